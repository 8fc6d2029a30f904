pub mod answer_question;
