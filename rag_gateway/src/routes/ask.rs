use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use tracing::info;

use crate::use_cases::answer_question::{
    AnswerQuestionError, AnswerQuestionRequest, AnswerQuestionUseCase,
};

#[tracing::instrument(name = "Ask handler", skip(answer_question_use_case))]
pub async fn ask(
    answer_question_use_case: web::Data<AnswerQuestionUseCase>,
    body: web::Json<BodyData>,
) -> Result<HttpResponse, AskError> {
    info!("Answering a question on collection '{}'", body.collection);

    let request = AnswerQuestionRequest {
        question: body.text.clone(),
        collection_name: body.collection.clone(),
        nb_results: body.n,
    };

    let answered = answer_question_use_case.execute(request).await?;

    Ok(HttpResponse::Ok().json(answered))
}

#[derive(Debug, serde::Deserialize)]
pub struct BodyData {
    /// The question
    text: String,
    /// Collection to search for supporting content
    collection: String,
    /// Number of nearest points backing the answer
    #[serde(default = "default_nb_results")]
    n: u64,
}

fn default_nb_results() -> u64 {
    1
}

#[derive(thiserror::Error)]
pub enum AskError {
    #[error(transparent)]
    AnswerQuestionError(#[from] AnswerQuestionError),
}

impl std::fmt::Debug for AskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AskError {
    fn status_code(&self) -> StatusCode {
        match self {
            AskError::AnswerQuestionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
