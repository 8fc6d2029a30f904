mod ask;
mod health_check;
mod helpers;
