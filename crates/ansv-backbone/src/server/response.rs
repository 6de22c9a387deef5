use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

pub(crate) fn handle_internal_server_error(e: &anyhow::Error) -> impl IntoResponse {
    error!(error = ?e, "unhandled error occurred.");
    (StatusCode::INTERNAL_SERVER_ERROR, error_payload("internal server error"))
}

#[derive(Serialize, Debug)]
pub(crate) struct ErrorPayload<'a> {
    error: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct MessagePayload<'a> {
    message: &'a str,
}

pub fn error_payload(message: &str) -> Json<ErrorPayload<'_>> {
    Json(ErrorPayload { error: message })
}

pub fn message_payload(message: &str) -> Json<MessagePayload<'_>> {
    Json(MessagePayload { message })
}
