//! Publish handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{PublishRequest, PublishResponse, json_body, required};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `POST /publish`: Publish a message on a topic.
///
/// Responds as soon as the broker has accepted the message; delivery to
/// subscribers is asynchronous and its outcome is not reported back.
///
/// # Errors
///
/// Returns [`RelayError`] if a field is missing or the broker is
/// unavailable.
#[utoipa::path(
    post,
    path = "/publish",
    tag = "Publishing",
    summary = "Publish a message",
    description = "Hands a message to the broker for asynchronous fan-out to topic subscribers.",
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Message accepted for dispatch", body = PublishResponse),
        (status = 400, description = "Topic or message missing", body = ErrorResponse),
        (status = 500, description = "Broker unavailable", body = ErrorResponse),
    )
)]
pub async fn publish(
    State(state): State<AppState>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let req = json_body(payload)?;
    let message_text = req.message_text();
    let topic = required(req.topic, "topic")?;
    let message = required(message_text, "message")?;

    state.relay_service.publish(&topic, &message).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            topic,
            status: "accepted".to_string(),
        }),
    ))
}

/// Publish routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/publish", post(publish))
}
