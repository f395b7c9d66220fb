//! Registration and subscription handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    RegisterRequest, SubscribeRequest, SubscribeResponse, SubscriberDto, json_body, required,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `POST /register`: Register a notification address.
///
/// # Errors
///
/// Returns [`RelayError`] if the email is missing, already registered, or
/// the registry fails.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Subscribers",
    summary = "Register a subscriber",
    description = "Registers an email address with an empty topic set.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Subscriber registered", body = SubscriberDto),
        (status = 400, description = "Email missing or already registered", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let req = json_body(payload)?;
    let email = required(req.email, "email")?;

    let subscriber = state.relay_service.register(&email).await?;

    Ok((StatusCode::CREATED, Json(SubscriberDto::from(subscriber))))
}

/// `POST /subscribe`: Subscribe a registered address to a topic.
///
/// # Errors
///
/// Returns [`RelayError`] if a field is missing, the email is not
/// registered, or the registry fails.
#[utoipa::path(
    post,
    path = "/subscribe",
    tag = "Subscribers",
    summary = "Subscribe to a topic",
    description = "Adds a topic to a subscriber. Subscribing twice to the same topic is a no-op.",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = SubscribeResponse),
        (status = 400, description = "Field missing or email not registered", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let req = json_body(payload)?;
    let email = required(req.email, "email")?;
    let topic = required(req.topic, "topic")?;

    let newly_added = state.relay_service.subscribe(&email, &topic).await?;

    Ok(Json(SubscribeResponse {
        message: format!("Subscribed to {topic}"),
        email,
        topic,
        newly_added,
    }))
}

/// `GET /subscribers/{email}`: Inspect a subscriber's topics.
///
/// # Errors
///
/// Returns [`RelayError::SubscriberNotFound`] if the email is not
/// registered.
#[utoipa::path(
    get,
    path = "/subscribers/{email}",
    tag = "Subscribers",
    summary = "Get a subscriber",
    description = "Returns a subscriber and the topics it is subscribed to.",
    params(
        ("email" = String, Path, description = "Subscriber email address"),
    ),
    responses(
        (status = 200, description = "Subscriber details", body = SubscriberDto),
        (status = 400, description = "Email not registered", body = ErrorResponse),
    )
)]
pub async fn get_subscriber(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let subscriber = state.relay_service.subscriber(&email).await?;
    Ok(Json(SubscriberDto::from(subscriber)))
}

/// Subscriber routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/subscribe", post(subscribe))
        .route("/subscribers/{email}", get(get_subscriber))
}
