//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    PublishRequest, PublishResponse, RegisterRequest, SubscribeRequest, SubscribeResponse,
    SubscriberDto,
};
use super::handlers::{publish, subscription, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "notify-relay",
        description = "Topic-based notification relay: register, subscribe, publish."
    ),
    paths(
        subscription::register,
        subscription::subscribe,
        subscription::get_subscriber,
        publish::publish,
        system::health_handler,
    ),
    components(schemas(
        RegisterRequest,
        SubscribeRequest,
        SubscribeResponse,
        SubscriberDto,
        PublishRequest,
        PublishResponse,
        system::HealthResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Subscribers", description = "Registration and topic subscription"),
        (name = "Publishing", description = "Message publication"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
