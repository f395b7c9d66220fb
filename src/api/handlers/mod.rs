//! REST endpoint handlers organized by resource.

pub mod publish;
pub mod subscription;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes the subscriber and publish routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(subscription::routes())
        .merge(publish::routes())
}
