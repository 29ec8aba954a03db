//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod accessories;
pub mod sse;

use axum::Router;
use axum::routing::{get, put};

use habridge_app::ports::{AccessoryHost, RemoteStateService};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, H>() -> Router<AppState<R, H>>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    Router::new()
        .route("/accessories", get(accessories::list::<R, H>))
        .route("/accessories/{name}", get(accessories::get::<R, H>))
        .route(
            "/accessories/{name}/characteristics",
            put(accessories::write::<R, H>),
        )
        .route(
            "/accessories/{name}/characteristics/{kind}",
            get(accessories::read::<R, H>),
        )
        .route("/events/stream", get(sse::stream::<R, H>))
}
