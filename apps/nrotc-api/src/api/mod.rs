//! API routes module
//!
//! Every resource is mounted twice: public routes at `/{name}` and admin
//! routes at `/admin/{name}`. `axum_helpers::create_router` nests the result
//! under `/api`.

pub mod health;
pub mod users;

use axum::Router;
use axum_helpers::mount_resources;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    mount_resources([users::routes(state)]).merge(health::router(state.clone()))
}
