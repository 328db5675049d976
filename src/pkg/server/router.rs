use axum::routing::post;
use axum::{routing::get, Router};

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = Router::new()
        .route("/forms", post(handlers::forms::create))
        .route("/forms", get(handlers::forms::list))
        .route("/forms/assign", post(handlers::forms::assign))
        .route("/forms/:token", get(handlers::forms::resolve))
        .route("/forms/:token/recipients", post(handlers::forms::add_recipient))
        .route("/forms/:token/submit", post(handlers::forms::submit))
        .route("/progress", get(handlers::progress::all_employees))
        .route("/progress/:email", get(handlers::progress::for_employee))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state);

    Ok(app)
}
