mod checkout;
mod contact;
mod gallery;

pub use checkout::*;
pub use contact::*;
pub use gallery::*;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::rate_limit;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(limits: RateLimitConfig) -> Router<AppState> {
    // Checkout and contact call out to Stripe / the mail relay; everything
    // else is cached reads.
    let strict = Router::new()
        .route("/checkout", post(create_checkout))
        .route("/contact", post(submit_contact))
        .route_layer(rate_limit::strict_layer(limits.strict_rpm));

    let relaxed = Router::new()
        .route("/health", get(health))
        .route("/", get(home))
        .route("/artwork", get(gallery_listing))
        .route("/art/{slug}", get(artwork_detail))
        .route_layer(rate_limit::relaxed_layer(limits.relaxed_rpm));

    strict.merge(relaxed)
}
