pub mod content;
pub mod payment;

pub use content::handle_content_webhook;
pub use payment::handle_payment_webhook;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook/payment", post(handle_payment_webhook))
        .route("/webhook/content", post(handle_content_webhook))
}
