use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::Json;
use crate::payments::{unit_amount_cents, CheckoutSessionSpec};
use crate::state::AppState;

/// Checkout request as submitted by the buy button: the artwork's display
/// title, its listed price in dollars, and the slug identifying it.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Validate the request fields; all three are required and must be
/// non-empty / positive.
fn validate(request: &CheckoutRequest) -> Result<(String, f64, String)> {
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let slug = request
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let price = request.price.filter(|p| p.is_finite() && *p > 0.0);

    match (title, price, slug) {
        (Some(title), Some(price), Some(slug)) => {
            Ok((title.to_string(), price, slug.to_string()))
        }
        _ => Err(AppError::BadRequest(msg::MISSING_CHECKOUT_FIELDS.into())),
    }
}

/// Create a hosted checkout session for a single artwork.
///
/// The availability check and the session creation are two separate calls
/// with no transaction between them; see DESIGN.md for the accepted race.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let (title, price, slug) = validate(&request)?;

    tracing::debug!(%slug, price, "Checkout request received");

    let artwork = state
        .content
        .artwork_by_slug(&slug)
        .await?
        .or_not_found(msg::ARTWORK_NOT_FOUND)?;

    if !artwork.status.is_purchasable() {
        return Err(AppError::Conflict(msg::ARTWORK_UNAVAILABLE.into()));
    }

    let spec = CheckoutSessionSpec {
        description: format!("Original artwork by {}", state.site.artist_name),
        // The provider substitutes the placeholder with the real session id
        // on redirect.
        success_url: format!(
            "{}/purchase/success?session_id={{CHECKOUT_SESSION_ID}}",
            state.site.base_url
        ),
        cancel_url: format!("{}/art/{}", state.site.base_url, slug),
        unit_amount: unit_amount_cents(price),
        shipping_countries: state.site.shipping_countries.clone(),
        title,
        slug,
    };

    let session = state.gateway.create_checkout_session(&spec).await?;

    tracing::info!(session_id = %session.id, slug = %spec.slug, "Checkout session created");

    Ok(Json(CheckoutResponse { url: session.url }))
}
