//! Payment provider integration.
//!
//! `PaymentGateway` is the seam between handlers and the provider API:
//! checkout-session creation and webhook signature verification. The
//! production implementation is `StripeClient`.

mod stripe;

pub use stripe::{
    StripeCheckoutSession, StripeClient, StripeCustomerDetails, StripeMetadata,
    StripePaymentIntent, StripeWebhookEvent,
};

use async_trait::async_trait;

use crate::error::Result;

/// Everything needed to create a hosted checkout session for one artwork.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionSpec {
    pub title: String,
    pub slug: String,
    pub description: String,
    /// Unit amount in minor currency units (cents).
    pub unit_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
    /// Allowed shipping countries; empty disables address collection.
    pub shipping_countries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

/// Convert a price in major units to minor units.
///
/// Fractional-cent prices are rounded to the nearest cent, not rejected;
/// callers supplying e.g. 10.005 get 1000 or 1001 per normal float rounding.
pub fn unit_amount_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session and return its id and URL.
    async fn create_checkout_session(&self, spec: &CheckoutSessionSpec) -> Result<CreatedSession>;

    /// Verify a webhook payload against its signature header.
    ///
    /// `Ok(false)` means a well-formed but non-matching (or stale)
    /// signature; `Err` means the header could not be parsed at all.
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool>;
}
