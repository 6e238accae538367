use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::StripeConfig;
use crate::error::{msg, AppError, Result};

use super::{CheckoutSessionSpec, CreatedSession, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

// Note: sessions are created with ad-hoc price_data rather than dashboard
// price ids. Each artwork is a one-off original, so there is no catalog
// entry to link against.

#[derive(Debug, Deserialize)]
struct CreateCheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
        }
    }

    /// Form-encoded parameters for the checkout session create call.
    ///
    /// Both the session metadata and the product metadata carry the artwork
    /// slug so the webhook can recover identity without re-querying by
    /// title.
    fn checkout_form(spec: &CheckoutSessionSpec) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), spec.success_url.clone()),
            ("cancel_url".to_string(), spec.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                spec.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                spec.title.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                spec.description.clone(),
            ),
            (
                "line_items[0][price_data][product_data][metadata][artwork_slug]".to_string(),
                spec.slug.clone(),
            ),
            ("metadata[artwork_slug]".to_string(), spec.slug.clone()),
            ("metadata[artwork_title]".to_string(), spec.title.clone()),
        ];

        for (i, country) in spec.shipping_countries.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{}]", i),
                country.clone(),
            ));
        }

        params
    }

    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    /// Stripe recommends 300 seconds (5 minutes).
    const WEBHOOK_TIMESTAMP_TOLERANCE_SECS: i64 = 300;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(&self, spec: &CheckoutSessionSpec) -> Result<CreatedSession> {
        let response = self
            .client
            .post("https://api.stripe.com/v1/checkout/sessions")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&Self::checkout_form(spec))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        let session: CreateCheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(CreatedSession {
            id: session.id,
            url: session.url,
        })
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        // Stripe signature format: t=timestamp,v1=signature
        let parts: Vec<&str> = signature.split(',').collect();

        let mut timestamp = None;
        let mut sig_v1 = None;

        for part in parts {
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                sig_v1 = Some(s);
            }
        }

        let timestamp_str =
            timestamp.ok_or_else(|| AppError::BadRequest(msg::INVALID_SIGNATURE_FORMAT.into()))?;
        let sig_v1 =
            sig_v1.ok_or_else(|| AppError::BadRequest(msg::INVALID_SIGNATURE_FORMAT.into()))?;

        // Parse and validate timestamp to prevent replay attacks.
        // Reject webhooks older than WEBHOOK_TIMESTAMP_TOLERANCE_SECS.
        let timestamp: i64 = timestamp_str
            .parse()
            .map_err(|_| AppError::BadRequest(msg::INVALID_TIMESTAMP_IN_SIGNATURE.into()))?;

        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(
                "Stripe webhook rejected: timestamp too old (age={}s, max={}s)",
                age,
                Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS
            );
            return Ok(false);
        }

        // Also reject timestamps from the future (clock skew tolerance: 60 seconds)
        if age < -60 {
            tracing::warn!(
                "Stripe webhook rejected: timestamp in the future (age={}s)",
                age
            );
            return Ok(false);
        }

        // Construct signed payload
        let signed_payload = format!("{}.{}", timestamp_str, String::from_utf8_lossy(payload));

        // Compute expected signature
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal(msg::INVALID_WEBHOOK_SECRET.into()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        // Use constant-time comparison to prevent timing attacks.
        let expected_bytes = expected.as_bytes();
        let provided_bytes = sig_v1.as_bytes();

        // Length check is not constant-time, but signature length is not
        // secret (always 64 hex chars for SHA-256).
        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }
}

/// Generic Stripe webhook event - object is parsed based on event_type
#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

// ============ checkout.session.completed ============

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub amount_total: Option<i64>,
    pub customer_details: Option<StripeCustomerDetails>,
    pub metadata: Option<StripeMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomerDetails {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StripeMetadata {
    pub artwork_slug: Option<String>,
    pub artwork_title: Option<String>,
}

// ============ payment_intent.payment_failed ============

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CheckoutSessionSpec {
        CheckoutSessionSpec {
            title: "Sunset".to_string(),
            slug: "sunset".to_string(),
            description: "Original artwork by the artist".to_string(),
            unit_amount: 25000,
            success_url: "http://localhost:3000/purchase/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "http://localhost:3000/art/sunset".to_string(),
            shipping_countries: vec!["US".to_string(), "CA".to_string()],
        }
    }

    fn form_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_checkout_form_carries_metadata_and_amount() {
        let params = StripeClient::checkout_form(&spec());

        assert_eq!(form_value(&params, "mode"), Some("payment"));
        assert_eq!(
            form_value(&params, "line_items[0][price_data][unit_amount]"),
            Some("25000")
        );
        assert_eq!(form_value(&params, "metadata[artwork_slug]"), Some("sunset"));
        assert_eq!(
            form_value(&params, "metadata[artwork_title]"),
            Some("Sunset")
        );
        assert_eq!(
            form_value(
                &params,
                "line_items[0][price_data][product_data][metadata][artwork_slug]"
            ),
            Some("sunset")
        );
    }

    #[test]
    fn test_checkout_form_shipping_countries() {
        let params = StripeClient::checkout_form(&spec());
        assert_eq!(
            form_value(&params, "shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            form_value(&params, "shipping_address_collection[allowed_countries][1]"),
            Some("CA")
        );

        let mut no_shipping = spec();
        no_shipping.shipping_countries.clear();
        let params = StripeClient::checkout_form(&no_shipping);
        assert!(params
            .iter()
            .all(|(k, _)| !k.starts_with("shipping_address_collection")));
    }

    #[test]
    fn test_session_metadata_null_is_accepted() {
        let session: StripeCheckoutSession = serde_json::from_value(serde_json::json!({
            "id": "cs_test_1",
            "amount_total": 25000,
            "metadata": null
        }))
        .unwrap();
        assert!(session.metadata.is_none());
    }
}
