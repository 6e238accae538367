//! Test utilities and fixtures for Easel integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use axum::routing::{get, post};
use axum::{body::Body, http::Request, Router};
use chrono::{DateTime, Utc};

pub use easel::config::SiteConfig;
pub use easel::content::ContentStore;
pub use easel::error::{msg, AppError, Result};
pub use easel::fulfillment::{fulfill, ActionOutcome, PurchaseNotice};
pub use easel::handlers::public::{
    artwork_detail, create_checkout, gallery_listing, home, submit_contact,
};
pub use easel::handlers::webhooks::{handle_content_webhook, handle_payment_webhook};
pub use easel::mailer::{Mailer, OutboundEmail};
pub use easel::models::{Artwork, ArtworkStatus};
pub use easel::payments::{
    CheckoutSessionSpec, CreatedSession, PaymentGateway, StripeClient,
};
pub use easel::state::AppState;

/// Webhook signing secret used by the recording gateway.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// In-memory content store keyed by slug.
#[derive(Default)]
pub struct MemoryContentStore {
    artworks: RwLock<HashMap<String, Artwork>>,
    homepage: Option<serde_json::Value>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, artwork: Artwork) {
        self.artworks
            .write()
            .unwrap()
            .insert(artwork.slug.clone(), artwork);
    }

    /// Current state of an artwork, for assertions.
    pub fn get(&self, slug: &str) -> Option<Artwork> {
        self.artworks.read().unwrap().get(slug).cloned()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn artwork_by_slug(&self, slug: &str) -> Result<Option<Artwork>> {
        Ok(self.artworks.read().unwrap().get(slug).cloned())
    }

    async fn gallery(&self) -> Result<Vec<Artwork>> {
        let mut all: Vec<Artwork> = self.artworks.read().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(all)
    }

    async fn featured(&self) -> Result<Vec<Artwork>> {
        let mut featured: Vec<Artwork> = self
            .artworks
            .read()
            .unwrap()
            .values()
            .filter(|a| a.featured.unwrap_or(false))
            .cloned()
            .collect();
        featured.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(featured)
    }

    async fn homepage(&self) -> Result<Option<serde_json::Value>> {
        Ok(self.homepage.clone())
    }

    async fn mark_sold(&self, artwork_id: &str, sold_at: DateTime<Utc>) -> Result<()> {
        let mut artworks = self.artworks.write().unwrap();
        let artwork = artworks
            .values_mut()
            .find(|a| a.id == artwork_id)
            .ok_or_else(|| AppError::NotFound(format!("No document with id {}", artwork_id)))?;
        artwork.status = ArtworkStatus::Sold;
        artwork.sold_at = Some(sold_at);
        Ok(())
    }
}

/// Mailer that records every message; optionally fails or reports itself
/// unconfigured.
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    configured: bool,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            configured: true,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn sent_to(&self, address: &str) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == address)
            .cloned()
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, mail: &OutboundEmail) -> Result<()> {
        if !self.configured {
            return Err(AppError::Internal(msg::MAIL_NOT_CONFIGURED.into()));
        }
        if self.fail {
            return Err(AppError::Upstream("SMTP error: connection refused".into()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Gateway that records created sessions and verifies signatures with the
/// real Stripe HMAC scheme under `TEST_WEBHOOK_SECRET`.
pub struct RecordingGateway {
    verifier: StripeClient,
    pub sessions: Mutex<Vec<CheckoutSessionSpec>>,
    fail: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            verifier: StripeClient::new(&easel::config::StripeConfig {
                secret_key: "sk_test_xxx".to_string(),
                webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            }),
            sessions: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_checkout_session(&self, spec: &CheckoutSessionSpec) -> Result<CreatedSession> {
        if self.fail {
            return Err(AppError::Upstream("Stripe API error: boom".into()));
        }
        self.sessions.lock().unwrap().push(spec.clone());
        Ok(CreatedSession {
            id: "cs_test_1".to_string(),
            url: "https://checkout.stripe.test/c/pay/cs_test_1".to_string(),
        })
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        self.verifier.verify_webhook_signature(payload, signature)
    }
}

/// Site settings used by the test state.
pub fn test_site() -> SiteConfig {
    SiteConfig {
        base_url: "http://localhost:3000".to_string(),
        artist_name: "Vicki Danielson".to_string(),
        artist_email: Some("artist@example.com".to_string()),
        shipping_countries: vec!["US".to_string(), "CA".to_string()],
        content_webhook_secret: Some("cms-test-secret".to_string()),
    }
}

/// Bundled fixtures plus the state wired from them.
pub struct TestContext {
    pub content: Arc<MemoryContentStore>,
    pub gateway: Arc<RecordingGateway>,
    pub mailer: Arc<RecordingMailer>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(test_site(), RecordingGateway::new(), RecordingMailer::new())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        Self::build(test_site(), RecordingGateway::new(), mailer)
    }

    pub fn with_gateway(gateway: RecordingGateway) -> Self {
        Self::build(test_site(), gateway, RecordingMailer::new())
    }

    pub fn with_site(site: SiteConfig) -> Self {
        Self::build(site, RecordingGateway::new(), RecordingMailer::new())
    }

    pub fn build(site: SiteConfig, gateway: RecordingGateway, mailer: RecordingMailer) -> Self {
        let content = Arc::new(MemoryContentStore::new());
        let gateway = Arc::new(gateway);
        let mailer = Arc::new(mailer);
        let state = AppState {
            content: content.clone(),
            gateway: gateway.clone(),
            mailer: mailer.clone(),
            cache: Default::default(),
            site,
        };
        Self {
            content,
            gateway,
            mailer,
            state,
        }
    }

    /// All routes, without the rate-limiting layers (those need socket
    /// connect info).
    pub fn app(&self) -> Router {
        Router::new()
            .route("/checkout", post(create_checkout))
            .route("/contact", post(submit_contact))
            .route("/", get(home))
            .route("/artwork", get(gallery_listing))
            .route("/art/{slug}", get(artwork_detail))
            .route("/webhook/payment", post(handle_payment_webhook))
            .route("/webhook/content", post(handle_content_webhook))
            .with_state(self.state.clone())
    }
}

/// Create a test artwork with the given status.
pub fn test_artwork(slug: &str, title: &str, price: f64, status: ArtworkStatus) -> Artwork {
    Artwork {
        id: format!("art-{}", slug),
        title: title.to_string(),
        slug: slug.to_string(),
        images: None,
        medium: Some("Oil on canvas".to_string()),
        dimensions: Some("24x36 in".to_string()),
        year: Some(2024),
        price: Some(price),
        status,
        description: None,
        featured: Some(false),
        sold_at: None,
    }
}

/// Build a JSON request for `oneshot`.
pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============ Stripe webhook signing helpers ============

/// Get current Unix timestamp as a string (for webhook signature tests)
pub fn current_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Get an old timestamp (for testing timestamp rejection)
pub fn old_timestamp() -> String {
    // 10 minutes ago - beyond the 5-minute tolerance
    (chrono::Utc::now().timestamp() - 600).to_string()
}

pub fn compute_stripe_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Signature header for a payload signed with the test webhook secret.
pub fn signed_header(payload: &[u8]) -> String {
    let timestamp = current_timestamp();
    let signature = compute_stripe_signature(payload, TEST_WEBHOOK_SECRET, &timestamp);
    format!("t={},v1={}", timestamp, signature)
}

/// Build a signed webhook request.
pub fn webhook_request(payload: &str, signature_header: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook/payment")
        .header("stripe-signature", signature_header)
        .body(Body::from(payload.to_string()))
        .unwrap()
}

/// A `checkout.session.completed` event body.
pub fn completed_session_event(
    slug: Option<&str>,
    title: Option<&str>,
    customer_email: Option<&str>,
    amount_total: Option<i64>,
) -> String {
    let mut metadata = serde_json::Map::new();
    if let Some(slug) = slug {
        metadata.insert("artwork_slug".into(), slug.into());
    }
    if let Some(title) = title {
        metadata.insert("artwork_title".into(), title.into());
    }

    serde_json::json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_1",
                "payment_status": "paid",
                "amount_total": amount_total,
                "customer_details": customer_email.map(|e| serde_json::json!({"email": e})),
                "metadata": metadata,
            }
        }
    })
    .to_string()
}
