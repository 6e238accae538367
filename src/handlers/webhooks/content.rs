//! Content store change webhook.
//!
//! The CMS posts a change notification whenever a document is published; the
//! handler checks the shared secret and purges the affected page-cache
//! entries. A pure dispatch table, not a state machine.

use axum::{extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::cache::paths_for_document;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::state::AppState;

/// The CMS sends slugs either as the raw `{current}` object or already
/// flattened to a string, depending on webhook projection.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SlugField {
    Object { current: String },
    Plain(String),
}

impl SlugField {
    fn as_str(&self) -> &str {
        match self {
            SlugField::Object { current } => current,
            SlugField::Plain(slug) => slug,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentChange {
    #[serde(rename = "_type")]
    pub document_type: String,
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(rename = "_rev")]
    pub rev: Option<String>,
    #[serde(default)]
    pub slug: Option<SlugField>,
}

#[derive(Debug, Serialize)]
pub struct ContentWebhookResponse {
    pub message: &'static str,
    #[serde(rename = "documentType")]
    pub document_type: String,
    pub paths: Vec<String>,
}

/// Pull the shared secret out of the request: `Authorization` (with or
/// without a `Bearer ` prefix) or the vendor signature header.
fn provided_secret(headers: &HeaderMap) -> Option<&str> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        return Some(auth.strip_prefix("Bearer ").unwrap_or(auth));
    }
    headers
        .get("sanity-webhook-signature")
        .and_then(|v| v.to_str().ok())
}

fn authorize(headers: &HeaderMap, configured: Option<&str>) -> Result<()> {
    // No secret configured means the endpoint is open.
    let Some(expected) = configured else {
        return Ok(());
    };

    let provided = provided_secret(headers).ok_or(AppError::Unauthorized)?;
    if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(())
    } else {
        tracing::warn!("Content webhook rejected: secret mismatch");
        Err(AppError::Unauthorized)
    }
}

pub async fn handle_content_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(change): Json<ContentChange>,
) -> Result<Json<ContentWebhookResponse>> {
    authorize(&headers, state.site.content_webhook_secret.as_deref())?;

    tracing::info!(
        document_type = %change.document_type,
        document_id = change.id.as_deref().unwrap_or("(unknown)"),
        operation = if change.rev.is_some() { "update" } else { "create" },
        "Content webhook received"
    );

    let slug = change.slug.as_ref().map(SlugField::as_str);
    let paths = paths_for_document(&change.document_type, slug);

    let purged = state.cache.invalidate(&paths);
    tracing::info!(?paths, purged, "Cache paths invalidated");

    Ok(Json(ContentWebhookResponse {
        message: "Revalidation triggered successfully",
        document_type: change.document_type,
        paths,
    }))
}
