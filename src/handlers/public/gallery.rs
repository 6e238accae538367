//! Cached gallery reads.
//!
//! Each endpoint serves its JSON payload out of the page cache when present
//! and repopulates it from the content store otherwise. The content webhook
//! purges these entries on document changes.

use axum::extract::State;
use serde_json::{json, Value};

use crate::cache::{artwork_detail_path, GALLERY_PATH, HOME_PATH};
use crate::error::{msg, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{Artwork, ArtworkStatus};
use crate::state::AppState;

/// Hidden pieces stay out of public payloads; the query itself is kept
/// identical to the CMS-side gallery query.
fn visible(artworks: Vec<Artwork>) -> Vec<Artwork> {
    artworks
        .into_iter()
        .filter(|a| a.status != ArtworkStatus::Hidden)
        .collect()
}

/// Home payload: the homepage document plus featured artworks.
pub async fn home(State(state): State<AppState>) -> Result<Json<Value>> {
    if let Some(cached) = state.cache.get(HOME_PATH) {
        return Ok(Json(cached));
    }

    let featured = visible(state.content.featured().await?);
    let homepage = state.content.homepage().await?;

    let payload = json!({
        "homepage": homepage,
        "featured": featured,
    });
    state.cache.put(HOME_PATH, payload.clone());

    Ok(Json(payload))
}

/// Full gallery listing.
pub async fn gallery_listing(State(state): State<AppState>) -> Result<Json<Value>> {
    if let Some(cached) = state.cache.get(GALLERY_PATH) {
        return Ok(Json(cached));
    }

    let artworks = visible(state.content.gallery().await?);

    let payload = json!(artworks);
    state.cache.put(GALLERY_PATH, payload.clone());

    Ok(Json(payload))
}

/// Single artwork detail view.
pub async fn artwork_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let path = artwork_detail_path(&slug);
    if let Some(cached) = state.cache.get(&path) {
        return Ok(Json(cached));
    }

    let artwork = state
        .content
        .artwork_by_slug(&slug)
        .await?
        .filter(|a| a.status != ArtworkStatus::Hidden)
        .or_not_found(msg::ARTWORK_NOT_FOUND)?;

    // Only hits are cached; misses return above without a cache entry.
    let payload = json!(artwork);
    state.cache.put(&path, payload.clone());

    Ok(Json(payload))
}
