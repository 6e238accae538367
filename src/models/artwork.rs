use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Sale status of an artwork document.
///
/// Available/Unavailable show in the gallery, Sold shows with an overlay,
/// Hidden doesn't show at all. Only Available pieces can be purchased.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
pub enum ArtworkStatus {
    #[default]
    Available,
    Unavailable,
    Sold,
    Hidden,
}

impl ArtworkStatus {
    /// Whether a checkout session may be created for this piece.
    pub fn is_purchasable(&self) -> bool {
        matches!(self, ArtworkStatus::Available)
    }
}

/// An artwork document as projected by the content store queries.
///
/// The queries flatten `slug.current` into a plain string, so `slug` here is
/// the URL-safe identifier used across checkout and fulfillment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    /// Free-form, e.g. "24x36 in"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Price in major currency units (USD dollars).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: ArtworkStatus,
    /// Portable-text blocks; passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    /// Set by fulfillment when the piece is marked sold.
    #[serde(default, rename = "soldAt", skip_serializing_if = "Option::is_none")]
    pub sold_at: Option<DateTime<Utc>>,
}
