//! In-process page cache and the content-webhook revalidation table.
//!
//! Gallery responses are cached under their request path and purged when the
//! CMS reports a document change. The path set per document type mirrors the
//! site structure: home shows featured pieces, `/artwork` is the gallery
//! listing, `/art/{slug}` the detail view.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

pub const HOME_PATH: &str = "/";
pub const GALLERY_PATH: &str = "/artwork";

pub fn artwork_detail_path(slug: &str) -> String {
    format!("/art/{}", slug)
}

/// Paths to invalidate for a changed document of the given type.
///
/// Artwork edits touch the home page (featured pieces), the listing, and the
/// detail page when a slug is known. Homepage edits touch only home.
/// Unrecognized types fall back to home + listing.
pub fn paths_for_document(doc_type: &str, slug: Option<&str>) -> Vec<String> {
    match doc_type {
        "artwork" => {
            let mut paths = vec![HOME_PATH.to_string(), GALLERY_PATH.to_string()];
            if let Some(slug) = slug {
                paths.push(artwork_detail_path(slug));
            }
            paths
        }
        "homepage" => vec![HOME_PATH.to_string()],
        _ => vec![HOME_PATH.to_string(), GALLERY_PATH.to_string()],
    }
}

/// Shared cache of rendered JSON payloads keyed by request path.
///
/// No TTL: entries live until a content webhook invalidates them, matching
/// the on-demand revalidation model of the original site.
#[derive(Clone, Default)]
pub struct PageCache {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.inner
            .read()
            .expect("page cache lock poisoned")
            .get(path)
            .cloned()
    }

    pub fn put(&self, path: &str, value: Value) {
        self.inner
            .write()
            .expect("page cache lock poisoned")
            .insert(path.to_string(), value);
    }

    /// Remove the given paths, returning how many entries were present.
    pub fn invalidate(&self, paths: &[String]) -> usize {
        let mut cache = self.inner.write().expect("page cache lock poisoned");
        paths
            .iter()
            .filter(|path| cache.remove(path.as_str()).is_some())
            .count()
    }
}
