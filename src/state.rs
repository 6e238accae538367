use std::sync::Arc;

use crate::cache::PageCache;
use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::mailer::Mailer;
use crate::payments::PaymentGateway;

/// Shared application state.
///
/// Clients are constructed once in `main` and injected here; handlers never
/// build their own. Tests substitute in-memory implementations behind the
/// same traits.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub cache: PageCache,
    pub site: SiteConfig,
}
