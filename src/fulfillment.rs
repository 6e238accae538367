//! Post-payment fulfillment.
//!
//! A verified completed checkout fans out three independent actions: mark
//! the artwork sold in the content store, email the customer, email the
//! artist. The actions run concurrently, none may abort another, and each
//! reports an explicit outcome so partial failure is visible to callers and
//! tests instead of only to the logs. Nothing here retries: the payment
//! already succeeded, so a failed notification is an operator problem, not
//! a buyer problem.

use chrono::Utc;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::mailer::{Mailer, OutboundEmail};

/// What fulfillment needs from a completed checkout session.
#[derive(Debug, Clone, Default)]
pub struct PurchaseNotice {
    pub artwork_slug: Option<String>,
    pub artwork_title: Option<String>,
    pub customer_email: Option<String>,
    /// Total charged, in minor currency units.
    pub amount_total: Option<i64>,
}

/// How a single fulfillment action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Preconditions weren't met (missing slug, unconfigured transport);
    /// not an error.
    Skipped(String),
    Failed(String),
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed(_))
    }
}

/// Settled outcomes of the three fulfillment actions.
#[derive(Debug, Clone)]
pub struct FulfillmentReport {
    pub mark_sold: ActionOutcome,
    pub customer_notice: ActionOutcome,
    pub artist_notice: ActionOutcome,
}

impl FulfillmentReport {
    pub fn has_failures(&self) -> bool {
        self.mark_sold.is_failure()
            || self.customer_notice.is_failure()
            || self.artist_notice.is_failure()
    }
}

/// Run all three fulfillment actions concurrently and collect the outcomes.
///
/// The notifications are attempted even when the session carried no artwork
/// slug; only the status patch depends on it.
pub async fn fulfill(
    content: &dyn ContentStore,
    mailer: &dyn Mailer,
    site: &SiteConfig,
    notice: &PurchaseNotice,
) -> FulfillmentReport {
    let (mark_sold, customer_notice, artist_notice) = tokio::join!(
        mark_sold(content, notice.artwork_slug.as_deref()),
        notify_customer(mailer, site, notice),
        notify_artist(mailer, site, notice),
    );

    FulfillmentReport {
        mark_sold,
        customer_notice,
        artist_notice,
    }
}

async fn mark_sold(content: &dyn ContentStore, slug: Option<&str>) -> ActionOutcome {
    let Some(slug) = slug else {
        return ActionOutcome::Skipped("no artwork slug in session metadata".to_string());
    };

    let artwork = match content.artwork_by_slug(slug).await {
        Ok(Some(artwork)) => artwork,
        Ok(None) => {
            tracing::warn!(slug, "Mark-sold skipped: artwork not found");
            return ActionOutcome::Skipped(format!("artwork not found: {}", slug));
        }
        Err(e) => {
            tracing::error!(slug, error = %e, "Mark-sold failed: lookup error");
            return ActionOutcome::Failed(e.to_string());
        }
    };

    // No status precondition here: a redelivered event re-patches to the
    // same terminal state, which is safe.
    match content.mark_sold(&artwork.id, Utc::now()).await {
        Ok(()) => {
            tracing::info!(slug, artwork_id = %artwork.id, "Artwork marked sold");
            ActionOutcome::Completed
        }
        Err(e) => {
            tracing::error!(slug, error = %e, "Mark-sold failed: patch error");
            ActionOutcome::Failed(e.to_string())
        }
    }
}

async fn notify_customer(
    mailer: &dyn Mailer,
    site: &SiteConfig,
    notice: &PurchaseNotice,
) -> ActionOutcome {
    if !mailer.is_configured() {
        return ActionOutcome::Skipped("mail transport not configured".to_string());
    }
    let Some(ref email) = notice.customer_email else {
        return ActionOutcome::Skipped("no customer email on session".to_string());
    };

    match mailer.send(&purchase_confirmation(site, notice, email)).await {
        Ok(()) => ActionOutcome::Completed,
        Err(e) => {
            tracing::error!(to = %email, error = %e, "Customer confirmation email failed");
            ActionOutcome::Failed(e.to_string())
        }
    }
}

async fn notify_artist(
    mailer: &dyn Mailer,
    site: &SiteConfig,
    notice: &PurchaseNotice,
) -> ActionOutcome {
    if !mailer.is_configured() {
        return ActionOutcome::Skipped("mail transport not configured".to_string());
    }
    let Some(ref email) = site.artist_email else {
        return ActionOutcome::Skipped("artist email not configured".to_string());
    };

    match mailer.send(&sale_notification(site, notice, email)).await {
        Ok(()) => ActionOutcome::Completed,
        Err(e) => {
            tracing::error!(to = %email, error = %e, "Artist sale notification failed");
            ActionOutcome::Failed(e.to_string())
        }
    }
}

fn title_or_fallback(notice: &PurchaseNotice) -> &str {
    notice.artwork_title.as_deref().unwrap_or("your artwork")
}

fn format_amount(cents: Option<i64>) -> String {
    match cents {
        Some(cents) => format!("${:.2}", cents as f64 / 100.0),
        None => "—".to_string(),
    }
}

fn purchase_confirmation(
    site: &SiteConfig,
    notice: &PurchaseNotice,
    to: &str,
) -> OutboundEmail {
    let title = title_or_fallback(notice);
    let amount = format_amount(notice.amount_total);

    let text = format!(
        "Thank you for your purchase!\n\nYour payment of {} for \"{}\" has been received. \
         {} will be in touch shortly to arrange shipping.\n\nIf you have any questions, \
         just reply to this email.",
        amount, title, site.artist_name
    );
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h2 style="color: #333;">Thank you for your purchase!</h2>
<p>Your payment of <strong>{}</strong> for <strong>{}</strong> has been received.</p>
<p>{} will be in touch shortly to arrange shipping.</p>
<p style="color: #666;">If you have any questions, just reply to this email.</p>
</body>
</html>"#,
        amount, title, site.artist_name
    );

    OutboundEmail {
        to: to.to_string(),
        subject: format!("Your purchase from {}", site.artist_name),
        text,
        html: Some(html),
        reply_to: site.artist_email.clone(),
    }
}

fn sale_notification(site: &SiteConfig, notice: &PurchaseNotice, to: &str) -> OutboundEmail {
    let title = title_or_fallback(notice);
    let amount = format_amount(notice.amount_total);
    let slug = notice.artwork_slug.as_deref().unwrap_or("(unknown)");
    let buyer = notice
        .customer_email
        .as_deref()
        .unwrap_or("(no email provided)");

    let text = format!(
        "An artwork just sold.\n\nTitle: {}\nSlug: {}\nAmount: {}\nBuyer: {}\n\n\
         The piece has been marked sold on the site.",
        title, slug, amount, buyer
    );
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h2 style="color: #333;">An artwork just sold</h2>
<div style="background: #f5f5f5; padding: 20px; border-radius: 8px;">
<p><strong>Title:</strong> {}</p>
<p><strong>Slug:</strong> {}</p>
<p><strong>Amount:</strong> {}</p>
<p><strong>Buyer:</strong> {}</p>
</div>
<p style="color: #666;">The piece has been marked sold on the site.</p>
</body>
</html>"#,
        title, slug, amount, buyer
    );

    OutboundEmail {
        to: to.to_string(),
        subject: format!("Artwork sold: {}", title),
        text,
        html: Some(html),
        reply_to: None,
    }
}
