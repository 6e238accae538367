//! Payment provider webhook.
//!
//! Signature verification happens before anything else touches the body; a
//! forged payload is never deserialized. Once verified, the handler always
//! acknowledges with 200 - the provider retries on non-2xx, and redelivering
//! an event because a mail server was down would only amplify the failure.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{msg, AppError};
use crate::fulfillment::{fulfill, ActionOutcome, PurchaseNotice};
use crate::payments::{StripeCheckoutSession, StripePaymentIntent, StripeWebhookEvent};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct WebhookAck {
    received: bool,
}

fn ack() -> Response {
    (StatusCode::OK, Json(WebhookAck { received: true })).into_response()
}

fn signature_header(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get("stripe-signature")
        .ok_or_else(|| AppError::BadRequest(msg::MISSING_SIGNATURE_HEADER.into()))?
        .to_str()
        .map_err(|_| AppError::BadRequest(msg::INVALID_SIGNATURE_HEADER.into()))
}

pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = match signature_header(&headers) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };

    match state.gateway.verify_webhook_signature(&body, signature) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Payment webhook rejected: signature mismatch");
            return AppError::BadRequest(msg::INVALID_SIGNATURE.into()).into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Payment webhook rejected: unparseable signature");
            return e.into_response();
        }
    }

    let StripeWebhookEvent { event_type, data } =
        match serde_json::from_slice::<StripeWebhookEvent>(&body) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse payment webhook payload");
                return AppError::BadRequest(msg::INVALID_WEBHOOK_PAYLOAD.into()).into_response();
            }
        };

    match event_type.as_str() {
        "checkout.session.completed" => handle_checkout_completed(&state, data.object).await,
        "payment_intent.payment_failed" => {
            match serde_json::from_value::<StripePaymentIntent>(data.object) {
                Ok(intent) => tracing::warn!(payment_intent = %intent.id, "Payment failed"),
                Err(e) => tracing::warn!(error = %e, "Payment failed (unparseable intent)"),
            }
        }
        // Routine events that accompany a checkout; nothing to do.
        "charge.succeeded" | "charge.updated" | "payment_intent.succeeded"
        | "payment_intent.created" => {
            tracing::debug!(%event_type, "Ignoring routine payment event");
        }
        other => {
            tracing::debug!(event_type = %other, "Unhandled payment event type");
        }
    }

    ack()
}

async fn handle_checkout_completed(state: &AppState, object: serde_json::Value) {
    let session: StripeCheckoutSession = match serde_json::from_value(object) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse checkout session from event");
            return;
        }
    };

    let metadata = session.metadata.unwrap_or_default();
    let notice = PurchaseNotice {
        artwork_slug: metadata.artwork_slug,
        artwork_title: metadata.artwork_title,
        customer_email: session.customer_details.and_then(|d| d.email),
        amount_total: session.amount_total,
    };

    tracing::info!(
        session_id = %session.id,
        slug = notice.artwork_slug.as_deref().unwrap_or("(none)"),
        "Payment completed, dispatching fulfillment"
    );

    let report = fulfill(
        state.content.as_ref(),
        state.mailer.as_ref(),
        &state.site,
        &notice,
    )
    .await;

    if report.has_failures() {
        // Logged but not surfaced: the buyer already paid, and a non-2xx
        // here would only trigger provider redelivery.
        tracing::error!(
            session_id = %session.id,
            mark_sold = ?report.mark_sold,
            customer_notice = ?report.customer_notice,
            artist_notice = ?report.artist_notice,
            "Fulfillment finished with failures"
        );
    } else if report.mark_sold == ActionOutcome::Completed {
        tracing::info!(session_id = %session.id, "Fulfillment complete");
    }
}
