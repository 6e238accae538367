use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::mailer::OutboundEmail;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
}

/// Basic email format validation.
///
/// Intentionally permissive: exactly one @, non-empty local part, dotted
/// domain. Not RFC 5322, just a sanity check before we hand the address to
/// the mail relay.
fn validate_email_format(email: &str) -> Result<()> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    Ok(())
}

/// Handle a contact form submission: notify the artist and send the sender
/// an auto-reply. Both messages must go out for the request to succeed.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let message = request.message.as_deref().map(str::trim).unwrap_or_default();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(msg::CONTACT_FIELDS_REQUIRED.into()));
    }
    validate_email_format(email)?;

    let artist_email = match (state.mailer.is_configured(), &state.site.artist_email) {
        (true, Some(artist_email)) => artist_email.clone(),
        _ => {
            tracing::error!("Contact form rejected: email configuration missing");
            return Err(AppError::Internal(msg::EMAIL_NOT_CONFIGURED.into()));
        }
    };

    let subject = request
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("General Inquiry");

    let notification = artist_notification(&artist_email, name, email, subject, message);
    let auto_reply = customer_auto_reply(&state, name, email, subject, message);

    tokio::try_join!(
        state.mailer.send(&notification),
        state.mailer.send(&auto_reply)
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to send contact form emails");
        AppError::Upstream(msg::CONTACT_SEND_FAILED.into())
    })?;

    tracing::info!(from = %email, "Contact form emails sent");

    Ok(Json(ContactResponse { success: true }))
}

fn artist_notification(
    to: &str,
    name: &str,
    email: &str,
    subject: &str,
    message: &str,
) -> OutboundEmail {
    let text = format!(
        "New contact form submission\n\nName: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}",
        name, email, subject, message
    );
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h2 style="color: #333; border-bottom: 2px solid #eee; padding-bottom: 10px;">New Contact Form Submission</h2>
<div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
<p><strong>Name:</strong> {}</p>
<p><strong>Email:</strong> <a href="mailto:{}">{}</a></p>
<p><strong>Subject:</strong> {}</p>
</div>
<div style="background: #fff; padding: 20px; border-left: 4px solid #007cba; margin: 20px 0;">
<p style="white-space: pre-wrap; line-height: 1.6;">{}</p>
</div>
</body>
</html>"#,
        name, email, email, subject, message
    );

    OutboundEmail {
        to: to.to_string(),
        subject: format!("New Contact Form Submission: {}", subject),
        text,
        html: Some(html),
        // Lets the artist reply straight to the sender.
        reply_to: Some(email.to_string()),
    }
}

fn customer_auto_reply(
    state: &AppState,
    name: &str,
    email: &str,
    subject: &str,
    message: &str,
) -> OutboundEmail {
    let artist = &state.site.artist_name;
    let text = format!(
        "Dear {},\n\nThank you for contacting {}. Your message has been received.\n\n\
         Subject: {}\n\n{}\n\nYou can expect a response within 24-48 hours during \
         business days.\n\nThis is an automated confirmation. Please do not reply to \
         this email.",
        name, artist, subject, message
    );
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
<h2 style="color: #333;">Thank you for reaching out!</h2>
<p>Dear {},</p>
<p>Thank you for contacting {}. Your message has been received.</p>
<div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
<p><strong>Subject:</strong> {}</p>
<p style="white-space: pre-wrap; line-height: 1.6;">{}</p>
</div>
<p>You can expect a response within 24-48 hours during business days.</p>
<div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; text-align: center; color: #666; font-size: 14px;">
<p>This is an automated confirmation. Please do not reply to this email.</p>
</div>
</body>
</html>"#,
        name, artist, subject, message
    );

    OutboundEmail {
        to: email.to_string(),
        subject: "Thank you for your message".to_string(),
        text,
        html: Some(html),
        reply_to: None,
    }
}
