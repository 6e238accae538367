use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easel::config::Config;
use easel::content::{ContentStore, SanityClient};
use easel::handlers;
use easel::mailer::{Mailer, SmtpMailer};
use easel::payments::{PaymentGateway, StripeClient};
use easel::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "easel")]
#[command(about = "Purchase-lifecycle backend for an artist's online gallery")]
struct Cli {
    /// Load configuration, report what is usable, and exit
    #[arg(long)]
    check_config: bool,
}

/// Log which optional integrations are live so a misconfigured deploy is
/// obvious at startup instead of at the first webhook.
fn report_config(config: &Config) {
    if config.stripe.secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY is not set - checkout will fail");
    }
    if config.stripe.webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is not set - payment webhooks will be rejected");
    }
    if config.sanity.project_id.is_empty() {
        tracing::warn!("SANITY_PROJECT_ID is not set - content store reads will fail");
    }
    if config.sanity.write_token.is_none() {
        tracing::warn!("SANITY_WRITE_TOKEN is not set - artworks cannot be marked sold");
    }
    if config.smtp.is_none() {
        tracing::warn!("SMTP credentials not set - email notifications disabled");
    }
    if config.site.artist_email.is_none() {
        tracing::warn!("ARTIST_EMAIL is not set - sale notifications and contact form disabled");
    }
    if config.site.content_webhook_secret.is_none() {
        tracing::warn!("SANITY_WEBHOOK_SECRET is not set - content webhook is open");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    report_config(&config);

    if cli.check_config {
        tracing::info!("Configuration check complete");
        return;
    }

    let content: Arc<dyn ContentStore> = Arc::new(SanityClient::new(&config.sanity));
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeClient::new(&config.stripe));
    let mailer: Arc<dyn Mailer> = Arc::new(
        SmtpMailer::from_config(config.smtp.as_ref()).expect("Failed to build SMTP transport"),
    );

    let state = AppState {
        content,
        gateway,
        mailer,
        cache: Default::default(),
        site: config.site.clone(),
    };

    // Build the application router
    let app = Router::new()
        // Public endpoints (rate limited per IP)
        .merge(handlers::public::router(config.rate_limit))
        // Webhook endpoints (provider-specific auth)
        .merge(handlers::webhooks::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Easel server listening on {}", addr);

    // Use into_make_service_with_connect_info to enable IP-based rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
