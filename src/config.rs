use std::env;

/// Payment provider credentials.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
}

/// Content store (CMS) endpoints and credentials.
///
/// Reads go to the public query API; the mark-sold mutation requires the
/// elevated `write_token`.
#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub write_token: Option<String>,
}

/// SMTP relay settings. Absent entirely when the transport is unconfigured,
/// in which case fulfillment emails are skipped and the contact form returns
/// a 500.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// From address, e.g. `Gallery <no-reply@example.com>`.
    pub from_address: String,
}

/// Site-level settings shared with handlers through `AppState`.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public base URL used to build redirect URLs.
    pub base_url: String,
    pub artist_name: String,
    /// Recipient for sale notifications and contact form submissions.
    pub artist_email: Option<String>,
    /// Shipping-country allow-list for checkout sessions; empty disables
    /// shipping address collection.
    pub shipping_countries: Vec<String>,
    /// Shared secret for the content webhook; None leaves the endpoint open.
    pub content_webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub strict_rpm: u32,
    pub relaxed_rpm: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
    pub site: SiteConfig,
    pub stripe: StripeConfig,
    pub sanity: SanityConfig,
    pub smtp: Option<SmtpConfig>,
    pub rate_limit: RateLimitConfig,
}

/// Parse a comma-separated country list, e.g. "US,CA".
fn parse_countries(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("EASEL_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_u16("PORT", 3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        // SMTP is configured only when both credentials are present.
        let smtp = match (env::var("SMTP_USER"), env::var("SMTP_PASSWORD")) {
            (Ok(username), Ok(password)) => {
                let from_address = env::var("SMTP_FROM")
                    .unwrap_or_else(|_| username.clone());
                Some(SmtpConfig {
                    host: env::var("SMTP_HOST")
                        .unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                    port: env_u16("SMTP_PORT", 587),
                    username,
                    password,
                    from_address,
                })
            }
            _ => None,
        };

        Self {
            host,
            port,
            dev_mode,
            site: SiteConfig {
                base_url,
                artist_name: env::var("ARTIST_NAME")
                    .unwrap_or_else(|_| "the artist".to_string()),
                artist_email: env::var("ARTIST_EMAIL").ok(),
                shipping_countries: env::var("SHIPPING_COUNTRIES")
                    .map(|raw| parse_countries(&raw))
                    .unwrap_or_else(|_| vec!["US".to_string(), "CA".to_string()]),
                content_webhook_secret: env::var("SANITY_WEBHOOK_SECRET").ok(),
            },
            stripe: StripeConfig {
                secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
                webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            },
            sanity: SanityConfig {
                project_id: env::var("SANITY_PROJECT_ID").unwrap_or_default(),
                dataset: env::var("SANITY_DATASET")
                    .unwrap_or_else(|_| "production".to_string()),
                api_version: env::var("SANITY_API_VERSION")
                    .unwrap_or_else(|_| "2024-01-01".to_string()),
                write_token: env::var("SANITY_WRITE_TOKEN").ok(),
            },
            smtp,
            rate_limit: RateLimitConfig {
                strict_rpm: env_u32("RATE_LIMIT_STRICT_RPM", 10),
                relaxed_rpm: env_u32("RATE_LIMIT_RELAXED_RPM", 60),
            },
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_countries_trims_and_uppercases() {
        assert_eq!(parse_countries("US, ca"), vec!["US", "CA"]);
        assert_eq!(parse_countries(""), Vec::<String>::new());
        assert_eq!(parse_countries("us,,gb,"), vec!["US", "GB"]);
    }
}
