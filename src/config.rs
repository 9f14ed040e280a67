use std::env;

/// Everything the original kept as global mutable settings (salon name,
/// staff contact address, mail sender) lives here and is injected.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub staff_token: String,
    pub salon_name: String,
    pub staff_email: String,
    pub mail_from: String,
    pub mailgun_domain: String,
    pub mailgun_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "salon.db".to_string()),
            staff_token: env::var("STAFF_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            salon_name: env::var("SALON_NAME").unwrap_or_else(|_| "Elegant Nails".to_string()),
            staff_email: env::var("STAFF_EMAIL").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "bookings@example.com".to_string()),
            mailgun_domain: env::var("MAILGUN_DOMAIN").unwrap_or_default(),
            mailgun_api_key: env::var("MAILGUN_API_KEY").unwrap_or_default(),
        }
    }
}
