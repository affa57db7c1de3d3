// Application configuration loaded from environment variables.
// Decision: Plain env vars (optionally from .env via dotenvy), read once at start-up
// Decision: Development defaults everywhere except the JWT secret in production

use anyhow::{anyhow, bail, Result};
use rand::Rng;
use std::time::Duration;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Session token configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing session tokens
    pub secret: String,
    /// Session token lifetime
    pub lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            lifetime: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
        }
    }
}

/// SMTP settings; absent means emails are only logged
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Sender shown in the From header
    pub from: String,
    /// Base URL of the web client, used in email links
    pub frontend_url: String,
    pub smtp: Option<SmtpConfig>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: "CashTrackr <admin@cashtrackr.com>".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            smtp: None,
        }
    }
}

/// Rate limiting for the account endpoints
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per window per client
    pub max_requests: u32,
    pub window_secs: u64,
    /// Key clients on X-Forwarded-For; only behind a proxy that sets it
    pub trust_proxy: bool,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
            trust_proxy: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_addr: String,
    /// PostgreSQL URL; None selects the in-memory backend
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            bind_addr: "0.0.0.0:4000".to_string(),
            database_url: None,
            jwt: JwtConfig::default(),
            email: EmailConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("APP_ENV")
            .map(|s| Environment::parse(&s))
            .unwrap_or_default();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let secret = match std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                bail!("JWT_SECRET must be set when APP_ENV=production")
            }
            None => {
                tracing::warn!("JWT_SECRET not set, using a random per-process secret");
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            }
        };

        let lifetime = match std::env::var("JWT_LIFETIME_DAYS") {
            Ok(days) if !days.trim().is_empty() => parse_lifetime_days(&days)?,
            _ => JwtConfig::default().lifetime,
        };

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let smtp = match (
            std::env::var("EMAIL_HOST"),
            std::env::var("EMAIL_USER"),
            std::env::var("EMAIL_PASS"),
        ) {
            (Ok(host), Ok(username), Ok(password)) if !host.is_empty() => {
                let port = std::env::var("EMAIL_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(587);
                Some(SmtpConfig {
                    host,
                    port,
                    username,
                    password,
                })
            }
            _ => None,
        };

        let from = std::env::var("EMAIL_FROM").unwrap_or_else(|_| EmailConfig::default().from);

        let default_max = match environment {
            Environment::Production => 5,
            Environment::Development => 100,
        };
        let max_requests = std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_max);
        let window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let trust_proxy = std::env::var("TRUST_PROXY")
            .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            environment,
            bind_addr,
            database_url,
            jwt: JwtConfig { secret, lifetime },
            email: EmailConfig {
                from,
                frontend_url,
                smtp,
            },
            rate_limit: RateLimitConfig {
                enabled: max_requests > 0,
                max_requests,
                window_secs,
                trust_proxy,
            },
        })
    }
}

/// Longest accepted session lifetime
pub const MAX_JWT_LIFETIME_DAYS: u64 = 3650;

/// Parse `JWT_LIFETIME_DAYS`, accepting 1..=MAX_JWT_LIFETIME_DAYS
fn parse_lifetime_days(raw: &str) -> Result<Duration> {
    let days: u64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("JWT_LIFETIME_DAYS must be a whole number of days, got {:?}", raw))?;
    if days == 0 || days > MAX_JWT_LIFETIME_DAYS {
        bail!(
            "JWT_LIFETIME_DAYS must be between 1 and {}, got {}",
            MAX_JWT_LIFETIME_DAYS,
            days
        );
    }
    Ok(Duration::from_secs(days * 24 * 60 * 60))
}
