use chrono::NaiveDateTime;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Longest login session that can be configured (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Parse an optional environment value, falling back to `default` when unset.
/// A value that is set but does not parse is an error.
fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, String> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("Invalid {}: {}", name, raw)),
        None => Ok(default),
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    /// Emails that are granted the admin role when they register
    pub admin_emails: Vec<String>,
    pub secure_cookies: bool,
}

/// Transactional email configuration
///
/// When `api_url` is unset, emails are written to the log instead of sent.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub log_level: String,
    pub log_format: String,
    pub http_port: u16,
    pub environment: String,
    pub app_base_url: String,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = parse_var(
            "DATABASE_MAX_CONNECTIONS",
            env::var("DATABASE_MAX_CONNECTIONS").ok(),
            10u32,
        )?;

        let acquire_timeout_secs = parse_var(
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            env::var("DATABASE_ACQUIRE_TIMEOUT_SECS").ok(),
            30u64,
        )?;

        let idle_timeout_secs = parse_var(
            "DATABASE_IDLE_TIMEOUT_SECS",
            env::var("DATABASE_IDLE_TIMEOUT_SECS").ok(),
            600u64, // 10 minutes
        )?;

        let max_lifetime_secs = parse_var(
            "DATABASE_MAX_LIFETIME_SECS",
            env::var("DATABASE_MAX_LIFETIME_SECS").ok(),
            1800u64, // 30 minutes
        )?;

        let test_before_acquire = parse_var(
            "DATABASE_TEST_BEFORE_ACQUIRE",
            env::var("DATABASE_TEST_BEFORE_ACQUIRE").ok(),
            true,
        )?;

        let config = Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if self.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/pokernight".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl AuthConfig {
    /// Session lifetime as a chrono duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    /// When a session issued at `now` expires, or `None` if the TTL is out of range
    pub fn session_expiry(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return None;
        }
        now.checked_add_signed(self.session_ttl())
    }

    /// Whether a (normalized) email is on the admin bootstrap list
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 720, // 30 days
            admin_emails: Vec::new(),
            secure_cookies: false,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from_address: "Poker Night <no-reply@pokernight.local>".to_string(),
        }
    }
}

/// Parse a comma separated admin email list, normalizing each entry
fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string());

        let http_port = parse_var("HTTP_PORT", env::var("HTTP_PORT").ok(), 8080u16)?;

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", http_port));

        let session_ttl_hours =
            parse_var("SESSION_TTL_HOURS", env::var("SESSION_TTL_HOURS").ok(), 720i64)?;

        let admin_emails = env::var("ADMIN_EMAILS")
            .map(|raw| parse_admin_emails(&raw))
            .unwrap_or_default();

        let mail = MailConfig {
            api_url: env::var("MAIL_API_URL").ok().filter(|s| !s.is_empty()),
            api_key: env::var("MAIL_API_KEY").ok().filter(|s| !s.is_empty()),
            from_address: env::var("MAIL_FROM")
                .unwrap_or_else(|_| MailConfig::default().from_address),
        };

        let environment = environment.to_lowercase();
        let config = Self {
            database,
            auth: AuthConfig {
                session_ttl_hours,
                admin_emails,
                secure_cookies: environment != "development",
            },
            mail,
            log_level: log_level.to_lowercase(),
            log_format: log_format.to_lowercase(),
            http_port,
            environment,
            app_base_url: app_base_url.trim_end_matches('/').to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate values that cannot be expressed by the types alone
    pub fn validate(&self) -> Result<(), String> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.log_format.as_str()) {
            return Err(format!(
                "Invalid LOG_FORMAT: {}. Must be one of: {:?}",
                self.log_format, valid_log_formats
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.environment.as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                self.environment, valid_environments
            ));
        }

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            return Err(format!(
                "SESSION_TTL_HOURS must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            ));
        }

        if self.mail.api_url.is_some() && self.mail.api_key.is_none() {
            return Err("MAIL_API_KEY is required when MAIL_API_URL is set".to_string());
        }

        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            mail: MailConfig::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            http_port: 8080,
            environment: "development".to_string(),
            app_base_url: "http://localhost:8080".to_string(),
        }
    }
}
