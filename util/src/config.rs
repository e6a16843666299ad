//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from `.env` and environment variables. It
//! provides thread-safe access and mutation for tests or runtime overrides.
//!
//! Most callers use the free accessor functions at the bottom of this module
//! (`config::port()`, `config::session_secret()`, ...) rather than holding the
//! read guard themselves.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub session_ttl_minutes: i64,
    pub session_cookie_name: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from: String,
    pub email_from_name: String,
    pub frontend_url: String,
    pub events_retry_ms: u64,
    pub events_keepalive_secs: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing or malformed optional values fall back to their defaults.
    /// Whether the result is fit for production is checked separately by
    /// [`AppConfig::validate`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env_name = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "development".into());

        Self {
            env: env_name,
            project_name: var_or("PROJECT_NAME", "helpdesk"),
            log_level: var_or("LOG_LEVEL", "api=info,services=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            database_url: var_or("DATABASE_URL", "sqlite://data/helpdesk.db?mode=rwc"),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 3000),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            session_ttl_minutes: parsed_or("SESSION_TTL_MINUTES", 1440),
            session_cookie_name: var_or("SESSION_COOKIE_NAME", "helpdesk_sid"),
            upload_dir: var_or("UPLOAD_DIR", "uploads"),
            max_upload_bytes: parsed_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: parsed_or("SMTP_PORT", 587),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            email_from: var_or("EMAIL_FROM", "helpdesk@localhost"),
            email_from_name: var_or("EMAIL_FROM_NAME", "IT Help Desk"),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
            events_retry_ms: parsed_or("EVENTS_RETRY_MS", 5_000),
            events_keepalive_secs: parsed_or("EVENTS_KEEPALIVE_SECS", 15),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            if let Ok(mut guard) = lock.write() {
                *guard = AppConfig::from_env();
            }
        }
    }

    /// Returns a list of problems that make this configuration unsafe to run in production.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.is_production() {
            if self.session_secret.len() < 32 {
                problems.push("SESSION_SECRET must be set to at least 32 characters".to_string());
            }
            if self.smtp_host.is_empty() {
                problems.push(
                    "SMTP_HOST is not set; emails will only be written to the log".to_string(),
                );
            }
        }
        if self.max_upload_bytes == 0 {
            problems.push("MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }
        problems
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_url = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_session_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.session_secret = value.into());
    }

    pub fn set_session_ttl_minutes(value: i64) {
        AppConfig::set_field(|cfg| cfg.session_ttl_minutes = value);
    }

    pub fn set_upload_dir(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.upload_dir = value.into());
    }

    pub fn set_max_upload_bytes(value: usize) {
        AppConfig::set_field(|cfg| cfg.max_upload_bytes = value);
    }

    pub fn set_smtp_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.smtp_host = value.into());
    }

    pub fn set_frontend_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.frontend_url = value.into());
    }
}

// --- Free accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_url() -> String {
    AppConfig::global().database_url.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn session_secret() -> String {
    AppConfig::global().session_secret.clone()
}

pub fn session_ttl_minutes() -> i64 {
    AppConfig::global().session_ttl_minutes
}

pub fn session_cookie_name() -> String {
    AppConfig::global().session_cookie_name.clone()
}

pub fn upload_dir() -> String {
    AppConfig::global().upload_dir.clone()
}

pub fn max_upload_bytes() -> usize {
    AppConfig::global().max_upload_bytes
}

pub fn events_retry_ms() -> u64 {
    AppConfig::global().events_retry_ms
}

pub fn events_keepalive_secs() -> u64 {
    AppConfig::global().events_keepalive_secs
}

pub fn is_production() -> bool {
    AppConfig::global().is_production()
}
