//! Configuration module for schoolgate.

use serde::Deserialize;
use std::path::Path;

use crate::auth::ThrottleScope;
use crate::{Result, SchoolError};

/// Console server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Timezone for displaying dates (e.g., "Asia/Kolkata", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seconds a connection may sit idle at a prompt before it is closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    2424
}

fn default_max_connections() -> usize {
    20
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_idle_timeout() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
            timezone: default_timezone(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// Portal presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Title shown on the login form.
    #[serde(default = "default_portal_name")]
    pub name: String,
    /// Help line shown under the login form.
    #[serde(default = "default_help_text")]
    pub help_text: String,
}

fn default_portal_name() -> String {
    "School Management System".to_string()
}

fn default_help_text() -> String {
    "Please contact your administrator if you need help accessing your account.".to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            name: default_portal_name(),
            help_text: default_help_text(),
        }
    }
}

/// Login gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Failed attempts allowed before the form is locked.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    /// Cooldown after the last failed attempt, in minutes.
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: u32,
    /// Absolute session lifetime, in hours.
    #[serde(default = "default_session_hours")]
    pub session_hours: u32,
    /// Throttle scope ("global" or "account").
    #[serde(default = "default_throttle_scope")]
    pub throttle_scope: String,
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_lockout_minutes() -> u32 {
    15
}

fn default_session_hours() -> u32 {
    8
}

fn default_throttle_scope() -> String {
    "global".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
            lockout_minutes: default_lockout_minutes(),
            session_hours: default_session_hours(),
            throttle_scope: default_throttle_scope(),
        }
    }
}

impl AuthConfig {
    /// Parse the configured throttle scope.
    pub fn scope(&self) -> Result<ThrottleScope> {
        self.throttle_scope.parse().map_err(SchoolError::Config)
    }
}

/// User directory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Optional TOML file with additional accounts.
    #[serde(default)]
    pub users_file: Option<String>,
    /// Seed the built-in demo accounts.
    #[serde(default = "default_seed_demo_users")]
    pub seed_demo_users: bool,
}

fn default_seed_demo_users() -> bool {
    true
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            users_file: None,
            seed_demo_users: default_seed_demo_users(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/schoolgate.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SchoolError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - `SCHOOLGATE_PORT`
    /// - `SCHOOLGATE_LOG_LEVEL`
    /// - `SCHOOLGATE_USERS_FILE`
    /// - `SCHOOLGATE_THROTTLE_SCOPE`
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = env_value("SCHOOLGATE_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(level) = env_value("SCHOOLGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(file) = env_value("SCHOOLGATE_USERS_FILE") {
            self.directory.users_file = Some(file);
        }
        if let Some(scope) = env_value("SCHOOLGATE_THROTTLE_SCOPE") {
            self.auth.throttle_scope = scope;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.max_login_attempts == 0 {
            return Err(SchoolError::Config(
                "auth.max_login_attempts must be at least 1".to_string(),
            ));
        }
        if self.auth.lockout_minutes == 0 {
            return Err(SchoolError::Config(
                "auth.lockout_minutes must be at least 1".to_string(),
            ));
        }
        if self.auth.session_hours == 0 {
            return Err(SchoolError::Config(
                "auth.session_hours must be at least 1".to_string(),
            ));
        }
        if self.server.idle_timeout_secs == 0 {
            return Err(SchoolError::Config(
                "server.idle_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.server.max_connections == 0 {
            return Err(SchoolError::Config(
                "server.max_connections must be at least 1".to_string(),
            ));
        }
        self.auth.scope()?;
        if self.server.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(SchoolError::Config(format!(
                "unknown timezone: {}",
                self.server.timezone
            )));
        }
        Ok(())
    }
}

/// Read a non-empty environment variable.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
