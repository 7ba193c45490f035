//! Service configuration.
//!
//! Settings come from a YAML file and are then overridden by `DUS_*`
//! environment variables, one variable per leaf key:
//!
//! | Env Var                              | YAML key                             |
//! |--------------------------------------|--------------------------------------|
//! | `DUS_SERVER_HOST`                    | `server.host`                        |
//! | `DUS_SERVER_PORT`                    | `server.port`                        |
//! | `DUS_SERVER_READ_TIMEOUT_SECS`       | `server.read_timeout_secs`           |
//! | `DUS_SERVER_WRITE_TIMEOUT_SECS`      | `server.write_timeout_secs`          |
//! | `DUS_SERVER_PUBLIC_HOST`             | `server.public_host`                 |
//! | `DUS_POSTGRES_HOST`                  | `postgres.host`                      |
//! | `DUS_POSTGRES_PORT`                  | `postgres.port`                      |
//! | `DUS_POSTGRES_USERNAME`              | `postgres.username`                  |
//! | `DUS_POSTGRES_PASSWORD`              | `postgres.password`                  |
//! | `DUS_POSTGRES_DB_NAME`               | `postgres.db_name`                   |
//! | `DUS_POSTGRES_SSLMODE`               | `postgres.sslmode`                   |
//! | `DUS_POSTGRES_MAX_CONNS`             | `postgres.max_conns`                 |
//! | `DUS_POSTGRES_MIN_CONNS`             | `postgres.min_conns`                 |
//! | `DUS_POSTGRES_MAX_CONN_LIFETIME_SECS`| `postgres.max_conn_lifetime_secs`    |
//! | `DUS_POSTGRES_MAX_CONN_IDLE_TIME_SECS`| `postgres.max_conn_idle_time_secs`  |
//! | `DUS_LOGGER_LEVEL`                   | `logger.level`                       |
//! | `DUS_LOGGER_ENCODING`                | `logger.encoding`                    |
//! | `DUS_LOGGER_OUTPUT_PATHS`            | `logger.output_paths` (comma list)   |
//! | `DUS_AUTO_ENROLLMENT_INTERVAL_SECS`  | `auto_enrollment.interval_secs`      |
//! | `DUS_AUTO_ENROLLMENT_ENABLED`        | `auto_enrollment.enabled`            |
//! | `DUS_REPORTS_DIR`                    | `reports.dir`                        |

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use dus_db::PoolSettings;
use serde::Deserialize;

/// Accepted values of `postgres.sslmode`.
pub const SSL_MODES: [&str; 6] = [
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// Accepted values of `logger.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Environment variable prefix for overrides.
const ENV_PREFIX: &str = "DUS_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value {value:?} for {key}")]
    Env { key: String, value: String },

    #[error("{key}: {message}")]
    Invalid {
        key: &'static str,
        message: &'static str,
    },
}

fn invalid(key: &'static str, message: &'static str) -> ConfigError {
    ConfigError::Invalid { key, message }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub logger: LoggerConfig,
    pub auto_enrollment: AutoEnrollmentConfig,
    pub reports: ReportsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// Host advertised in report URLs. Falls back to `host`.
    pub public_host: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            read_timeout_secs: 10,
            write_timeout_secs: 10,
            public_host: None,
        }
    }
}

impl ServerConfig {
    /// Deadline applied to every HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs + self.write_timeout_secs)
    }

    /// Host used when building report download URLs.
    pub fn advertised_host(&self) -> &str {
        self.public_host.as_deref().unwrap_or(&self.host)
    }
}

/// Database endpoint and pool sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,
    pub sslmode: String,
    pub max_conns: u32,
    pub min_conns: u32,
    pub max_conn_lifetime_secs: u64,
    pub max_conn_idle_time_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            username: String::new(),
            password: String::new(),
            db_name: "segmentation".into(),
            sslmode: "disable".into(),
            max_conns: 10,
            min_conns: 1,
            max_conn_lifetime_secs: 3600,
            max_conn_idle_time_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn to_pool_settings(&self) -> PoolSettings {
        PoolSettings {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            db_name: self.db_name.clone(),
            sslmode: self.sslmode.clone(),
            max_conns: self.max_conns,
            min_conns: self.min_conns,
            max_conn_lifetime: Duration::from_secs(self.max_conn_lifetime_secs),
            max_conn_idle_time: Duration::from_secs(self.max_conn_idle_time_secs),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEncoding {
    Json,
    Console,
}

impl FromStr for LogEncoding {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "console" => Ok(Self::Console),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: String,
    pub encoding: LogEncoding,
    /// `stdout`, `stderr` or a file path, one sink each.
    pub output_paths: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            encoding: LogEncoding::Json,
            output_paths: vec!["stdout".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoEnrollmentConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for AutoEnrollmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 3600,
        }
    }
}

impl AutoEnrollmentConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Directory holding generated CSV reports.
    pub dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./reports"),
        }
    }
}

impl AppConfig {
    /// Load the YAML file at `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&raw)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without overrides or validation. Missing keys take defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `DUS_*` overrides using `lookup` to resolve variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Overrides { lookup };

        env.string("SERVER_HOST", &mut self.server.host);
        env.parsed("SERVER_PORT", &mut self.server.port)?;
        env.parsed("SERVER_READ_TIMEOUT_SECS", &mut self.server.read_timeout_secs)?;
        env.parsed("SERVER_WRITE_TIMEOUT_SECS", &mut self.server.write_timeout_secs)?;
        if let Some(host) = env.get("SERVER_PUBLIC_HOST") {
            self.server.public_host = Some(host);
        }

        let pg = &mut self.postgres;
        env.string("POSTGRES_HOST", &mut pg.host);
        env.parsed("POSTGRES_PORT", &mut pg.port)?;
        env.string("POSTGRES_USERNAME", &mut pg.username);
        env.string("POSTGRES_PASSWORD", &mut pg.password);
        env.string("POSTGRES_DB_NAME", &mut pg.db_name);
        env.string("POSTGRES_SSLMODE", &mut pg.sslmode);
        env.parsed("POSTGRES_MAX_CONNS", &mut pg.max_conns)?;
        env.parsed("POSTGRES_MIN_CONNS", &mut pg.min_conns)?;
        env.parsed("POSTGRES_MAX_CONN_LIFETIME_SECS", &mut pg.max_conn_lifetime_secs)?;
        env.parsed("POSTGRES_MAX_CONN_IDLE_TIME_SECS", &mut pg.max_conn_idle_time_secs)?;

        env.string("LOGGER_LEVEL", &mut self.logger.level);
        env.parsed("LOGGER_ENCODING", &mut self.logger.encoding)?;
        if let Some(paths) = env.get("LOGGER_OUTPUT_PATHS") {
            self.logger.output_paths = paths
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        env.parsed("AUTO_ENROLLMENT_ENABLED", &mut self.auto_enrollment.enabled)?;
        env.parsed("AUTO_ENROLLMENT_INTERVAL_SECS", &mut self.auto_enrollment.interval_secs)?;

        if let Some(dir) = env.get("REPORTS_DIR") {
            self.reports.dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(invalid("server.host", "empty host"));
        }
        if self.server.read_timeout_secs == 0 {
            return Err(invalid("server.read_timeout_secs", "must be greater than zero"));
        }
        if self.server.write_timeout_secs == 0 {
            return Err(invalid("server.write_timeout_secs", "must be greater than zero"));
        }

        let pg = &self.postgres;
        if pg.host.trim().is_empty() {
            return Err(invalid("postgres.host", "empty host"));
        }
        if pg.username.is_empty() {
            return Err(invalid("postgres.username", "empty username"));
        }
        if pg.password.is_empty() {
            return Err(invalid("postgres.password", "empty password"));
        }
        if pg.db_name.is_empty() {
            return Err(invalid("postgres.db_name", "empty database name"));
        }
        if !SSL_MODES.contains(&pg.sslmode.as_str()) {
            return Err(invalid(
                "postgres.sslmode",
                "invalid ssl mode (disable, allow, prefer, require, verify-ca, verify-full)",
            ));
        }
        if pg.max_conns == 0 {
            return Err(invalid("postgres.max_conns", "must be greater than zero"));
        }
        if pg.min_conns > pg.max_conns {
            return Err(invalid("postgres.min_conns", "cannot exceed max_conns"));
        }
        if pg.max_conn_lifetime_secs == 0 {
            return Err(invalid("postgres.max_conn_lifetime_secs", "must be greater than zero"));
        }
        if pg.max_conn_idle_time_secs == 0 {
            return Err(invalid("postgres.max_conn_idle_time_secs", "must be greater than zero"));
        }

        if !LOG_LEVELS.contains(&self.logger.level.as_str()) {
            return Err(invalid(
                "logger.level",
                "invalid level (trace, debug, info, warn, error)",
            ));
        }
        if self.logger.output_paths.is_empty() {
            return Err(invalid("logger.output_paths", "empty output path"));
        }

        if self.auto_enrollment.interval_secs == 0 {
            return Err(invalid(
                "auto_enrollment.interval_secs",
                "must be greater than zero",
            ));
        }

        if self.reports.dir.as_os_str().is_empty() {
            return Err(invalid("reports.dir", "empty reports directory"));
        }

        Ok(())
    }
}

/// Prefixed environment lookups used by [`AppConfig::apply_overrides`].
struct Overrides<F> {
    lookup: F,
}

impl<F> Overrides<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{key}"))
    }

    fn string(&self, key: &str, target: &mut String) {
        if let Some(value) = self.get(key) {
            *target = value;
        }
    }

    fn parsed<T: FromStr>(&self, key: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = value.trim().parse().map_err(|_| ConfigError::Env {
                key: format!("{ENV_PREFIX}{key}"),
                value,
            })?;
        }
        Ok(())
    }
}
