//! Configuration for excel-seeder
//!
//! - CLI arguments (clap derive)
//! - YAML config file with `.env` / environment overrides
//! - Database connection settings and header mapping profiles

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use regex::Regex;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::{AppError, AppResult};
use crate::excel::{HeaderMapping, ItemField, DEFAULT_PROFILE};
use crate::sql::{DEFAULT_PARAM_LIMIT, POSTGRES_MAX_PARAMS};

/// Go-style duration: one or more `<number><unit>` components, e.g. `1h30m`.
static DURATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:ms|h|m|s))+$").expect("Invalid duration regex"));
static DURATION_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(ms|h|m|s)").expect("Invalid duration part regex"));

/// Where parsed items go.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Insert directly into the database
    Database,
    /// Generate a SQL seeder file
    Seeder,
}

/// Load m_item records from a spreadsheet into PostgreSQL or a SQL seeder file
#[derive(Parser, Debug, Clone)]
#[command(
    name = "excel-seeder",
    version,
    about = "Load m_item records from a spreadsheet into PostgreSQL or a SQL seeder file",
    after_help = "EXAMPLES:\n    \
        excel-seeder --excel file/MasterBarang.xlsx\n    \
        excel-seeder --output seeder --seeder-path seeder/seeder.sql\n    \
        excel-seeder --config config.prod.yaml --profile supplier_a"
)]
pub struct CliArgs {
    /// Path to config file
    #[arg(long, default_value = "config.local.yaml", value_name = "FILE")]
    pub config: PathBuf,

    /// Path to Excel file
    #[arg(long, default_value = "file/MasterBarang.xlsx", value_name = "FILE")]
    pub excel: PathBuf,

    /// Output mode
    #[arg(long, value_enum, default_value_t = OutputMode::Database)]
    pub output: OutputMode,

    /// Path for generated seeder file (when --output seeder)
    #[arg(long, default_value = "seeder/seeder.sql", value_name = "FILE")]
    pub seeder_path: PathBuf,

    /// Header mapping profile
    #[arg(long, default_value = DEFAULT_PROFILE, value_name = "NAME")]
    pub profile: String,

    /// Bind parameter ceiling per statement (overrides loader.param_limit)
    #[arg(long, value_name = "NUM")]
    pub param_limit: Option<usize>,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub env: String,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub mapping_profiles: HashMap<String, HashMap<String, ItemField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
    pub timezone: Option<String>,
    pub max_idle_conn: u32,
    pub max_open_conn: u32,
    pub conn_max_lifetime: Option<String>,

    /// Set from `DATABASE_URL`; takes precedence over the fields above.
    #[serde(skip)]
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: String::new(),
            sslmode: "disable".to_string(),
            timezone: None,
            max_idle_conn: 0,
            max_open_conn: 10,
            conn_max_lifetime: None,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_param_limit")]
    pub param_limit: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            param_limit: default_param_limit(),
        }
    }
}

fn default_param_limit() -> usize {
    DEFAULT_PARAM_LIMIT
}

impl Config {
    /// Reads the YAML file, then applies `.env` / environment overrides.
    pub fn load(path: &Path) -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let data = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("error reading config file {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_yaml(&data)?;

        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.is_empty() {
                config.database.url = Some(url);
            }
        }

        Ok(config)
    }

    pub fn from_yaml(data: &str) -> AppResult<Self> {
        let config: Config = serde_yaml::from_str(data)
            .map_err(|e| AppError::Config(format!("error parsing config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        validate_param_limit(self.loader.param_limit)?;
        if self.database.max_open_conn == 0 {
            return Err(AppError::Config("database.max_open_conn must be at least 1".into()));
        }
        if let Some(lifetime) = &self.database.conn_max_lifetime {
            parse_duration(lifetime)?;
        }
        Ok(())
    }

    /// Applies command-line overrides.
    pub fn apply_args(&mut self, args: &CliArgs) -> AppResult<()> {
        if let Some(limit) = args.param_limit {
            validate_param_limit(limit)?;
            self.loader.param_limit = limit;
        }
        Ok(())
    }

    /// Resolves a header mapping profile by name.
    ///
    /// Profiles from the config file take precedence over the built-in default.
    pub fn mapping(&self, profile: &str) -> AppResult<HeaderMapping> {
        if let Some(entries) = self.mapping_profiles.get(profile) {
            return Ok(HeaderMapping::from_entries(
                entries.iter().map(|(header, field)| (header.as_str(), *field)),
            ));
        }
        if profile == DEFAULT_PROFILE {
            return Ok(HeaderMapping::default());
        }

        let mut available: Vec<&str> = self.mapping_profiles.keys().map(String::as_str).collect();
        available.push(DEFAULT_PROFILE);
        available.sort_unstable();
        available.dedup();
        Err(AppError::Config(format!(
            "unknown mapping profile '{}' (available: {})",
            profile,
            available.join(", ")
        )))
    }
}

/// The ceiling must leave headroom below the PostgreSQL hard limit.
fn validate_param_limit(limit: usize) -> AppResult<()> {
    if limit == 0 || limit >= POSTGRES_MAX_PARAMS {
        return Err(AppError::Config(format!(
            "param_limit must be between 1 and {}, got {}",
            POSTGRES_MAX_PARAMS - 1,
            limit
        )));
    }
    Ok(())
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> AppResult<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| AppError::Config(format!("invalid DATABASE_URL: {}", e)));
        }

        let ssl_mode = PgSslMode::from_str(&self.sslmode)
            .map_err(|e| AppError::Config(format!("invalid sslmode '{}': {}", self.sslmode, e)))?;

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .ssl_mode(ssl_mode);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if !self.dbname.is_empty() {
            options = options.database(&self.dbname);
        }
        if let Some(tz) = &self.timezone {
            options = options.options([("timezone", tz.as_str())]);
        }
        Ok(options)
    }

    pub fn max_lifetime(&self) -> AppResult<Option<Duration>> {
        self.conn_max_lifetime.as_deref().map(parse_duration).transpose()
    }

    /// Connection target for logs, without credentials.
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.dbname),
        }
    }
}

/// Parses `300ms`, `45s`, `10m`, `1h30m`.
pub fn parse_duration(s: &str) -> AppResult<Duration> {
    let s = s.trim();
    if !DURATION_REGEX.is_match(s) {
        return Err(AppError::Config(format!("invalid duration '{}'", s)));
    }

    let invalid = || AppError::Config(format!("invalid duration '{}'", s));

    let mut total = Duration::ZERO;
    for caps in DURATION_PART_REGEX.captures_iter(s) {
        let value: u64 = caps[1].parse().map_err(|_| invalid())?;
        let part = match &caps[2] {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            _ => value.checked_mul(3600).map(Duration::from_secs),
        };
        total = part
            .and_then(|part| total.checked_add(part))
            .ok_or_else(invalid)?;
    }
    Ok(total)
}
