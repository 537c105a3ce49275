use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    /// Fill empty tables with sample rows on startup
    #[serde(default)]
    pub seed: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    pub max_page_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { max_page_size: 500 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    pub dir: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: "dist".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// A session not used for this long has to log in again
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
    /// Accounts created on startup when missing
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

fn default_session_idle_minutes() -> i64 {
    5
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_idle_minutes: default_session_idle_minutes(),
            users: Vec::new(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
path = "target/db/geogrid.db"
seed = true

[grid]
max_page_size = 500

[static_files]
dir = "dist"

[auth]
session_idle_minutes = 5

[[auth.users]]
username = "admin"
password = "admin"
is_admin = true

[[auth.users]]
username = "guest"
password = "guest"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

/// Makes the loaded configuration visible to request handlers.
pub fn install(config: Config) -> anyhow::Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("configuration already installed"))
}

pub fn max_page_size() -> usize {
    CONFIG
        .get()
        .map(|c| c.grid.max_page_size)
        .unwrap_or_else(|| GridConfig::default().max_page_size)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.grid.max_page_size == 0 {
        anyhow::bail!("grid.max_page_size must be positive");
    }
    if config.auth.session_idle_minutes <= 0 {
        anyhow::bail!("auth.session_idle_minutes must be positive");
    }
    Ok(config)
}

pub fn session_idle() -> chrono::Duration {
    let minutes = CONFIG
        .get()
        .map(|c| c.auth.session_idle_minutes)
        .unwrap_or_else(default_session_idle_minutes);
    chrono::Duration::minutes(minutes)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}
