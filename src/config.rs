use log::LevelFilter;
use serde::Deserialize;
use std::{
    env,
    fs::read_to_string,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

/// The server version extracted from the Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable key to load the config from
const CONFIG_ENV_KEY: &str = "FSS_CONFIG_JSON";

pub fn load_config() -> Option<Config> {
    // Attempt to load the config from the env
    if let Ok(env) = env::var(CONFIG_ENV_KEY) {
        let config: Config = match serde_json::from_str(&env) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("Failed to load env config (Using default): {:?}", err);
                return None;
            }
        };
        return Some(config);
    }

    // Attempt to load the config from disk
    let file = Path::new("config.json");
    if !file.exists() {
        return None;
    }

    let data = match read_to_string(file) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load config file (Using defaults): {:?}", err);
            return None;
        }
    };

    let config: Config = match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load config file (Using default): {:?}", err);
            return None;
        }
    };

    Some(config)
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub logging: LevelFilter,
    pub logging_dir: String,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    /// CSV sources imported when the players table is empty
    pub import: Vec<ImportSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            logging: LevelFilter::Info,
            logging_dir: "data/logs".to_string(),
            database: Default::default(),
            api: Default::default(),
            import: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the sqlite database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/app.db".to_string(),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Include the underlying error message in internal error
    /// responses, only intended for development
    pub expose_errors: bool,
}

/// A CSV file of player cards along with the gender of
/// every card within it (The source files don't include it)
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSource {
    pub path: PathBuf,
    pub gender: String,
}
