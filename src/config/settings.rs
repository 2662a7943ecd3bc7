use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::config::{DatabaseConfig, LogConfig, MigrationsConfig};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logs: LogConfig,

    #[serde(default)]
    pub migrations: MigrationsConfig,
}

fn get_env_file_name() -> String {
    if let Ok(env_file) = std::env::var("STRATA_ENV_FILE") {
        return env_file;
    }
    if let Ok(env) = std::env::var("STRATA_ENV") {
        match env.to_lowercase().as_str() {
            "dev" => return ".env.dev".to_string(),
            "test" => return ".env.test".to_string(),
            _ => return ".env".to_string(),
        }
    }
    ".env".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file selected by `STRATA_ENV` / `STRATA_ENV_FILE`
        dotenvy::from_filename(get_env_file_name()).ok();

        let settings = Config::builder()
            .add_source(
                Environment::with_prefix("STRATA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn print_config(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(err) => eprintln!("Failed to serialize settings: {}", err),
        }
    }
}
