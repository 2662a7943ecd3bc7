use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConsoleFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: Option<String>,

    #[serde(default)]
    pub console_format: ConsoleFormat,

    #[serde(default = "default_true")]
    pub file_enabled: bool,

    /// Per-target overrides, `target:level` pairs separated by commas.
    #[serde(
        default = "default_ext_level",
        deserialize_with = "deserialize_ext_level"
    )]
    pub ext_level: BTreeMap<String, String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            console_format: ConsoleFormat::default(),
            file_enabled: default_true(),
            ext_level: default_ext_level(),
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directives: the base level followed by every override.
    pub fn filter_directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.ext_level
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_dir() -> Option<String> {
    Some("./logs".to_string())
}

fn default_true() -> bool {
    true
}

fn default_ext_level() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("sea_orm_migration".to_string(), "warn".to_string()),
        ("sqlx".to_string(), "error".to_string()),
    ])
}

fn deserialize_ext_level<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;

    let mut map = default_ext_level();
    for pair in s.iter().flat_map(|s| s.split(',')) {
        if let Some((target, level)) = pair.split_once(':') {
            map.insert(target.trim().to_string(), level.trim().to_string());
        }
    }

    Ok(map)
}
