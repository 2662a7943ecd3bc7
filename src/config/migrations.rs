use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{types::Platform, utils::serde::deserialize_path_list};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MigrationsConfig {
    /// Every immediate subdirectory is a source root.
    #[serde(default = "default_packages_dir")]
    pub packages_dir: Option<PathBuf>,

    #[serde(default, deserialize_with = "deserialize_path_list")]
    pub extra_roots: Vec<PathBuf>,

    /// Where `generate` renders a file before moving it into place.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Overrides the platform detected from the database url.
    #[serde(default)]
    pub platform: Option<Platform>,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
            extra_roots: vec![],
            staging_dir: default_staging_dir(),
            platform: None,
        }
    }
}

fn default_packages_dir() -> Option<PathBuf> {
    Some(PathBuf::from("./packages"))
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("./var/migrations")
}
