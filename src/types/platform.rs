use sea_orm::DbBackend;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Database platform, used as the directory name that holds a root's migrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    Mysql,
    Postgresql,
    Sqlite,
}

impl TryFrom<String> for Platform {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.trim().parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}

impl From<DbBackend> for Platform {
    fn from(backend: DbBackend) -> Self {
        match backend {
            DbBackend::MySql => Platform::Mysql,
            DbBackend::Postgres => Platform::Postgresql,
            DbBackend::Sqlite => Platform::Sqlite,
            _ => unreachable!("unsupported database backend: {backend:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_platform_from_backend() {
        assert_eq!(Platform::from(DbBackend::MySql), Platform::Mysql);
        assert_eq!(Platform::from(DbBackend::Postgres), Platform::Postgresql);
        assert_eq!(Platform::from(DbBackend::Sqlite), Platform::Sqlite);
    }

    #[test]
    fn test_platform_directory_name() {
        assert_eq!(Platform::Postgresql.to_string(), "Postgresql");
        assert_eq!(Platform::from_str("sqlite").unwrap(), Platform::Sqlite);
    }
}
