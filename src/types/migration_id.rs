use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::MigrationError;

/// Identifier of a single migration.
///
/// Textually a run of ASCII digits, usually a `YYYYMMDDHHMMSS` timestamp.
/// Leading zeros are dropped on parse so that `Version0042` and `42` name the
/// same migration, which keeps ordering numeric without any integer width limit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationId(String);

impl MigrationId {
    /// Prefix used by migration file names, accepted (and stripped) on input.
    pub const FILE_PREFIX: &'static str = "Version";

    /// The "nothing executed yet" sentinel.
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn parse(input: &str) -> Result<Self, MigrationError> {
        let trimmed = input.trim();
        let digits = strip_prefix_ignore_case(trimmed, Self::FILE_PREFIX).unwrap_or(trimmed);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MigrationError::UnknownMigrationVersion(input.to_string()));
        }

        let normalized = digits.trim_start_matches('0');
        if normalized.is_empty() {
            return Ok(Self::zero());
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used for this migration, e.g. `Version20240101120000.sql`.
    pub fn file_name(&self) -> String {
        format!("{}{}.sql", Self::FILE_PREFIX, self.0)
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

impl Ord for MigrationId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for MigrationId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MigrationId {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MigrationId {
    type Error = MigrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MigrationId> for String {
    fn from(id: MigrationId) -> Self {
        id.0
    }
}

impl From<u64> for MigrationId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}
