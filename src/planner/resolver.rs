use std::collections::BTreeSet;

use strum_macros::{Display, EnumString};

use crate::{
    errors::MigrationError,
    metadata::ExecutedSet,
    registry::AvailableSet,
    types::MigrationId,
};

/// Symbolic version references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Alias {
    First,
    Latest,
    Current,
    Next,
    Prev,
}

/// Highest executed id, or the zero sentinel when nothing ran yet.
pub fn current_version(executed: &ExecutedSet) -> MigrationId {
    executed
        .ids()
        .next_back()
        .cloned()
        .unwrap_or_else(MigrationId::zero)
}

/// Maps an alias, a `current+N`/`current-N` offset or an explicit id to a
/// concrete id. Never mutates anything.
pub fn resolve(
    alias: &str,
    available: &AvailableSet,
    executed: &ExecutedSet,
) -> Result<MigrationId, MigrationError> {
    let alias = alias.trim();
    let current = current_version(executed);

    if let Ok(named) = alias.parse::<Alias>() {
        return match named {
            Alias::First => union(available, executed)
                .into_iter()
                .next()
                .ok_or(MigrationError::NoMigrationsFound),
            Alias::Latest => union(available, executed)
                .into_iter()
                .next_back()
                .ok_or(MigrationError::NoMigrationsFound),
            Alias::Current => Ok(current),
            Alias::Next => step_forward(alias, available, &current, 1),
            Alias::Prev => step_back(alias, executed, &current, 1),
        };
    }

    if let Some(offset) = alias.strip_prefix("current") {
        let steps = parse_offset(alias, offset)?;
        return match steps {
            0 => Ok(current),
            n if n > 0 => step_forward(alias, available, &current, n as usize),
            n => step_back(alias, executed, &current, n.unsigned_abs() as usize),
        };
    }

    let id = MigrationId::parse(alias)?;
    if id.is_zero() || available.contains(&id) || executed.contains(&id) {
        Ok(id)
    } else {
        Err(MigrationError::UnknownMigrationVersion(alias.to_string()))
    }
}

fn union(available: &AvailableSet, executed: &ExecutedSet) -> BTreeSet<MigrationId> {
    available.ids().chain(executed.ids()).cloned().collect()
}

fn parse_offset(alias: &str, offset: &str) -> Result<i64, MigrationError> {
    let unknown = || MigrationError::UnknownMigrationVersion(alias.to_string());
    let (sign, digits) = match offset.chars().next() {
        Some('+') => (1, &offset[1..]),
        Some('-') => (-1, &offset[1..]),
        _ => return Err(unknown()),
    };
    let value: i64 = digits.parse().map_err(|_| unknown())?;
    Ok(sign * value)
}

fn step_forward(
    alias: &str,
    available: &AvailableSet,
    current: &MigrationId,
    steps: usize,
) -> Result<MigrationId, MigrationError> {
    available
        .ids()
        .filter(|id| *id > current)
        .nth(steps - 1)
        .cloned()
        .ok_or_else(|| MigrationError::NoMigrationsToExecute(alias.to_string()))
}

fn step_back(
    alias: &str,
    executed: &ExecutedSet,
    current: &MigrationId,
    steps: usize,
) -> Result<MigrationId, MigrationError> {
    executed
        .ids()
        .rev()
        .filter(|id| *id < current)
        .nth(steps - 1)
        .cloned()
        .ok_or_else(|| MigrationError::NoMigrationsToExecute(alias.to_string()))
}
