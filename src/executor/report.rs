use std::{fmt, time::Duration};

use crate::{
    errors::MigrationError,
    types::{Direction, MigrationId},
    utils::time::format_elapsed,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Statements were produced but nothing ran.
    DryRun,
    Failed(String),
    /// Skipped because an earlier migration failed or the run was cancelled.
    NotAttempted,
}

#[derive(Debug, Clone)]
pub struct ReportItem {
    pub id: MigrationId,
    pub direction: Direction,
    pub statements: Vec<String>,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

/// Result of applying one plan.
#[derive(Debug)]
pub struct ExecutionReport {
    pub direction: Direction,
    pub dry_run: bool,
    pub items: Vec<ReportItem>,
    pub cancelled: bool,
    pub error: Option<MigrationError>,
    pub elapsed: Duration,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.cancelled
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ReportItem> {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, Outcome::Succeeded | Outcome::DryRun))
    }

    pub fn failed(&self) -> Option<&ReportItem> {
        self.items
            .iter()
            .find(|item| matches!(item.outcome, Outcome::Failed(_)))
    }

    pub fn not_attempted(&self) -> impl Iterator<Item = &ReportItem> {
        self.items
            .iter()
            .filter(|item| item.outcome == Outcome::NotAttempted)
    }

    /// Every statement of the migrations that ran (or would have run), in order.
    pub fn statements(&self) -> Vec<String> {
        self.succeeded()
            .flat_map(|item| item.statements.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.direction {
            Direction::Up => "++ migrating",
            Direction::Down => "-- reverting",
        };

        for item in &self.items {
            match &item.outcome {
                Outcome::NotAttempted => {
                    writeln!(f, "  ~~ skipped {}", item.id)?;
                    continue;
                }
                _ => writeln!(f, "  {} {}", verb, item.id)?,
            }
            writeln!(f)?;
            for statement in &item.statements {
                writeln!(f, "     -> {}", statement)?;
            }
            writeln!(f)?;
            match &item.outcome {
                Outcome::Succeeded => {
                    writeln!(f, "  ++ done {} ({})", item.id, format_elapsed(item.elapsed))?
                }
                Outcome::DryRun => writeln!(f, "  ++ dry-run {}", item.id)?,
                Outcome::Failed(message) => writeln!(f, "  !! failed {}: {}", item.id, message)?,
                Outcome::NotAttempted => {}
            }
            writeln!(f)?;
        }

        let count = self.succeeded().count();
        writeln!(f, "  ------------------------")?;
        writeln!(f)?;
        writeln!(f, "  ++ finished in {}", format_elapsed(self.elapsed))?;
        writeln!(
            f,
            "  ++ {} migration{} {}",
            count,
            if count == 1 { "" } else { "s" },
            if self.dry_run { "planned" } else { "executed" }
        )?;
        write!(f, "  ++ {} sql queries", self.statements().len())?;
        if self.cancelled {
            write!(f, "\n  !! cancelled before completion")?;
        }
        Ok(())
    }
}
