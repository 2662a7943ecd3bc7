use std::sync::Arc;

use crate::{
    registry::MigrationDefinition,
    types::{Direction, MigrationId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    pub migration: Arc<MigrationDefinition>,
    pub direction: Direction,
}

impl PlanItem {
    pub fn id(&self) -> &MigrationId {
        &self.migration.id
    }

    pub fn statements(&self) -> &[String] {
        self.migration.statements(self.direction)
    }
}

/// Ordered migrations to run in one pass. Never holds the same id twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    direction: Direction,
    items: Vec<PlanItem>,
}

impl Plan {
    pub(crate) fn new(direction: Direction, migrations: Vec<Arc<MigrationDefinition>>) -> Self {
        let items = migrations
            .into_iter()
            .map(|migration| PlanItem {
                migration,
                direction,
            })
            .collect();
        Self { direction, items }
    }

    pub fn empty(direction: Direction) -> Self {
        Self {
            direction,
            items: vec![],
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn ids(&self) -> Vec<MigrationId> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
