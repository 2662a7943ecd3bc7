use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use itertools::Itertools;
use tracing::debug;

use crate::{
    errors::MigrationError,
    metadata::ExecutedSet,
    planner::{Plan, resolver::current_version},
    registry::{AvailableSet, MigrationDefinition},
    types::{Direction, MigrationId},
};

type Selection = BTreeMap<MigrationId, Arc<MigrationDefinition>>;

/// Plan that moves the executed state from the current version to `target`.
///
/// Going up selects every unexecuted available migration in
/// `(current, target]` plus their unexecuted dependencies below `current`.
/// Going down selects every executed migration in `(target, current]`. A
/// dependency above the target when going up, or an executed dependent at or
/// below the target when going down, is `DependencyAcrossTarget`. An empty
/// plan means the target is already reached.
pub fn plan_to(
    target: &MigrationId,
    available: &AvailableSet,
    executed: &ExecutedSet,
) -> Result<Plan, MigrationError> {
    let current = current_version(executed);

    match target.cmp(&current) {
        Ordering::Equal => Ok(Plan::empty(Direction::Up)),
        Ordering::Greater => {
            let mut selected = Selection::new();
            for definition in available.iter() {
                let id = &definition.id;
                if *id > current && id <= target && !executed.contains(id) {
                    selected.insert(id.clone(), definition.clone());
                }
            }
            add_dependencies(&mut selected, target, available, executed)?;
            debug!("Planned {} migration(s) up to {}", selected.len(), target);
            Ok(Plan::new(Direction::Up, order(&selected, Direction::Up)?))
        }
        Ordering::Less => {
            let mut selected = Selection::new();
            for id in executed.ids().filter(|id| *id > target && **id <= current) {
                selected.insert(id.clone(), require_available(id, available)?);
            }
            check_dependents(&selected, target, available, executed)?;
            debug!("Planned {} migration(s) down to {}", selected.len(), target);
            Ok(Plan::new(Direction::Down, order(&selected, Direction::Down)?))
        }
    }
}

/// Plan for an explicit set of migrations in one direction, without pulling
/// in anything else.
pub fn plan_for(
    targets: &[MigrationId],
    direction: Direction,
    available: &AvailableSet,
    executed: &ExecutedSet,
) -> Result<Plan, MigrationError> {
    let mut selected = Selection::new();

    for id in targets {
        let definition = require_available(id, available)?;
        match (direction, executed.contains(id)) {
            (Direction::Up, true) => return Err(MigrationError::VersionAlreadyExists(id.clone())),
            (Direction::Down, false) => {
                return Err(MigrationError::VersionDoesNotExist(id.clone()));
            }
            _ => {}
        }
        selected.insert(id.clone(), definition);
    }

    Ok(Plan::new(direction, order(&selected, direction)?))
}

fn require_available(
    id: &MigrationId,
    available: &AvailableSet,
) -> Result<Arc<MigrationDefinition>, MigrationError> {
    available
        .get(id)
        .cloned()
        .ok_or_else(|| MigrationError::UnknownMigrationVersion(id.to_string()))
}

fn add_dependencies(
    selected: &mut Selection,
    target: &MigrationId,
    available: &AvailableSet,
    executed: &ExecutedSet,
) -> Result<(), MigrationError> {
    let mut pending: Vec<Arc<MigrationDefinition>> = selected.values().cloned().collect();

    while let Some(definition) = pending.pop() {
        for dep in &definition.depends_on {
            if executed.contains(dep) || selected.contains_key(dep) {
                continue;
            }
            let dep_definition = require_available(dep, available)?;
            if dep > target {
                return Err(MigrationError::DependencyAcrossTarget {
                    target: target.clone(),
                    migration: definition.id.clone(),
                    dependency: dep.clone(),
                });
            }
            debug!("Pulling in {} required by {}", dep, definition.id);
            selected.insert(dep.clone(), dep_definition.clone());
            pending.push(dep_definition);
        }
    }
    Ok(())
}

/// Executed migrations left in place must not depend on anything being reverted.
fn check_dependents(
    selected: &Selection,
    target: &MigrationId,
    available: &AvailableSet,
    executed: &ExecutedSet,
) -> Result<(), MigrationError> {
    let kept = executed
        .ids()
        .filter(|id| !selected.contains_key(*id))
        .filter_map(|id| available.get(id));

    for dependent in kept {
        if let Some(dep) = dependent.depends_on.iter().find(|dep| selected.contains_key(*dep)) {
            return Err(MigrationError::DependencyAcrossTarget {
                target: target.clone(),
                migration: dependent.id.clone(),
                dependency: dep.clone(),
            });
        }
    }
    Ok(())
}

/// Topological order with an id tiebreak: ascending with dependencies first
/// for `Up`, descending with dependents first for `Down`.
fn order(
    selected: &Selection,
    direction: Direction,
) -> Result<Vec<Arc<MigrationDefinition>>, MigrationError> {
    // edges[a] = nodes that may only run after a
    let mut edges: BTreeMap<&MigrationId, Vec<&MigrationId>> = BTreeMap::new();
    let mut blockers: BTreeMap<&MigrationId, usize> =
        selected.keys().map(|id| (id, 0)).collect();

    for definition in selected.values() {
        for dep in definition.depends_on.iter().filter(|d| selected.contains_key(*d)) {
            let (before, after) = match direction {
                Direction::Up => (dep, &definition.id),
                Direction::Down => (&definition.id, dep),
            };
            edges.entry(before).or_default().push(after);
            *blockers.entry(after).or_default() += 1;
        }
    }

    let mut ready: BTreeSet<&MigrationId> = blockers
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut ordered = Vec::with_capacity(selected.len());

    loop {
        let next = match direction {
            Direction::Up => ready.pop_first(),
            Direction::Down => ready.pop_last(),
        };
        let Some(id) = next else { break };

        ordered.push(selected[id].clone());
        for after in edges.get(id).into_iter().flatten() {
            if let Some(count) = blockers.get_mut(after) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*after);
                }
            }
        }
    }

    if ordered.len() < selected.len() {
        let remaining: Selection = selected
            .iter()
            .filter(|(id, _)| !ordered.iter().any(|d| &d.id == *id))
            .map(|(id, d)| (id.clone(), d.clone()))
            .collect();
        return Err(MigrationError::CircularDependency {
            cycle: find_cycle(&remaining).iter().join(" -> "),
        });
    }

    Ok(ordered)
}

fn find_cycle(remaining: &Selection) -> Vec<MigrationId> {
    let mut done = BTreeSet::new();
    let mut stack = Vec::new();
    for id in remaining.keys() {
        if let Some(cycle) = visit(id, remaining, &mut stack, &mut done) {
            return cycle;
        }
    }
    remaining.keys().cloned().collect()
}

fn visit(
    id: &MigrationId,
    remaining: &Selection,
    stack: &mut Vec<MigrationId>,
    done: &mut BTreeSet<MigrationId>,
) -> Option<Vec<MigrationId>> {
    if done.contains(id) {
        return None;
    }
    if let Some(pos) = stack.iter().position(|s| s == id) {
        let mut cycle = stack[pos..].to_vec();
        cycle.push(id.clone());
        return Some(cycle);
    }

    stack.push(id.clone());
    for dep in &remaining[id].depends_on {
        if remaining.contains_key(dep) {
            if let Some(cycle) = visit(dep, remaining, stack, done) {
                return Some(cycle);
            }
        }
    }
    stack.pop();
    done.insert(id.clone());
    None
}
