use std::{sync::Arc, time::Instant};

use tracing::{error, info, warn};

use crate::{
    errors::MigrationError,
    executor::{
        CancelSignal, ExecutionReport, MigrationLock, Outcome, ReportItem, StatementExecutor,
    },
    planner::{Plan, PlanItem},
    types::Direction,
    utils::ProgressReporter,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
}

/// Applies plans one migration at a time. Each migration is committed with
/// its version table record before the next one starts.
pub struct ExecutionCoordinator {
    executor: Arc<dyn StatementExecutor>,
    lock: Arc<dyn MigrationLock>,
    cancel: CancelSignal,
}

impl ExecutionCoordinator {
    pub fn new(
        executor: Arc<dyn StatementExecutor>,
        lock: Arc<dyn MigrationLock>,
        cancel: CancelSignal,
    ) -> Self {
        Self {
            executor,
            lock,
            cancel,
        }
    }

    /// Runs the plan in order.
    ///
    /// Stops at the first failure. Migrations before it stay recorded, the failed
    /// one and everything after it are left untouched. A dry run walks the same
    /// items without executing or recording anything and does not take the lock.
    ///
    /// Only lock acquisition errors are returned as `Err`; execution failures
    /// are carried in the report.
    pub async fn apply(
        &self,
        plan: &Plan,
        options: ApplyOptions,
        progress: &ProgressReporter,
    ) -> Result<ExecutionReport, MigrationError> {
        if !options.dry_run {
            self.lock.acquire().await?;
        }

        let report = self.run(plan, options, progress).await;

        if !options.dry_run {
            if let Err(e) = self.lock.release().await {
                warn!("Failed to release migration lock: {}", e);
            }
        }

        Ok(report)
    }

    async fn run(
        &self,
        plan: &Plan,
        options: ApplyOptions,
        progress: &ProgressReporter,
    ) -> ExecutionReport {
        let started = Instant::now();
        let mut report = ExecutionReport {
            direction: plan.direction(),
            dry_run: options.dry_run,
            items: Vec::with_capacity(plan.len()),
            cancelled: false,
            error: None,
            elapsed: Default::default(),
        };

        let total = plan.len();
        for (i, item) in plan.items().iter().enumerate() {
            if report.error.is_some() || report.cancelled {
                report.items.push(not_attempted(item));
                continue;
            }
            if self.cancel.is_cancelled() {
                warn!("Cancellation requested, stopping before {}", item.id());
                report.cancelled = true;
                report.items.push(not_attempted(item));
                continue;
            }

            progress.report(format!(
                "{} {} ({} of {})",
                match item.direction {
                    Direction::Up => "Migrating",
                    Direction::Down => "Reverting",
                },
                item.id(),
                i + 1,
                total
            ));

            let item_started = Instant::now();
            let outcome = if options.dry_run {
                Ok(Outcome::DryRun)
            } else {
                self.executor
                    .execute_batch(item.id(), item.direction, item.statements())
                    .await
                    .map(|_| Outcome::Succeeded)
            };

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Migration {} failed: {}", item.id(), e);
                    let message = e.to_string();
                    report.error = Some(e);
                    Outcome::Failed(message)
                }
            };

            report.items.push(ReportItem {
                id: item.id().clone(),
                direction: item.direction,
                statements: item.statements().to_vec(),
                outcome,
                elapsed: item_started.elapsed(),
            });
        }

        report.elapsed = started.elapsed();
        info!(
            "Applied {} of {} migrations {} in {:?}",
            report.succeeded().count(),
            total,
            plan.direction(),
            report.elapsed
        );
        report
    }

}

fn not_attempted(item: &PlanItem) -> ReportItem {
    ReportItem {
        id: item.id().clone(),
        direction: item.direction,
        statements: item.statements().to_vec(),
        outcome: Outcome::NotAttempted,
        elapsed: Default::default(),
    }
}
