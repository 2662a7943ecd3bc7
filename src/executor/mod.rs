pub mod cancel;
pub mod coordinator;
pub mod database;
pub mod lock;
pub mod recording;
pub mod report;

use async_trait::async_trait;

pub use cancel::CancelSignal;
pub use coordinator::{ApplyOptions, ExecutionCoordinator};
pub use database::DatabaseExecutor;
pub use lock::{InMemoryLock, MigrationLock};
pub use recording::RecordingExecutor;
pub use report::{ExecutionReport, Outcome, ReportItem};

use crate::{
    errors::MigrationError,
    types::{Direction, MigrationId},
};

/// Runs the statements of one migration together with its version table
/// change as a single transactional unit.
///
/// Going up inserts the record, going down deletes it. Either both the
/// statements and the record change are committed, or neither is.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_batch(
        &self,
        id: &MigrationId,
        direction: Direction,
        statements: &[String],
    ) -> Result<(), MigrationError>;
}
