mod direction;
mod migration_id;
mod platform;

pub use direction::Direction;
pub use migration_id::MigrationId;
pub use platform::Platform;
