pub mod migration_lock;
pub mod migration_version;

pub use migration_lock::{
    ActiveModel as MigrationLockActiveModel, Column as MigrationLockColumn,
    Entity as MigrationLocksEntity, Model as MigrationLockModel,
};
pub use migration_version::{
    ActiveModel as MigrationVersionActiveModel, Column as MigrationVersionColumn,
    Entity as MigrationVersionsEntity, Model as MigrationVersionModel,
};
