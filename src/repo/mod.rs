pub mod lock_repo;
pub mod version_repo;

pub use lock_repo::MigrationLockRepository;
pub use version_repo::MigrationVersionRepository;
