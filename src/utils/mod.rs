pub mod fs;
pub mod logger;
pub mod progress;
pub mod serde;
pub mod sql_writer;
pub mod templates;
pub mod time;

pub use fs::move_file;
pub use progress::ProgressReporter;
pub use sql_writer::SqlWriter;
pub use templates::render_migration;
pub use time::format_elapsed;
