pub mod env;
pub mod workspace;

pub use env::load_test_env;
pub use workspace::TestWorkspace;
