use std::sync::Once;

static INIT: Once = Once::new();

/// Loads `.env.test` if present and installs a quiet subscriber once per test binary.
pub fn load_test_env() {
    INIT.call_once(|| {
        dotenvy::from_filename(".env.test").ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}
