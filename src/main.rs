use strata::{
    cli::{Cli, ExitOnErr},
    config::Settings,
    executor::CancelSignal,
    utils,
};
use tracing::warn;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let settings = Settings::new().exit_on_err("Failed to load configuration");

    utils::logger::init_logging(&settings.logs);

    let cancel = CancelSignal::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current migration");
            eprintln!("⚠️ Interrupted, stopping after the current migration (press Ctrl-C again to abort)");
            signal.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    cli.execute(&settings, cancel).await;
}
