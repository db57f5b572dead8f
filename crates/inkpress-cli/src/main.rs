//! Thin entrypoint for the `inkpress` binary.

use std::process;

use inkpress_telemetry::LoggingConfig;

#[tokio::main]
async fn main() {
    if let Err(err) = inkpress_telemetry::init_logging(&LoggingConfig::default()) {
        eprintln!("error: failed to initialise logging: {err:#}");
        process::exit(1);
    }

    let exit_code = inkpress_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
