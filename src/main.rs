use std::sync::Arc;

use reqmeter::config::{load_config, print_schema};
use reqmeter::startup::run;
use reqmeter::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().skip(1).any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = load_config();

    if let Err(e) = init_logging(&config.logging, &config.service) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(Arc::new(config)).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
