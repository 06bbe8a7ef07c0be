//! A headless simulation of bakers using crafting bowls.

use std::process::ExitCode;

use tracing::error;

pub mod config;
pub mod baker;
pub mod sim;


pub fn main() -> ExitCode {

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match sim::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("simulation failed: {e}");
            ExitCode::FAILURE
        }
    }

}
