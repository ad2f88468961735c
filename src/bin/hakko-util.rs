use std::process::ExitCode;

use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    use hakko::util::cli::*;

    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = Options::parse();
    match run_cli_action(opts) {
        Ok(output) => {
            println!("{:#}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            event!(Level::ERROR, error = %e, "hakko-util failed");
            ExitCode::FAILURE
        }
    }
}
