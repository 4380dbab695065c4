use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pixlife::app;
use pixlife::config::Config;
use pixlife::config::ConfigError;
use pixlife::config::USAGE;

fn main() -> anyhow::Result<ExitCode> {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            print!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    // stdout is the display, so logs go to a file
    let log = File::create(&config.log_file)
        .with_context(|| format!("Failed to create {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let shutdown = app::run(&config)?;

    Ok(ExitCode::from(shutdown.exit_code()))
}
