use anyhow::Context;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use image_label_uploader::cli::{Cli, Commands};
use image_label_uploader::config::{self, Config};
use image_label_uploader::errors::{AppError, AppResult};
use image_label_uploader::surface::UploadSurface;
use image_label_uploader::uploader::TerminalSink;

/// Exit status for a submission rejected before any upload.
const EXIT_REJECTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging before the config is read so its warnings are kept.
    // The configured level is applied afterwards unless RUST_LOG is set.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .parse_default_env()
        .init();
    let level_from_env = std::env::var_os("RUST_LOG").is_some();
    if !level_from_env {
        log::set_max_level(log::LevelFilter::Info);
    }

    let loaded_config = config::load_config();

    if !level_from_env {
        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            loaded_config
                .as_ref()
                .map(Config::log_level_filter)
                .unwrap_or(log::LevelFilter::Info)
        };
        log::set_max_level(level);
    }

    log::info!("Starting image-label-uploader v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Upload {
            client_id,
            endpoint,
            files,
        } => run_upload(loaded_config, &client_id, endpoint.as_deref(), files).await,

        Commands::Config {
            show,
            set_endpoint,
            reset,
        } => match run_config(show, set_endpoint, reset) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_upload(
    loaded_config: AppResult<Config>,
    client_id: &str,
    endpoint: Option<&str>,
    files: Vec<PathBuf>,
) -> ExitCode {
    // Initialization failures are only logged; the user gets no prompt.
    let surface = match loaded_config.and_then(|config| UploadSurface::bind(&config, endpoint)) {
        Ok(surface) => surface,
        Err(e) => {
            log::error!("Upload surface unavailable, submission disabled: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::debug!("Submitting to {}", surface.endpoint());

    let stdout = io::stdout();
    let erase_placeholders = TerminalSink::<io::Stdout, io::Stderr>::can_erase_placeholders(
        stdout.is_terminal(),
        log::max_level(),
    );
    let mut sink = TerminalSink::new(stdout, io::stderr(), erase_placeholders);

    match surface.submit(&mut sink, client_id, files).await {
        Ok(summary) => {
            log::info!(
                "{} of {} images analysed ({} failed)",
                summary.succeeded,
                summary.total,
                summary.failed
            );
            ExitCode::SUCCESS
        }
        Err(AppError::Validation { .. }) => ExitCode::from(EXIT_REJECTED),
        Err(e) => {
            log::error!("Submission failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_config(show: bool, set_endpoint: Option<String>, reset: bool) -> anyhow::Result<()> {
    let mut config = if reset {
        let config = config::reset_config().context("failed to reset configuration")?;
        println!("Configuration reset to defaults");
        config
    } else {
        config::load_config().context("failed to load configuration")?
    };

    if let Some(endpoint) = set_endpoint {
        config.endpoint_url = endpoint.trim().to_string();
        config::save_config(&config).context("failed to save configuration")?;
        println!("Endpoint set to {}", config.endpoint_url);
    }

    if show || !reset {
        let path = config::get_config_path().context("failed to locate configuration")?;
        println!("Configuration ({}):", path.display());
        println!("  endpoint:        {}", config.endpoint_url);
        println!("  request timeout: {}s", config.request_timeout_secs);
        println!("  log level:       {}", config.log_level);
    }

    Ok(())
}
