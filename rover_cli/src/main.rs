//! rover CLI entry point: config loading, tracing setup, and dispatch.

mod cli;
mod drive;
mod error_fmt;
mod panel;
mod rt;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_fmt::emit(&e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> eyre::Result<()> {
    let (cfg, from_file) = load_config(&cli.config)?;
    init_tracing(cli, &cfg.logging)?;
    if from_file {
        tracing::info!(path = %cli.config.display(), "config loaded");
    } else {
        tracing::info!(path = %cli.config.display(), "no config file; using built-in defaults");
    }
    cfg.validate().wrap_err("invalid configuration")?;

    match &cli.cmd {
        Commands::Drive {
            cycles,
            rt,
            rt_prio,
            rt_lock,
            rt_cpu,
        } => drive::run_drive(&cfg, *cycles, *rt, *rt_prio, *rt_lock, *rt_cpu, cli.json),
        Commands::SelfCheck => drive::self_check(&cfg, cli.json),
        Commands::Health => drive::health(cli.json),
    }
}

fn load_config(path: &Path) -> eyre::Result<(rover_config::Config, bool)> {
    if path.exists() {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        let cfg = rover_config::load_toml(&text)
            .wrap_err_with(|| format!("parsing config {}", path.display()))?;
        Ok((cfg, true))
    } else {
        Ok((rover_config::Config::default(), false))
    }
}

fn init_tracing(cli: &Cli, logging: &rover_config::Logging) -> eyre::Result<()> {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins over the CLI flag when set.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    match &logging.file {
        Some(file) => {
            let p = Path::new(file);
            let dir = p
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "rover.log".to_string());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            if cli.json {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .init();
            }
        }
        None => {
            // Console logs go to stderr; stdout stays clean for results.
            if cli.json {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
    Ok(())
}
