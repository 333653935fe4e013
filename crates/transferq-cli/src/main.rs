//! transferq - per-extension serialized directory copier
//!
//! Copies every file of a source directory into a destination directory,
//! one file at a time per extension, and keeps accepting new directory pairs
//! from an interactive prompt while copies run.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use transferq_config::{ConfigLoader, LoggingConfig};
use transferq_engine::TransferManager;

mod commands;
mod parser;

use commands::{CommandsProcessor, MENU};

/// transferq - per-extension serialized directory copier
#[derive(Parser)]
#[command(
    name = "transferq",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy directories with one file in flight per extension",
    long_about = "transferq copies the files of a source directory into a destination directory.\n\
                  Files sharing an extension are copied strictly one after another, different\n\
                  extensions in parallel. Unfinished copies are resumed on the next start."
)]
struct Cli {
    /// Directory to copy from
    source: String,

    /// Directory to copy into
    destination: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - errors only
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };

    let _log_guard = init_logging(&cli, &config.logging)?;
    info!("transferq v{} starting", env!("CARGO_PKG_VERSION"));

    let manager = Arc::new(TransferManager::local(&config));
    manager.start().await.context("Failed to start transfer manager")?;
    manager.submit(cli.source.clone(), cli.destination.clone());
    println!(
        "{}",
        style(format!(
            "Copying data from '{}' to '{}'",
            cli.source, cli.destination
        ))
        .green()
    );

    command_loop(CommandsProcessor::new(manager)).await
}

async fn command_loop(processor: CommandsProcessor) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        println!("{}", style("Commands:").bold());
        for entry in MENU {
            println!("  {entry}");
        }

        let line = lines.next_line().await.context("Failed to read command")?;
        let (finished, message) = match line {
            Some(line) => processor.execute(&line).await,
            None => processor.execute("exit").await,
        };

        if finished {
            println!("{}", style(message).cyan());
            return Ok(());
        }
        println!("{message}");
    }
}

fn init_logging(cli: &Cli, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, EnvFilter};

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    let (writer, guard) = match &logging.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file {} has no file name", path.display()))?;
            let (non_blocking, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(guard.is_none())
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(guard)
}
