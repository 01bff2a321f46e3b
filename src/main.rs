// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, LogLevel};
use crate::app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod extraction;
mod language_utils;
mod oracle;
mod translation;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run or resume a full translation (default command)
    Translate(TranslateArgs),

    /// Retranslate specific batches, backing up prior artifacts
    Retranslate(RetranslateArgs),

    /// Regenerate the final document from existing artifacts
    Assemble,

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Pre-extracted source text file (overrides config)
    #[arg(short = 'i', long)]
    source: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Source language code (e.g., 'en', 'th')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Parser, Debug)]
struct RetranslateArgs {
    /// Comma-separated batch ids to retranslate
    #[arg(long, value_delimiter = ',')]
    batches: Vec<usize>,

    /// Retranslate every batch whose output drifted from its input
    #[arg(long, conflicts_with = "batches")]
    suspect: bool,
}

/// doctrans - segmented-batch document translation
///
/// Translates a long pre-extracted document through an external LLM oracle
/// in fixed-size page batches, with alignment validation, glossary
/// consistency and resumable per-batch caching.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "0.3.0")]
#[command(about = "Batch document translation through an LLM oracle")]
#[command(long_about = "doctrans splits a pre-extracted document into page batches, sends each
batch to a translation oracle, validates the alignment of what comes back,
and reassembles a paragraph-aligned target document.

EXAMPLES:
    doctrans translate -i book.txt              # Translate using default config
    doctrans translate -s en -t zh -i book.txt  # Override language pair
    doctrans retranslate --batches 3,7          # Redo two batches
    doctrans retranslate --suspect              # Redo drifted batches
    doctrans assemble                           # Rebuild the final document
    doctrans completions bash > doctrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in doctrans.json by default. You can specify a
    different config file with --config. If the config file doesn't exist, a
    default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "doctrans.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default.
    // The level is updated after the config is loaded.
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "doctrans", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let translate_args = match &cli.command {
        Some(Commands::Translate(args)) => Some(args),
        _ => None,
    };
    let config = load_config(&cli.config_path, translate_args, cli.log_level.as_ref())?;

    config
        .validate()
        .context("Configuration validation failed")?;

    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::new(config);

    match cli.command {
        None | Some(Commands::Translate(_)) => {
            let summary = controller.run().await?;
            if summary.failed > 0 {
                warn!(
                    "{} batches failed; rerun 'doctrans retranslate' with the ids in retry.json",
                    summary.failed
                );
            }
        }
        Some(Commands::Retranslate(args)) => {
            if args.suspect {
                controller.retranslate_suspect().await?;
            } else if args.batches.is_empty() {
                anyhow::bail!("retranslate needs --batches <ids> or --suspect");
            } else {
                controller.retranslate(&args.batches).await?;
            }
        }
        Some(Commands::Assemble) => {
            controller.assemble()?;
        }
        Some(Commands::Completions { .. }) => unreachable!("handled above"),
    }

    Ok(())
}

fn load_config(
    config_path: &str,
    overrides: Option<&TranslateArgs>,
    log_level: Option<&CliLogLevel>,
) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config: {}", config_path))?;
        config
    };

    if let Some(args) = overrides {
        if let Some(source) = &args.source {
            config.source_text = source.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(source_language) = &args.source_language {
            config.source_language = source_language.clone();
        }
        if let Some(target_language) = &args.target_language {
            config.target_language = target_language.clone();
        }
        if let Some(model) = &args.model {
            config.oracle.model = model.clone();
        }
    }

    if let Some(level) = log_level {
        config.log_level = level.clone().into();
    }

    Ok(config)
}
