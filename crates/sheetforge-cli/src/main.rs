//! sheetforge CLI - generate workbooks from JSON requests

mod logger;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use sheetforge::config::parse_log_level;
use sheetforge::prelude::*;
use sheetforge::StorageKind;

#[derive(Parser)]
#[command(name = "sheetforge")]
#[command(author, version, about = "Generate XLSX workbooks from declarative JSON requests")]
struct Cli {
    /// Log verbosity: error, warn, info or debug
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, build and store a workbook, then print the result envelope
    Generate {
        /// JSON request file, `-` for stdin
        input: PathBuf,

        /// Directory for local storage (overrides DEV_STORAGE_PATH)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Storage backend: local or s3 (overrides STORAGE_TYPE)
        #[arg(short, long)]
        storage: Option<String>,
    },

    /// Check a request against the workbook grammar
    Validate {
        /// JSON request file, `-` for stdin
        input: PathBuf,

        /// Skip required-field checks on top-level fields
        #[arg(short, long)]
        partial: bool,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = GeneratorConfig::from_env().context("Failed to read configuration from the environment")?;
    if let Some(level) = &cli.log_level {
        config.log_level = parse_log_level(level)?;
    }
    logger::init(config.log_level);

    match cli.command {
        Commands::Generate {
            input,
            output_dir,
            storage,
        } => {
            if let Some(dir) = output_dir {
                config.local_storage_path = dir;
            }
            if let Some(kind) = storage {
                config.storage = kind.parse::<StorageKind>()?;
            }
            generate_command(&input, config)
        }
        Commands::Validate { input, partial } => validate_command(&input, partial),
    }
}

fn read_request(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read request from stdin");
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read '{}'", input.display()))
}

fn generate_command(input: &Path, config: GeneratorConfig) -> Result<ExitCode> {
    let raw = read_request(input)?;
    debug!("Storage: {:?} at {}", config.storage, config.local_storage_path.display());

    let service = WorkbookService::new(config);
    match service.handle_json(&raw) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&handle_error(&err))?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn validate_command(input: &Path, partial: bool) -> Result<ExitCode> {
    let raw = read_request(input)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("'{}' is not valid JSON", input.display()))?;

    let (valid, errors) = if partial {
        let outcome = validate_partial(&value);
        (outcome.valid, outcome.errors)
    } else {
        match validate(&value) {
            Ok(_) => (true, Vec::new()),
            Err(errors) => (false, errors.messages()),
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "valid": valid, "errors": errors }))?
    );
    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
