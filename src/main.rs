//! Nugget Extract - command line front end
//!
//! Handles CLI argument parsing, logging initialization, settings loading,
//! and dumps the scanned catalog as JSON.

use anyhow::Context;
use nugget_extract::{scan, AppResult, Settings};
use std::path::PathBuf;

/// Application name for logging
const APP_NAME: &str = "nugget-extract";

/// Parsed command line options
#[derive(Debug, Default)]
struct Flags {
    config: Option<PathBuf>,
    project_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let flags = parse_args();
    let settings = load_settings(&flags).context("could not load settings")?;

    log::info!(
        "Scanning {} root(s) for nuggets",
        settings.directories_to_scan.len()
    );
    let outcome = scan(&settings).context("scan failed")?;

    let json = serde_json::to_string_pretty(&outcome.catalog)?;
    println!("{}", json);
    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,nugget_extract=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Resolve settings from an explicit file, the user config directory, or defaults
fn load_settings(flags: &Flags) -> AppResult<Settings> {
    let mut settings = match &flags.config {
        Some(path) => Settings::load(path)?,
        None => match Settings::default_path().filter(|p| p.is_file()) {
            Some(path) => Settings::load(&path)?,
            None => Settings::default(),
        },
    };

    if let Some(project_dir) = &flags.project_dir {
        settings.project_dir = Some(project_dir.clone());
    }
    if settings.project_dir.is_none() {
        settings.project_dir = std::env::current_dir().ok();
    }

    Ok(settings)
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                flags.config = Some(path_argument(&args, &mut i));
            }
            "-p" | "--project" => {
                flags.project_dir = Some(path_argument(&args, &mut i));
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    flags
}

/// Consume the value following the option at `args[*i]`
fn path_argument(args: &[String], i: &mut usize) -> PathBuf {
    match args.get(*i + 1) {
        Some(value) => {
            *i += 1;
            PathBuf::from(value)
        }
        None => {
            eprintln!("Error: {} requires a path argument", args[*i]);
            std::process::exit(1);
        }
    }
}

/// Print help message
fn print_help() {
    println!(
        r#"Nugget Extract - collect translatable nuggets into a catalog

USAGE:
    nugget-extract [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version information
    -c, --config <FILE>     Settings file (JSON)
    -p, --project <DIR>     Project directory; references are relative to it

The catalog is written to stdout as JSON. Set RUST_LOG to change verbosity.
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
