//! Schema From Source - Command-line tool for generating API type definitions.
//!
//! Reads the type declarations of a Rust project and writes a Swagger 2.0 style
//! document whose `definitions` block describes every struct, enum and alias.
//!
//! # Usage
//!
//! ```bash
//! schema-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML definitions:
//! ```bash
//! schema-from-source ./my-api-project -o definitions.yaml
//! ```
//!
//! Generate JSON with camelCase properties, restricted to one root type:
//! ```bash
//! schema-from-source ./my-api-project -f json -p camelcase -r Order
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! schema-from-source ./my-api-project -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use schema_from_source::cli;

fn main() -> Result<()> {
    // The verbose flag decides the log level, so parse before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Schema From Source starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("Definition generation completed successfully");

    Ok(())
}
