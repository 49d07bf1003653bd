use crate::document::{DocumentBuilder, SchemaDocument};
use crate::loader;
use crate::naming::NamingStrategy;
use crate::overrides::OverrideTable;
use crate::parser::{ParsedFile, SourceParser};
use crate::resolver::{resolve_pass, PassConfig};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Overrides file picked up from the project root when none is given
pub const DEFAULT_OVERRIDES_FILE: &str = ".schema-overrides";

/// Schema From Source - Generate API type definitions from Rust source code
#[derive(Parser, Debug)]
#[command(name = "schema-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Naming strategy for property names without an explicit rename
    #[arg(short = 'p', long = "property-strategy", value_enum, default_value = "identity")]
    pub property_strategy: NamingStrategy,

    /// Type overrides file (defaults to .schema-overrides in the project root, if present)
    #[arg(long = "overrides-file", value_name = "FILE")]
    pub overrides_file: Option<PathBuf>,

    /// Mark every non-optional field as required
    #[arg(long = "required-by-default")]
    pub required_by_default: bool,

    /// Only emit definitions reachable from these names (repeatable)
    #[arg(short = 'r', long = "root", value_name = "NAME")]
    pub roots: Vec<String>,

    /// Directory names to skip while scanning (repeatable)
    #[arg(long = "exclude", value_name = "DIR")]
    pub excludes: Vec<String>,

    /// Document title
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// Document version
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    if let Some(ref path) = args.overrides_file {
        if !path.is_file() {
            anyhow::bail!("Overrides file does not exist: {}", path.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    info!("Property strategy: {:?}", args.property_strategy);
    if !args.roots.is_empty() {
        info!("Roots: {}", args.roots.join(", "));
    }

    Ok(args)
}

/// Directory the module tree starts from: `<project>/src` when present
pub fn source_root(project_path: &Path) -> PathBuf {
    let src = project_path.join("src");
    if src.is_dir() {
        src
    } else {
        project_path.to_path_buf()
    }
}

fn load_overrides(args: &CliArgs) -> Result<OverrideTable> {
    if let Some(path) = &args.overrides_file {
        info!("Loading overrides from {}", path.display());
        return OverrideTable::load_file(path);
    }
    let default_path = args.project_path.join(DEFAULT_OVERRIDES_FILE);
    if default_path.is_file() {
        info!("Loading overrides from {}", default_path.display());
        OverrideTable::load_file(&default_path)
    } else {
        Ok(OverrideTable::new())
    }
}

/// Scan, parse, load and resolve a project into a document
///
/// # Errors
///
/// Returns an error if no Rust file can be found or parsed, if the overrides file is
/// invalid, or if the resolution pass fails.
pub fn generate(args: &CliArgs) -> Result<SchemaDocument> {
    // Step 1: Scan directory for Rust files
    let base = source_root(&args.project_path);
    info!("Scanning {}...", base.display());
    let scanner = FileScanner::new(base.clone()).with_excludes(args.excludes.clone());
    let scan_result = scanner.scan()?.without_binary_root(&base);

    info!("Found {} Rust files", scan_result.rust_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files into syntax trees
    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = SourceParser::parse_files(&base, &scan_result.rust_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {:#}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} files", parsed_files.len());

    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    // Step 3: Lower declarations and resolve
    let store = loader::load(&parsed_files);
    let overrides = load_overrides(args)?;
    let config = PassConfig {
        strategy: args.property_strategy,
        required_by_default: args.required_by_default,
    };
    let definitions = resolve_pass(&store, &overrides, config, &args.roots)
        .context("Failed to resolve type definitions")?;
    info!("Resolved {} definitions", definitions.len());

    Ok(DocumentBuilder::new()
        .with_info(args.title.clone(), args.api_version.clone(), None)
        .build(definitions))
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting definition generation...");
    let document = generate(&args)?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote {} definitions to {}", document.definitions.len(), output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
