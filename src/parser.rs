use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Parser for Rust source files.
///
/// The `SourceParser` uses the `syn` crate to parse each file into a syntax tree and
/// assigns it the module path it defines, relative to the source root.
///
/// # Example
///
/// ```no_run
/// use schema_from_source::parser::SourceParser;
/// use std::path::Path;
///
/// let parsed = SourceParser::parse_file(Path::new("src"), Path::new("src/models/pet.rs")).unwrap();
/// assert_eq!(parsed.unit, "crate::models::pet");
/// ```
pub struct SourceParser;

/// A successfully parsed Rust file with its syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module path the file defines, e.g. `crate::models::pet`
    pub unit: String,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

/// Module path of a file relative to the source root.
///
/// `lib.rs`, `main.rs` and `mod.rs` define their parent directory's module; the root
/// module is `crate`.
pub fn unit_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.pop() {
        let stem = Path::new(&last)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or(last);
        if !matches!(stem.as_str(), "lib" | "main" | "mod") {
            segments.push(stem);
        }
    }

    let mut unit = String::from("crate");
    for segment in segments {
        unit.push_str("::");
        unit.push_str(&segment.replace('-', "_"));
    }
    unit
}

impl SourceParser {
    /// Parses a single Rust source file.
    ///
    /// # Arguments
    ///
    /// * `base` - The source root the module path is computed from
    /// * `path` - Path to the Rust source file to parse
    ///
    /// # Returns
    ///
    /// Returns a `ParsedFile` containing the file path, module path and syntax tree.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(base: &Path, path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        let unit = unit_path(base, path);
        debug!("Parsed {} as {}", path.display(), unit);

        Ok(ParsedFile {
            path: path.to_path_buf(),
            unit,
            syntax_tree,
        })
    }

    /// Parses source text that defines the given module.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid Rust.
    pub fn parse_source(unit: &str, code: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(code)
            .with_context(|| format!("Failed to parse Rust syntax for module {}", unit))?;
        Ok(ParsedFile {
            path: PathBuf::from(format!("<{}>", unit)),
            unit: unit.to_string(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues for the
    /// remaining files so that one broken file does not hide every other type.
    ///
    /// # Arguments
    ///
    /// * `base` - The source root module paths are computed from
    /// * `paths` - Slice of file paths to parse
    ///
    /// # Returns
    ///
    /// Returns a vector of `Result<ParsedFile>`, one for each input path.
    pub fn parse_files(base: &Path, paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file(base, path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
