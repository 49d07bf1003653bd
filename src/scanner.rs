use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a source directory to find all Rust files.
/// It automatically skips `target` and hidden directories (those starting with `.`), plus
/// any directory names given through [`FileScanner::with_excludes`].
///
/// # Example
///
/// ```no_run
/// use schema_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project/src"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    excludes: Vec<String>,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths to all discovered `.rs` files, sorted so output is stable across runs
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl ScanResult {
    /// Drops `main.rs` at the source root when `lib.rs` sits next to it.
    ///
    /// Both files would define the `crate` module; the library is the one described.
    pub fn without_binary_root(mut self, root: &Path) -> Self {
        let main = root.join("main.rs");
        if root.join("lib.rs").is_file() && self.rust_files.contains(&main) {
            debug!("Skipping {}: lib.rs defines the crate root", main.display());
            self.rust_files.retain(|path| *path != main);
        }
        self
    }
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            excludes: Vec::new(),
        }
    }

    /// Additional directory names to skip
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";
                let is_excluded =
                    e.file_type().is_dir() && self.excludes.iter().any(|x| *x == file_name);

                !is_hidden && !is_target && !is_excluded
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        debug!(
            "Scanned {}: {} Rust files",
            self.root_path.display(),
            rust_files.len()
        );

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}
