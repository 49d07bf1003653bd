//! Serialization module for converting schema documents to YAML or JSON format.
//!
//! This module provides functions to serialize documents into standard formats
//! and write them to files or return them as strings.

use crate::document::SchemaDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a schema document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use schema_from_source::document::DocumentBuilder;
/// use schema_from_source::serializer::serialize_yaml;
/// use std::collections::BTreeMap;
///
/// let doc = DocumentBuilder::new().build(BTreeMap::new());
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.contains("swagger"));
/// ```
pub fn serialize_yaml(doc: &SchemaDocument) -> Result<String> {
    debug!("Serializing schema document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize schema document to YAML")
}

/// Serializes a schema document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &SchemaDocument) -> Result<String> {
    debug!("Serializing schema document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize schema document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file and any missing parent directories, or overwrites the file if it exists.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
