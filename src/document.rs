use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Swagger 2.0 document carrying only the `definitions` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub swagger: String,
    pub info: Info,
    /// Always empty; operations are not described
    pub paths: IndexMap<String, serde_json::Value>,
    pub definitions: BTreeMap<String, Schema>,
}

/// Document Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document builder
pub struct DocumentBuilder {
    info: Info,
}

impl DocumentBuilder {
    /// Create a new builder with default info
    pub fn new() -> Self {
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("Type definitions generated from Rust code".to_string()),
            },
        }
    }

    /// Set custom info for the document
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Wrap a resolved definitions map
    pub fn build(self, definitions: BTreeMap<String, Schema>) -> SchemaDocument {
        debug!("Building document with {} definitions", definitions.len());
        SchemaDocument {
            swagger: "2.0".to_string(),
            info: self.info,
            paths: IndexMap::new(),
            definitions,
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_info() {
        let doc = DocumentBuilder::new().build(BTreeMap::new());
        assert_eq!(doc.swagger, "2.0");
        assert_eq!(doc.info.title, "Generated API");
        assert_eq!(doc.info.version, "1.0.0");
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn test_custom_info() {
        let doc = DocumentBuilder::new()
            .with_info("Pets".to_string(), "2.1.0".to_string(), None)
            .build(BTreeMap::new());
        assert_eq!(doc.info.title, "Pets");
        assert_eq!(doc.info.version, "2.1.0");
        assert_eq!(doc.info.description, None);
    }

    #[test]
    fn test_document_shape() {
        let mut definitions = BTreeMap::new();
        definitions.insert("Tag".to_string(), Schema::scalar("string", None));
        definitions.insert("Pet".to_string(), Schema::reference("Tag"));

        let doc = DocumentBuilder::new()
            .with_info("Pets".to_string(), "1.0".to_string(), None)
            .build(definitions);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            value,
            json!({
                "swagger": "2.0",
                "info": {"title": "Pets", "version": "1.0"},
                "paths": {},
                "definitions": {
                    "Pet": {"$ref": "#/definitions/Tag"},
                    "Tag": {"type": "string"}
                }
            })
        );
    }
}
