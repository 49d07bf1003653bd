//! Schema From Source - API type definitions from Rust source code.
//!
//! This library reads the type declarations of a Rust project and synthesizes a normalized,
//! cross-referenced set of schema definitions: one entry per named type, `$ref` links between
//! them, and enum values gathered from constants and unit variants.
//!
//! # Architecture
//!
//! The engine works on an in-memory [`store::DeclarationStore`] and does no I/O:
//!
//! 1. [`store`] - Units, type declarations, constants and routines
//! 2. [`registry`] - Canonical names and scope-aware lookup
//! 3. [`overrides`] - User-supplied replacements and elisions
//! 4. [`resolver`] - Type expressions to schemas, with cycle breaking
//! 5. [`enums`] - Constants bound to scalar types
//! 6. [`naming`] - Property naming strategies
//!
//! The collaborators around it turn a project directory into a document:
//!
//! - [`scanner`] - Recursively scans project directories for Rust files
//! - [`parser`] - Parses Rust source files into syntax trees
//! - [`loader`] - Lowers syntax trees into the declaration store
//! - [`document`] - Wraps the definitions into a Swagger 2.0 document
//! - [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use schema_from_source::loader::load_sources;
//! use schema_from_source::overrides::OverrideTable;
//! use schema_from_source::resolver::{resolve_pass, PassConfig};
//!
//! let store = load_sources(&[(
//!     "crate",
//!     "pub struct Pet { pub name: String, pub parent: Option<Box<Pet>> }",
//! )])
//! .unwrap();
//! let definitions =
//!     resolve_pass(&store, &OverrideTable::new(), PassConfig::default(), &[]).unwrap();
//! assert_eq!(
//!     definitions["Pet"].properties["parent"].reference.as_deref(),
//!     Some("#/definitions/Pet")
//! );
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod attributes;
pub mod cli;
pub mod document;
pub mod enums;
pub mod error;
pub mod loader;
pub mod naming;
pub mod overrides;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod store;
pub mod type_expr;
