use crate::error::{Error, Result};
use crate::type_expr::TypeExpr;
use anyhow::Context;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// What to do with a type whose fully qualified name is overridden
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// Resolve this expression instead, from the crate root
    Replace(TypeExpr),
    /// Drop every property of this type wherever it is referenced
    Elide,
}

/// User-supplied type substitutions, keyed by fully qualified name.
///
/// Immutable once built; passes share it by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: BTreeMap<String, Override>,
}

/// `::chrono::DateTime` and `chrono::DateTime` name the same type
fn normalize_key(name: &str) -> String {
    name.trim().trim_start_matches("::").to_string()
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a plain map; an empty value means elide.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOverride` when a replacement is not a valid type expression.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut table = OverrideTable::new();
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        for key in keys {
            let value = &map[key];
            if value.trim().is_empty() {
                table.elide(key);
            } else {
                let expr = TypeExpr::parse(value).map_err(|e| Error::InvalidOverride {
                    line: 0,
                    message: format!("`{}` for {}: {}", value, key, e),
                })?;
                table.replace(key, expr);
            }
        }
        Ok(table)
    }

    /// Parse the line-oriented overrides format:
    ///
    /// ```text
    /// // comment
    /// replace crate::db::NullInt64 i64
    /// skip crate::db::Secret
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidOverride` with the 1-based line number of the first bad line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = OverrideTable::new();
        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            match directive {
                "replace" => {
                    let Some((name, expr_text)) = rest.split_once(char::is_whitespace) else {
                        return Err(Error::InvalidOverride {
                            line: line_no,
                            message: "replace needs a type name and a replacement".to_string(),
                        });
                    };
                    let expr = TypeExpr::parse(expr_text).map_err(|e| Error::InvalidOverride {
                        line: line_no,
                        message: format!("bad replacement `{}`: {}", expr_text.trim(), e),
                    })?;
                    table.replace(name, expr);
                }
                "skip" => {
                    if rest.is_empty() || rest.contains(char::is_whitespace) {
                        return Err(Error::InvalidOverride {
                            line: line_no,
                            message: "skip needs exactly one type name".to_string(),
                        });
                    }
                    table.elide(rest);
                }
                other => {
                    return Err(Error::InvalidOverride {
                        line: line_no,
                        message: format!("unknown directive `{}`", other),
                    })
                }
            }
        }
        debug!("Loaded {} type overrides", table.len());
        Ok(table)
    }

    /// Read and parse an overrides file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains an invalid line.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read overrides file: {}", path.display()))?;
        let table = Self::parse(&text)
            .with_context(|| format!("Invalid overrides file: {}", path.display()))?;
        Ok(table)
    }

    pub fn replace(&mut self, name: &str, expr: TypeExpr) {
        self.entries.insert(normalize_key(name), Override::Replace(expr));
    }

    pub fn elide(&mut self, name: &str) {
        self.entries.insert(normalize_key(name), Override::Elide);
    }

    pub fn get(&self, fqn: &str) -> Option<&Override> {
        self.entries.get(fqn.trim_start_matches("::"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
