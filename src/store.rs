//! Declaration Store: every type, constant and routine found in the source,
//! indexed by defining unit. Pure storage; no resolution happens here.

use crate::naming::NamingStrategy;
use crate::type_expr::TypeExpr;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// Path of the crate root unit
pub const ROOT_UNIT: &str = "crate";

/// Index of a type declaration inside a [`DeclarationStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub usize);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A `use` binding: `alias` refers to `path` inside the importing unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub alias: String,
    pub path: Vec<String>,
}

/// One source unit (a Rust module) and its import table
#[derive(Debug, Clone, Default)]
pub struct Unit {
    /// Module path anchored at the crate root, e.g. `crate::models::pet`
    pub path: String,
    pub imports: Vec<Import>,
    /// Targets of `use some::path::*;`, as written
    pub globs: Vec<Vec<String>>,
}

impl Unit {
    pub fn import(&self, alias: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.alias == alias)
    }
}

pub fn unit_short_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Literal value of a constant
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Literal::Str(s) => serde_json::Value::String(s.clone()),
            Literal::Int(i) => serde_json::Value::from(*i),
            Literal::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Literal::Bool(b) => serde_json::Value::Bool(*b),
        }
    }
}

/// Field-level directives collected from `#[serde(...)]` and `#[schema(...)]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDirectives {
    pub ignore: bool,
    pub read_only: bool,
    pub required: bool,
    pub rename: Option<String>,
    pub embed: bool,
    pub as_string: bool,
    pub example: Option<String>,
    pub format: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

/// How a field takes part in its owner's schema, after directive precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition<'a> {
    Ignore,
    Renamed(&'a str),
    Embed,
    Default,
}

impl FieldDirectives {
    /// Precedence: ignore > rename > embed > default
    pub fn disposition(&self) -> Disposition<'_> {
        if self.ignore {
            Disposition::Ignore
        } else if let Some(rename) = &self.rename {
            Disposition::Renamed(rename)
        } else if self.embed {
            Disposition::Embed
        } else {
            Disposition::Default
        }
    }

    /// True when the field needs sibling keys next to a `$ref`
    pub fn has_metadata(&self) -> bool {
        self.read_only
            || self.example.is_some()
            || self.minimum.is_some()
            || self.maximum.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.pattern.is_some()
    }
}

/// One member of a composite type
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub directives: FieldDirectives,
    pub doc: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Field {
            name: name.into(),
            ty,
            directives: FieldDirectives::default(),
            doc: None,
        }
    }

    pub fn with_directives(mut self, directives: FieldDirectives) -> Self {
        self.directives = directives;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// One constant bound to a named scalar type
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub value: Literal,
    pub ident: String,
    pub rename: Option<String>,
    pub comment: Option<String>,
    pub ordinal: usize,
}

impl EnumValue {
    /// Identifier used in `x-enum-varnames` and `x-enum-comments`
    pub fn display_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.ident)
    }
}

/// One named type definition found in source
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub unit: String,
    pub name: String,
    pub generics: Vec<String>,
    pub expr: TypeExpr,
    /// Routine the type is declared inside, if any
    pub scope: Option<String>,
    pub name_override: Option<String>,
    pub doc: Option<String>,
    pub rename_all: Option<NamingStrategy>,
    pub enum_values: Vec<EnumValue>,
}

impl TypeDecl {
    pub fn new(unit: impl Into<String>, name: impl Into<String>, expr: TypeExpr) -> Self {
        TypeDecl {
            unit: unit.into(),
            name: name.into(),
            generics: Vec::new(),
            expr,
            scope: None,
            name_override: None,
            doc: None,
            rename_all: None,
            enum_values: Vec::new(),
        }
    }

    pub fn in_scope(mut self, routine: impl Into<String>) -> Self {
        self.scope = Some(routine.into());
        self
    }

    pub fn with_generics(mut self, params: &[&str]) -> Self {
        self.generics = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_name_override(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    pub fn with_rename_all(mut self, strategy: NamingStrategy) -> Self {
        self.rename_all = Some(strategy);
        self
    }

    /// Fully qualified name: `unit::[routine::]Name`
    pub fn fqn(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}::{}::{}", self.unit, scope, self.name),
            None => format!("{}::{}", self.unit, self.name),
        }
    }
}

/// A `const` item, associated const or unit enum variant
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub unit: String,
    pub scope: Option<String>,
    pub ident: String,
    pub ty: TypeExpr,
    /// `None` when the initializer is not a literal
    pub value: Option<Literal>,
    pub doc: Option<String>,
    pub rename: Option<String>,
}

impl ConstDecl {
    pub fn new(unit: impl Into<String>, ident: impl Into<String>, ty: TypeExpr) -> Self {
        ConstDecl {
            unit: unit.into(),
            scope: None,
            ident: ident.into(),
            ty,
            value: None,
            doc: None,
            rename: None,
        }
    }

    pub fn with_value(mut self, value: Literal) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A `fn` item or method
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDecl {
    pub unit: String,
    pub name: String,
    pub doc: Option<String>,
}

/// Holds every declaration of one pass
#[derive(Debug, Clone, Default)]
pub struct DeclarationStore {
    units: BTreeMap<String, Unit>,
    types: Vec<TypeDecl>,
    consts: Vec<ConstDecl>,
    routines: Vec<RoutineDecl>,
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unit, creating it on first use
    pub fn unit_mut(&mut self, path: &str) -> &mut Unit {
        self.units.entry(path.to_string()).or_insert_with(|| Unit {
            path: path.to_string(),
            ..Unit::default()
        })
    }

    pub fn add_import(&mut self, unit: &str, alias: impl Into<String>, path: Vec<String>) {
        let alias = alias.into();
        debug!("Import in {}: {} -> {}", unit, alias, path.join("::"));
        self.unit_mut(unit).imports.push(Import { alias, path });
    }

    pub fn add_glob(&mut self, unit: &str, path: Vec<String>) {
        self.unit_mut(unit).globs.push(path);
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> DeclId {
        self.unit_mut(&decl.unit);
        let id = DeclId(self.types.len());
        debug!("Declared type {} as {}", decl.fqn(), id);
        self.types.push(decl);
        id
    }

    pub fn add_const(&mut self, decl: ConstDecl) {
        self.unit_mut(&decl.unit);
        self.consts.push(decl);
    }

    pub fn add_routine(&mut self, decl: RoutineDecl) {
        self.unit_mut(&decl.unit);
        self.routines.push(decl);
    }

    pub fn get(&self, id: DeclId) -> &TypeDecl {
        &self.types[id.0]
    }

    pub fn set_enum_values(&mut self, id: DeclId, values: Vec<EnumValue>) {
        self.types[id.0].enum_values = values;
    }

    /// Type declarations in declaration order
    pub fn types(&self) -> impl Iterator<Item = (DeclId, &TypeDecl)> {
        self.types.iter().enumerate().map(|(i, d)| (DeclId(i), d))
    }

    /// Constants in source order
    pub fn consts(&self) -> &[ConstDecl] {
        &self.consts
    }

    pub fn routine(&self, unit: &str, name: &str) -> Option<&RoutineDecl> {
        self.routines.iter().find(|r| r.unit == unit && r.name == name)
    }

    pub fn unit(&self, path: &str) -> Option<&Unit> {
        self.units.get(path)
    }

    /// True for a unit with declarations or imports, or for any ancestor of one
    pub fn has_unit(&self, path: &str) -> bool {
        if self.units.contains_key(path) {
            return true;
        }
        let prefix = format!("{}::", path);
        self.units
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_expr::Primitive;

    #[test]
    fn test_add_and_query_types() {
        let mut store = DeclarationStore::new();
        let pet = store.add_type(TypeDecl::new(
            "crate::models",
            "Pet",
            TypeExpr::Composite(vec![Field::new("name", TypeExpr::Scalar(Primitive::String))]),
        ));
        let local = store.add_type(
            TypeDecl::new("crate", "response", TypeExpr::Composite(vec![])).in_scope("fun"),
        );

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(pet).fqn(), "crate::models::Pet");
        assert_eq!(store.get(local).fqn(), "crate::fun::response");
        assert_eq!(store.types().filter(|(_, d)| d.unit == "crate::models").count(), 1);
        assert!(store.unit("crate::models").is_some());
        assert!(store.has_unit("crate"));
        assert!(!store.has_unit("crate::model"));
    }

    #[test]
    fn test_imports_are_per_unit() {
        let mut store = DeclarationStore::new();
        store.add_import(
            "crate::api",
            "Pet",
            vec!["crate".into(), "models".into(), "Pet".into()],
        );
        store.add_glob("crate::api", vec!["crate".into(), "shared".into()]);

        let unit = store.unit("crate::api").unwrap();
        assert_eq!(unit.import("Pet").unwrap().path.len(), 3);
        assert_eq!(unit.globs.len(), 1);
        assert!(store.unit("crate").is_none());
    }

    #[test]
    fn test_directive_precedence() {
        let all = FieldDirectives {
            ignore: true,
            rename: Some("x".into()),
            embed: true,
            ..Default::default()
        };
        assert_eq!(all.disposition(), Disposition::Ignore);

        let renamed_embed = FieldDirectives {
            rename: Some("x".into()),
            embed: true,
            ..Default::default()
        };
        assert_eq!(renamed_embed.disposition(), Disposition::Renamed("x"));

        let embed = FieldDirectives {
            embed: true,
            ..Default::default()
        };
        assert_eq!(embed.disposition(), Disposition::Embed);
        assert_eq!(FieldDirectives::default().disposition(), Disposition::Default);
    }

    #[test]
    fn test_literal_to_json() {
        assert_eq!(Literal::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(Literal::Str("a".into()).to_json(), serde_json::json!("a"));
        assert_eq!(Literal::Bool(true).to_json(), serde_json::json!(true));
        assert_eq!(Literal::Float(1.5).to_json(), serde_json::json!(1.5));
    }
}
