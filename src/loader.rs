//! Declaration loader: lowers parsed Rust files into a [`DeclarationStore`].
//!
//! Modules become units, structs / enums / type aliases become type declarations,
//! `fn` items and methods become routines, and `const` items plus unit enum variants
//! become the constants the enum extractor binds. Items declared inside a function body
//! are recorded with that function as their scope.

use crate::attributes::{
    container_attributes, extract_doc_comment, field_directives, schema_rename, serde_name,
};
use crate::enums;
use crate::parser::{ParsedFile, SourceParser};
use crate::store::{ConstDecl, DeclarationStore, Field, Literal, RoutineDecl, TypeDecl};
use crate::type_expr::{strip_raw_prefix, Primitive, TypeExpr};
use anyhow::Result;
use log::{debug, info, warn};

/// Lower every parsed file into one store and attach enum values
pub fn load(files: &[ParsedFile]) -> DeclarationStore {
    let mut loader = Loader {
        store: DeclarationStore::new(),
    };
    for file in files {
        loader.store.unit_mut(&file.unit);
        loader.load_items(&file.unit, &file.syntax_tree.items);
    }
    let mut store = loader.store;
    enums::populate(&mut store);
    info!(
        "Loaded {} type declarations from {} files",
        store.len(),
        files.len()
    );
    store
}

/// Parse and load in-memory sources given as `(module path, code)` pairs
///
/// # Errors
///
/// Returns an error if any source is not valid Rust.
pub fn load_sources(sources: &[(&str, &str)]) -> Result<DeclarationStore> {
    let files = sources
        .iter()
        .map(|(unit, code)| SourceParser::parse_source(unit, code))
        .collect::<Result<Vec<_>>>()?;
    Ok(load(&files))
}

struct Loader {
    store: DeclarationStore,
}

fn generic_params(generics: &syn::Generics) -> Vec<String> {
    generics
        .type_params()
        .map(|p| p.ident.to_string())
        .collect()
}

/// Name of the type an `impl` block is for
fn impl_target(item: &syn::ItemImpl) -> Option<String> {
    match item.self_ty.as_ref() {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string()),
        _ => None,
    }
}

/// Literal value of a constant initializer: `1`, `-1`, `"a"`, `Level(1)`, `Self(1)`
pub fn literal_of(expr: &syn::Expr) -> Option<Literal> {
    match expr {
        syn::Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Str(s) => Some(Literal::Str(s.value())),
            syn::Lit::Char(c) => Some(Literal::Str(c.value().to_string())),
            syn::Lit::Int(i) => i.base10_parse::<i64>().ok().map(Literal::Int),
            syn::Lit::Float(f) => f.base10_parse::<f64>().ok().map(Literal::Float),
            syn::Lit::Bool(b) => Some(Literal::Bool(b.value)),
            _ => None,
        },
        syn::Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => match literal_of(expr)? {
            Literal::Int(i) => Some(Literal::Int(-i)),
            Literal::Float(f) => Some(Literal::Float(-f)),
            _ => None,
        },
        syn::Expr::Call(call) if call.args.len() == 1 => call.args.first().and_then(literal_of),
        syn::Expr::Paren(paren) => literal_of(&paren.expr),
        syn::Expr::Group(group) => literal_of(&group.expr),
        syn::Expr::Cast(cast) => literal_of(&cast.expr),
        _ => None,
    }
}

impl Loader {
    fn load_items(&mut self, unit: &str, items: &[syn::Item]) {
        for item in items {
            match item {
                syn::Item::Struct(item) => self.load_struct(unit, None, item),
                syn::Item::Enum(item) => self.load_enum(unit, None, item),
                syn::Item::Type(item) => self.load_alias(unit, None, item),
                syn::Item::Const(item) => self.load_const(unit, None, item),
                syn::Item::Fn(item) => {
                    let name = item.sig.ident.to_string();
                    self.load_routine(unit, &name, &item.attrs, &item.block);
                }
                syn::Item::Impl(item) => self.load_impl(unit, item),
                syn::Item::Mod(item) => {
                    if let Some((_, content)) = &item.content {
                        let child = format!("{}::{}", unit, strip_raw_prefix(&item.ident.to_string()));
                        self.store.unit_mut(&child);
                        self.load_items(&child, content);
                    }
                }
                syn::Item::Use(item) => self.load_use(unit, &item.tree, Vec::new()),
                _ => {}
            }
        }
    }

    fn load_routine(&mut self, unit: &str, name: &str, attrs: &[syn::Attribute], block: &syn::Block) {
        self.store.add_routine(RoutineDecl {
            unit: unit.to_string(),
            name: name.to_string(),
            doc: extract_doc_comment(attrs),
        });
        for stmt in &block.stmts {
            if let syn::Stmt::Item(item) = stmt {
                match item {
                    syn::Item::Struct(item) => self.load_struct(unit, Some(name), item),
                    syn::Item::Enum(item) => self.load_enum(unit, Some(name), item),
                    syn::Item::Type(item) => self.load_alias(unit, Some(name), item),
                    syn::Item::Const(item) => self.load_const(unit, Some(name), item),
                    _ => {}
                }
            }
        }
    }

    fn declare(
        &mut self,
        unit: &str,
        scope: Option<&str>,
        name: &str,
        expr: TypeExpr,
        generics: Vec<String>,
        attrs: &[syn::Attribute],
    ) {
        let container = container_attributes(attrs);
        let mut decl = TypeDecl::new(unit, name, expr);
        decl.scope = scope.map(str::to_string);
        decl.generics = generics;
        decl.doc = extract_doc_comment(attrs);
        decl.rename_all = container.rename_all;
        decl.name_override = container.name;
        self.store.add_type(decl);
    }

    fn load_struct(&mut self, unit: &str, scope: Option<&str>, item: &syn::ItemStruct) {
        let name = item.ident.to_string();

        let mut expr = match &item.fields {
            syn::Fields::Named(named) => TypeExpr::Composite(
                named
                    .named
                    .iter()
                    .filter_map(|field| {
                        let ident = field.ident.as_ref()?;
                        Some(Field {
                            name: strip_raw_prefix(&ident.to_string()).to_string(),
                            ty: TypeExpr::from_syn(&field.ty),
                            directives: field_directives(&field.attrs),
                            doc: extract_doc_comment(&field.attrs),
                        })
                    })
                    .collect(),
            ),
            syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                TypeExpr::from_syn(&unnamed.unnamed[0].ty)
            }
            syn::Fields::Unnamed(unnamed) => {
                let elems: Vec<TypeExpr> = unnamed
                    .unnamed
                    .iter()
                    .map(|f| TypeExpr::from_syn(&f.ty))
                    .collect();
                match elems.first() {
                    Some(first) if elems.iter().all(|e| e == first) => {
                        TypeExpr::Slice(Box::new(first.clone()))
                    }
                    _ => TypeExpr::Slice(Box::new(TypeExpr::Any)),
                }
            }
            syn::Fields::Unit => TypeExpr::Any,
        };
        expr.replace_self(&name);

        debug!("Struct {} in {}", name, unit);
        self.declare(
            unit,
            scope,
            &name,
            expr,
            generic_params(&item.generics),
            &item.attrs,
        );
    }

    fn load_enum(&mut self, unit: &str, scope: Option<&str>, item: &syn::ItemEnum) {
        let name = item.ident.to_string();
        let container = container_attributes(&item.attrs);
        let all_unit = item
            .variants
            .iter()
            .all(|v| matches!(v.fields, syn::Fields::Unit));

        if !all_unit {
            warn!(
                "Enum {} in {} carries data; it is described as an unconstrained schema",
                name, unit
            );
            self.declare(
                unit,
                scope,
                &name,
                TypeExpr::Any,
                generic_params(&item.generics),
                &item.attrs,
            );
            return;
        }

        let numeric = container.serialize_repr;
        let primitive = if numeric {
            container.repr.unwrap_or(Primitive::I64)
        } else {
            Primitive::String
        };

        // `None` once implicit numbering has run past i64::MAX
        let mut next_discriminant: Option<i64> = Some(0);
        for variant in &item.variants {
            let ident = variant.ident.to_string();
            let value = if numeric {
                if let Some((_, expr)) = &variant.discriminant {
                    match literal_of(expr) {
                        Some(Literal::Int(explicit)) => next_discriminant = Some(explicit),
                        _ => warn!("Discriminant of {}::{} is not an integer literal", name, ident),
                    }
                }
                let Some(discriminant) = next_discriminant else {
                    warn!("Discriminant of {}::{} overflows i64; variant skipped", name, ident);
                    continue;
                };
                next_discriminant = discriminant.checked_add(1);
                Literal::Int(discriminant)
            } else {
                let serialized = serde_name(&variant.attrs).unwrap_or_else(|| {
                    match container.rename_all {
                        Some(strategy) => strategy.apply_to_variant(&ident),
                        None => ident.clone(),
                    }
                });
                Literal::Str(serialized)
            };

            let mut constant = ConstDecl::new(unit, &ident, TypeExpr::named(&name)).with_value(value);
            constant.scope = scope.map(str::to_string);
            constant.doc = extract_doc_comment(&variant.attrs);
            constant.rename = schema_rename(&variant.attrs);
            self.store.add_const(constant);
        }

        debug!("Enum {} in {} with {} variants", name, unit, item.variants.len());
        self.declare(
            unit,
            scope,
            &name,
            TypeExpr::Scalar(primitive),
            Vec::new(),
            &item.attrs,
        );
    }

    fn load_alias(&mut self, unit: &str, scope: Option<&str>, item: &syn::ItemType) {
        let name = item.ident.to_string();
        self.declare(
            unit,
            scope,
            &name,
            TypeExpr::from_syn(&item.ty),
            generic_params(&item.generics),
            &item.attrs,
        );
    }

    fn load_const(&mut self, unit: &str, scope: Option<&str>, item: &syn::ItemConst) {
        let mut constant = ConstDecl::new(unit, item.ident.to_string(), TypeExpr::from_syn(&item.ty));
        constant.scope = scope.map(str::to_string);
        constant.value = literal_of(&item.expr);
        constant.doc = extract_doc_comment(&item.attrs);
        constant.rename = schema_rename(&item.attrs);
        self.store.add_const(constant);
    }

    fn load_impl(&mut self, unit: &str, item: &syn::ItemImpl) {
        let Some(target) = impl_target(item) else {
            return;
        };
        let inherent = item.trait_.is_none();

        for impl_item in &item.items {
            match impl_item {
                syn::ImplItem::Const(constant) if inherent => {
                    let mut ty = TypeExpr::from_syn(&constant.ty);
                    ty.replace_self(&target);
                    let mut decl = ConstDecl::new(unit, constant.ident.to_string(), ty);
                    decl.value = literal_of(&constant.expr);
                    decl.doc = extract_doc_comment(&constant.attrs);
                    decl.rename = schema_rename(&constant.attrs);
                    self.store.add_const(decl);
                }
                syn::ImplItem::Fn(method) => {
                    let name = format!("{}.{}", target, method.sig.ident);
                    self.load_routine(unit, &name, &method.attrs, &method.block);
                }
                _ => {}
            }
        }
    }

    fn load_use(&mut self, unit: &str, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.load_use(unit, &path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                let ident = name.ident.to_string();
                if ident == "self" {
                    if let Some(alias) = prefix.last().cloned() {
                        self.store.add_import(unit, alias, prefix);
                    }
                } else {
                    prefix.push(ident.clone());
                    self.store.add_import(unit, ident, prefix);
                }
            }
            syn::UseTree::Rename(rename) => {
                let ident = rename.ident.to_string();
                if ident != "self" {
                    prefix.push(ident);
                }
                if rename.rename != "_" {
                    self.store.add_import(unit, rename.rename.to_string(), prefix);
                }
            }
            syn::UseTree::Glob(_) => self.store.add_glob(unit, prefix),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.load_use(unit, item, prefix.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(code: &str) -> DeclarationStore {
        load_sources(&[("crate", code)]).unwrap()
    }

    #[test]
    fn test_struct_fields_and_docs() {
        let store = store_of(
            r#"
            /// A registered user
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            pub struct User {
                /// Primary key
                pub id: u64,
                #[serde(rename = "displayName")]
                pub name: Option<String>,
                #[serde(skip)]
                pub password: String,
                pub r#type: String,
            }
            "#,
        );
        let (_, user) = store.types().next().unwrap();
        assert_eq!(user.name, "User");
        assert_eq!(user.doc.as_deref(), Some("A registered user"));
        assert_eq!(user.rename_all, Some(crate::naming::NamingStrategy::CamelCase));
        let TypeExpr::Composite(fields) = &user.expr else {
            panic!("expected composite");
        };
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].doc.as_deref(), Some("Primary key"));
        assert_eq!(fields[1].directives.rename.as_deref(), Some("displayName"));
        assert!(fields[1].ty.is_pointer());
        assert!(fields[2].directives.ignore);
        assert_eq!(fields[3].name, "type");
    }

    #[test]
    fn test_tuple_and_unit_structs() {
        let store = store_of(
            r#"
            pub struct UserId(u64);
            pub struct Point(f64, f64);
            pub struct Marker;
            "#,
        );
        let exprs: Vec<&TypeExpr> = store.types().map(|(_, d)| &d.expr).collect();
        assert_eq!(*exprs[0], TypeExpr::Scalar(Primitive::U64));
        assert_eq!(
            *exprs[1],
            TypeExpr::Slice(Box::new(TypeExpr::Scalar(Primitive::F64)))
        );
        assert_eq!(*exprs[2], TypeExpr::Any);
    }

    #[test]
    fn test_unit_enum_becomes_string_constants() {
        let store = store_of(
            r#"
            #[serde(rename_all = "snake_case")]
            pub enum Status {
                /// Waiting for review
                InReview,
                #[serde(rename = "done")]
                Finished,
            }
            "#,
        );
        let (_, status) = store.types().next().unwrap();
        assert_eq!(status.expr, TypeExpr::Scalar(Primitive::String));
        let values: Vec<&Literal> = status.enum_values.iter().map(|v| &v.value).collect();
        assert_eq!(
            values,
            vec![
                &Literal::Str("in_review".to_string()),
                &Literal::Str("done".to_string())
            ]
        );
        assert_eq!(status.enum_values[0].comment.as_deref(), Some("Waiting for review"));
    }

    #[test]
    fn test_repr_enum_uses_discriminants() {
        let store = store_of(
            r#"
            #[derive(Serialize_repr)]
            #[repr(u8)]
            pub enum Level { Low = 1, Mid, High = 10 }
            "#,
        );
        let (_, level) = store.types().next().unwrap();
        assert_eq!(level.expr, TypeExpr::Scalar(Primitive::U8));
        let values: Vec<&Literal> = level.enum_values.iter().map(|v| &v.value).collect();
        assert_eq!(values, vec![&Literal::Int(1), &Literal::Int(2), &Literal::Int(10)]);
    }

    #[test]
    fn test_implicit_discriminant_overflow_skips_variant() {
        let store = store_of(
            r#"
            #[derive(Serialize_repr)]
            #[repr(i64)]
            pub enum Edge { Max = 9223372036854775807, Wrapped, Reset = 0, Next }
            "#,
        );
        let (_, edge) = store.types().next().unwrap();
        let values: Vec<&Literal> = edge.enum_values.iter().map(|v| &v.value).collect();
        assert_eq!(
            values,
            vec![&Literal::Int(i64::MAX), &Literal::Int(0), &Literal::Int(1)]
        );
    }

    #[test]
    fn test_variant_renaming_matches_serde() {
        let store = store_of(
            r#"
            #[serde(rename_all = "camelCase")]
            pub enum Kind { UserID, HTTPServer }
            "#,
        );
        let (_, kind) = store.types().next().unwrap();
        let values: Vec<&Literal> = kind.enum_values.iter().map(|v| &v.value).collect();
        assert_eq!(
            values,
            vec![
                &Literal::Str("userID".to_string()),
                &Literal::Str("hTTPServer".to_string())
            ]
        );
    }

    #[test]
    fn test_data_enum_is_any() {
        let store = store_of("pub enum Shape { Circle(f64), Square { side: f64 } }");
        let (_, shape) = store.types().next().unwrap();
        assert_eq!(shape.expr, TypeExpr::Any);
        assert!(shape.enum_values.is_empty());
    }

    #[test]
    fn test_constants_bind_to_newtype() {
        let store = store_of(
            r#"
            pub struct Level(i32);
            /// first
            pub const A: Level = Level(1);
            pub const B: Level = Level(2);
            impl Level {
                /// third
                pub const C: Self = Self(3);
                pub const D: Self = Self::compute();
            }
            "#,
        );
        let (_, level) = store.types().next().unwrap();
        let idents: Vec<&str> = level.enum_values.iter().map(|v| v.ident.as_str()).collect();
        assert_eq!(idents, vec!["A", "B", "C"]);
        assert_eq!(level.enum_values[2].comment.as_deref(), Some("third"));
    }

    #[test]
    fn test_locals_and_methods() {
        let store = store_of(
            r#"
            pub struct response { pub ok: bool }
            pub fn fun() {
                struct response { id: u8 }
            }
            pub struct Service;
            impl Service {
                fn handle(&self) {
                    struct Body { text: String }
                }
            }
            "#,
        );
        let scopes: Vec<(String, Option<String>)> = store
            .types()
            .map(|(_, d)| (d.name.clone(), d.scope.clone()))
            .collect();
        assert!(scopes.contains(&("response".to_string(), None)));
        assert!(scopes.contains(&("response".to_string(), Some("fun".to_string()))));
        assert!(scopes.contains(&("Body".to_string(), Some("Service.handle".to_string()))));
        assert!(store.routine("crate", "fun").is_some());
    }

    #[test]
    fn test_use_trees_and_inline_modules() {
        let store = store_of(
            r#"
            use crate::models::{self, Pet as Animal, shared::*};
            use chrono::DateTime;
            mod inner {
                pub struct Hidden;
            }
            "#,
        );
        let root = store.unit("crate").unwrap();
        assert_eq!(root.import("models").unwrap().path, vec!["crate", "models"]);
        assert_eq!(
            root.import("Animal").unwrap().path,
            vec!["crate", "models", "Pet"]
        );
        assert_eq!(root.import("DateTime").unwrap().path, vec!["chrono", "DateTime"]);
        assert_eq!(root.globs, vec![vec!["crate", "models", "shared"]]);
        assert_eq!(store.types().filter(|(_, d)| d.unit == "crate::inner").count(), 1);
    }

    #[test]
    fn test_literal_of() {
        let parse = |text: &str| literal_of(&syn::parse_str::<syn::Expr>(text).unwrap());
        assert_eq!(parse("-5"), Some(Literal::Int(-5)));
        assert_eq!(parse("Level(\"a\")"), Some(Literal::Str("a".to_string())));
        assert_eq!(parse("1.5"), Some(Literal::Float(1.5)));
        assert_eq!(parse("(true)"), Some(Literal::Bool(true)));
        assert_eq!(parse("compute()"), None);
    }
}
