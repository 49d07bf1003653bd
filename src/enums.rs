//! Enum Extractor: binds constants to the named scalar type they belong to.

use crate::store::{ConstDecl, DeclId, DeclarationStore, EnumValue, TypeDecl};
use crate::type_expr::TypeExpr;
use indexmap::IndexMap;
use log::{debug, warn};

/// Per-value data emitted next to `enum`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumMetadata {
    pub values: Vec<serde_json::Value>,
    pub var_names: Vec<String>,
    /// Only identifiers that carry a comment
    pub comments: IndexMap<String, String>,
    /// Aligned with `values`; empty when no value has a comment
    pub descriptions: Vec<String>,
}

fn binds_to(constant: &ConstDecl, decl: &TypeDecl) -> bool {
    if constant.unit != decl.unit || constant.scope != decl.scope {
        return false;
    }
    match &constant.ty {
        TypeExpr::Named { path, args } if args.is_empty() => match path.as_slice() {
            [name] => *name == decl.name,
            [prefix, name] => prefix == "self" && *name == decl.name,
            _ => false,
        },
        _ => false,
    }
}

/// Collect the constants bound to a declaration, in source order
pub fn extract(store: &DeclarationStore, id: DeclId) -> Vec<EnumValue> {
    let decl = store.get(id);
    let mut values = Vec::new();
    for constant in store.consts().iter().filter(|c| binds_to(c, decl)) {
        let Some(value) = &constant.value else {
            warn!(
                "Skipping constant {} of {}: value is not a literal",
                constant.ident,
                decl.fqn()
            );
            continue;
        };
        let comment = constant
            .doc
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        values.push(EnumValue {
            value: value.clone(),
            ident: constant.ident.clone(),
            rename: constant.rename.clone(),
            comment,
            ordinal: values.len(),
        });
    }
    values
}

/// Attach enum values to every non-generic scalar declaration
pub fn populate(store: &mut DeclarationStore) {
    let targets: Vec<DeclId> = store
        .types()
        .filter(|(_, d)| matches!(d.expr, TypeExpr::Scalar(_)) && d.generics.is_empty())
        .map(|(id, _)| id)
        .collect();

    for id in targets {
        let values = extract(store, id);
        if !values.is_empty() {
            debug!("{} has {} enum values", store.get(id).fqn(), values.len());
            store.set_enum_values(id, values);
        }
    }
}

/// Build the parallel `enum` / `x-enum-*` arrays, preserving ordinal order
pub fn metadata(values: &[EnumValue]) -> EnumMetadata {
    let mut ordered: Vec<&EnumValue> = values.iter().collect();
    ordered.sort_by_key(|v| v.ordinal);

    let mut meta = EnumMetadata::default();
    for value in &ordered {
        meta.values.push(value.value.to_json());
        meta.var_names.push(value.display_name().to_string());
        if let Some(comment) = &value.comment {
            meta.comments
                .insert(value.display_name().to_string(), comment.clone());
        }
    }
    if !meta.comments.is_empty() {
        meta.descriptions = ordered
            .iter()
            .map(|v| v.comment.clone().unwrap_or_default())
            .collect();
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Literal;
    use crate::type_expr::Primitive;
    use serde_json::json;

    fn level_store() -> (DeclarationStore, DeclId) {
        let mut store = DeclarationStore::new();
        let id = store.add_type(TypeDecl::new(
            "crate::model",
            "Level",
            TypeExpr::Scalar(Primitive::I32),
        ));
        let ty = TypeExpr::named("Level");
        store.add_const(
            ConstDecl::new("crate::model", "A", ty.clone())
                .with_value(Literal::Int(1))
                .with_doc(" first"),
        );
        store.add_const(ConstDecl::new("crate::model", "B", ty.clone()).with_value(Literal::Int(2)));
        store.add_const(
            ConstDecl::new("crate::model", "C", ty.clone())
                .with_value(Literal::Int(3))
                .with_doc("third"),
        );
        (store, id)
    }

    #[test]
    fn test_extract_in_source_order() {
        let (store, id) = level_store();
        let values = extract(&store, id);
        let idents: Vec<&str> = values.iter().map(|v| v.ident.as_str()).collect();
        assert_eq!(idents, vec!["A", "B", "C"]);
        assert_eq!(values[0].comment.as_deref(), Some("first"));
        assert_eq!(values[1].comment, None);
        assert_eq!(values[2].ordinal, 2);
    }

    #[test]
    fn test_metadata_arrays() {
        let (store, id) = level_store();
        let meta = metadata(&extract(&store, id));
        assert_eq!(meta.values, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(meta.var_names, vec!["A", "B", "C"]);
        assert_eq!(meta.descriptions, vec!["first", "", "third"]);
        assert_eq!(meta.comments.len(), 2);
        assert_eq!(meta.comments["A"], "first");
        assert_eq!(meta.comments["C"], "third");
    }

    #[test]
    fn test_rename_changes_names_not_order() {
        let (mut store, id) = level_store();
        let mut renamed = ConstDecl::new("crate::model", "D", TypeExpr::named("Level"))
            .with_value(Literal::Int(1))
            .with_doc("again");
        renamed.rename = Some("Duplicate".to_string());
        store.add_const(renamed);

        let meta = metadata(&extract(&store, id));
        assert_eq!(meta.var_names, vec!["A", "B", "C", "Duplicate"]);
        assert_eq!(meta.values, vec![json!(1), json!(2), json!(3), json!(1)]);
        assert_eq!(meta.comments["Duplicate"], "again");
    }

    #[test]
    fn test_no_comments_means_no_descriptions() {
        let mut store = DeclarationStore::new();
        let id = store.add_type(TypeDecl::new("crate", "Kind", TypeExpr::Scalar(Primitive::String)));
        store.add_const(
            ConstDecl::new("crate", "X", TypeExpr::named("Kind")).with_value(Literal::Str("x".into())),
        );
        let meta = metadata(&extract(&store, id));
        assert!(meta.comments.is_empty());
        assert!(meta.descriptions.is_empty());
    }

    #[test]
    fn test_non_literal_and_foreign_constants_are_skipped() {
        let (mut store, id) = level_store();
        store.add_const(ConstDecl::new("crate::model", "COMPUTED", TypeExpr::named("Level")));
        store.add_const(
            ConstDecl::new("crate::other", "FAR", TypeExpr::named("Level")).with_value(Literal::Int(9)),
        );
        assert_eq!(extract(&store, id).len(), 3);
    }

    #[test]
    fn test_populate_attaches_values() {
        let (mut store, id) = level_store();
        populate(&mut store);
        assert_eq!(store.get(id).enum_values.len(), 3);
    }
}
