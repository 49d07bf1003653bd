//! Attribute extraction: `#[serde(...)]`, `#[schema(...)]`, `#[repr(...)]` and doc comments.

use crate::naming::NamingStrategy;
use crate::store::FieldDirectives;
use crate::type_expr::Primitive;
use log::{debug, warn};
use quote::ToTokens;
use syn::meta::ParseNestedMeta;

/// Attributes of a struct, enum or type alias
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerAttributes {
    pub rename_all: Option<NamingStrategy>,
    /// `#[schema(name = "...")]`
    pub name: Option<String>,
    /// `#[repr(u8)]` and friends
    pub repr: Option<Primitive>,
    /// Derives `Serialize_repr`, so unit variants serialize as their discriminants
    pub serialize_repr: bool,
}

/// Extract doc comments from attributes.
/// Returns concatenated doc comment string or None if no doc comments.
pub fn extract_doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let mut doc_lines = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(meta_nv) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit_str),
                ..
            }) = &meta_nv.value
            {
                let line = lit_str.value();
                // Trim leading space that rustdoc adds
                let trimmed = line.strip_prefix(' ').unwrap_or(&line);
                doc_lines.push(trimmed.trim_end().to_string());
            }
        }
    }

    let text = doc_lines.join("\n").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Consume the value of a nested meta item we do not care about
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.step(|cursor| {
            let mut rest = *cursor;
            while let Some((_, next)) = rest.token_tree() {
                rest = next;
            }
            Ok(((), rest))
        })?;
    }
    Ok(())
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: syn::LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Any literal, as text: `example = 5` and `example = "5"` are the same
fn literal_text(meta: &ParseNestedMeta) -> syn::Result<String> {
    let expr: syn::Expr = meta.value()?.parse()?;
    match &expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(s),
            ..
        }) => Ok(s.value()),
        syn::Expr::Lit(syn::ExprLit { lit, .. }) => Ok(lit.to_token_stream().to_string()),
        syn::Expr::Unary(_) => Ok(expr.to_token_stream().to_string().replace(' ', "")),
        _ => Err(meta.error("expected a literal")),
    }
}

fn number_value(meta: &ParseNestedMeta) -> syn::Result<f64> {
    let expr: syn::Expr = meta.value()?.parse()?;
    number_from_expr(&expr).ok_or_else(|| meta.error("expected a number"))
}

fn number_from_expr(expr: &syn::Expr) -> Option<f64> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(i),
            ..
        }) => i.base10_parse::<f64>().ok(),
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Float(f),
            ..
        }) => f.base10_parse::<f64>().ok(),
        syn::Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => number_from_expr(expr).map(|n| -n),
        _ => None,
    }
}

fn count_value(meta: &ParseNestedMeta) -> syn::Result<u64> {
    let lit: syn::LitInt = meta.value()?.parse()?;
    lit.base10_parse()
}

/// `rename = "x"` or `rename(serialize = "x", ...)`
fn serde_rename(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        return string_value(meta).map(Some);
    }
    let mut serialized = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            serialized = Some(string_value(&inner)?);
            Ok(())
        } else {
            skip_value(&inner)
        }
    })?;
    Ok(serialized)
}

/// Collect field directives from `#[serde(...)]` and `#[schema(...)]`.
///
/// Malformed attributes are reported and skipped; they never abort a load.
pub fn field_directives(attrs: &[syn::Attribute]) -> FieldDirectives {
    let mut directives = FieldDirectives::default();

    for attr in attrs {
        let result = if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if let Some(name) = serde_rename(&meta)? {
                        directives.rename = Some(name);
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    directives.ignore = true;
                } else if meta.path.is_ident("flatten") {
                    directives.embed = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })
        } else if attr.path().is_ident("schema") {
            attr.parse_nested_meta(|meta| {
                let key = meta
                    .path
                    .get_ident()
                    .map(|i| i.to_string())
                    .unwrap_or_default();
                match key.as_str() {
                    "ignore" => directives.ignore = true,
                    "read_only" => directives.read_only = true,
                    "required" => directives.required = true,
                    "inline" => directives.embed = true,
                    "string" => directives.as_string = true,
                    "rename" => directives.rename = Some(string_value(&meta)?),
                    "example" => directives.example = Some(literal_text(&meta)?),
                    "format" => directives.format = Some(string_value(&meta)?),
                    "pattern" => directives.pattern = Some(string_value(&meta)?),
                    "minimum" => directives.minimum = Some(number_value(&meta)?),
                    "maximum" => directives.maximum = Some(number_value(&meta)?),
                    "min_length" => directives.min_length = Some(count_value(&meta)?),
                    "max_length" => directives.max_length = Some(count_value(&meta)?),
                    _ => {
                        debug!("Ignoring unknown schema attribute `{}`", key);
                        skip_value(&meta)?;
                    }
                }
                Ok(())
            })
        } else {
            Ok(())
        };

        if let Err(e) = result {
            warn!("Malformed attribute `{}`: {}", attr.to_token_stream(), e);
        }
    }

    directives
}

/// Collect container-level attributes
pub fn container_attributes(attrs: &[syn::Attribute]) -> ContainerAttributes {
    let mut container = ContainerAttributes::default();

    for attr in attrs {
        let result = if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let value = if meta.input.peek(syn::Token![=]) {
                        Some(string_value(&meta)?)
                    } else {
                        serde_rename(&meta)?
                    };
                    if let Some(value) = value {
                        container.rename_all = NamingStrategy::from_serde(&value);
                        if container.rename_all.is_none() {
                            warn!("Unknown rename_all strategy `{}`", value);
                        }
                    }
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })
        } else if attr.path().is_ident("schema") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    container.name = Some(string_value(&meta)?);
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })
        } else if attr.path().is_ident("repr") {
            attr.parse_nested_meta(|meta| {
                if let Some(ident) = meta.path.get_ident() {
                    if let Some(primitive) = Primitive::from_name(&ident.to_string()) {
                        container.repr = Some(primitive);
                    }
                }
                skip_value(&meta)
            })
        } else if attr.path().is_ident("derive") {
            attr.parse_nested_meta(|meta| {
                if meta
                    .path
                    .segments
                    .last()
                    .is_some_and(|s| s.ident == "Serialize_repr")
                {
                    container.serialize_repr = true;
                }
                Ok(())
            })
        } else {
            Ok(())
        };

        if let Err(e) = result {
            warn!("Malformed attribute `{}`: {}", attr.to_token_stream(), e);
        }
    }

    container
}

/// Serialized name of an enum variant or constant: `#[serde(rename)]` on variants
pub fn serde_name(attrs: &[syn::Attribute]) -> Option<String> {
    let mut renamed = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(name) = serde_rename(&meta)? {
                    renamed = Some(name);
                }
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        });
    }
    renamed
}

/// `#[schema(rename = "...")]`: display name of a constant in enum metadata
pub fn schema_rename(attrs: &[syn::Attribute]) -> Option<String> {
    let schema_attrs: Vec<syn::Attribute> = attrs
        .iter()
        .filter(|a| a.path().is_ident("schema"))
        .cloned()
        .collect();
    field_directives(&schema_attrs).rename
}
