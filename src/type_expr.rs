//! Type expressions - the language-neutral shape of a declared type.
//!
//! Rust syntax is lowered into [`TypeExpr`] once, at load time. Everything downstream
//! (symbol lookup, overrides, schema resolution) works on this form only.

use crate::store::Field;
use log::debug;
use quote::ToTokens;
use std::fmt;

/// Primitive types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

impl Primitive {
    /// Parse a primitive type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" | "str" => Some(Primitive::String),
            "char" => Some(Primitive::Char),
            "bool" => Some(Primitive::Bool),
            "i8" => Some(Primitive::I8),
            "i16" => Some(Primitive::I16),
            "i32" => Some(Primitive::I32),
            "i64" => Some(Primitive::I64),
            "i128" => Some(Primitive::I128),
            "isize" => Some(Primitive::Isize),
            "u8" => Some(Primitive::U8),
            "u16" => Some(Primitive::U16),
            "u32" => Some(Primitive::U32),
            "u64" => Some(Primitive::U64),
            "u128" => Some(Primitive::U128),
            "usize" => Some(Primitive::Usize),
            "f32" => Some(Primitive::F32),
            "f64" => Some(Primitive::F64),
            _ => None,
        }
    }

    /// The Rust spelling, used when rendering generic arguments into schema names
    pub fn rust_name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Char => "char",
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
            Primitive::Isize => "isize",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::Usize => "usize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }

    /// OpenAPI `type` and `format` for this primitive
    pub fn schema_type_and_format(&self) -> (&'static str, Option<&'static str>) {
        match self {
            Primitive::String | Primitive::Char => ("string", None),
            Primitive::I8 | Primitive::I16 | Primitive::I32 => ("integer", Some("int32")),
            Primitive::U8 | Primitive::U16 | Primitive::U32 => ("integer", Some("int32")),
            Primitive::I64 | Primitive::I128 | Primitive::Isize => ("integer", Some("int64")),
            Primitive::U64 | Primitive::U128 | Primitive::Usize => ("integer", Some("int64")),
            Primitive::F32 => ("number", Some("float")),
            Primitive::F64 => ("number", Some("double")),
            Primitive::Bool => ("boolean", None),
        }
    }
}

/// A type expression as written in a declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A primitive scalar
    Scalar(Primitive),
    /// A reference to a named type, as written (`Pet`, `models::Pet`, `Page<User>`)
    Named { path: Vec<String>, args: Vec<TypeExpr> },
    /// `Option<T>` and raw pointers
    Pointer(Box<TypeExpr>),
    /// Sequences: `[T; N]`, `&[T]`, tuples, and std collections once resolved
    Slice(Box<TypeExpr>),
    /// Key/value maps, produced from std map names once resolved
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// A structured type with named fields
    Composite(Vec<Field>),
    /// Accepts any shape
    Any,
    /// A function or closure type
    Function,
    /// A channel endpoint, produced from std channel names once resolved
    Channel(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for a single-segment named reference without arguments
    pub fn named(name: &str) -> Self {
        TypeExpr::Named {
            path: vec![name.to_string()],
            args: Vec::new(),
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeExpr::Pointer(_))
    }

    /// Strips any number of pointer layers
    pub fn pointee(&self) -> &TypeExpr {
        match self {
            TypeExpr::Pointer(inner) => inner.pointee(),
            other => other,
        }
    }

    /// Structural meaning of a std wrapper, container or channel name.
    ///
    /// Only meaningful once the name is known not to be declared in the tree: a
    /// user type called `Cell` or `Sender` stays a named reference.
    pub fn builtin(&self) -> Option<TypeExpr> {
        let TypeExpr::Named { path, args } = self else {
            return None;
        };
        let first_arg = || args.first().cloned().unwrap_or(TypeExpr::Any);
        let expr = match path.last()?.as_str() {
            "Box" | "Rc" | "Arc" | "RefCell" | "Cell" | "Mutex" | "RwLock" | "Cow" => first_arg(),
            "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet"
            | "BinaryHeap" => TypeExpr::Slice(Box::new(first_arg())),
            "HashMap" | "BTreeMap" | "IndexMap" => {
                let value = args.get(1).cloned().unwrap_or(TypeExpr::Any);
                TypeExpr::Map(Box::new(first_arg()), Box::new(value))
            }
            "Sender" | "Receiver" | "SyncSender" | "UnboundedSender" | "UnboundedReceiver" => {
                TypeExpr::Channel(Box::new(first_arg()))
            }
            _ => return None,
        };
        Some(expr)
    }

    /// Rewrites every `Self` reference to the given type name
    pub fn replace_self(&mut self, name: &str) {
        match self {
            TypeExpr::Named { path, args } => {
                if path.len() == 1 && path[0] == "Self" {
                    path[0] = name.to_string();
                }
                for arg in args {
                    arg.replace_self(name);
                }
            }
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Channel(inner) => {
                inner.replace_self(name)
            }
            TypeExpr::Map(key, value) => {
                key.replace_self(name);
                value.replace_self(name);
            }
            TypeExpr::Composite(fields) => {
                for field in fields {
                    field.ty.replace_self(name);
                }
            }
            TypeExpr::Scalar(_) | TypeExpr::Any | TypeExpr::Function => {}
        }
    }

    /// Parse a type expression from its textual form, e.g. `Vec<crate::models::Pet>`
    pub fn parse(text: &str) -> syn::Result<Self> {
        let ty: syn::Type = syn::parse_str(text.trim())?;
        Ok(Self::from_syn(&ty))
    }

    /// Lower a `syn::Type` into a type expression
    pub fn from_syn(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(type_path) => {
                if type_path.qself.is_some() {
                    debug!(
                        "Qualified path type treated as any: {}",
                        type_path.to_token_stream()
                    );
                    return TypeExpr::Any;
                }
                Self::from_path(&type_path.path)
            }
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem),
            syn::Type::Ptr(ptr) => TypeExpr::Pointer(Box::new(Self::from_syn(&ptr.elem))),
            syn::Type::Slice(slice) => TypeExpr::Slice(Box::new(Self::from_syn(&slice.elem))),
            syn::Type::Array(array) => TypeExpr::Slice(Box::new(Self::from_syn(&array.elem))),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Tuple(tuple) => {
                let elems: Vec<TypeExpr> = tuple.elems.iter().map(Self::from_syn).collect();
                match elems.first() {
                    None => TypeExpr::Any,
                    Some(first) if elems.iter().all(|e| e == first) => {
                        TypeExpr::Slice(Box::new(first.clone()))
                    }
                    Some(_) => TypeExpr::Slice(Box::new(TypeExpr::Any)),
                }
            }
            syn::Type::BareFn(_) => TypeExpr::Function,
            syn::Type::ImplTrait(impl_trait) => Self::from_bounds(impl_trait.bounds.iter()),
            syn::Type::TraitObject(trait_object) => Self::from_bounds(trait_object.bounds.iter()),
            other => {
                debug!("Unsupported type syntax treated as any: {}", other.to_token_stream());
                TypeExpr::Any
            }
        }
    }

    fn from_bounds<'a>(bounds: impl Iterator<Item = &'a syn::TypeParamBound>) -> Self {
        for bound in bounds {
            if let syn::TypeParamBound::Trait(trait_bound) = bound {
                if let Some(segment) = trait_bound.path.segments.last() {
                    if matches!(segment.ident.to_string().as_str(), "Fn" | "FnMut" | "FnOnce") {
                        return TypeExpr::Function;
                    }
                }
            }
        }
        TypeExpr::Any
    }

    fn from_path(path: &syn::Path) -> Self {
        let segments: Vec<String> = path
            .segments
            .iter()
            .map(|s| strip_raw_prefix(&s.ident.to_string()).to_string())
            .collect();
        let Some(last) = path.segments.last() else {
            return TypeExpr::Any;
        };
        let name = last.ident.to_string();
        let args = type_arguments(&last.arguments);
        if name == "Option" {
            return TypeExpr::Pointer(Box::new(args.first().cloned().unwrap_or(TypeExpr::Any)));
        }

        let is_std_path = segments.len() == 1
            || matches!(segments[0].as_str(), "std" | "core" | "alloc");
        if is_std_path && args.is_empty() {
            if let Some(primitive) = Primitive::from_name(&name) {
                return TypeExpr::Scalar(primitive);
            }
        }

        TypeExpr::Named {
            path: segments,
            args,
        }
    }
}

fn type_arguments(arguments: &syn::PathArguments) -> Vec<TypeExpr> {
    match arguments {
        syn::PathArguments::AngleBracketed(angle) => angle
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(TypeExpr::from_syn(ty)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Strips the `r#` prefix from raw identifiers.
pub fn strip_raw_prefix(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Scalar(p) => write!(f, "{}", p.rust_name()),
            TypeExpr::Named { path, args } => {
                write!(f, "{}", path.join("::"))?;
                if !args.is_empty() {
                    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", rendered.join(", "))?;
                }
                Ok(())
            }
            TypeExpr::Pointer(inner) => write!(f, "Option<{}>", inner),
            TypeExpr::Slice(inner) => write!(f, "Vec<{}>", inner),
            TypeExpr::Map(key, value) => write!(f, "HashMap<{}, {}>", key, value),
            TypeExpr::Composite(fields) => write!(f, "struct {{ {} fields }}", fields.len()),
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::Function => write!(f, "fn"),
            TypeExpr::Channel(inner) => write!(f, "Sender<{}>", inner),
        }
    }
}
