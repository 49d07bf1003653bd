use thiserror::Error;

/// Result type alias for the schema engine
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions raised while building the symbol table or resolving schemas.
///
/// Every variant aborts the pass it occurs in; callers discard any partial output.
#[derive(Debug, Error)]
pub enum Error {
    /// A type name is used but neither declared nor overridden
    #[error("cannot find type definition: {name} (referenced from {context})")]
    UnresolvedReference { name: String, context: String },

    /// Two declarations canonicalize to the same schema name
    #[error("conflicting schema name `{name}`: declared by {first} and {second}")]
    NamingConflict {
        name: String,
        first: String,
        second: String,
    },

    /// A function, channel or otherwise non-data type was reached where a schema is required
    #[error("{name} cannot be described by a schema ({context})")]
    InvalidTypeShape { name: String, context: String },

    /// A line of an overrides file could not be understood
    #[error("invalid override on line {line}: {message}")]
    InvalidOverride { line: usize, message: String },
}

impl Error {
    pub fn unresolved(name: impl Into<String>, context: impl Into<String>) -> Self {
        Error::UnresolvedReference {
            name: name.into(),
            context: context.into(),
        }
    }

    pub fn invalid_shape(name: impl Into<String>, context: impl Into<String>) -> Self {
        Error::InvalidTypeShape {
            name: name.into(),
            context: context.into(),
        }
    }
}
