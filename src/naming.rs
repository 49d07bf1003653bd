//! Property naming strategies.
//!
//! Maps a declared field name to its emitted property name. Pure and total: every input
//! string produces an output, and nothing here can fail.

use clap::ValueEnum;

/// Transform applied to field names that carry no explicit rename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum NamingStrategy {
    /// Keep the declared name
    #[default]
    Identity,
    /// `user_id`
    #[value(alias = "snakecase")]
    SnakeCase,
    /// `user-id`
    #[value(alias = "kebabcase")]
    KebabCase,
    /// `userId`
    #[value(alias = "camelcase")]
    CamelCase,
    /// `UserId`
    #[value(alias = "pascalcase")]
    PascalCase,
    /// `userid`
    LowerCase,
    /// `USERID`
    UpperCase,
    /// `USER_ID`
    ScreamingSnakeCase,
    /// `USER-ID`
    ScreamingKebabCase,
}

impl NamingStrategy {
    /// Parse a serde `rename_all` value
    pub fn from_serde(value: &str) -> Option<Self> {
        match value {
            "lowercase" => Some(NamingStrategy::LowerCase),
            "UPPERCASE" => Some(NamingStrategy::UpperCase),
            "PascalCase" => Some(NamingStrategy::PascalCase),
            "camelCase" => Some(NamingStrategy::CamelCase),
            "snake_case" => Some(NamingStrategy::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(NamingStrategy::ScreamingSnakeCase),
            "kebab-case" => Some(NamingStrategy::KebabCase),
            "SCREAMING-KEBAB-CASE" => Some(NamingStrategy::ScreamingKebabCase),
            _ => None,
        }
    }

    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingStrategy::Identity => name.to_string(),
            NamingStrategy::LowerCase => name.to_lowercase(),
            NamingStrategy::UpperCase => name.to_uppercase(),
            NamingStrategy::SnakeCase => join_lower(name, "_"),
            NamingStrategy::KebabCase => join_lower(name, "-"),
            NamingStrategy::ScreamingSnakeCase => join_lower(name, "_").to_uppercase(),
            NamingStrategy::ScreamingKebabCase => join_lower(name, "-").to_uppercase(),
            NamingStrategy::CamelCase => {
                let words = split_words(name);
                let mut out = String::with_capacity(name.len());
                for (i, word) in words.iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        out.push_str(&capitalize(word));
                    }
                }
                out
            }
            NamingStrategy::PascalCase => split_words(name).iter().map(|w| capitalize(w)).collect(),
        }
    }

    /// Rename an enum variant exactly the way serde's `rename_all` does.
    ///
    /// Variants are PascalCase already, so word boundaries are single uppercase letters
    /// and acronyms are not collapsed: `UserID` becomes `userID` in camelCase.
    pub fn apply_to_variant(&self, variant: &str) -> String {
        match self {
            NamingStrategy::Identity | NamingStrategy::PascalCase => variant.to_string(),
            NamingStrategy::LowerCase => variant.to_ascii_lowercase(),
            NamingStrategy::UpperCase => variant.to_ascii_uppercase(),
            NamingStrategy::CamelCase => {
                let mut chars = variant.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            NamingStrategy::SnakeCase => variant_snake(variant),
            NamingStrategy::ScreamingSnakeCase => variant_snake(variant).to_ascii_uppercase(),
            NamingStrategy::KebabCase => variant_snake(variant).replace('_', "-"),
            NamingStrategy::ScreamingKebabCase => {
                variant_snake(variant).to_ascii_uppercase().replace('_', "-")
            }
        }
    }
}

fn variant_snake(variant: &str) -> String {
    let mut out = String::with_capacity(variant.len() + 4);
    for (i, c) in variant.char_indices() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Apply `strategy` to `name`
pub fn apply(strategy: NamingStrategy, name: &str) -> String {
    strategy.apply(name)
}

fn join_lower(name: &str, separator: &str) -> String {
    split_words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}

/// First character upper, the rest lower
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

/// Split an identifier into words.
///
/// Boundaries: `_`, `-` and whitespace; a lower or digit followed by an upper; the last
/// upper of an acronym run when a lower follows (`HTTPServer` -> `HTTP`, `Server`).
/// Digits stay attached to the word before them.
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
