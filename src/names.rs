//! Deterministic display-name and identifier generation.
//!
//! All functions here are pure: identical inputs yield identical outputs
//! within and across runs. Generated names are length-bounded with a stable
//! digest tail so truncation keeps them practically collision-free.

use sha2::{Digest, Sha256};

use crate::model::{Attribute, LinkPath, Model};

/// The common relational-identifier limit.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 63;

/// Generates display names, table aliases and derived foreign-key names from
/// attributes and link paths.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    max_length: usize,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl NameGenerator {
    /// A generator bounding names at `max_length` characters. The bound must
    /// leave room for the 8-character digest tail plus a useful head.
    pub fn new(max_length: usize) -> Self {
        assert!(max_length >= 16, "max_length must be at least 16");
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Normalize a generated name: collapse whitespace runs and
    /// immediately-repeated words ("booking booking" becomes "booking"),
    /// capitalize the first letter, and bound the length by replacing the
    /// tail with an 8-character hex digest of the full name.
    pub fn normalize(&self, name: &str) -> String {
        let mut words: Vec<&str> = Vec::new();
        for word in name.split_whitespace() {
            if words.last() == Some(&word) && is_word(word) {
                continue;
            }
            words.push(word);
        }
        let joined = words.join(" ");

        let mut chars = joined.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => joined,
        };

        if capitalized.chars().count() > self.max_length {
            let digest = Sha256::digest(capitalized.as_bytes());
            let tail: String = digest[..4].iter().map(|byte| format!("{byte:02x}")).collect();
            let head: String = capitalized.chars().take(self.max_length - 8).collect();
            format!("{head}{tail}")
        } else {
            capitalized
        }
    }

    /// The display name of an attribute seen through a path: the link
    /// prefixes, lower-cased and space-joined, followed by the attribute name
    /// with its first letter lowered unless it starts with an acronym.
    pub fn prefixed_name(&self, model: &Model, attribute: &Attribute, path: &LinkPath) -> String {
        if path.is_empty() {
            return self.normalize(&attribute.name);
        }
        let prefix = path
            .links()
            .iter()
            .map(|&link| model.link(link).prefix.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        self.normalize(&format!("{prefix} {}", first_lower(&attribute.name)))
    }

    /// The table alias for a non-empty path: the link prefixes joined with the
    /// terminal entity name. The root table is aliased to the root entity's
    /// name directly.
    pub fn table_alias(&self, model: &Model, path: &LinkPath) -> String {
        let mut parts: Vec<&str> = path
            .links()
            .iter()
            .map(|&link| model.link(link).prefix.as_str())
            .collect();
        let target = path
            .last()
            .map(|link| model.entity(model.link_target(link)).name.as_str())
            .unwrap_or_default();
        parts.push(target);
        self.normalize(&parts.join(" "))
    }

    /// The star-schema fact-table foreign key column for a path,
    /// e.g. "Order item order_fk": the parent alias (the root entity name for
    /// one-link paths) joined with the last link's foreign-key column.
    pub fn join_fk_name(&self, model: &Model, root_name: &str, path: &LinkPath) -> String {
        let Some(link) = path.last() else {
            return self.normalize(root_name);
        };
        let parent = path.parent();
        let base = if parent.is_empty() {
            root_name.to_string()
        } else {
            self.table_alias(model, &parent)
        };
        self.normalize(&format!("{base} {}", model.link(link).fk_column))
    }

    /// The derived foreign-key name for a date/duration attribute,
    /// e.g. "Order date (FK)".
    pub fn attribute_fk_name(&self, model: &Model, attribute: &Attribute, path: &LinkPath) -> String {
        format!("{} (FK)", self.prefixed_name(model, attribute, path))
    }
}

/// Lowercase the first letter unless the name starts with two or more
/// consecutive capitals (acronyms like "ID" or "URL" stay intact).
fn first_lower(name: &str) -> String {
    let mut chars = name.chars();
    let first = chars.next();
    let second = chars.next();
    if let (Some(a), Some(b)) = (first, second) {
        if a.is_ascii_uppercase() && b.is_ascii_uppercase() {
            return name.to_string();
        }
    }
    match first {
        Some(first) => first.to_lowercase().collect::<String>() + &name[first.len_utf8()..],
        None => String::new(),
    }
}

fn is_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '_')
}
