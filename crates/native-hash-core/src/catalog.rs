// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flattens the `namespace -> hash -> { name, .. }` catalog document into
//! `hash:namespace:displayName` definition lines.
//!
//! Document order is preserved (serde_json is built with `preserve_order`).

use std::fmt;

use serde_json::Value;

/// Errors raised while compiling the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Not JSON, or not a two-level object nesting.
    #[error("[CATALOG_UNREADABLE] {reason}")]
    Unreadable {
        /// What was wrong with the document.
        reason: String,
    },
    /// An entry has no string `name` field.
    #[error("[CATALOG_ENTRY_MALFORMED] {namespace}/{hash} has no string `name`")]
    EntryMalformed {
        /// Namespace holding the entry.
        namespace: String,
        /// Hash key of the entry.
        hash: String,
    },
}

/// One catalog entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NativeDefinition {
    /// Hash key, as written in the document.
    pub hash: String,
    /// Owning namespace.
    pub namespace: String,
    /// Declared name; may be empty.
    pub name: String,
}

impl NativeDefinition {
    /// `name`, or `_<hash>` when the name is empty.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("_{}", self.hash)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for NativeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hash, self.namespace, self.display_name())
    }
}

/// Compile the catalog document.
///
/// # Errors
///
/// [`CatalogError::Unreadable`] if the text is not a nested object document,
/// [`CatalogError::EntryMalformed`] for the first entry without a `name`.
pub fn compile_catalog(document: &str) -> Result<Vec<NativeDefinition>, CatalogError> {
    let root: Value = serde_json::from_str(document).map_err(|err| CatalogError::Unreadable {
        reason: err.to_string(),
    })?;
    let namespaces = root.as_object().ok_or_else(|| CatalogError::Unreadable {
        reason: "top level is not an object".to_owned(),
    })?;

    let mut definitions = Vec::new();
    for (namespace, natives) in namespaces {
        let natives = natives.as_object().ok_or_else(|| CatalogError::Unreadable {
            reason: format!("namespace {namespace} is not an object"),
        })?;
        for (hash, entry) in natives {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| CatalogError::EntryMalformed {
                    namespace: namespace.clone(),
                    hash: hash.clone(),
                })?;
            definitions.push(NativeDefinition {
                hash: hash.clone(),
                namespace: namespace.clone(),
                name: name.to_owned(),
            });
        }
    }
    Ok(definitions)
}

/// Render definitions, one `\n`-terminated line each.
///
/// The same bytes feed both the flat data listing and the header-data listing.
pub fn render_definitions(definitions: &[NativeDefinition]) -> String {
    let mut out = String::new();
    for definition in definitions {
        out.push_str(&definition.to_string());
        out.push('\n');
    }
    out
}
