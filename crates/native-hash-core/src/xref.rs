// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! IDC naming script for a specific binary build.
//!
//! The address map lists `hash : address` per native compiled into that build.
//! Joining it against the patched header's declarations names every address
//! after its declaration. The join is a read-only filter, run in parallel per
//! declaration; results are collected in declaration order, with each
//! declaration's matches contiguous and in address-map order.

use std::fmt;

use rayon::prelude::*;
use tracing::info;

use crate::hash::HashToken;
use crate::header::Declaration;

/// Fixed script opening.
pub const SCRIPT_PROLOGUE: &str = "\n#include <idc.idc>\n\nstatic main() {\n";

/// Fixed script closing.
pub const SCRIPT_EPILOGUE: &str = "}\n\n";

/// Errors raised while parsing an address map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressMapError {
    /// A non-blank line without `hash : address` shape.
    #[error("[MALFORMED_ADDRESS_LINE] line {line}: {text:?}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The line as read.
        text: String,
    },
}

/// One native's address in a build.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AddressEntry {
    /// Native hash.
    pub hash: HashToken,
    /// Address text, copied into the script verbatim.
    pub address: String,
}

/// Parse a colon-delimited address map. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`AddressMapError::MalformedLine`] for a line with no `:` or with
/// an empty side.
pub fn parse_address_map(text: &str) -> Result<Vec<AddressEntry>, AddressMapError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = || AddressMapError::MalformedLine {
            line: idx + 1,
            text: line.to_owned(),
        };
        let (hash, address) = line.split_once(':').ok_or_else(malformed)?;
        let (hash, address) = (hash.trim(), address.trim());
        if hash.is_empty() || address.is_empty() {
            return Err(malformed());
        }
        entries.push(AddressEntry {
            hash: HashToken::new(hash),
            address: address.to_owned(),
        });
    }
    Ok(entries)
}

/// An address bound to a declaration name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CrossReference {
    /// Address from the map.
    pub address: String,
    /// Declaration name from the header.
    pub name: String,
}

impl fmt::Display for CrossReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\tMakeName({}, \"{}\");", self.address, self.name)
    }
}

/// Join declarations against address entries by hash.
///
/// Declarations without a name are ignored; addresses matching no
/// declaration produce nothing.
pub fn cross_reference(
    declarations: &[Declaration<'_>],
    addresses: &[AddressEntry],
) -> Vec<CrossReference> {
    let keys: Vec<String> = addresses.iter().map(|entry| entry.hash.key()).collect();

    let references: Vec<CrossReference> = declarations
        .par_iter()
        .filter_map(|decl| decl.name.map(|name| (decl.hash.digits(), name)))
        .flat_map_iter(|(key, name)| {
            addresses
                .iter()
                .zip(&keys)
                .filter(move |(_, entry_key)| **entry_key == key)
                .map(move |(entry, _)| CrossReference {
                    address: entry.address.clone(),
                    name: name.to_owned(),
                })
        })
        .collect();

    info!(
        "matched {} addresses against {} declarations",
        references.len(),
        declarations.len()
    );
    references
}

/// Render the full script.
pub fn render_script(references: &[CrossReference]) -> String {
    let mut out = String::from(SCRIPT_PROLOGUE);
    for reference in references {
        out.push_str(&reference.to_string());
        out.push('\n');
    }
    out.push_str(SCRIPT_EPILOGUE);
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::header::parse_declaration;

    const HEADER: [&str; 4] = [
        "namespace SYSTEM {",
        "\tstatic void WAIT(int ms) { invoke<Void>(0x4EDE34FBADD967A6, ms); }",
        "\tstatic int TIMERA() { return invoke<int>(0x83666F9FB8FEBD4B); }",
        "}",
    ];

    fn declarations() -> Vec<Declaration<'static>> {
        HEADER.iter().copied().filter_map(parse_declaration).collect()
    }

    #[test]
    fn address_map_lines_are_trimmed() {
        let map = parse_address_map("0x4EDE34FBADD967A6 : 0x1402A3B10\n\n  0x83666F9FB8FEBD4B:0x140001000  \n").unwrap();
        assert_eq!(
            map,
            vec![
                AddressEntry {
                    hash: HashToken::new("0x4EDE34FBADD967A6"),
                    address: "0x1402A3B10".to_owned(),
                },
                AddressEntry {
                    hash: HashToken::new("0x83666F9FB8FEBD4B"),
                    address: "0x140001000".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn malformed_address_line_is_rejected() {
        assert_eq!(
            parse_address_map("0x1 : 0x2\nno colon here").unwrap_err(),
            AddressMapError::MalformedLine {
                line: 2,
                text: "no colon here".to_owned(),
            }
        );
        assert!(parse_address_map(" : 0x2").is_err());
    }

    #[test]
    fn join_follows_declaration_order() {
        let addresses = parse_address_map(
            "0x83666F9FB8FEBD4B : 0x3000\n0x4ede34fbadd967a6 : 0x1000\n0xFFFFFFFFFFFFFFFF : 0x9999\n0x4EDE34FBADD967A6 : 0x2000\n",
        )
        .unwrap();
        let refs = cross_reference(&declarations(), &addresses);
        let rendered: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "\tMakeName(0x1000, \"WAIT\");",
                "\tMakeName(0x2000, \"WAIT\");",
                "\tMakeName(0x3000, \"TIMERA\");",
            ]
        );
    }

    #[test]
    fn script_has_fixed_frame() {
        let refs = [CrossReference {
            address: "0x1000".to_owned(),
            name: "WAIT".to_owned(),
        }];
        assert_eq!(
            render_script(&refs),
            "\n#include <idc.idc>\n\nstatic main() {\n\tMakeName(0x1000, \"WAIT\");\n}\n\n"
        );
        assert_eq!(render_script(&[]), format!("{SCRIPT_PROLOGUE}{SCRIPT_EPILOGUE}"));
    }
}
