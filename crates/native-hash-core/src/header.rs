// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generated header patching.
//!
//! Declaration lines look like
//!
//! ```text
//! \tstatic void WAIT(int ms) { invoke<Void>(0x4EDE34FBADD967A6, ms); } // 0x4EDE34FBADD967A6 b323
//! ```
//!
//! The hash literal that matters is the one inside the body, between the
//! first `{` and the next `}`. Anything outside that span (trailing comments
//! repeating the hash, for instance) is never touched.

use std::ops::Range;

use tracing::{debug, info, warn};

use crate::chain::RenameIndex;
use crate::diff::RenamePair;
use crate::hash::HexHash;

/// Prefix that marks a declaration line.
pub const DECLARATION_MARKER: &str = "\tstatic";

/// A parsed declaration line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Declaration<'a> {
    /// The whole line.
    pub line: &'a str,
    /// Value of the body's hash literal.
    pub hash: HexHash,
    /// Byte range of the 18-character literal within `line`.
    pub literal: Range<usize>,
    /// Function name, if the line has a parameter list.
    pub name: Option<&'a str>,
}

/// Parse a declaration line. Returns `None` for any other line, and for
/// declarations without a hash literal in their body.
pub fn parse_declaration(line: &str) -> Option<Declaration<'_>> {
    if !line.starts_with(DECLARATION_MARKER) {
        return None;
    }
    let (hash, literal) = body_literal(line)?;
    Some(Declaration {
        line,
        hash,
        literal,
        name: declaration_name(line),
    })
}

/// Locate the first `0x` + 16 hex digit literal inside the `{ .. }` body.
fn body_literal(line: &str) -> Option<(HexHash, Range<usize>)> {
    let open = line.find('{')?;
    let close = open + line[open..].find('}')?;
    let body = &line[open..close];
    body.match_indices("0x").find_map(|(offset, _)| {
        let start = open + offset;
        let end = start + HexHash::LITERAL_LEN;
        if end > close {
            return None;
        }
        let literal = line.get(start..end)?;
        if !literal[2..].bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        literal.parse().ok().map(|hash| (hash, start..end))
    })
}

/// The identifier right before the parameter list's `(`, pointer and
/// reference sigils stripped.
fn declaration_name(line: &str) -> Option<&str> {
    let (head, _) = line.split_once('(')?;
    let name = head
        .split_whitespace()
        .last()?
        .trim_start_matches(['*', '&']);
    (!name.is_empty()).then_some(name)
}

/// A header with its hash literals updated.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PatchedHeader {
    /// Output lines, one per input line, same order.
    pub lines: Vec<String>,
    /// Declaration lines seen.
    pub declarations: usize,
    /// Declaration lines rewritten.
    pub patched: usize,
}

impl PatchedHeader {
    /// Join lines with `\n`, terminating the last one.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Rewrite every declaration whose body literal is an original hash in
/// `renames` with the corresponding new hash.
///
/// Each output line has the same length as its input line and differs only
/// inside the literal. Lines without a matching rename are copied as-is.
pub fn patch_header<S: AsRef<str>>(lines: &[S], renames: &[RenamePair]) -> PatchedHeader {
    let index = RenameIndex::from_pairs(renames);
    let mut patched = PatchedHeader {
        lines: Vec::with_capacity(lines.len()),
        ..PatchedHeader::default()
    };

    for line in lines {
        let line = line.as_ref();
        let Some(declaration) = parse_declaration(line) else {
            if line.starts_with(DECLARATION_MARKER) {
                debug!("declaration without body hash literal: {line:?}");
            }
            patched.lines.push(line.to_owned());
            continue;
        };
        patched.declarations += 1;

        let replacement = index
            .get_key(&declaration.hash.digits())
            .map(|token| (token, token.parse()));
        let mut out = line.to_owned();
        match replacement {
            Some((_, Ok(new_hash))) => {
                out.replace_range(declaration.literal, &new_hash.to_string());
                patched.patched += 1;
            }
            Some((token, Err(err))) => {
                warn!("cannot patch {}: rename target {token} unusable: {err}", declaration.hash);
            }
            None => {}
        }
        patched.lines.push(out);
    }

    info!(
        "patched {} of {} declarations",
        patched.patched, patched.declarations
    );
    patched
}
