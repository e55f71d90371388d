// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cross-map listing: `{oldHash, newHash},` per resolved rename.

use crate::diff::RenamePair;

/// Render resolved renames as initializer rows, tokens as written in the
/// diff files.
pub fn render_crossmap(renames: &[RenamePair]) -> String {
    let mut out = String::new();
    for pair in renames {
        out.push_str(&format!("{{{}, {}}},\n", pair.original, pair.new));
    }
    out
}
