// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Forward substitution of hashes through the ordered diff tables.
//!
//! Every pair of the earliest table anchors one chain. Its `new` hash is the
//! cursor; each later table either renames the cursor or carries it forward
//! unchanged. Chains whose final hash equals the anchor's original hash are
//! no-ops and are dropped.
//!
//! Substitution is a single forward pass: one lookup per table, no fixed-point
//! iteration. A cursor that returns to a hash already on its own chain is
//! recorded as a [`ChainCycle`] but does not change the result.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::diff::{RenamePair, VersionDiffTable};
use crate::hash::HashToken;

/// Key lookup from original hash to new hash over a slice of pairs.
///
/// When several pairs share an original hash, the first in slice order wins.
#[derive(Debug, Default)]
pub struct RenameIndex<'a> {
    targets: HashMap<String, &'a HashToken>,
}

impl<'a> RenameIndex<'a> {
    /// Index `pairs` by [`HashToken::key`] of their original hash.
    pub fn from_pairs(pairs: &'a [RenamePair]) -> Self {
        let mut targets = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            targets.entry(pair.original.key()).or_insert(&pair.new);
        }
        Self { targets }
    }

    /// New hash for `hash`, if renamed.
    pub fn get(&self, hash: &HashToken) -> Option<&'a HashToken> {
        self.get_key(&hash.key())
    }

    /// New hash for a pre-computed key.
    pub fn get_key(&self, key: &str) -> Option<&'a HashToken> {
        self.targets.get(key).copied()
    }

    /// Number of distinct original hashes.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no pair was indexed.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A chain that revisited a hash it had already passed through.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChainCycle {
    /// Original hash anchoring the chain.
    pub anchor: HashToken,
    /// The hash seen twice.
    pub repeated: HashToken,
    /// Starting version index of the table that produced the repeat.
    pub version: u32,
}

/// Result of resolving a table sequence.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Resolution {
    /// Number of chains walked (pairs in the earliest table).
    pub anchors: usize,
    /// One pair per chain with a net rename, in earliest-table order.
    pub renames: Vec<RenamePair>,
    /// Chains that oscillated; first repeat per chain only.
    pub cycles: Vec<ChainCycle>,
}

/// Resolve `tables` (earliest first) into original-to-final renames.
///
/// The input tables are not modified. An empty sequence or an empty earliest
/// table resolves to nothing.
pub fn resolve(tables: &[VersionDiffTable]) -> Resolution {
    let Some((first, rest)) = tables.split_first() else {
        return Resolution::default();
    };

    info!(
        "found {} natives in build {}",
        first.pairs.len(),
        first.span.from
    );

    let indexes: Vec<RenameIndex<'_>> = rest
        .iter()
        .map(|table| RenameIndex::from_pairs(&table.pairs))
        .collect();

    let mut renames = Vec::new();
    let mut cycles = Vec::new();

    for anchor in &first.pairs {
        let mut cursor = &anchor.new;
        let mut cursor_key = cursor.key();
        let mut visited: HashSet<String> = HashSet::from([anchor.original.key(), cursor_key.clone()]);
        let mut cycle: Option<ChainCycle> = None;

        for (index, table) in indexes.iter().zip(rest) {
            let Some(next) = index.get_key(&cursor_key) else {
                continue;
            };
            let next_key = next.key();
            if next_key != cursor_key && !visited.insert(next_key.clone()) && cycle.is_none() {
                cycle = Some(ChainCycle {
                    anchor: anchor.original.clone(),
                    repeated: next.clone(),
                    version: table.span.from,
                });
            }
            cursor = next;
            cursor_key = next_key;
        }

        if let Some(cycle) = cycle {
            warn!(
                "hash chain for {} revisits {} at build {}",
                cycle.anchor, cycle.repeated, cycle.version
            );
            cycles.push(cycle);
        }

        if cursor_key != anchor.original.key() {
            renames.push(RenamePair {
                original: anchor.original.clone(),
                new: cursor.clone(),
            });
        }
    }

    info!("found {} renamed natives", renames.len());

    Resolution {
        anchors: first.pairs.len(),
        renames,
        cycles,
    }
}
