// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! native-hash-core: native hash chain resolution and derived artifacts.
//!
//! A catalog of natives is keyed by 64-bit hashes that change between game
//! builds. Each build transition ships a version-diff file of `{ old, new }`
//! renames. This crate orders those files, walks every hash of the earliest
//! build through the whole chain, and emits the artifacts that must agree with
//! the result:
//!
//! - flat definition listings compiled from the catalog document,
//! - the generated header with its hash literals patched in place,
//! - the cross-map of resolved renames,
//! - a deflate-compressed translation stream of the full rename history,
//! - an optional IDC naming script joined against a build's address map.
//!
//! # Determinism Invariant
//!
//! Every artifact is a pure function of its inputs. Catalog iteration follows
//! document order, diff tables follow version index order, and the parallel
//! address join collects in declaration order. Running the pipeline twice over
//! the same inputs yields byte-identical outputs.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

/// Catalog document flattening into definition listings.
pub mod catalog;
/// Version-diff resolution across the ordered table sequence.
pub mod chain;
mod config;
mod crossmap;
/// Version-diff file naming, parsing, and ordering.
pub mod diff;
mod hash;
/// Declaration-line parsing and in-place hash literal patching.
pub mod header;
/// End-to-end run over files on disk.
pub mod pipeline;
/// Deflate-compressed historical rename stream.
pub mod translation;
/// Address map parsing and IDC naming script generation.
pub mod xref;

/// Per-run configuration: input locations and output file names.
pub use config::{OutputNames, PipelineConfig};
/// Cross-map rendering of resolved renames.
pub use crossmap::render_crossmap;
/// Hash values and their textual tokens.
pub use hash::{HashError, HashToken, HexHash};
