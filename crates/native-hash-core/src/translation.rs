// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Historical translation stream.
//!
//! Unlike the cross-map, this covers every rename in every table, so a
//! consumer can translate a hash from any build forward one step at a time.
//! The stream is raw DEFLATE (no zlib or gzip wrapper) over text records
//! `newHash:originalHash\n`, both sides as 16 upper-case digits.
//!
//! Value-level noise is filtered, not reported: identity renames, zero
//! originals, and tokens that are not hex are skipped.

use std::io::{self, Write};

use flate2::write::DeflateEncoder;
use flate2::Compression;
use tracing::{debug, info};

use crate::diff::{RenamePair, VersionDiffTable};

/// Errors raised while compressing the stream.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    /// The deflate encoder failed.
    #[error("[TRANSLATION_COMPRESS] {0}")]
    Compress(#[from] io::Error),
}

/// A finished, independently decompressible stream.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TranslationStream {
    /// Compressed bytes.
    pub bytes: Vec<u8>,
    /// Records written.
    pub records: usize,
    /// Pairs filtered out.
    pub skipped: usize,
}

/// The record for `pair`, or `None` if it is filtered.
pub fn translation_record(pair: &RenamePair) -> Option<String> {
    let (from, to) = match (pair.original.parse(), pair.new.parse()) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(err), _) | (_, Err(err)) => {
            debug!("skipping translation pair: {err}");
            return None;
        }
    };
    if from == to || from.is_zero() {
        return None;
    }
    Some(format!("{}:{}\n", to.digits(), from.digits()))
}

/// Compress the records of every pair, tables in order then pairs in order.
///
/// The encoder is sync-flushed at each table boundary and finished at the
/// end.
///
/// # Errors
///
/// Returns [`TranslationError::Compress`] if the encoder fails.
pub fn encode_translation(tables: &[VersionDiffTable]) -> Result<TranslationStream, TranslationError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    let mut records = 0;
    let mut skipped = 0;

    for table in tables {
        for pair in &table.pairs {
            match translation_record(pair) {
                Some(record) => {
                    encoder.write_all(record.as_bytes())?;
                    records += 1;
                }
                None => skipped += 1,
            }
        }
        encoder.flush()?;
    }

    let bytes = encoder.finish()?;
    info!(
        "translation stream: {records} records, {skipped} skipped, {} bytes",
        bytes.len()
    );
    Ok(TranslationStream {
        bytes,
        records,
        skipped,
    })
}
