// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Version-diff files.
//!
//! A diff file is named for the build transition it describes, e.g.
//! `b1604-b1737.txt`, and holds one `{ oldHash, newHash }` rename per line.
//! Build numbers are not zero-padded, so tables are ordered by the parsed
//! `from` index rather than by file name.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::hash::HashToken;

/// Errors raised while loading version-diff files.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A non-blank line lacks its `{`, `,` or `}` delimiter.
    #[error("[MALFORMED_DIFF_LINE] {}:{line}: {text:?}", path.display())]
    MalformedDiffLine {
        /// File containing the line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The line as read.
        text: String,
    },
    /// File name does not encode a `<marker><from>-<marker><to>` transition.
    #[error("[INVALID_DIFF_FILE_NAME] {} does not name a version transition", path.display())]
    InvalidFileName {
        /// The offending path.
        path: PathBuf,
    },
    /// Two files start at the same version index.
    #[error(
        "[DUPLICATE_VERSION_INDEX] {} and {} both start at version {index}",
        first.display(),
        second.display()
    )]
    DuplicateVersionIndex {
        /// The shared starting index.
        index: u32,
        /// First file seen with that index.
        first: PathBuf,
        /// Second file seen with that index.
        second: PathBuf,
    },
    /// Reading a file or directory failed.
    #[error("[DIFF_IO] {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// One rename observed between two consecutive builds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RenamePair {
    /// Hash in the older build.
    pub original: HashToken,
    /// Hash in the newer build.
    pub new: HashToken,
}

impl RenamePair {
    /// Build a pair from two tokens.
    pub fn new(original: impl Into<HashToken>, new: impl Into<HashToken>) -> Self {
        Self {
            original: original.into(),
            new: new.into(),
        }
    }
}

/// The build transition a diff file covers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VersionSpan {
    /// Starting build index; the ordering key.
    pub from: u32,
    /// Ending build index, when the second half of the name carries one.
    pub to: Option<u32>,
    /// Second half of the file stem (e.g. `b1737`); names per-build outputs.
    pub target: String,
}

impl VersionSpan {
    /// Parse a file name such as `b1604-b1737.txt`.
    ///
    /// The part before the first `-` must be an optional non-digit marker
    /// followed by digits only. Returns `None` for anything else.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = Path::new(name).file_stem()?.to_str()?;
        let (head, tail) = stem.split_once('-')?;
        let from = head
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .ok()?;
        if tail.is_empty() {
            return None;
        }
        Some(Self {
            from,
            to: leading_index(tail),
            target: tail.to_owned(),
        })
    }
}

fn leading_index(part: &str) -> Option<u32> {
    let digits: String = part
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Renames between two builds, in file order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VersionDiffTable {
    /// Transition this table covers.
    pub span: VersionSpan,
    /// Renames in file order.
    pub pairs: Vec<RenamePair>,
}

impl VersionDiffTable {
    /// Build a table directly from pairs.
    pub fn new(span: VersionSpan, pairs: Vec<RenamePair>) -> Self {
        Self { span, pairs }
    }

    /// Parse a table from file text.
    ///
    /// Blank lines are skipped. `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::MalformedDiffLine`] for the first line missing a
    /// delimiter; no partial table is produced.
    pub fn parse(span: VersionSpan, text: &str, path: &Path) -> Result<Self, DiffError> {
        let mut pairs = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let pair = parse_diff_line(line).ok_or_else(|| DiffError::MalformedDiffLine {
                path: path.to_path_buf(),
                line: idx + 1,
                text: line.to_owned(),
            })?;
            pairs.push(pair);
        }
        Ok(Self { span, pairs })
    }
}

/// Split a `{ old, new }` line into its two fields.
///
/// Fields are the text between the first `{` and the following `,`, and
/// between that `,` and the next `}`, each trimmed. Anything after the closing
/// brace (a trailing `,` for instance) is ignored.
pub fn split_pair_fields(line: &str) -> Option<(&str, &str)> {
    let (_, rest) = line.split_once('{')?;
    let (original, rest) = rest.split_once(',')?;
    let (new, _) = rest.split_once('}')?;
    Some((original.trim(), new.trim()))
}

/// Parse a single diff line.
pub fn parse_diff_line(line: &str) -> Option<RenamePair> {
    split_pair_fields(line).map(|(original, new)| RenamePair::new(original, new))
}

/// Order diff file paths by starting version index.
///
/// # Errors
///
/// Fails on a file name without a version transition, or on two files that
/// share a starting index.
pub fn order_diff_files<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Vec<(VersionSpan, PathBuf)>, DiffError> {
    let mut spans = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(VersionSpan::from_file_name)
                .map(|span| (span, path.to_path_buf()))
                .ok_or_else(|| DiffError::InvalidFileName {
                    path: path.to_path_buf(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    spans.sort_by_key(|(span, _)| span.from);

    for window in spans.windows(2) {
        let [(prev, prev_path), (next, next_path)] = window else {
            continue;
        };
        if prev.from == next.from {
            return Err(DiffError::DuplicateVersionIndex {
                index: prev.from,
                first: prev_path.clone(),
                second: next_path.clone(),
            });
        }
        if let Some(to) = prev.to {
            if to != next.from {
                warn!(
                    "version gap: {} ends at {to} but {} starts at {}",
                    prev_path.display(),
                    next_path.display(),
                    next.from
                );
            }
        }
    }

    Ok(spans)
}

/// Load and order every diff file.
///
/// # Errors
///
/// Any naming, ordering, IO or line-shape failure aborts the whole load.
pub fn load_diff_tables<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<VersionDiffTable>, DiffError> {
    order_diff_files(paths)?
        .into_iter()
        .map(|(span, path)| {
            let text = fs::read_to_string(&path).map_err(|source| DiffError::Io {
                path: path.clone(),
                source,
            })?;
            let table = VersionDiffTable::parse(span, &text, &path)?;
            debug!("loaded {} renames from {}", table.pairs.len(), path.display());
            Ok(table)
        })
        .collect()
}

/// Find every `*.txt` file in `dir` whose name encodes a full version
/// transition (both halves carry an index).
///
/// # Errors
///
/// Returns [`DiffError::Io`] if the directory cannot be listed.
pub fn discover_diff_files(dir: &Path) -> Result<Vec<PathBuf>, DiffError> {
    let io_err = |source| DiffError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
            continue;
        }
        let is_transition = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(VersionSpan::from_file_name)
            .is_some_and(|span| span.to.is_some());
        if is_transition && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn span_from_build_file_name() {
        let span = VersionSpan::from_file_name("b1604-b1737.txt").unwrap();
        assert_eq!(span.from, 1604);
        assert_eq!(span.to, Some(1737));
        assert_eq!(span.target, "b1737");
    }

    #[test]
    fn span_rejects_names_without_index() {
        assert!(VersionSpan::from_file_name("addresses-b1737.txt").is_none());
        assert!(VersionSpan::from_file_name("natives.txt").is_none());
        assert!(VersionSpan::from_file_name("b12x-b13.txt").is_none());
        assert!(VersionSpan::from_file_name("b12-.txt").is_none());
    }

    #[test]
    fn line_fields_tolerate_whitespace() {
        let pair = parse_diff_line("{0xAAAAAAAAAAAAAAAA,0xBBBBBBBBBBBBBBBB}").unwrap();
        assert_eq!(pair.original.as_str(), "0xAAAAAAAAAAAAAAAA");
        assert_eq!(pair.new.as_str(), "0xBBBBBBBBBBBBBBBB");

        let spaced = parse_diff_line("  {   0xAAAAAAAAAAAAAAAA ,\t0xBBBBBBBBBBBBBBBB   },").unwrap();
        assert_eq!(spaced, pair);
    }

    #[test]
    fn line_without_delimiters_is_rejected() {
        assert!(parse_diff_line("0xAAAAAAAAAAAAAAAA 0xBBBBBBBBBBBBBBBB").is_none());
        assert!(parse_diff_line("{ 0xAAAAAAAAAAAAAAAA 0xBBBBBBBBBBBBBBBB }").is_none());
        assert!(parse_diff_line("{ 0xAAAAAAAAAAAAAAAA, 0xBBBBBBBBBBBBBBBB").is_none());
    }

    #[test]
    fn malformed_line_fails_whole_table() {
        let span = VersionSpan::from_file_name("b1-b2.txt").unwrap();
        let text = "{ 0x1, 0x2 }\n\n{ 0x3 0x4 }\n{ 0x5, 0x6 }\n";
        let err = VersionDiffTable::parse(span, text, Path::new("b1-b2.txt")).unwrap_err();
        match err {
            DiffError::MalformedDiffLine { line, text, .. } => {
                assert_eq!(line, 3);
                assert_eq!(text, "{ 0x3 0x4 }");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn files_order_numerically_not_lexically() {
        let ordered = order_diff_files(&["b1000-b1100.txt", "b999-b1000.txt", "b1100-b1200.txt"]).unwrap();
        let froms: Vec<u32> = ordered.iter().map(|(span, _)| span.from).collect();
        assert_eq!(froms, vec![999, 1000, 1100]);
    }

    #[test]
    fn duplicate_start_index_is_rejected() {
        let err = order_diff_files(&["b10-b11.txt", "b10-b12.txt"]).unwrap_err();
        assert!(matches!(err, DiffError::DuplicateVersionIndex { index: 10, .. }));
    }

    #[test]
    fn bad_file_name_is_rejected() {
        let err = order_diff_files(&["renames.txt"]).unwrap_err();
        assert!(matches!(err, DiffError::InvalidFileName { .. }));
    }
}
