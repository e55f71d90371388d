// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One synchronous run from input files to written artifacts.
//!
//! Stages pass values explicitly:
//!
//! 1. load and order the diff tables,
//! 2. resolve the hash chains,
//! 3. compile the catalog into definition listings,
//! 4. patch the header,
//! 5. render the cross-map,
//! 6. encode the translation history,
//! 7. join the address map, when one exists for the target build.
//!
//! All required inputs are checked before any stage runs, and every artifact
//! is built in memory before the first byte is written. A failing stage
//! therefore leaves the output directory untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{compile_catalog, render_definitions, CatalogError};
use crate::chain::resolve;
use crate::config::PipelineConfig;
use crate::crossmap::render_crossmap;
use crate::diff::{discover_diff_files, load_diff_tables, DiffError, VersionDiffTable};
use crate::header::{parse_declaration, patch_header, Declaration};
use crate::translation::{encode_translation, TranslationError};
use crate::xref::{cross_reference, parse_address_map, render_script, AddressMapError};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required input does not exist.
    #[error("[MISSING_INPUT_FILE] {role} not found at {}", path.display())]
    MissingInputFile {
        /// What the file is for.
        role: &'static str,
        /// Where it was expected.
        path: PathBuf,
    },
    /// No diff files were configured.
    #[error("[NO_DIFF_TABLES] at least one version-diff file is required")]
    NoDiffTables,
    /// Diff loading failed.
    #[error(transparent)]
    Diff(#[from] DiffError),
    /// Catalog compilation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Address map parsing failed.
    #[error(transparent)]
    AddressMap(#[from] AddressMapError),
    /// Translation encoding failed.
    #[error(transparent)]
    Translation(#[from] TranslationError),
    /// Reading an input or writing an artifact failed.
    #[error("[PIPELINE_IO] {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Counts and paths describing a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineReport {
    /// Target build label taken from the last diff file.
    pub target: String,
    /// Chains walked.
    pub anchors: usize,
    /// Net renames found.
    pub renames: usize,
    /// Chains that revisited a hash.
    pub cycles: usize,
    /// Catalog definitions compiled.
    pub definitions: usize,
    /// Declaration lines in the header.
    pub declarations: usize,
    /// Declaration lines rewritten.
    pub patched_lines: usize,
    /// Records in the translation stream.
    pub translation_records: usize,
    /// Statements in the naming script, if one was produced.
    pub cross_references: Option<usize>,
    /// Every artifact written, in write order.
    pub written: Vec<PathBuf>,
}

struct Artifact {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl Artifact {
    fn new(path: PathBuf, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            bytes: bytes.into(),
        }
    }
}

/// Run every stage for `config`.
///
/// # Errors
///
/// Any [`PipelineError`]; nothing is written when one is returned before the
/// write phase.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    if config.diff_files.is_empty() {
        return Err(PipelineError::NoDiffTables);
    }
    let diff_paths: Vec<PathBuf> = config
        .diff_files
        .iter()
        .map(|path| config.input_path(path))
        .collect();
    for path in &diff_paths {
        require("version-diff file", path)?;
    }
    let catalog_path = config.input_path(&config.catalog);
    require("catalog document", &catalog_path)?;
    let header_path = config.input_path(&config.header);
    require("header", &header_path)?;

    let tables = load_diff_tables(&diff_paths)?;
    let target = tables
        .last()
        .map(|table| table.span.target.clone())
        .ok_or(PipelineError::NoDiffTables)?;
    let resolution = resolve(&tables);

    let mut report = PipelineReport {
        target: target.clone(),
        anchors: resolution.anchors,
        renames: resolution.renames.len(),
        cycles: resolution.cycles.len(),
        ..PipelineReport::default()
    };
    let mut artifacts = Vec::new();

    let definitions = compile_catalog(&read_text(&catalog_path)?)?;
    report.definitions = definitions.len();
    let listing = render_definitions(&definitions);
    artifacts.push(Artifact::new(
        config.output_path(&config.outputs.definitions),
        listing.clone(),
    ));
    artifacts.push(Artifact::new(
        config.output_path(&config.outputs.definitions_header),
        listing,
    ));

    let header_text = read_text(&header_path)?;
    let header_lines: Vec<&str> = header_text.lines().collect();
    let patched = patch_header(&header_lines, &resolution.renames);
    report.declarations = patched.declarations;
    report.patched_lines = patched.patched;
    artifacts.push(Artifact::new(
        config.output_path(&PipelineConfig::patched_header_name(&target)),
        patched.render(),
    ));

    artifacts.push(Artifact::new(
        config.output_path(&config.outputs.crossmap),
        render_crossmap(&resolution.renames),
    ));

    let scanned: Vec<VersionDiffTable>;
    let history: &[VersionDiffTable] = match &config.history_dir {
        Some(dir) => {
            let dir = config.input_path(dir);
            scanned = load_diff_tables(&discover_diff_files(&dir)?)?;
            debug!("translation history: {} tables from {}", scanned.len(), dir.display());
            &scanned
        }
        None => &tables,
    };
    let stream = encode_translation(history)?;
    report.translation_records = stream.records;
    artifacts.push(Artifact::new(
        config.output_path(&config.outputs.translation),
        stream.bytes,
    ));

    let (address_path, explicit) = config.address_map_path(&target);
    if address_path.is_file() {
        let addresses = parse_address_map(&read_text(&address_path)?)?;
        let declarations: Vec<Declaration<'_>> = patched
            .lines
            .iter()
            .filter_map(|line| parse_declaration(line))
            .collect();
        let references = cross_reference(&declarations, &addresses);
        report.cross_references = Some(references.len());
        artifacts.push(Artifact::new(
            config.output_path(&PipelineConfig::xref_script_name(&target)),
            render_script(&references),
        ));
    } else if explicit {
        return Err(PipelineError::MissingInputFile {
            role: "address map",
            path: address_path,
        });
    } else {
        debug!("no address map at {}; skipping naming script", address_path.display());
    }

    fs::create_dir_all(&config.output_dir).map_err(|source| PipelineError::Io {
        path: config.output_dir.clone(),
        source,
    })?;
    for artifact in artifacts {
        fs::write(&artifact.path, &artifact.bytes).map_err(|source| PipelineError::Io {
            path: artifact.path.clone(),
            source,
        })?;
        info!("wrote {}", artifact.path.display());
        report.written.push(artifact.path);
    }

    Ok(report)
}

fn require(role: &'static str, path: &Path) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::MissingInputFile {
            role,
            path: path.to_path_buf(),
        })
    }
}

fn read_text(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}
