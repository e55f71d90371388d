// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! `native-hash-updater`: resolve native hash chains across builds and
//! regenerate the definition listings, patched header, cross-map,
//! translation stream and (when an address map exists) the IDC naming script.
//!
//! Settings come from an optional JSON config file; flags override it.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use native_hash_core::pipeline;
use native_hash_core::PipelineConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "native-hash-updater",
    version,
    about = "Resolve native hash renames across builds and regenerate derived artifacts"
)]
struct Cli {
    /// Version-diff files named `<marker><from>-<marker><to>.txt`, any order.
    diff_files: Vec<PathBuf>,

    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog document (default `natives.json`).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Previously generated header (default `natives.h`).
    #[arg(long)]
    header: Option<PathBuf>,

    /// Address map for the target build (default `addresses-<target>.txt`, optional).
    #[arg(long)]
    address_map: Option<PathBuf>,

    /// Directory scanned for every diff file to build the translation stream.
    #[arg(long)]
    history_dir: Option<PathBuf>,

    /// Base directory for relative input paths.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving every artifact.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = build_config(cli)?;
    let report = pipeline::run(&config).context("native hash update failed")?;

    if report.cycles > 0 {
        warn!("{} hash chains revisit an earlier hash", report.cycles);
    }
    info!(
        "done: {} of {} natives renamed up to {}, {} header lines patched, {} artifacts written",
        report.renames,
        report.anchors,
        report.target,
        report.patched_lines,
        report.written.len()
    );
    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

fn build_config(cli: Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            PipelineConfig::from_json(&bytes)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    if !cli.diff_files.is_empty() {
        config.diff_files = cli.diff_files;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog = catalog;
    }
    if let Some(header) = cli.header {
        config.header = header;
    }
    if let Some(address_map) = cli.address_map {
        config.address_map = Some(address_map);
    }
    if let Some(history_dir) = cli.history_dir {
        config.history_dir = Some(history_dir);
    }
    if let Some(input_dir) = cli.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "native-hash-updater",
            "b1-b2.txt",
            "b2-b3.txt",
            "--header",
            "custom.h",
            "--output-dir",
            "out",
        ]);
        let config = build_config(cli).unwrap();
        assert_eq!(
            config.diff_files,
            vec![PathBuf::from("b1-b2.txt"), PathBuf::from("b2-b3.txt")]
        );
        assert_eq!(config.header, PathBuf::from("custom.h"));
        assert_eq!(config.catalog, PathBuf::from("natives.json"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
