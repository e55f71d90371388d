// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pipeline configuration: where inputs live and what outputs are called.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File names of the fixed-name artifacts, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNames {
    /// Flat definition listing.
    pub definitions: String,
    /// Header-data copy of the definition listing.
    pub definitions_header: String,
    /// Resolved renames as initializer rows.
    pub crossmap: String,
    /// Compressed translation stream.
    pub translation: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            definitions: "x64natives.dat".to_owned(),
            definitions_header: "HashMapData.h".to_owned(),
            crossmap: "crossmap.txt".to_owned(),
            translation: "native_translation.dat".to_owned(),
        }
    }
}

/// Everything a run needs to locate its inputs and name its outputs.
///
/// Relative input paths resolve against `input_dir`; outputs land in
/// `output_dir`. Every field has a default, so a JSON config only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Version-diff files, any order.
    pub diff_files: Vec<PathBuf>,
    /// Directory scanned for the translation history; defaults to `diff_files`.
    pub history_dir: Option<PathBuf>,
    /// Base for relative input paths.
    pub input_dir: PathBuf,
    /// Destination of every artifact.
    pub output_dir: PathBuf,
    /// Catalog document.
    pub catalog: PathBuf,
    /// Previously generated header.
    pub header: PathBuf,
    /// Address map; defaults to `addresses-<target>.txt` and is then optional.
    pub address_map: Option<PathBuf>,
    /// Fixed output names.
    pub outputs: OutputNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            diff_files: Vec::new(),
            history_dir: None,
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            catalog: PathBuf::from("natives.json"),
            header: PathBuf::from("natives.h"),
            address_map: None,
            outputs: OutputNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Deserialize a JSON config; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the bytes are not a config object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Resolve an input path against `input_dir`.
    pub fn input_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.input_dir.join(path)
        }
    }

    /// Path of an output file.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Patched header name for a target build, e.g. `natives-b1737.h`.
    pub fn patched_header_name(target: &str) -> String {
        format!("natives-{target}.h")
    }

    /// Naming script name for a target build, e.g. `addresses-b1737.idc`.
    pub fn xref_script_name(target: &str) -> String {
        format!("addresses-{target}.idc")
    }

    /// Address map location, and whether it was configured explicitly.
    pub fn address_map_path(&self, target: &str) -> (PathBuf, bool) {
        match &self.address_map {
            Some(path) => (self.input_path(path), true),
            None => (
                self.input_dir.join(format!("addresses-{target}.txt")),
                false,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(
            br#"{ "diff_files": ["b1-b2.txt"], "outputs": { "crossmap": "renames.txt" } }"#,
        )
        .unwrap();
        assert_eq!(config.diff_files, vec![PathBuf::from("b1-b2.txt")]);
        assert_eq!(config.catalog, PathBuf::from("natives.json"));
        assert_eq!(config.outputs.crossmap, "renames.txt");
        assert_eq!(config.outputs.translation, "native_translation.dat");
    }

    #[test]
    fn relative_inputs_resolve_against_input_dir() {
        let config = PipelineConfig {
            input_dir: PathBuf::from("data"),
            ..PipelineConfig::default()
        };
        assert_eq!(config.input_path(Path::new("natives.h")), PathBuf::from("data/natives.h"));
        let (path, explicit) = config.address_map_path("b1737");
        assert_eq!(path, PathBuf::from("data/addresses-b1737.txt"));
        assert!(!explicit);
    }

    #[test]
    fn per_build_names() {
        assert_eq!(PipelineConfig::patched_header_name("b1737"), "natives-b1737.h");
        assert_eq!(PipelineConfig::xref_script_name("b1737"), "addresses-b1737.idc");
    }
}
