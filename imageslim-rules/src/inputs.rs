//! Configurable lookup data the rules consume. Everything here is plain
//! mapping data with builtin defaults; callers may override any of it from
//! config or external sources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleInputs {
    /// Image → known slimmer variant of the same family.
    pub slim_variants: BTreeMap<String, String>,

    /// Image family (repo name before the tag) → minimal runtime base with
    /// no shell or package manager.
    pub runtime_bases: BTreeMap<String, String>,

    /// Glob patterns for paths that are known bloat in a build context.
    pub bloat_patterns: Vec<String>,

    /// Directories holding static assets that could be served externally.
    pub asset_paths: Vec<String>,

    /// `asset-externalize` stays silent below this many bytes.
    pub asset_threshold_bytes: u64,

    /// Directory the build stage is expected to write its output to; the
    /// generated runtime stage copies only this.
    pub build_output_dir: String,
}

impl Default for RuleInputs {
    fn default() -> Self {
        let slim_variants = [
            ("node:18", "node:18-alpine"),
            ("node:20", "node:20-alpine"),
            ("python:3.11", "python:3.11-slim"),
            ("debian:bookworm", "debian:bookworm-slim"),
        ];
        let runtime_bases = [
            ("node", "gcr.io/distroless/nodejs18-debian11"),
            ("python", "gcr.io/distroless/python3-debian12"),
            ("debian", "gcr.io/distroless/base-debian12"),
            ("ubuntu", "gcr.io/distroless/base-debian12"),
        ];

        Self {
            slim_variants: slim_variants
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            runtime_bases: runtime_bases
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            bloat_patterns: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "npm-debug.log".to_string(),
                ".cache".to_string(),
            ],
            asset_paths: vec![
                "public".to_string(),
                "static".to_string(),
                "assets".to_string(),
            ],
            asset_threshold_bytes: 25_000_000,
            build_output_dir: ".output".to_string(),
        }
    }
}
