//! Base-image size table and RUN-command cost model.
//!
//! Both are plain mapping data: the caller may load them from a registry or
//! a JSON file; the estimator only consumes the resolved mapping. Builtin
//! defaults cover the common web-app bases so the tool is useful out of the
//! box, but any entry can be overridden.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MB: u64 = 1_000_000;

/// Compressed-ish sizes for commonly used bases. Approximations, by nature.
const DEFAULT_IMAGE_SIZES: &[(&str, u64)] = &[
    ("node:18", 1_090 * MB),
    ("node:18-alpine", 181 * MB),
    ("node:20", 1_100 * MB),
    ("node:20-alpine", 185 * MB),
    ("python:3.11", 1_020 * MB),
    ("python:3.11-slim", 150 * MB),
    ("debian:bookworm", 117 * MB),
    ("debian:bookworm-slim", 75 * MB),
    ("ubuntu:22.04", 77 * MB),
    ("alpine:3.19", 7 * MB),
    ("gcr.io/distroless/nodejs18-debian11", 108 * MB),
    ("gcr.io/distroless/python3-debian12", 52 * MB),
    ("gcr.io/distroless/base-debian12", 20 * MB),
];

const DEFAULT_RUN_COSTS: &[(&str, i64)] = &[
    ("npm install", 250_000_000),
    ("npm ci", 250_000_000),
    ("yarn install", 250_000_000),
    ("npm run build", 50_000_000),
    ("pip install", 120_000_000),
    ("apt-get install", 90_000_000),
    ("apk add", 30_000_000),
    ("npm cache clean", -40_000_000),
];

/// Image reference → estimated bytes. Exact-match lookup only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSizeTable {
    sizes: BTreeMap<String, u64>,
}

impl ImageSizeTable {
    pub fn new(sizes: BTreeMap<String, u64>) -> Self {
        Self { sizes }
    }

    pub fn builtin() -> Self {
        Self {
            sizes: DEFAULT_IMAGE_SIZES
                .iter()
                .map(|(image, bytes)| (image.to_string(), *bytes))
                .collect(),
        }
    }

    pub fn lookup(&self, image: &str) -> Option<u64> {
        self.sizes.get(image).copied()
    }

    pub fn contains(&self, image: &str) -> bool {
        self.sizes.contains_key(image)
    }

    pub fn insert(&mut self, image: impl Into<String>, bytes: u64) {
        self.sizes.insert(image.into(), bytes);
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merged(mut self, other: ImageSizeTable) -> Self {
        self.sizes.extend(other.sizes);
        self
    }
}

/// Command signature → expected byte delta for RUN layers.
///
/// Lookup is exact first, then the longest entry that is a token-boundary
/// prefix of the command, then zero. Deltas may be negative (cleanup).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunCostModel {
    costs: BTreeMap<String, i64>,
}

impl RunCostModel {
    pub fn new(costs: BTreeMap<String, i64>) -> Self {
        Self { costs }
    }

    pub fn builtin() -> Self {
        Self {
            costs: DEFAULT_RUN_COSTS
                .iter()
                .map(|(command, delta)| (command.to_string(), *delta))
                .collect(),
        }
    }

    pub fn insert(&mut self, command: impl Into<String>, delta: i64) {
        self.costs.insert(command.into(), delta);
    }

    pub fn merged(mut self, other: RunCostModel) -> Self {
        self.costs.extend(other.costs);
        self
    }

    pub fn delta_for(&self, command: &str) -> i64 {
        if let Some(delta) = self.costs.get(command) {
            return *delta;
        }
        self.costs
            .iter()
            .filter(|(signature, _)| {
                command.starts_with(signature.as_str())
                    && command.as_bytes().get(signature.len()) == Some(&b' ')
            })
            .max_by_key(|(signature, _)| signature.len())
            .map(|(_, delta)| *delta)
            .unwrap_or(0)
    }
}
