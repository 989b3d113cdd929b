//! Configuration file loading for imageslim.
//!
//! Discovers and loads `imageslim.toml` from the context root. Merges config
//! file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "imageslim.toml";

/// Top-level configuration from imageslim.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageslimConfig {
    /// Analyze settings (paths, tables).
    pub analyze: AnalyzeConfig,

    /// Rule engine knobs.
    pub rules: RulesConfig,
}

/// Analyze section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Build spec path, relative to the context root.
    pub spec: Option<Utf8PathBuf>,

    /// Ignore file path, relative to the context root.
    pub ignore_file: Option<Utf8PathBuf>,

    /// Artifact output directory.
    pub out_dir: Option<Utf8PathBuf>,

    /// JSON file with extra image-size entries, overlaid on the defaults.
    pub image_sizes: Option<Utf8PathBuf>,

    /// JSON file with extra run-cost entries, overlaid on the defaults.
    pub run_costs: Option<Utf8PathBuf>,
}

/// Rules section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Asset-externalize threshold, in megabytes.
    pub asset_threshold_mb: Option<u64>,

    /// Directory the build writes its output to, for the stage-split rule.
    pub build_output_dir: Option<String>,

    /// Extra directories treated as static assets.
    pub asset_paths: Option<Vec<String>>,
}

/// Discover the imageslim.toml config file.
///
/// Returns `None` if no config file is found in the context root.
pub fn discover_config(context_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = context_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse an imageslim.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ImageslimConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ImageslimConfig> {
    let config: ImageslimConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the context root, or return default if not found.
pub fn load_or_default(context_dir: &Utf8Path) -> anyhow::Result<ImageslimConfig> {
    match discover_config(context_dir) {
        Some(path) => load_config(&path),
        None => Ok(ImageslimConfig::default()),
    }
}

/// Merged paths combining config file and CLI arguments.
///
/// CLI arguments take precedence over config file settings; hard-coded
/// defaults apply when neither is set.
#[derive(Debug, Clone)]
pub struct MergedAnalyzeConfig {
    pub spec: Utf8PathBuf,
    pub ignore_file: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub image_sizes: Option<Utf8PathBuf>,
    pub run_costs: Option<Utf8PathBuf>,
    pub asset_threshold_mb: Option<u64>,
    pub build_output_dir: Option<String>,
    pub asset_paths: Option<Vec<String>>,
}

/// Merge config with analyze CLI arguments.
pub fn merge_analyze_args(
    config: ImageslimConfig,
    cli_spec: Option<Utf8PathBuf>,
    cli_ignore_file: Option<Utf8PathBuf>,
    cli_out_dir: Option<Utf8PathBuf>,
    cli_image_sizes: Option<Utf8PathBuf>,
    cli_run_costs: Option<Utf8PathBuf>,
) -> MergedAnalyzeConfig {
    MergedAnalyzeConfig {
        spec: cli_spec
            .or(config.analyze.spec)
            .unwrap_or_else(|| Utf8PathBuf::from("Dockerfile")),
        ignore_file: cli_ignore_file
            .or(config.analyze.ignore_file)
            .unwrap_or_else(|| Utf8PathBuf::from(".dockerignore")),
        out_dir: cli_out_dir
            .or(config.analyze.out_dir)
            .unwrap_or_else(|| Utf8PathBuf::from("imageslim-out")),
        image_sizes: cli_image_sizes.or(config.analyze.image_sizes),
        run_costs: cli_run_costs.or(config.analyze.run_costs),
        asset_threshold_mb: config.rules.asset_threshold_mb,
        build_output_dir: config.rules.build_output_dir,
        asset_paths: config.rules.asset_paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_example_config() {
        let contents = r#"
[analyze]
spec = "docker/Dockerfile"
ignore_file = ".dockerignore"
out_dir = "artifacts/imageslim"
image_sizes = "image-sizes.json"

[rules]
asset_threshold_mb = 10
build_output_dir = "dist"
asset_paths = ["public", "static"]
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(
            config.analyze.spec.as_deref(),
            Some(Utf8Path::new("docker/Dockerfile"))
        );
        assert_eq!(config.rules.asset_threshold_mb, Some(10));
        assert_eq!(config.rules.build_output_dir.as_deref(), Some("dist"));
        assert_eq!(
            config.rules.asset_paths,
            Some(vec!["public".to_string(), "static".to_string()])
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.analyze.spec.is_none());
        assert!(config.rules.asset_threshold_mb.is_none());
    }

    #[test]
    fn test_merge_cli_takes_precedence() {
        let config = parse_config("[analyze]\nspec = \"from-config\"\nout_dir = \"cfg-out\"\n")
            .unwrap();
        let merged = merge_analyze_args(
            config,
            Some(Utf8PathBuf::from("from-cli")),
            None,
            None,
            None,
            None,
        );
        assert_eq!(merged.spec, Utf8PathBuf::from("from-cli"));
        assert_eq!(merged.out_dir, Utf8PathBuf::from("cfg-out"));
        assert_eq!(merged.ignore_file, Utf8PathBuf::from(".dockerignore"));
    }

    #[test]
    fn test_merge_defaults_when_nothing_set() {
        let merged = merge_analyze_args(ImageslimConfig::default(), None, None, None, None, None);
        assert_eq!(merged.spec, Utf8PathBuf::from("Dockerfile"));
        assert_eq!(merged.out_dir, Utf8PathBuf::from("imageslim-out"));
        assert!(merged.image_sizes.is_none());
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.analyze.out_dir.is_none());
    }
}
