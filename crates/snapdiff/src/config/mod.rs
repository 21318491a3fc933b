pub mod resolve;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snapdiff::{Backend, EdgeCoordinates};

pub use self::resolve::ResolvedDiffConfig;
pub use self::template::{config_file_exists, write_gitignore, write_template};

pub(crate) const CONFIG_DIR: &str = ".snapdiff";
const CONFIG_FILE: &str = "config.toml";

pub fn validate_tolerance(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("tolerance must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_tolerance(v)
}

/// Comparison settings.
///
/// Every field is `Option`; `None` means "not set at this layer".
/// Serves both TOML deserialization (`[diff]`) and CLI argument parsing.
#[derive(Clone, Debug, Default, PartialEq, clap::Args, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Region localization backend
    #[arg(long, value_enum)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,

    /// Max acceptable diff area / image area (0.0-1.0)
    #[arg(long, value_parser = parse_tolerance)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    /// Max acceptable diff area in pixels
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_size_limit: Option<u64>,

    /// Max RGBA distance for two pixels to count as equal
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_distance_limit: Option<f64>,

    /// Radius searched for a displaced matching pixel (pixel-scan only)
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_distance_limit: Option<u32>,

    /// Median smoothing window, odd (mask-projection only)
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_filter_window_size: Option<u32>,

    /// `[left, top, right, bottom]` areas always treated as matching.
    #[arg(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_area: Vec<EdgeCoordinates>,
}

impl DiffConfig {
    /// Overlay set fields from `other` onto self. Skip areas accumulate.
    pub fn merge(&mut self, other: &DiffConfig) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.tolerance.is_some() {
            self.tolerance = other.tolerance;
        }
        if other.area_size_limit.is_some() {
            self.area_size_limit = other.area_size_limit;
        }
        if other.color_distance_limit.is_some() {
            self.color_distance_limit = other.color_distance_limit;
        }
        if other.shift_distance_limit.is_some() {
            self.shift_distance_limit = other.shift_distance_limit;
        }
        if other.median_filter_window_size.is_some() {
            self.median_filter_window_size = other.median_filter_window_size;
        }
        self.skip_area.extend_from_slice(&other.skip_area);
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
}

/// Load `.snapdiff/config.toml` below `root`. A missing file is an empty config.
pub fn load_from(root: &Path) -> Result<Config> {
    let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    if let Some(tolerance) = config.diff.tolerance {
        validate_tolerance(tolerance).map_err(|e| anyhow::anyhow!("diff.{e}"))?;
    }
    Ok(config)
}

pub fn load() -> Result<Config> {
    load_from(Path::new("."))
}
