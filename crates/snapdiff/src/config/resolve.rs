use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ValueEnum;
use snapdiff::{Backend, DiffOptions, EdgeCoordinates, Region};

use super::{DiffConfig, load, validate_tolerance};

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedDiffConfig {
    pub backend: Backend,
    /// Options without skip areas; those go through the area calculator.
    pub options: DiffOptions,
    /// Skip areas from the config file, in absolute screenshot coordinates.
    pub skip_area: Vec<EdgeCoordinates>,
}

impl ResolvedDiffConfig {
    pub fn new(cli: &DiffConfig) -> Result<Self> {
        // 1. File layer
        let mut merged = load()?.diff;

        // 2. Env layer
        merged.merge(&env_overrides(|name| std::env::var(name).ok())?);

        // 3. CLI layer
        merged.merge(cli);

        Self::from_merged(merged)
    }

    fn from_merged(merged: DiffConfig) -> Result<Self> {
        if let Some(tolerance) = merged.tolerance {
            validate_tolerance(tolerance).map_err(|e| anyhow::anyhow!("{e}"))?;
        }
        Ok(Self {
            backend: merged.backend.unwrap_or_default(),
            options: DiffOptions {
                tolerance: merged.tolerance,
                area_size_limit: merged.area_size_limit,
                color_distance_limit: merged.color_distance_limit,
                shift_distance_limit: merged.shift_distance_limit,
                median_filter_window_size: merged.median_filter_window_size,
                skip_area: Vec::new(),
            },
            skip_area: merged.skip_area,
        })
    }

    /// Engine options with the calculated skip areas filled in.
    pub fn options_with_skip_area(&self, skip_area: Vec<Region>) -> DiffOptions {
        DiffOptions {
            skip_area,
            ..self.options.clone()
        }
    }
}

/// `SNAPDIFF_*` environment overrides. `lookup` is `std::env::var` outside tests.
pub fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Result<DiffConfig> {
    let backend = lookup("SNAPDIFF_BACKEND")
        .map(|v| <Backend as ValueEnum>::from_str(&v, true).map_err(anyhow::Error::msg))
        .transpose()
        .context("SNAPDIFF_BACKEND must be pixel-scan or mask-projection")?;

    Ok(DiffConfig {
        backend,
        tolerance: parse_env(&lookup, "SNAPDIFF_TOLERANCE")?,
        area_size_limit: parse_env(&lookup, "SNAPDIFF_AREA_SIZE_LIMIT")?,
        color_distance_limit: parse_env(&lookup, "SNAPDIFF_COLOR_DISTANCE_LIMIT")?,
        shift_distance_limit: parse_env(&lookup, "SNAPDIFF_SHIFT_DISTANCE_LIMIT")?,
        median_filter_window_size: None,
        skip_area: Vec::new(),
    })
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|v| v.parse::<T>())
        .transpose()
        .with_context(|| format!("{name} must be a valid number"))
}
