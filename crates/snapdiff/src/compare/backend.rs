use serde::{Deserialize, Serialize};

use super::comparison::Comparison;
use super::difference::Difference;
use super::{mask, pixel_scan};

/// Region localization strategy, fixed when a [`Comparison`] is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Per-pixel row/column scan. Supports shift tolerance.
    #[default]
    PixelScan,
    /// Difference mask plus axis projections. Supports median smoothing,
    /// falls back to the pixel scan when shift tolerance is requested.
    MaskProjection,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PixelScan => "pixel-scan",
            Self::MaskProjection => "mask-projection",
        }
    }

    pub fn supports_shift_tolerance(&self) -> bool {
        matches!(self, Self::PixelScan)
    }

    pub fn supports_median_filter(&self) -> bool {
        matches!(self, Self::MaskProjection)
    }

    /// Locate the differing area. The expensive part of a comparison.
    pub fn find_difference_region<'a>(&self, comparison: &'a Comparison) -> Difference<'a> {
        match self {
            Self::PixelScan => pixel_scan::find_difference_region(comparison),
            Self::MaskProjection => mask::find_difference_region(comparison),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
