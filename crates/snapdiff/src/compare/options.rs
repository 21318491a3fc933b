use serde::Serialize;

use crate::error::DiffError;
use crate::region::Region;

/// Tolerance policy for a single comparison. Every field is optional;
/// the default is an exact comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffOptions {
    /// Max acceptable difference ratio (diff area / image area).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Max acceptable diff area in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_size_limit: Option<u64>,
    /// Max Euclidean RGBA distance for two pixels to count as equal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_distance_limit: Option<f64>,
    /// Radius searched for a matching color at a displaced position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_distance_limit: Option<u32>,
    /// Median smoothing window edge (odd). Mask-projection backend only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_filter_window_size: Option<u32>,
    /// Pixels inside these regions always match.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_area: Vec<Region>,
}

impl DiffOptions {
    /// True when any option can turn a pixel difference into "equal".
    pub fn affects_equality(&self) -> bool {
        self.tolerance.is_some()
            || self.area_size_limit.is_some()
            || self.color_distance_limit.is_some()
            || self.shift_distance_limit.is_some()
            || self.median_filter_window_size.is_some()
            || !self.skip_area.is_empty()
    }

    pub fn validate(&self) -> Result<(), DiffError> {
        if let Some(tolerance) = self.tolerance
            && !(0.0..=1.0).contains(&tolerance)
        {
            return Err(DiffError::Configuration(format!(
                "tolerance must be between 0.0 and 1.0, got {tolerance}"
            )));
        }
        if let Some(limit) = self.color_distance_limit
            && !(limit.is_finite() && limit >= 0.0)
        {
            return Err(DiffError::Configuration(format!(
                "color_distance_limit must be a non-negative number, got {limit}"
            )));
        }
        if let Some(size) = self.median_filter_window_size
            && size % 2 == 0
        {
            return Err(DiffError::Configuration(format!(
                "median_filter_window_size must be odd, got {size}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_do_not_affect_equality() {
        assert!(!DiffOptions::default().affects_equality());
        let opts = DiffOptions {
            skip_area: vec![Region::from_edges(0, 0, 1, 1).unwrap()],
            ..Default::default()
        };
        assert!(opts.affects_equality());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let bad_tolerance = DiffOptions {
            tolerance: Some(1.5),
            ..Default::default()
        };
        assert!(bad_tolerance.validate().is_err());

        let nan_tolerance = DiffOptions {
            tolerance: Some(f64::NAN),
            ..Default::default()
        };
        assert!(nan_tolerance.validate().is_err());

        let negative_color = DiffOptions {
            color_distance_limit: Some(-1.0),
            ..Default::default()
        };
        assert!(negative_color.validate().is_err());

        let even_window = DiffOptions {
            median_filter_window_size: Some(4),
            ..Default::default()
        };
        assert!(even_window.validate().is_err());
    }

    #[test]
    fn validate_accepts_boundaries() {
        let opts = DiffOptions {
            tolerance: Some(1.0),
            color_distance_limit: Some(0.0),
            median_filter_window_size: Some(3),
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
    }
}
