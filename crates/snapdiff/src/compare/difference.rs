use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use super::comparison::Comparison;
use crate::region::Region;

/// Reason a comparison can never be tolerable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailedBy {
    DifferentDimensions {
        base_width: u32,
        base_height: u32,
        new_width: u32,
        new_height: u32,
    },
}

/// Largest displacement needed to match a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDistance {
    Pixels(u32),
    /// No match within the search radius.
    Unbounded,
}

impl ShiftDistance {
    pub fn max(self, other: ShiftDistance) -> ShiftDistance {
        match (self, other) {
            (Self::Pixels(a), Self::Pixels(b)) => Self::Pixels(a.max(b)),
            _ => Self::Unbounded,
        }
    }
}

impl std::fmt::Display for ShiftDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pixels(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Diagnostics collected by a backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DifferenceMetadata {
    /// Largest RGBA distance observed, rounded up to one decimal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_color_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_shift_distance: Option<ShiftDistance>,
    /// Exact ratio of differing pixels, when the backend counts them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub different_pixels: Option<u64>,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone)]
pub struct Difference<'a> {
    region: Option<Region>,
    metadata: DifferenceMetadata,
    comparison: &'a Comparison,
    failed_by: Option<FailedBy>,
}

impl<'a> Difference<'a> {
    pub fn new(
        region: Option<Region>,
        metadata: DifferenceMetadata,
        comparison: &'a Comparison,
    ) -> Self {
        Self {
            region,
            metadata,
            comparison,
            failed_by: None,
        }
    }

    /// No region, no failure.
    pub fn none(comparison: &'a Comparison) -> Self {
        Self::new(None, DifferenceMetadata::default(), comparison)
    }

    pub fn failed(comparison: &'a Comparison, failed_by: FailedBy) -> Self {
        Self {
            failed_by: Some(failed_by),
            ..Self::none(comparison)
        }
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn metadata(&self) -> &DifferenceMetadata {
        &self.metadata
    }

    pub fn comparison(&self) -> &'a Comparison {
        self.comparison
    }

    pub fn failed_by(&self) -> Option<FailedBy> {
        self.failed_by
    }

    pub fn is_blank(&self) -> bool {
        self.region.is_none_or(|region| region.size() == 0)
    }

    pub fn is_failed(&self) -> bool {
        self.failed_by.is_some()
    }

    /// Ratio of differing area to image area.
    ///
    /// Uses the backend's exact pixel count when it measured one, otherwise
    /// the bounding box area. `None` for an empty image.
    pub fn difference_ratio(&self) -> Option<f64> {
        if let Some(level) = self.metadata.difference_level {
            return Some(level);
        }
        let image = self.comparison.new_image();
        let image_area = u64::from(image.width()) * u64::from(image.height());
        if image_area == 0 {
            return None;
        }
        let area = self.region.map_or(0, |region| region.size());
        Some(area as f64 / image_area as f64)
    }

    pub fn is_tolerable(&self) -> bool {
        let Some(region) = self.region else {
            return true;
        };
        let options = self.comparison.options();
        let within_area = options
            .area_size_limit
            .is_some_and(|limit| limit >= region.size());
        let within_ratio = options.tolerance.is_some_and(|tolerance| {
            self.difference_ratio()
                .is_some_and(|ratio| tolerance >= ratio)
        });
        within_area || within_ratio
    }

    pub fn is_different(&self) -> bool {
        self.is_failed() || !(self.is_blank() || self.is_tolerable())
    }

    /// One-line summary for reports.
    pub fn describe(&self) -> String {
        if let Some(FailedBy::DifferentDimensions {
            base_width,
            base_height,
            new_width,
            new_height,
        }) = self.failed_by
        {
            return format!(
                "dimensions changed: {base_width}x{base_height} -> {new_width}x{new_height}"
            );
        }
        let Some(region) = self.region else {
            return "no difference".to_string();
        };

        let mut parts = vec![format!("region {region}")];
        if let Some(ratio) = self.difference_ratio() {
            parts.push(format!("ratio {ratio:.4}"));
        }
        if let Some(distance) = self.metadata.max_color_distance {
            parts.push(format!("color distance {distance:.1}"));
        }
        if let Some(shift) = self.metadata.max_shift_distance {
            parts.push(format!("shift distance {shift}"));
        }
        parts.join(", ")
    }
}

impl Serialize for Difference<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Difference", 6)?;
        s.serialize_field("region", &self.region)?;
        s.serialize_field("different", &self.is_different())?;
        s.serialize_field("failed", &self.is_failed())?;
        s.serialize_field("failed_by", &self.failed_by)?;
        s.serialize_field("difference_ratio", &self.difference_ratio())?;
        s.serialize_field("metadata", &self.metadata)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::compare::{Backend, DiffOptions};

    fn comparison(w: u32, h: u32, options: DiffOptions) -> Comparison {
        let img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]));
        Comparison::new(img.clone(), img, options, Backend::PixelScan).unwrap()
    }

    fn block() -> Option<Region> {
        Region::from_edges(11, 3, 48, 20)
    }

    #[test]
    fn absent_region_is_blank_and_equal() {
        let c = comparison(80, 80, DiffOptions::default());
        let d = Difference::none(&c);
        assert!(d.is_blank());
        assert!(!d.is_different());
        assert_eq!(d.difference_ratio(), Some(0.0));
    }

    #[test]
    fn region_without_tolerance_is_different() {
        let c = comparison(80, 80, DiffOptions::default());
        let d = Difference::new(block(), DifferenceMetadata::default(), &c);
        assert!(!d.is_blank());
        assert!(!d.is_tolerable());
        assert!(d.is_different());
    }

    #[test]
    fn area_size_limit_is_inclusive() {
        let exact = comparison(
            80,
            80,
            DiffOptions {
                area_size_limit: Some(629),
                ..Default::default()
            },
        );
        assert!(!Difference::new(block(), DifferenceMetadata::default(), &exact).is_different());

        let below = comparison(
            80,
            80,
            DiffOptions {
                area_size_limit: Some(628),
                ..Default::default()
            },
        );
        assert!(Difference::new(block(), DifferenceMetadata::default(), &below).is_different());
    }

    #[test]
    fn tolerance_uses_bounding_box_ratio() {
        // 629 / 6400 = 0.0983
        let loose = comparison(
            80,
            80,
            DiffOptions {
                tolerance: Some(0.1),
                ..Default::default()
            },
        );
        assert!(!Difference::new(block(), DifferenceMetadata::default(), &loose).is_different());

        let strict = comparison(
            80,
            80,
            DiffOptions {
                tolerance: Some(0.09),
                ..Default::default()
            },
        );
        assert!(Difference::new(block(), DifferenceMetadata::default(), &strict).is_different());
    }

    #[test]
    fn measured_level_overrides_bounding_box() {
        let c = comparison(
            80,
            80,
            DiffOptions {
                tolerance: Some(0.01),
                ..Default::default()
            },
        );
        let metadata = DifferenceMetadata {
            difference_level: Some(0.005),
            ..Default::default()
        };
        let d = Difference::new(block(), metadata, &c);
        assert_eq!(d.difference_ratio(), Some(0.005));
        assert!(!d.is_different());
    }

    #[test]
    fn empty_image_never_satisfies_tolerance() {
        let c = comparison(
            0,
            0,
            DiffOptions {
                tolerance: Some(1.0),
                ..Default::default()
            },
        );
        let d = Difference::new(
            Region::from_edges(0, 0, 0, 0),
            DifferenceMetadata::default(),
            &c,
        );
        assert_eq!(d.difference_ratio(), None);
        assert!(d.is_different());
    }

    #[test]
    fn failure_is_always_different() {
        let c = comparison(
            4,
            4,
            DiffOptions {
                tolerance: Some(1.0),
                area_size_limit: Some(u64::MAX),
                ..Default::default()
            },
        );
        let d = Difference::failed(
            &c,
            FailedBy::DifferentDimensions {
                base_width: 4,
                base_height: 4,
                new_width: 4,
                new_height: 3,
            },
        );
        assert!(d.is_failed());
        assert!(d.is_different());
        assert_eq!(d.describe(), "dimensions changed: 4x4 -> 4x3");
    }

    #[test]
    fn serializes_verdicts() {
        let c = comparison(80, 80, DiffOptions::default());
        let metadata = DifferenceMetadata {
            max_color_distance: Some(441.7),
            ..Default::default()
        };
        let d = Difference::new(block(), metadata, &c);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["different"], true);
        assert_eq!(json["failed"], false);
        assert_eq!(json["region"]["x"], 11);
        assert_eq!(json["region"]["width"], 37);
        assert_eq!(json["metadata"]["max_color_distance"], 441.7);
        assert!(json["failed_by"].is_null());
    }

    #[test]
    fn shift_distance_max_prefers_unbounded() {
        assert_eq!(
            ShiftDistance::Pixels(3).max(ShiftDistance::Pixels(5)),
            ShiftDistance::Pixels(5)
        );
        assert_eq!(
            ShiftDistance::Pixels(3).max(ShiftDistance::Unbounded),
            ShiftDistance::Unbounded
        );
    }
}
