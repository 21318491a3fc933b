//! Generic per-pixel localization.
//!
//! Finds the first differing pixel (the anchor), widens a bounding window
//! row by row by probing only the columns outside it, then walks up from
//! the bottom of the image to find the last differing row inside the window.
//! Supports exact and approximate color matching plus a shift search that
//! tolerates anti-aliasing and sub-pixel displacement.

use image::{Rgba, RgbaImage};
use tracing::debug;

use super::comparison::Comparison;
use super::difference::{Difference, DifferenceMetadata, ShiftDistance};
use super::options::DiffOptions;
use crate::region::Region;

pub fn find_difference_region(comparison: &Comparison) -> Difference<'_> {
    let options = comparison.options();
    let scanner = PixelScanner::new(comparison.base_image(), comparison.new_image(), options);
    let mut stats = ScanStats::default();

    let region = scanner.find_top(&mut stats).and_then(|anchor| {
        let bounds = scanner.find_left_right_and_top(anchor, &mut stats);
        let bounds = scanner.find_bottom(bounds, &mut stats);
        bounds.to_region()
    });
    debug!(region = ?region, "pixel scan finished");

    let mut metadata = DifferenceMetadata::default();
    if region.is_some() {
        metadata.max_color_distance = stats.max_color_distance.map(ceil_to_tenth);
        if options.shift_distance_limit.is_some() {
            metadata.max_shift_distance =
                Some(stats.max_shift_distance.unwrap_or(ShiftDistance::Pixels(0)));
        }
    }
    Difference::new(region, metadata, comparison)
}

/// Euclidean distance over the four RGBA channels, 0.0 to 510.0.
pub fn color_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

pub(crate) fn ceil_to_tenth(v: f64) -> f64 {
    (v * 10.0).ceil() / 10.0
}

/// Running diagnostics, threaded through every scan pass.
#[derive(Debug, Default)]
struct ScanStats {
    max_color_distance: Option<f64>,
    max_shift_distance: Option<ShiftDistance>,
}

impl ScanStats {
    fn record_color_distance(&mut self, distance: f64) {
        if self.max_color_distance.is_none_or(|max| distance > max) {
            self.max_color_distance = Some(distance);
        }
    }

    fn record_shift_distance(&mut self, shift: ShiftDistance) {
        self.max_shift_distance = Some(match self.max_shift_distance {
            Some(max) => max.max(shift),
            None => shift,
        });
    }
}

/// Inclusive pixel bounds of the difference found so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Bounds {
    fn anchor(x: u32, y: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    fn to_region(self) -> Option<Region> {
        Region::from_edges(
            i64::from(self.left),
            i64::from(self.top),
            i64::from(self.right),
            i64::from(self.bottom),
        )
    }
}

struct PixelScanner<'a> {
    base: &'a RgbaImage,
    new: &'a RgbaImage,
    options: &'a DiffOptions,
}

impl<'a> PixelScanner<'a> {
    fn new(base: &'a RgbaImage, new: &'a RgbaImage, options: &'a DiffOptions) -> Self {
        Self { base, new, options }
    }

    fn width(&self) -> u32 {
        self.base.width()
    }

    fn height(&self) -> u32 {
        self.base.height()
    }

    /// First non-matching pixel in reading order.
    fn find_top(&self, stats: &mut ScanStats) -> Option<Bounds> {
        for y in 0..self.height() {
            for x in 0..self.width() {
                if !self.same_pixel(x, y, stats) {
                    return Some(Bounds::anchor(x, y));
                }
            }
        }
        None
    }

    /// Widen the window from the anchor row down, probing only the columns
    /// outside `[left, right]` on each row. `bottom` tracks the last row
    /// where the window had to grow.
    fn find_left_right_and_top(&self, anchor: Bounds, stats: &mut ScanStats) -> Bounds {
        let mut bounds = anchor;
        for y in anchor.top..self.height() {
            if let Some(x) = (0..bounds.left).find(|&x| !self.same_pixel(x, y, stats)) {
                bounds.left = x;
                bounds.bottom = y;
            }
            if let Some(x) = (bounds.right + 1..self.width())
                .rev()
                .find(|&x| !self.same_pixel(x, y, stats))
            {
                bounds.right = x;
                bounds.bottom = y;
            }
        }
        bounds
    }

    /// Lowest row below `bottom` with a difference inside `[left, right]`.
    fn find_bottom(&self, mut bounds: Bounds, stats: &mut ScanStats) -> Bounds {
        if let Some(y) = (bounds.bottom + 1..self.height())
            .rev()
            .find(|&y| (bounds.left..=bounds.right).any(|x| !self.same_pixel(x, y, stats)))
        {
            bounds.bottom = y;
        }
        bounds
    }

    fn is_skipped(&self, x: u32, y: u32) -> bool {
        self.options
            .skip_area
            .iter()
            .any(|region| region.contains_point(i64::from(x), i64::from(y)))
    }

    fn color_matches(&self, distance: f64) -> bool {
        distance == 0.0
            || self
                .options
                .color_distance_limit
                .is_some_and(|limit| distance <= limit)
    }

    fn same_pixel(&self, x: u32, y: u32, stats: &mut ScanStats) -> bool {
        if self.is_skipped(x, y) {
            return true;
        }

        let old = self.base.get_pixel(x, y);
        let direct = color_distance(old, self.new.get_pixel(x, y));

        let Some(limit) = self.options.shift_distance_limit else {
            stats.record_color_distance(direct);
            return self.color_matches(direct);
        };

        let nearest = self.min_distance_within(old, x, y, limit);
        stats.record_color_distance(nearest);
        let shift = if self.color_matches(direct) {
            ShiftDistance::Pixels(0)
        } else if self.color_matches(nearest) {
            self.shift_distance_at(old, x, y, limit)
                .map_or(ShiftDistance::Unbounded, ShiftDistance::Pixels)
        } else {
            ShiftDistance::Unbounded
        };
        stats.record_shift_distance(shift);
        shift != ShiftDistance::Unbounded
    }

    /// Smallest distance between `old` and any new-image pixel in the
    /// `(2 * radius + 1)^2` window around `(x, y)`, clipped to the image.
    fn min_distance_within(&self, old: &Rgba<u8>, x: u32, y: u32, radius: u32) -> f64 {
        let x_range = x.saturating_sub(radius)..=x.saturating_add(radius).min(self.width() - 1);
        let y_range = y.saturating_sub(radius)..=y.saturating_add(radius).min(self.height() - 1);
        let mut nearest = f64::INFINITY;
        for dy in y_range {
            for dx in x_range.clone() {
                nearest = nearest.min(color_distance(old, self.new.get_pixel(dx, dy)));
                if nearest == 0.0 {
                    return nearest;
                }
            }
        }
        nearest
    }

    /// Ring search outwards from `(x, y)`: for each radius, the top edge of
    /// the ring, then its left, bottom and right edges. Returns the first
    /// radius holding a matching new-image pixel.
    fn shift_distance_at(&self, old: &Rgba<u8>, x: u32, y: u32, limit: u32) -> Option<u32> {
        let width = i64::from(self.width());
        let height = i64::from(self.height());
        let (x, y) = (i64::from(x), i64::from(y));
        let matches_at = |dx: i64, dy: i64| {
            self.color_matches(color_distance(
                old,
                self.new.get_pixel(dx as u32, dy as u32),
            ))
        };

        for radius in 0..=i64::from(limit) {
            let top = y - radius;
            let bottom = y + radius;
            let left = x - radius;
            let right = x + radius;
            let columns = left.max(0)..=right.min(width - 1);

            if top >= 0 && columns.clone().any(|dx| matches_at(dx, top)) {
                return Some(radius as u32);
            }
            if radius == 0 {
                continue;
            }

            let rows = (top + 1).max(0)..=(bottom - 1).min(height - 1);
            if left >= 0 && rows.clone().any(|dy| matches_at(left, dy)) {
                return Some(radius as u32);
            }
            if bottom < height && columns.clone().any(|dx| matches_at(dx, bottom)) {
                return Some(radius as u32);
            }
            if right < width && rows.clone().any(|dy| matches_at(right, dy)) {
                return Some(radius as u32);
            }
        }
        None
    }
}
