//! Vectorized localization: a per-pixel distance image thresholded into a
//! binary mask, with the bounding box read off its axis projections.
//!
//! Reports the exact share of differing pixels as `difference_level`, where
//! the pixel scan can only offer its bounding box area. Has no shift
//! search; such requests are delegated to the pixel scan.

use std::borrow::Cow;

use image::{GrayImage, ImageBuffer, Luma, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::filter::median_filter;
use imageproc::rect::Rect;
use tracing::{debug, warn};

use super::comparison::Comparison;
use super::difference::{Difference, DifferenceMetadata};
use super::pixel_scan::{self, ceil_to_tenth, color_distance};
use crate::region::Region;

const SET: Luma<u8> = Luma([255]);
const UNSET: Luma<u8> = Luma([0]);

pub fn find_difference_region(comparison: &Comparison) -> Difference<'_> {
    let options = comparison.options();
    if let Some(limit) = options.shift_distance_limit {
        warn!(
            shift_distance_limit = limit,
            "mask-projection backend has no shift tolerance, falling back to pixel-scan"
        );
        return pixel_scan::find_difference_region(comparison);
    }

    let (base, new) = match options.median_filter_window_size {
        Some(size) => {
            let radius = size / 2;
            debug!(window = size, "median filtering both images");
            (
                Cow::Owned(median_filter(comparison.base_image(), radius, radius)),
                Cow::Owned(median_filter(comparison.new_image(), radius, radius)),
            )
        }
        None => (
            Cow::Borrowed(comparison.base_image()),
            Cow::Borrowed(comparison.new_image()),
        ),
    };

    let mut distances = distance_image(&base, &new);
    for region in &options.skip_area {
        if let Some(rect) = clipped_rect(region, distances.width(), distances.height()) {
            draw_filled_rect_mut(&mut distances, rect, Luma([0.0]));
        }
    }

    let limit = options.color_distance_limit.unwrap_or(0.0);
    let mask = DifferenceMask::threshold(&distances, limit);
    let region = mask.bounding_region();
    debug!(region = ?region, different_pixels = mask.count, "mask projection finished");

    let mut metadata = DifferenceMetadata::default();
    if region.is_some() {
        let area = u64::from(mask.image.width()) * u64::from(mask.image.height());
        metadata.max_color_distance = Some(ceil_to_tenth(mask.max_distance));
        metadata.different_pixels = Some(mask.count);
        metadata.difference_level = Some(mask.count as f64 / area as f64);
    }
    Difference::new(region, metadata, comparison)
}

/// Per-pixel Euclidean RGBA distance between the two images.
fn distance_image(base: &RgbaImage, new: &RgbaImage) -> ImageBuffer<Luma<f64>, Vec<f64>> {
    ImageBuffer::from_fn(base.width(), base.height(), |x, y| {
        Luma([color_distance(base.get_pixel(x, y), new.get_pixel(x, y))])
    })
}

/// Canvas rectangle covering the region's inclusive edges, clipped to
/// `width` x `height`. `None` when nothing is left after clipping.
fn clipped_rect(region: &Region, width: u32, height: u32) -> Option<Rect> {
    let left = region.left().max(0);
    let top = region.top().max(0);
    let right = region.right().min(i64::from(width) - 1);
    let bottom = region.bottom().min(i64::from(height) - 1);
    if right < left || bottom < top {
        return None;
    }
    Some(
        Rect::at(left as i32, top as i32)
            .of_size((right - left + 1) as u32, (bottom - top + 1) as u32),
    )
}

struct DifferenceMask {
    image: GrayImage,
    count: u64,
    max_distance: f64,
}

impl DifferenceMask {
    fn threshold(distances: &ImageBuffer<Luma<f64>, Vec<f64>>, limit: f64) -> Self {
        let mut count = 0;
        let mut max_distance: f64 = 0.0;
        let image = GrayImage::from_fn(distances.width(), distances.height(), |x, y| {
            let Luma([distance]) = *distances.get_pixel(x, y);
            max_distance = max_distance.max(distance);
            if distance > limit {
                count += 1;
                SET
            } else {
                UNSET
            }
        });
        Self {
            image,
            count,
            max_distance,
        }
    }

    /// First and last set index of the column and row projections.
    fn bounding_region(&self) -> Option<Region> {
        let (columns, rows) = self.project();
        let left = columns.iter().position(|&set| set)?;
        let right = columns.iter().rposition(|&set| set)?;
        let top = rows.iter().position(|&set| set)?;
        let bottom = rows.iter().rposition(|&set| set)?;
        Region::from_edges(left as i64, top as i64, right as i64, bottom as i64)
    }

    fn project(&self) -> (Vec<bool>, Vec<bool>) {
        let mut columns = vec![false; self.image.width() as usize];
        let mut rows = vec![false; self.image.height() as usize];
        for (x, y, pixel) in self.image.enumerate_pixels() {
            if *pixel == SET {
                columns[x as usize] = true;
                rows[y as usize] = true;
            }
        }
        (columns, rows)
    }
}
