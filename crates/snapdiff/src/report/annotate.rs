use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use snapdiff::{Difference, Region, image_io};

/// Maximum possible delta in YIQ color space (used by dify internally).
const MAX_YIQ_POSSIBLE_DELTA: f32 = 35215.0;

/// Pre-computed threshold: MAX_YIQ_POSSIBLE_DELTA * 0.1 * 0.1
const THRESHOLD: f32 = MAX_YIQ_POSSIBLE_DELTA * 0.1 * 0.1;

const REGION_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const SKIP_COLOR: Rgba<u8> = Rgba([255, 200, 0, 255]);

/// Write `base.png` and `new.png` with the difference region outlined, plus
/// a `difference.png` overlay for a human reviewer.
///
/// The overlay is diagnostics only; the verdict never depends on it.
pub fn write_annotations(difference: &Difference<'_>, dir: &Path) -> Result<Vec<PathBuf>> {
    let comparison = difference.comparison();
    let skip_area = &comparison.options().skip_area;
    let mut written = Vec::new();

    for (file, image) in [
        ("base.png", comparison.base_image()),
        ("new.png", comparison.new_image()),
    ] {
        let annotated = annotate(image, difference.region(), skip_area);
        let path = dir.join(file);
        image_io::save(&annotated, &path)?;
        written.push(path);
    }

    if let Some(overlay) = overlay(comparison.base_image(), comparison.new_image(), skip_area) {
        let path = dir.join("difference.png");
        image_io::save(&overlay, &path).context("Failed to write difference overlay")?;
        written.push(path);
    }

    Ok(written)
}

fn annotate(image: &RgbaImage, region: Option<Region>, skip_area: &[Region]) -> RgbaImage {
    let mut annotated = image.clone();
    for skip in skip_area {
        image_io::draw_rectangle(&mut annotated, skip, SKIP_COLOR);
    }
    if let Some(region) = region {
        image_io::draw_rectangle(&mut annotated, &region, REGION_COLOR);
    }
    annotated
}

/// Perceptual overlay via dify. Skip areas are blocked out; mismatched
/// dimensions are padded with magenta so the size delta stands out.
fn overlay(base: &RgbaImage, new: &RgbaImage, skip_area: &[Region]) -> Option<RgbaImage> {
    let max_w = base.width().max(new.width());
    let max_h = base.height().max(new.height());
    let (left, right) = if base.dimensions() != new.dimensions() {
        (pad_to(base, max_w, max_h), pad_to(new, max_w, max_h))
    } else {
        (base.clone(), new.clone())
    };

    let block_out = blocked_pixels(skip_area, max_w, max_h);
    let output_base = Some(dify::cli::OutputImageBase::LeftImage);

    dify::diff::get_results(
        left,
        right,
        THRESHOLD,
        true, // detect anti-aliased
        Some(0.1),
        &output_base,
        &block_out,
    )
    .map(|(_, diff_image)| diff_image)
}

fn blocked_pixels(skip_area: &[Region], width: u32, height: u32) -> Option<HashSet<(u32, u32)>> {
    if skip_area.is_empty() {
        return None;
    }
    let mut pixels = HashSet::new();
    for region in skip_area {
        let left = region.left().max(0);
        let top = region.top().max(0);
        let right = region.right().min(i64::from(width) - 1);
        let bottom = region.bottom().min(i64::from(height) - 1);
        if right < left || bottom < top {
            continue;
        }
        for y in top as u32..=bottom as u32 {
            for x in left as u32..=right as u32 {
                pixels.insert((x, y));
            }
        }
    }
    Some(pixels)
}

/// Paste `src` onto a magenta canvas of `w x h`, anchored at top-left.
fn pad_to(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(w, h, Rgba([255, 0, 255, 255]));
    image::imageops::overlay(&mut canvas, src, 0, 0);
    canvas
}
