//! Image loading and the drawing helpers used to annotate reports.

use std::path::Path;

use image::{ImageReader, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::DiffError;
use crate::region::Region;

/// Decode any supported format into 8-bit RGBA.
pub fn load(path: &Path) -> Result<RgbaImage, DiffError> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| DiffError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let image = reader.decode().map_err(|source| DiffError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Encode by file extension, creating parent directories as needed.
pub fn save(image: &RgbaImage, path: &Path) -> Result<(), DiffError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| DiffError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    image.save(path).map_err(|source| DiffError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Outline the pixels covered by `region` (inclusive edges), clipped to the
/// canvas. Nothing is drawn when the region lies outside the image.
pub fn draw_rectangle(image: &mut RgbaImage, region: &Region, color: Rgba<u8>) {
    let left = region.left().max(0);
    let top = region.top().max(0);
    let right = region.right().min(i64::from(image.width()) - 1);
    let bottom = region.bottom().min(i64::from(image.height()) - 1);
    if right < left || bottom < top {
        return;
    }
    let rect = Rect::at(left as i32, top as i32)
        .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
    draw_hollow_rect_mut(image, rect, color);
}

/// Cut the crop window out of a screenshot. The window is clipped to the
/// image, so the result may be smaller than `region`.
pub fn crop(image: &RgbaImage, region: &Region) -> RgbaImage {
    let x = region.x().clamp(0, i64::from(image.width())) as u32;
    let y = region.y().clamp(0, i64::from(image.height())) as u32;
    let right = region.right().clamp(0, i64::from(image.width())) as u32;
    let bottom = region.bottom().clamp(0, i64::from(image.height())) as u32;
    image::imageops::crop_imm(image, x, y, right.saturating_sub(x), bottom.saturating_sub(y))
        .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn save_then_load_keeps_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shot.png");
        let mut img = RgbaImage::from_pixel(6, 4, GRAY);
        img.put_pixel(2, 1, RED);
        save(&img, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, img);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, DiffError::Io { .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, DiffError::Decode { .. }));
    }

    #[test]
    fn draw_rectangle_outlines_inclusive_edges() {
        let mut img = RgbaImage::from_pixel(10, 10, GRAY);
        draw_rectangle(&mut img, &Region::from_edges(2, 3, 5, 6).unwrap(), RED);
        assert_eq!(*img.get_pixel(2, 3), RED);
        assert_eq!(*img.get_pixel(5, 6), RED);
        assert_eq!(*img.get_pixel(5, 3), RED);
        assert_eq!(*img.get_pixel(3, 4), GRAY);
        assert_eq!(*img.get_pixel(6, 6), GRAY);
    }

    #[test]
    fn draw_rectangle_clips_to_canvas() {
        let mut img = RgbaImage::from_pixel(4, 4, GRAY);
        draw_rectangle(&mut img, &Region::from_edges(-2, -2, 10, 1).unwrap(), RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(3, 1), RED);
        assert_eq!(*img.get_pixel(1, 2), GRAY);

        let mut untouched = RgbaImage::from_pixel(4, 4, GRAY);
        draw_rectangle(&mut untouched, &Region::from_edges(8, 8, 9, 9).unwrap(), RED);
        assert!(untouched.pixels().all(|p| *p == GRAY));
    }

    #[test]
    fn crop_is_clipped() {
        let mut img = RgbaImage::from_pixel(10, 10, GRAY);
        img.put_pixel(4, 5, RED);
        let cropped = crop(&img, &Region::from_corner(4, 5, 20, 2).unwrap());
        assert_eq!(cropped.dimensions(), (6, 2));
        assert_eq!(*cropped.get_pixel(0, 0), RED);
    }
}
