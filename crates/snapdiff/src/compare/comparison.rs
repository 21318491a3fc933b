use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::backend::Backend;
use super::difference::Difference;
use super::finder::DifferenceFinder;
use super::options::DiffOptions;
use crate::error::DiffError;
use crate::image_io;

/// Input bundle for one evaluation: the baseline, the candidate, the
/// tolerance policy and the backend that localizes differences.
#[derive(Debug)]
pub struct Comparison {
    base_image: RgbaImage,
    new_image: RgbaImage,
    options: DiffOptions,
    backend: Backend,
    base_path: Option<PathBuf>,
    new_path: Option<PathBuf>,
}

impl Comparison {
    /// Fails with [`DiffError::Configuration`] when the options are invalid or
    /// request a feature the backend has no fallback for.
    pub fn new(
        base_image: RgbaImage,
        new_image: RgbaImage,
        options: DiffOptions,
        backend: Backend,
    ) -> Result<Self, DiffError> {
        options.validate()?;
        if options.median_filter_window_size.is_some() && !backend.supports_median_filter() {
            return Err(DiffError::Configuration(format!(
                "median_filter_window_size is not supported by the {backend} backend"
            )));
        }
        // Shift tolerance on the mask backend delegates to the pixel scan,
        // which cannot honor the median filter.
        if options.median_filter_window_size.is_some()
            && options.shift_distance_limit.is_some()
            && !backend.supports_shift_tolerance()
        {
            return Err(DiffError::Configuration(format!(
                "median_filter_window_size cannot be combined with shift_distance_limit on the {backend} backend"
            )));
        }
        Ok(Self {
            base_image,
            new_image,
            options,
            backend,
            base_path: None,
            new_path: None,
        })
    }

    /// Decode both files and build a comparison that remembers their paths.
    pub fn load(
        base_path: &Path,
        new_path: &Path,
        options: DiffOptions,
        backend: Backend,
    ) -> Result<Self, DiffError> {
        let base_image = image_io::load(base_path)?;
        let new_image = image_io::load(new_path)?;
        Ok(Self::new(base_image, new_image, options, backend)?.with_paths(base_path, new_path))
    }

    /// Remember where the images came from, for diagnostics.
    pub fn with_paths(
        mut self,
        base_path: impl Into<PathBuf>,
        new_path: impl Into<PathBuf>,
    ) -> Self {
        self.base_path = Some(base_path.into());
        self.new_path = Some(new_path.into());
        self
    }

    pub fn base_image(&self) -> &RgbaImage {
        &self.base_image
    }

    pub fn new_image(&self) -> &RgbaImage {
        &self.new_image
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn new_path(&self) -> Option<&Path> {
        self.new_path.as_deref()
    }

    /// Cheap yes/no answer; see [`DifferenceFinder::quick_equal`].
    pub fn quick_equal(&self) -> bool {
        DifferenceFinder::new(self).quick_equal().0
    }

    /// Full diagnostic evaluation; see [`DifferenceFinder::find`].
    pub fn difference(&self) -> Difference<'_> {
        DifferenceFinder::new(self).find()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn gray(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 200, 200, 255]))
    }

    #[test]
    fn median_filter_requires_mask_backend() {
        let options = DiffOptions {
            median_filter_window_size: Some(3),
            ..Default::default()
        };
        let err = Comparison::new(gray(4, 4), gray(4, 4), options.clone(), Backend::PixelScan)
            .unwrap_err();
        assert!(matches!(err, DiffError::Configuration(_)));
        assert!(Comparison::new(gray(4, 4), gray(4, 4), options, Backend::MaskProjection).is_ok());
    }

    #[test]
    fn median_filter_with_shift_tolerance_is_rejected() {
        let options = DiffOptions {
            median_filter_window_size: Some(3),
            shift_distance_limit: Some(2),
            ..Default::default()
        };
        let err = Comparison::new(gray(4, 4), gray(4, 4), options, Backend::MaskProjection)
            .unwrap_err();
        assert!(err.to_string().contains("shift_distance_limit"), "{err}");
    }

    #[test]
    fn load_keeps_paths() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.png");
        let new = dir.path().join("new.png");
        gray(8, 8).save(&base).unwrap();
        gray(8, 8).save(&new).unwrap();

        let comparison =
            Comparison::load(&base, &new, DiffOptions::default(), Backend::default()).unwrap();
        assert_eq!(comparison.base_path(), Some(base.as_path()));
        assert_eq!(comparison.new_path(), Some(new.as_path()));
        assert!(comparison.quick_equal());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.png");
        let new = dir.path().join("new.png");
        gray(8, 8).save(&base).unwrap();
        std::fs::write(&new, b"\x89PNG\r\n\x1a\nnot really a png").unwrap();

        let err =
            Comparison::load(&base, &new, DiffOptions::default(), Backend::default()).unwrap_err();
        assert!(matches!(err, DiffError::Decode { .. }));
    }
}
