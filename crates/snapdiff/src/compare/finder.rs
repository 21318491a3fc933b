use tracing::debug;

use super::comparison::Comparison;
use super::difference::{Difference, FailedBy};

/// Result of [`DifferenceFinder::evaluate`].
#[derive(Debug)]
pub enum Evaluation<'a> {
    /// Quick mode. `difference` is `None` when localization was skipped.
    Quick {
        equal: bool,
        difference: Option<Difference<'a>>,
    },
    /// Full mode, always with diagnostics.
    Full(Difference<'a>),
}

/// Three-tier comparison protocol:
/// 1. dimension check (O(1), never tolerable)
/// 2. byte equality of the pixel buffers
/// 3. region localization by the comparison's backend
///
/// Quick mode additionally bails out between 2 and 3 when no option could
/// turn a pixel difference into equality, so polling callers never pay for
/// the region search.
pub struct DifferenceFinder<'a> {
    comparison: &'a Comparison,
}

impl<'a> DifferenceFinder<'a> {
    pub fn new(comparison: &'a Comparison) -> Self {
        Self { comparison }
    }

    pub fn evaluate(&self, quick_mode: bool) -> Evaluation<'a> {
        let comparison = self.comparison;
        let base = comparison.base_image();
        let new = comparison.new_image();

        if base.dimensions() != new.dimensions() {
            debug!(
                base = ?base.dimensions(),
                new = ?new.dimensions(),
                "image dimensions differ"
            );
            let difference = Difference::failed(
                comparison,
                FailedBy::DifferentDimensions {
                    base_width: base.width(),
                    base_height: base.height(),
                    new_width: new.width(),
                    new_height: new.height(),
                },
            );
            return finish(quick_mode, false, difference);
        }

        if base.as_raw() == new.as_raw() {
            debug!("images are pixel-identical");
            return finish(quick_mode, true, Difference::none(comparison));
        }

        if quick_mode && !comparison.options().affects_equality() {
            debug!("no tolerance options, skipping region search");
            return Evaluation::Quick {
                equal: false,
                difference: None,
            };
        }

        let backend = comparison.backend();
        debug!(backend = %backend, "locating difference region");
        let difference = backend.find_difference_region(comparison);
        let equal = !difference.is_different();
        finish(quick_mode, equal, difference)
    }

    /// `(equal, difference)`; the difference is `None` when quick mode could
    /// answer without localizing it.
    pub fn quick_equal(&self) -> (bool, Option<Difference<'a>>) {
        match self.evaluate(true) {
            Evaluation::Quick { equal, difference } => (equal, difference),
            Evaluation::Full(difference) => (!difference.is_different(), Some(difference)),
        }
    }

    pub fn find(&self) -> Difference<'a> {
        match self.evaluate(false) {
            Evaluation::Full(difference) => difference,
            Evaluation::Quick { difference, .. } => {
                difference.unwrap_or_else(|| Difference::none(self.comparison))
            }
        }
    }
}

fn finish(quick_mode: bool, equal: bool, difference: Difference<'_>) -> Evaluation<'_> {
    if quick_mode {
        Evaluation::Quick {
            equal,
            difference: Some(difference),
        }
    } else {
        Evaluation::Full(difference)
    }
}
