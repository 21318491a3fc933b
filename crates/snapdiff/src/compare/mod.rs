pub mod backend;
pub mod comparison;
pub mod difference;
pub mod finder;
pub mod mask;
pub mod options;
pub mod pixel_scan;

pub use self::backend::Backend;
pub use self::comparison::Comparison;
pub use self::difference::{Difference, DifferenceMetadata, FailedBy, ShiftDistance};
pub use self::finder::{DifferenceFinder, Evaluation};
pub use self::options::DiffOptions;
