//! Visual difference engine for UI screenshots.
//!
//! Build a [`Comparison`] from a baseline and a candidate image, then ask a
//! [`DifferenceFinder`] whether they are acceptably equal and, if not, where
//! they differ.

pub mod area;
pub mod compare;
pub mod error;
pub mod image_io;
pub mod region;

pub use self::area::{AreaCalculator, AreaSpec, ElementResolver, StaticResolver};
pub use self::compare::{
    Backend, Comparison, DiffOptions, Difference, DifferenceFinder, DifferenceMetadata,
    Evaluation, FailedBy, ShiftDistance,
};
pub use self::error::DiffError;
pub use self::region::{EdgeCoordinates, Region};
