//! Normalization of crop and skip specifications into pixel regions.
//!
//! Callers describe areas as ready [`Region`]s, raw edge coordinates, or
//! named elements that only a browser can locate. [`AreaCalculator`] turns
//! all of them into absolute regions and, when a crop window is present,
//! rebases skip areas into crop-local coordinates so they line up with the
//! cropped screenshot.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::DiffError;
use crate::region::{EdgeCoordinates, Region};

/// One caller-supplied area.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaSpec {
    Region(Region),
    Coordinates(EdgeCoordinates),
    /// Symbolic reference resolved through an [`ElementResolver`].
    Element(String),
}

impl From<Region> for AreaSpec {
    fn from(region: Region) -> Self {
        Self::Region(region)
    }
}

/// `left,top,right,bottom` (blank entries are missing coordinates) or an
/// element name.
impl FromStr for AreaSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("area must not be empty".to_string());
        }
        if !s.contains(',') {
            return Ok(Self::Element(s.to_string()));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!(
                "expected left,top,right,bottom but got {} values in '{s}'",
                parts.len()
            ));
        }
        let mut coords: EdgeCoordinates = [None; 4];
        for (slot, part) in coords.iter_mut().zip(parts) {
            if part.is_empty() {
                continue;
            }
            *slot = Some(
                part.parse::<i64>()
                    .map_err(|e| format!("invalid coordinate '{part}': {e}"))?,
            );
        }
        Ok(Self::Coordinates(coords))
    }
}

/// Locates named UI elements as absolute pixel rectangles.
pub trait ElementResolver {
    fn resolve(&self, selector: &str) -> Result<Vec<EdgeCoordinates>, DiffError>;
}

/// Fixed selector to rectangles table.
///
/// JSON form: `{ "header": [[0, 0, 1365, 80]], "clock": [[1200, 10, 1300, 40]] }`.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticResolver {
    elements: HashMap<String, Vec<EdgeCoordinates>>,
}

impl StaticResolver {
    pub fn from_json_file(path: &Path) -> Result<Self, DiffError> {
        let content = std::fs::read_to_string(path).map_err(|source| DiffError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DiffError::Configuration(format!("invalid element file {}: {e}", path.display()))
        })
    }

    pub fn insert(&mut self, selector: impl Into<String>, rects: Vec<EdgeCoordinates>) {
        self.elements.insert(selector.into(), rects);
    }
}

impl ElementResolver for StaticResolver {
    fn resolve(&self, selector: &str) -> Result<Vec<EdgeCoordinates>, DiffError> {
        self.elements
            .get(selector)
            .cloned()
            .ok_or_else(|| DiffError::Locator {
                selector: selector.to_string(),
                message: "unknown element".to_string(),
            })
    }
}

/// Memoized outcome of crop resolution.
#[derive(Debug)]
enum CropState {
    Pending,
    Resolved(Option<Region>),
    /// The locator failed for this selector; replayed without asking again.
    Failed { selector: String, message: String },
}

pub struct AreaCalculator {
    crop: Option<AreaSpec>,
    skip: Vec<AreaSpec>,
    crop_state: CropState,
}

impl AreaCalculator {
    pub fn new(crop: Option<AreaSpec>, skip: Vec<AreaSpec>) -> Self {
        Self {
            crop,
            skip,
            crop_state: CropState::Pending,
        }
    }

    /// Absolute crop window. Resolved once; later calls replay the cached
    /// region, or the cached locator failure, without touching the resolver.
    pub fn calculate_crop(
        &mut self,
        resolver: &dyn ElementResolver,
    ) -> Result<Option<Region>, DiffError> {
        match &self.crop_state {
            CropState::Pending => {}
            CropState::Resolved(region) => return Ok(*region),
            CropState::Failed { selector, message } => {
                return Err(DiffError::Locator {
                    selector: selector.clone(),
                    message: message.clone(),
                });
            }
        }

        let region = match &self.crop {
            None => None,
            Some(AreaSpec::Region(region)) => Some(*region),
            Some(AreaSpec::Coordinates(coords)) => {
                Some(Region::from_edge_coordinates(coords).ok_or_else(|| {
                    DiffError::Configuration(format!("crop area {coords:?} is not a valid region"))
                })?)
            }
            Some(AreaSpec::Element(selector)) => match locate_crop(resolver, selector) {
                Ok(region) => Some(region),
                Err(err) => {
                    let message = match &err {
                        DiffError::Locator { message, .. } => message.clone(),
                        other => other.to_string(),
                    };
                    self.crop_state = CropState::Failed {
                        selector: selector.clone(),
                        message,
                    };
                    return Err(err);
                }
            },
        };
        debug!(crop = ?region, "crop area calculated");

        self.crop_state = CropState::Resolved(region);
        Ok(region)
    }

    /// Skip areas as valid regions, in crop-local coordinates when a crop is set.
    ///
    /// Coordinates that do not form a region are dropped, as are skip areas
    /// that do not overlap the crop window.
    pub fn calculate_skip_area(
        &mut self,
        resolver: &dyn ElementResolver,
    ) -> Result<Vec<Region>, DiffError> {
        let mut regions = Vec::new();
        let mut coordinates = Vec::new();
        let mut selectors = Vec::new();
        for spec in &self.skip {
            match spec {
                AreaSpec::Region(region) => regions.push(*region),
                AreaSpec::Coordinates(coords) => coordinates.push(*coords),
                AreaSpec::Element(selector) => selectors.push(selector.as_str()),
            }
        }

        for selector in selectors {
            coordinates.extend(resolver.resolve(selector)?);
        }

        let total = regions.len() + coordinates.len();
        regions.extend(
            coordinates
                .iter()
                .filter_map(|coords| Region::from_edge_coordinates(coords)),
        );
        if regions.len() < total {
            debug!(
                dropped = total - regions.len(),
                "skipping invalid skip area coordinates"
            );
        }

        match self.calculate_crop(resolver)? {
            Some(crop) => Ok(regions
                .iter()
                .filter_map(|region| crop.relative_intersect(region))
                .collect()),
            None => Ok(regions),
        }
    }
}

fn locate_crop(resolver: &dyn ElementResolver, selector: &str) -> Result<Region, DiffError> {
    resolver
        .resolve(selector)?
        .iter()
        .find_map(|coords| Region::from_edge_coordinates(coords))
        .ok_or_else(|| DiffError::Locator {
            selector: selector.to_string(),
            message: "no visible rectangle to crop to".to_string(),
        })
}
