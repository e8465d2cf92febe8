//! Coordinate adapters between WGS84 and the native grid coordinates of each
//! dataset.
//!
//! Geographic grids use longitude/latitude in degrees as their native
//! coordinates (`x = lon`, `y = lat`). Projected grids are converted with
//! [`proj4rs`]:
//!
//! | System | Datasets | Definition |
//! |--------|----------|------------|
//! | Lambert-93 (EPSG:2154) | BD ALTI 75 | `lcc`, GRS80 |
//! | British National Grid (EPSG:27700) | OS Terrain 50 | `tmerc`, Airy 1830 + Helmert |
//! | UTM zone 32N (EPSG:25832) | DGM200 | `utm`, GRS80 |
//!
//! A conversion that fails, or a location outside the dataset's extent,
//! yields `None`. Callers treat that as "no data from this source".

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use serde::Serialize;

use crate::error::{HeightError, Result};
use crate::types::Location;

const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";

const LAMBERT93: &str = "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 \
    +x_0=700000 +y_0=6600000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

const BRITISH_NATIONAL_GRID: &str = "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 \
    +x_0=400000 +y_0=-100000 +ellps=airy \
    +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489 +units=m +no_defs";

const UTM32N: &str = "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Native coordinate system of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinateSystem {
    /// Longitude/latitude in degrees.
    Geographic,
    /// French Lambert-93 conic conformal projection.
    Lambert93,
    /// Ordnance Survey National Grid (OSGB36).
    BritishNationalGrid,
    /// UTM zone 32 north (ETRS89).
    Utm32N,
}

impl CoordinateSystem {
    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            CoordinateSystem::Geographic => "WGS84",
            CoordinateSystem::Lambert93 => "Lambert-93",
            CoordinateSystem::BritishNationalGrid => "British National Grid",
            CoordinateSystem::Utm32N => "UTM 32N",
        }
    }

    fn proj_string(&self) -> Option<&'static str> {
        match self {
            CoordinateSystem::Geographic => None,
            CoordinateSystem::Lambert93 => Some(LAMBERT93),
            CoordinateSystem::BritishNationalGrid => Some(BRITISH_NATIONAL_GRID),
            CoordinateSystem::Utm32N => Some(UTM32N),
        }
    }
}

/// A WGS84 bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Extent {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Check whether a location lies inside the box (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

struct Projected {
    wgs84: Proj,
    native: Proj,
}

/// Converts between WGS84 and one dataset's native coordinates.
///
/// # Example
///
/// ```ignore
/// use heightmap::projection::{CoordinateAdapter, CoordinateSystem};
///
/// let adapter = CoordinateAdapter::new(CoordinateSystem::BritishNationalGrid, None)?;
/// let (easting, northing) = adapter.to_native(51.5074, -0.1278).unwrap();
/// ```
pub struct CoordinateAdapter {
    extent: Option<Extent>,
    projected: Option<Projected>,
}

impl CoordinateAdapter {
    /// Create an adapter for `crs`, optionally restricted to `extent`.
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::Projection`] if the projection library rejects
    /// the definition.
    pub fn new(crs: CoordinateSystem, extent: Option<Extent>) -> Result<Self> {
        let projected = match crs.proj_string() {
            None => None,
            Some(definition) => {
                let parse = |s: &str| {
                    Proj::from_proj_string(s).map_err(|e| HeightError::Projection {
                        crs: crs.name(),
                        message: format!("{e:?}"),
                    })
                };
                Some(Projected {
                    wgs84: parse(WGS84)?,
                    native: parse(definition)?,
                })
            }
        };

        Ok(Self { extent, projected })
    }

    /// Convert a WGS84 location to native `(x, y)`.
    ///
    /// Returns `None` when the location lies outside the dataset extent or
    /// the projection cannot represent it.
    pub fn to_native(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if let Some(extent) = &self.extent {
            if !extent.contains(lat, lon) {
                return None;
            }
        }

        match &self.projected {
            None => Some((lon, lat)),
            Some(p) => {
                let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
                transform(&p.wgs84, &p.native, &mut point).ok()?;
                (point.0.is_finite() && point.1.is_finite()).then_some((point.0, point.1))
            }
        }
    }

    /// Convert native `(x, y)` back to a WGS84 location.
    pub fn to_wgs84(&self, x: f64, y: f64) -> Option<Location> {
        let (lon, lat) = match &self.projected {
            None => (x, y),
            Some(p) => {
                let mut point = (x, y, 0.0);
                transform(&p.native, &p.wgs84, &mut point).ok()?;
                (point.0.to_degrees(), point.1.to_degrees())
            }
        };

        ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
            .then_some(Location::new(lat, lon))
    }
}
