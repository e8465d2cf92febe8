//! Result types shared by source engines and the arbitrator.

use serde::{Deserialize, Serialize};

use crate::error::{HeightError, Result};

/// NODATA value reported by the arbitrator when no source has data.
pub const NODATA: f64 = -32768.0;

/// Source name reported when no source has data.
pub const NODATA_SOURCE: &str = "NODATA";

/// A WGS84 location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Dataset attribution, passed through to callers unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub name: &'static str,
    pub url: &'static str,
}

/// Land/water label of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Ocean,
    Land,
    Water,
}

/// Answer to a point query.
///
/// `altitude` equal to the source's NODATA value means the source has no
/// reading at this location; see [`ElevationResult::is_nodata`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationResult {
    /// Elevation in meters.
    pub altitude: f64,
    /// Name of the dataset that produced the value.
    pub source: String,
    /// The requested location.
    pub query: Location,
    /// Reference point of the grid cell that was read.
    pub found: Location,
    /// Geodesic distance between `query` and `found` in meters.
    pub distance_m: f64,
    pub attributions: Vec<Attribution>,
    /// Vertical precision of the dataset in meters, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision_m: Option<f64>,
    /// Whether the dataset models the sea floor.
    pub seabed_included: bool,
    /// Land/water label consulted by the arbitrator, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<SurfaceKind>,
    #[serde(skip)]
    pub(crate) nodata: f64,
}

impl ElevationResult {
    /// Returns `true` if the source had no reading at this location.
    pub fn is_nodata(&self) -> bool {
        self.altitude == self.nodata
    }

    /// The "nothing found" answer of the arbitrator.
    pub(crate) fn nowhere(query: Location, surface: Option<SurfaceKind>) -> Self {
        Self {
            altitude: NODATA,
            source: NODATA_SOURCE.to_string(),
            query,
            found: query,
            distance_m: 0.0,
            attributions: Vec::new(),
            precision_m: None,
            seabed_included: false,
            surface,
            nodata: NODATA,
        }
    }
}

/// An extreme value and every cell that holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremum {
    pub value: f64,
    /// Number of tied cells; always equal to `locations.len()`.
    pub count: usize,
    pub locations: Vec<Location>,
}

impl Extremum {
    pub(crate) fn new(value: f64, locations: Vec<Location>) -> Self {
        Self {
            value,
            count: locations.len(),
            locations,
        }
    }

    pub(crate) fn empty(nodata: f64) -> Self {
        Self::new(nodata, Vec::new())
    }
}

/// Answer to a maximum or minimum rectangle search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremumResult {
    #[serde(flatten)]
    pub extremum: Extremum,
    pub source: String,
    pub attributions: Vec<Attribution>,
    /// Vertical precision of the dataset in meters, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision_m: Option<f64>,
    /// Whether the dataset models the sea floor.
    pub seabed_included: bool,
    #[serde(skip)]
    pub(crate) nodata: f64,
}

impl ExtremumResult {
    /// Returns `true` if no valid cell was found.
    pub fn is_nodata(&self) -> bool {
        self.extremum.value == self.nodata
    }

    pub(crate) fn nowhere() -> Self {
        Self {
            extremum: Extremum::empty(NODATA),
            source: NODATA_SOURCE.to_string(),
            attributions: Vec::new(),
            precision_m: None,
            seabed_included: false,
            nodata: NODATA,
        }
    }
}

/// Answer to a combined minimum and maximum rectangle search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinMaxResult {
    pub min: Extremum,
    pub max: Extremum,
    pub source: String,
    pub attributions: Vec<Attribution>,
    /// Vertical precision of the dataset in meters, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision_m: Option<f64>,
    /// Whether the dataset models the sea floor.
    pub seabed_included: bool,
    #[serde(skip)]
    pub(crate) nodata: f64,
}

impl MinMaxResult {
    /// Returns `true` if either extreme is missing.
    pub fn is_nodata(&self) -> bool {
        self.min.value == self.nodata || self.max.value == self.nodata
    }

    pub(crate) fn nowhere() -> Self {
        Self {
            min: Extremum::empty(NODATA),
            max: Extremum::empty(NODATA),
            source: NODATA_SOURCE.to_string(),
            attributions: Vec::new(),
            precision_m: None,
            seabed_included: false,
            nodata: NODATA,
        }
    }
}

/// Validate a WGS84 coordinate pair.
pub(crate) fn check_coordinates(lat: f64, lon: f64) -> Result<()> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(HeightError::InvalidCoordinate { lat, lon })
    }
}

/// Validate both corners of a rectangle.
///
/// Returns `Ok(false)` for a rectangle whose lower-left corner lies north or
/// east of its upper-right corner; callers answer those with an empty result.
pub(crate) fn check_rectangle(lat_ll: f64, lon_ll: f64, lat_ur: f64, lon_ur: f64) -> Result<bool> {
    check_coordinates(lat_ll, lon_ll)?;
    check_coordinates(lat_ur, lon_ur)?;
    Ok(lat_ll <= lat_ur && lon_ll <= lon_ur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_coordinates() {
        assert!(check_coordinates(0.0, 0.0).is_ok());
        assert!(check_coordinates(90.0, 180.0).is_ok());
        assert!(check_coordinates(-90.0, -180.0).is_ok());
        assert!(check_coordinates(90.1, 0.0).is_err());
        assert!(check_coordinates(0.0, -180.5).is_err());
        assert!(check_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_check_rectangle_orientation() {
        assert!(check_rectangle(5.0, 5.0, 10.0, 10.0).unwrap());
        assert!(!check_rectangle(10.0, 10.0, 5.0, 5.0).unwrap());
        assert!(!check_rectangle(5.0, 10.0, 10.0, 5.0).unwrap());
        assert!(check_rectangle(5.0, 5.0, 95.0, 10.0).is_err());
    }

    #[test]
    fn test_extremum_count_matches_locations() {
        let extremum = Extremum::new(
            12.0,
            vec![Location::new(1.0, 2.0), Location::new(1.5, 2.5)],
        );
        assert_eq!(extremum.count, 2);
        assert_eq!(Extremum::empty(-9999.0).count, 0);
    }

    #[test]
    fn test_nowhere_results_are_nodata() {
        let query = Location::new(10.0, 20.0);
        let result = ElevationResult::nowhere(query, Some(SurfaceKind::Ocean));
        assert!(result.is_nodata());
        assert_eq!(result.source, NODATA_SOURCE);
        assert_eq!(result.found, query);

        assert!(ExtremumResult::nowhere().is_nodata());
        assert!(MinMaxResult::nowhere().is_nodata());
    }

    #[test]
    fn test_elevation_result_json_shape() {
        let result = ElevationResult {
            altitude: 512.0,
            source: "SRTMGL1".to_string(),
            query: Location::new(46.5, 8.0),
            found: Location::new(46.5, 8.0),
            distance_m: 0.0,
            attributions: vec![Attribution {
                name: "SRTMGL1",
                url: "https://doi.org/10.5067/MEaSUREs/SRTM/SRTMGL1.003",
            }],
            precision_m: Some(16.0),
            seabed_included: false,
            surface: None,
            nodata: -32768.0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["altitude"], 512.0);
        assert_eq!(json["source"], "SRTMGL1");
        assert!(json.get("surface").is_none());
        assert!(json.get("nodata").is_none());
        assert_eq!(json["precision_m"], 16.0);
        assert_eq!(json["seabed_included"], false);
    }
}
