//! Ellipsoidal distance between WGS84 locations.

use geo::{Distance, Geodesic, Point};

use crate::types::Location;

/// Geodesic distance in meters on the WGS84 ellipsoid.
pub fn distance_m(from: Location, to: Location) -> f64 {
    if from == to {
        return 0.0;
    }
    Geodesic.distance(Point::new(from.lon, from.lat), Point::new(to.lon, to.lat))
}
