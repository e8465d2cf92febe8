//! Land/water classification consulted by the arbitrator.

use std::path::Path;

use crate::error::Result;
use crate::tile::{ByteOrder, ElementType, GridFile};
use crate::types::{check_coordinates, Attribution, SurfaceKind};

/// Labels a location as ocean, land or inland water.
///
/// `Ok(None)` means the classifier has no opinion; the arbitrator then
/// treats the location as not ocean.
pub trait SurfaceClassifier: Send + Sync {
    fn classify(&self, lat: f64, lon: f64) -> Result<Option<SurfaceKind>>;

    /// Credit for the data behind the labels, added to labelled results.
    fn attribution(&self) -> Option<Attribution> {
        None
    }
}

/// A classifier that gives the same answer everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClassifier(pub Option<SurfaceKind>);

impl SurfaceClassifier for FixedClassifier {
    fn classify(&self, lat: f64, lon: f64) -> Result<Option<SurfaceKind>> {
        check_coordinates(lat, lon)?;
        Ok(self.0)
    }
}

/// Global north-up byte raster with the CCI water bodies legend:
/// 0 ocean, 1 land, 2 inland water.
///
/// The raster starts at 90°N/180°W and holds `cells_per_degree` cells per
/// degree in both directions.
pub struct RasterClassifier {
    file: GridFile,
    cells_per_degree: usize,
}

impl RasterClassifier {
    pub const ATTRIBUTION: Attribution = Attribution {
        name: "CCI Water Bodies v4.0",
        url: "https://www.mdpi.com/2072-4292/9/1/36",
    };

    /// Map a raster file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or its size is not
    /// `180 × 360 × cells_per_degree²` bytes.
    pub fn open<P: AsRef<Path>>(path: P, cells_per_degree: usize) -> Result<Self> {
        let file = GridFile::open(
            path,
            180 * cells_per_degree,
            360 * cells_per_degree,
            ElementType::U8,
            ByteOrder::BigEndian,
        )?;
        Ok(Self {
            file,
            cells_per_degree,
        })
    }
}

impl SurfaceClassifier for RasterClassifier {
    fn classify(&self, lat: f64, lon: f64) -> Result<Option<SurfaceKind>> {
        check_coordinates(lat, lon)?;
        let cpd = self.cells_per_degree as f64;
        // GridFile clamps 90°S and 180°E onto the last row and column
        let col = ((lon + 180.0) * cpd).floor() as usize;
        let row = ((90.0 - lat) * cpd).floor() as usize;

        Ok(match self.file.value(row, col) as u8 {
            0 => Some(SurfaceKind::Ocean),
            1 => Some(SurfaceKind::Land),
            2 => Some(SurfaceKind::Water),
            _ => None,
        })
    }

    fn attribution(&self) -> Option<Attribution> {
        Some(Self::ATTRIBUTION)
    }
}
