//! # heightmap - Multi-Source Elevation Queries
//!
//! Point and rectangle elevation queries over a set of raster elevation
//! datasets stored as plain binary grids, from 50 m national models to
//! global bathymetry.
//!
//! ## Features
//!
//! - **Fast**: memory-mapped grids, tiles opened on demand and kept in a small
//!   concurrent cache
//! - **Projected grids**: British National Grid, Lambert-93 and UTM 32N
//!   datasets are queried with WGS84 coordinates
//! - **Rectangle search**: highest and lowest cells with every tied location,
//!   pruned with precomputed per-tile min/max summaries
//! - **Arbitration**: the most precise source wins, with a land/water
//!   classifier keeping land datasets away from the sea
//!
//! ## Quick Start
//!
//! ```ignore
//! use heightmap::HeightInfoBuilder;
//!
//! // Discover every dataset under the data directory
//! let info = HeightInfoBuilder::new("/data").build()?;
//!
//! let point = info.get_height(35.3606, 138.7274)?;
//! println!("{} m ({})", point.altitude, point.source);
//!
//! let peak = info.get_max_height(35.0, 138.0, 36.0, 139.0)?;
//! println!("{} m at {:?}", peak.extremum.value, peak.extremum.locations);
//! ```
//!
//! ## Single datasets
//!
//! ```ignore
//! use heightmap::{GridSource, SourceEngine};
//!
//! let srtm = SourceEngine::builder(GridSource::srtm1(), "/data/srtm1")
//!     .cache_file("/data/srtm1_map_cache.json")
//!     .build()?;
//! let result = srtm.get_height(46.5586, 7.8322)?;
//! ```
//!
//! ## Data layout
//!
//! Every grid is a headerless array of big-endian `i16` or `f32` samples
//! (ETOPO1 is little-endian). A missing reading is the dataset's NODATA value,
//! reported unchanged in [`ElevationResult::altitude`]; the arbitrator's own
//! "nothing found" value is [`NODATA`].

pub mod arbitrator;
pub mod cache;
pub mod classifier;
pub mod dataset;
pub mod error;
pub mod filename;
pub mod geodesy;
pub mod grid;
pub mod projection;
pub mod search;
pub mod source;
pub mod tile;
pub mod types;

#[cfg(test)]
mod testutil;

// Re-export main types at crate root for convenience
pub use arbitrator::{Acceptance, HeightInfo, HeightInfoBuilder};
pub use cache::{MinMaxCache, TileSummary};
pub use classifier::{FixedClassifier, RasterClassifier, SurfaceClassifier};
pub use dataset::{Dataset, Earth2014Surface, Etopo1Surface, GridSource, SrtmResolution};
pub use error::{HeightError, Result};
pub use projection::CoordinateSystem;
pub use search::SearchKind;
pub use source::{CacheStats, SourceEngine, SourceEngineBuilder};
pub use tile::{ByteOrder, ElementType, GridFile};
pub use types::{
    Attribution, ElevationResult, Extremum, ExtremumResult, Location, MinMaxResult, SurfaceKind,
    NODATA, NODATA_SOURCE,
};
