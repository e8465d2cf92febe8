//! Per-dataset query engine.
//!
//! A [`SourceEngine`] answers point and rectangle queries against one
//! [`GridSource`]: it adapts WGS84 coordinates to the dataset's native grid,
//! resolves cells to files, and keeps recently opened files in a small
//! concurrent cache.
//!
//! ```ignore
//! use heightmap::{GridSource, SourceEngine};
//!
//! let srtm = SourceEngine::builder(GridSource::srtm1(), "/data/srtm1")
//!     .cache_file("/data/srtm1_map_cache.json")
//!     .file_cache_size(4)
//!     .build()?;
//!
//! let point = srtm.get_height(46.5586, 7.8322)?;
//! let peak = srtm.get_max_height(46.5, 7.9, 46.6, 8.1)?;
//! println!("{} m at {:?}", peak.extremum.value, peak.extremum.locations);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, error, info};

use crate::cache::MinMaxCache;
use crate::dataset::GridSource;
use crate::error::{HeightError, Result};
use crate::geodesy::distance_m;
use crate::grid::{TileFile, TileRegion};
use crate::projection::CoordinateAdapter;
use crate::search::{prune, Candidate, Direction, Extreme, SearchKind};
use crate::tile::GridFile;
use crate::types::{
    check_coordinates, check_rectangle, ElevationResult, Extremum, ExtremumResult, Location,
    MinMaxResult,
};

/// Statistics about the open-file cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of files currently in the cache.
    pub entry_count: u64,
    /// Number of reads served from an already open file.
    pub hit_count: u64,
    /// Number of files opened from disk.
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

type Cells = Vec<(i64, i64)>;

/// Raw outcome of a rectangle scan, global cell indices per extreme.
struct Scan {
    max: (f64, Cells),
    min: (f64, Cells),
}

/// Query engine for one dataset.
///
/// Engines are `Send + Sync`; share one instance across threads. All
/// queries are blocking.
pub struct SourceEngine {
    source: GridSource,
    data_dir: PathBuf,
    adapter: CoordinateAdapter,
    summaries: Option<MinMaxCache>,
    pruning: bool,
    /// Open files keyed by path relative to `data_dir`.
    files: Option<Cache<String, Arc<GridFile>>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SourceEngine {
    /// Create a builder for `source` with files under `data_dir`.
    pub fn builder<P: AsRef<Path>>(source: GridSource, data_dir: P) -> SourceEngineBuilder {
        SourceEngineBuilder::new(source, data_dir)
    }

    /// The dataset this engine reads.
    pub fn source(&self) -> &GridSource {
        &self.source
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The min/max cache, if one was loaded.
    pub fn summaries(&self) -> Option<&MinMaxCache> {
        self.summaries.as_ref()
    }

    /// Elevation of the grid cell nearest to `(lat, lon)`.
    ///
    /// Locations outside the dataset, failed projections and missing tile
    /// files all give a NODATA result.
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::InvalidCoordinate`] for coordinates outside the
    /// WGS84 range, and IO or size errors for unreadable tile files.
    pub fn get_height(&self, lat: f64, lon: f64) -> Result<ElevationResult> {
        check_coordinates(lat, lon)?;
        let query = Location::new(lat, lon);

        let Some((x, y)) = self.adapter.to_native(lat, lon) else {
            return Ok(self.nodata_result(query));
        };

        for cell in self.source.layout.locate(x, y) {
            let Some(file) = self.open(&cell.tile)? else {
                continue;
            };
            let value = file.value(cell.file_row(), cell.file_col());
            let altitude = if value.is_nan() { self.source.nodata } else { value };

            let (fx, fy) = self.source.layout.reference(cell.row, cell.col);
            let found = self.adapter.to_wgs84(fx, fy).unwrap_or(query);

            return Ok(ElevationResult {
                altitude,
                source: self.source.name.to_string(),
                query,
                found,
                distance_m: distance_m(query, found),
                attributions: vec![self.source.attribution],
                precision_m: self.source.precision_m,
                seabed_included: self.source.seabed_included,
                surface: None,
                nodata: self.source.nodata,
            });
        }

        Ok(self.nodata_result(query))
    }

    /// Highest cells inside the rectangle, with every tied location.
    ///
    /// An inverted rectangle, or one that does not intersect the dataset,
    /// gives a NODATA result with no locations.
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::InvalidCoordinate`] for corners outside the
    /// WGS84 range, [`HeightError::MissingTile`] and
    /// [`HeightError::CacheInconsistent`] when the tiles on disk disagree with
    /// the min/max cache.
    pub fn get_max_height(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<ExtremumResult> {
        let scan = self.search(SearchKind::Max, lat_ll, lon_ll, lat_ur, lon_ur)?;
        Ok(self.extremum_result(scan.max))
    }

    /// Lowest cells inside the rectangle, with every tied location.
    ///
    /// See [`SourceEngine::get_max_height`] for errors and empty results.
    pub fn get_min_height(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<ExtremumResult> {
        let scan = self.search(SearchKind::Min, lat_ll, lon_ll, lat_ur, lon_ur)?;
        Ok(self.extremum_result(scan.min))
    }

    /// Lowest and highest cells inside the rectangle in one scan.
    pub fn get_min_max_height(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<MinMaxResult> {
        let scan = self.search(SearchKind::MinMax, lat_ll, lon_ll, lat_ur, lon_ur)?;
        Ok(MinMaxResult {
            min: self.extremum(scan.min),
            max: self.extremum(scan.max),
            source: self.source.name.to_string(),
            attributions: vec![self.source.attribution],
            precision_m: self.source.precision_m,
            seabed_included: self.source.seabed_included,
            nodata: self.source.nodata,
        })
    }

    /// Get open-file cache statistics.
    pub fn file_cache_stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.files.as_ref().map_or(0, |c| c.entry_count()),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    fn search(
        &self,
        kind: SearchKind,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<Scan> {
        let nodata = self.source.nodata;
        let mut max = Extreme::new(Direction::Max, nodata);
        let mut min = Extreme::new(Direction::Min, nodata);
        let empty = || Scan {
            max: (nodata, Vec::new()),
            min: (nodata, Vec::new()),
        };

        if !check_rectangle(lat_ll, lon_ll, lat_ur, lon_ur)? {
            debug!(source = self.source.name, "inverted rectangle");
            return Ok(empty());
        }
        let (Some(lower_left), Some(upper_right)) = (
            self.adapter.to_native(lat_ll, lon_ll),
            self.adapter.to_native(lat_ur, lon_ur),
        ) else {
            return Ok(empty());
        };
        let Some(window) = self.source.layout.index_window(lower_left, upper_right) else {
            return Ok(empty());
        };

        let regions = self.source.layout.decompose(&window);
        let tiles = regions.len();
        let mut candidates = self.resolve(regions)?;
        if self.pruning {
            candidates = prune(kind, candidates, nodata);
        }
        debug!(
            source = self.source.name,
            cells = window.cells(),
            tiles,
            scanned = candidates.len(),
            "rectangle search"
        );

        for candidate in &candidates {
            let tile = &candidate.region.tile;
            let Some(file) = self.open(tile)? else {
                continue;
            };
            let window = candidate.region.window;
            let (col_lo, col_hi) = (tile.file_col(window.col_lo), tile.file_col(window.col_hi));

            for row in candidate.region.rows_in_file_order() {
                let values = file.row_segment(tile.file_row(row), col_lo, col_hi);
                for (col, value) in (window.col_lo..).zip(values) {
                    if kind.wants_max() {
                        max.offer(value, || (row, col));
                    }
                    if kind.wants_min() {
                        min.offer(value, || (row, col));
                    }
                }
            }
        }

        Ok(Scan {
            max: max.into_parts(),
            min: min.into_parts(),
        })
    }

    /// Pair every region with its cached summary and check that disk and
    /// cache agree.
    fn resolve(&self, regions: BTreeMap<String, TileRegion>) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(regions.len());

        for (key, region) in regions {
            let path = self.data_dir.join(&region.tile.file);
            let on_disk = path.is_file();
            let summary = self.summaries.as_ref().and_then(|c| c.get(&key)).copied();

            match (on_disk, summary) {
                (true, None) if self.summaries.is_some() => {
                    error!(source = self.source.name, tile = %key, "tile missing from min/max cache");
                    return Err(HeightError::CacheInconsistent {
                        dataset: self.source.name.to_string(),
                        reason: format!("tile {key} exists on disk but not in the min/max cache"),
                    });
                }
                (true, summary) => candidates.push(Candidate { region, summary }),
                (false, Some(_)) => {
                    error!(source = self.source.name, tile = %key, path = %path.display(), "cached tile missing on disk");
                    return Err(HeightError::MissingTile { name: key, path });
                }
                (false, None) => {}
            }
        }

        Ok(candidates)
    }

    /// Open a tile file, `None` if it does not exist.
    fn open(&self, tile: &TileFile) -> Result<Option<Arc<GridFile>>> {
        if let Some(file) = self.files.as_ref().and_then(|c| c.get(&tile.file)) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(file));
        }

        let path = self.data_dir.join(&tile.file);
        if !path.is_file() {
            return Ok(None);
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let file = Arc::new(GridFile::open(
            &path,
            tile.rows,
            tile.cols,
            self.source.element,
            self.source.byte_order,
        )?);
        if let Some(cache) = &self.files {
            cache.insert(tile.file.clone(), Arc::clone(&file));
        }
        Ok(Some(file))
    }

    fn nodata_result(&self, query: Location) -> ElevationResult {
        ElevationResult {
            altitude: self.source.nodata,
            source: self.source.name.to_string(),
            query,
            found: query,
            distance_m: 0.0,
            attributions: vec![self.source.attribution],
            precision_m: self.source.precision_m,
            seabed_included: self.source.seabed_included,
            surface: None,
            nodata: self.source.nodata,
        }
    }

    fn extremum(&self, (value, cells): (f64, Cells)) -> Extremum {
        let locations = cells
            .into_iter()
            .filter_map(|(row, col)| {
                let (x, y) = self.source.layout.reference(row, col);
                self.adapter.to_wgs84(x, y)
            })
            .collect();
        Extremum::new(value, locations)
    }

    fn extremum_result(&self, found: (f64, Cells)) -> ExtremumResult {
        ExtremumResult {
            extremum: self.extremum(found),
            source: self.source.name.to_string(),
            attributions: vec![self.source.attribution],
            precision_m: self.source.precision_m,
            seabed_included: self.source.seabed_included,
            nodata: self.source.nodata,
        }
    }
}

/// Builder for [`SourceEngine`].
///
/// # Example
///
/// ```ignore
/// use heightmap::{GridSource, SourceEngineBuilder};
///
/// let dgm200 = SourceEngineBuilder::new(GridSource::dgm200(), "/data/dgm200")
///     .file_cache_size(0)
///     .build()?;
/// ```
pub struct SourceEngineBuilder {
    source: GridSource,
    data_dir: PathBuf,
    cache_file: Option<PathBuf>,
    file_cache_size: u64,
    pruning: bool,
}

impl SourceEngineBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(source: GridSource, data_dir: P) -> Self {
        Self {
            source,
            data_dir: data_dir.as_ref().to_path_buf(),
            cache_file: None,
            file_cache_size: 1,
            pruning: true,
        }
    }

    /// Set the min/max cache file.
    pub fn cache_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the number of open files to keep.
    ///
    /// Default is 1. `0` disables the cache.
    pub fn file_cache_size(mut self, size: u64) -> Self {
        self.file_cache_size = size;
        self
    }

    /// Enable or disable cache-based pruning of rectangle searches.
    ///
    /// Default is enabled. Disabled pruning scans every tile of a rectangle
    /// and makes the min/max cache optional.
    pub fn pruning(mut self, enabled: bool) -> Self {
        self.pruning = enabled;
        self
    }

    /// Build the [`SourceEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::CacheInconsistent`] if the dataset needs a
    /// min/max cache for pruning and none is available, a cache error if the
    /// cache file is malformed, and [`HeightError::Projection`] if the
    /// dataset's projection cannot be set up.
    pub fn build(self) -> Result<SourceEngine> {
        let name = self.source.name;
        let adapter = CoordinateAdapter::new(self.source.crs, self.source.extent)?;

        let summaries = match &self.cache_file {
            Some(path) if path.is_file() => Some(MinMaxCache::load(path)?),
            Some(path) => {
                error!(source = name, path = %path.display(), "min/max cache file not found");
                return Err(HeightError::CacheInconsistent {
                    dataset: name.to_string(),
                    reason: format!("cache file {} not found", path.display()),
                });
            }
            None if self.pruning && self.source.layout.needs_summaries() => {
                error!(source = name, "no min/max cache configured");
                return Err(HeightError::CacheInconsistent {
                    dataset: name.to_string(),
                    reason: "no min/max cache configured".to_string(),
                });
            }
            None => None,
        };

        let files = (self.file_cache_size > 0)
            .then(|| Cache::builder().max_capacity(self.file_cache_size).build());

        info!(
            source = name,
            data_dir = %self.data_dir.display(),
            cached_tiles = summaries.as_ref().map_or(0, MinMaxCache::len),
            file_cache_size = self.file_cache_size,
            pruning = self.pruning,
            "source engine ready"
        );

        Ok(SourceEngine {
            source: self.source,
            data_dir: self.data_dir,
            adapter,
            summaries,
            pruning: self.pruning,
            files,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }
}
