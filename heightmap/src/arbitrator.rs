//! Multi-source arbitration.
//!
//! [`HeightInfo`] holds one [`SourceEngine`] per discovered dataset and
//! answers every query from the most precise source that has an acceptable
//! value, consulting a [`SurfaceClassifier`] to avoid reporting land
//! elevations for points at sea.
//!
//! # Example
//!
//! ```ignore
//! use heightmap::HeightInfoBuilder;
//!
//! let info = HeightInfoBuilder::new("/data")
//!     .max_distance_m(50.0)
//!     .build()?;
//!
//! let result = info.get_height(51.4779, -0.0015)?;
//! println!("{} m from {}", result.altitude, result.source);
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classifier::{FixedClassifier, RasterClassifier, SurfaceClassifier};
use crate::dataset::{Dataset, Earth2014Surface, Etopo1Surface, GridSource};
use crate::error::{HeightError, Result};
use crate::source::SourceEngine;
use crate::types::{
    check_coordinates, check_rectangle, ElevationResult, ExtremumResult, Location, MinMaxResult,
    SurfaceKind,
};

/// Default distance limit for the high-resolution DGM200 tier.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 25.0;

/// Default tie limit for min+max rectangle answers.
pub const DEFAULT_MAX_TIES: usize = 50;

/// Default resolution of the water bodies raster.
pub const DEFAULT_WATER_BODIES_CELLS_PER_DEGREE: usize = 720;

/// Rule a point result must satisfy to be returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    /// Valid, closer than `max_distance_m` to the query, and not at sea.
    Nearby { max_distance_m: f64 },
    /// Valid, and either not at sea or above sea level.
    DryLand,
    /// Valid and not at sea.
    NotOcean,
    /// Any valid value.
    Any,
}

impl Acceptance {
    pub fn accepts(&self, result: &ElevationResult, ocean: bool) -> bool {
        if result.is_nodata() {
            return false;
        }
        match *self {
            Acceptance::Nearby { max_distance_m } => result.distance_m < max_distance_m && !ocean,
            Acceptance::DryLand => !ocean || result.altitude > 0.0,
            Acceptance::NotOcean => !ocean,
            Acceptance::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tier {
    dataset: Dataset,
    acceptance: Acceptance,
}

fn point_tiers(max_distance_m: f64) -> Vec<Tier> {
    use Acceptance::*;
    [
        (Dataset::Dgm200, Nearby { max_distance_m }),
        (Dataset::Terrain50, DryLand),
        (Dataset::BdAlti75, DryLand),
        (Dataset::Srtm1, DryLand),
        (Dataset::Dgm200, NotOcean),
        (Dataset::Gebco, Any),
        (Dataset::Earth2014, Any),
        (Dataset::Etopo1, Any),
    ]
    .into_iter()
    .map(|(dataset, acceptance)| Tier {
        dataset,
        acceptance,
    })
    .collect()
}

/// Rectangle searches take the first source with data, most precise first.
const RECTANGLE_ORDER: [Dataset; 7] = [
    Dataset::Terrain50,
    Dataset::BdAlti75,
    Dataset::Dgm200,
    Dataset::Srtm1,
    Dataset::Gebco,
    Dataset::Earth2014,
    Dataset::Etopo1,
];

/// Elevation service over every configured dataset.
///
/// `HeightInfo` is `Send + Sync`; wrap it in an `Arc` to share it.
pub struct HeightInfo {
    engines: BTreeMap<Dataset, Arc<SourceEngine>>,
    classifier: Arc<dyn SurfaceClassifier>,
    tiers: Vec<Tier>,
    max_distance_m: f64,
    max_ties: usize,
}

impl HeightInfo {
    /// A builder without a data directory: only engines added with
    /// [`HeightInfoBuilder::engine`] are used.
    pub fn builder() -> HeightInfoBuilder {
        HeightInfoBuilder::default()
    }

    /// Datasets with an engine, in priority-independent order.
    pub fn datasets(&self) -> Vec<Dataset> {
        self.engines.keys().copied().collect()
    }

    pub fn engine(&self, dataset: Dataset) -> Option<&Arc<SourceEngine>> {
        self.engines.get(&dataset)
    }

    pub fn max_distance_m(&self) -> f64 {
        self.max_distance_m
    }

    pub fn max_ties(&self) -> usize {
        self.max_ties
    }

    /// Elevation at `(lat, lon)` from the best source that accepts it.
    ///
    /// The result carries the classifier's label in `surface`. If no source
    /// accepts the point the result is NODATA with source `"NODATA"`.
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::InvalidCoordinate`] for coordinates outside the
    /// WGS84 range, and any error raised by a source or the classifier.
    pub fn get_height(&self, lat: f64, lon: f64) -> Result<ElevationResult> {
        check_coordinates(lat, lon)?;
        let surface = self.classifier.classify(lat, lon)?;
        let ocean = surface == Some(SurfaceKind::Ocean);

        // DGM200 sits in two tiers; query each engine once
        let mut answered: BTreeMap<Dataset, ElevationResult> = BTreeMap::new();

        for tier in &self.tiers {
            let Some(engine) = self.engines.get(&tier.dataset) else {
                continue;
            };
            let result = match answered.entry(tier.dataset) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(engine.get_height(lat, lon)?),
            };

            if tier.acceptance.accepts(result, ocean) {
                let mut result = result.clone();
                result.surface = surface;
                if surface.is_some() {
                    result.attributions.extend(self.classifier.attribution());
                }
                return Ok(result);
            }
            debug!(
                dataset = %tier.dataset,
                acceptance = ?tier.acceptance,
                altitude = result.altitude,
                distance_m = result.distance_m,
                ocean,
                "point not accepted, falling through"
            );
        }

        Ok(ElevationResult::nowhere(Location::new(lat, lon), surface))
    }

    /// Highest cells of the rectangle from the first source with data.
    pub fn get_max_height(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<ExtremumResult> {
        self.first_extremum(lat_ll, lon_ll, lat_ur, lon_ur, |engine| {
            engine.get_max_height(lat_ll, lon_ll, lat_ur, lon_ur)
        })
    }

    /// Lowest cells of the rectangle from the first source with data.
    pub fn get_min_height(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<ExtremumResult> {
        self.first_extremum(lat_ll, lon_ll, lat_ur, lon_ur, |engine| {
            engine.get_min_height(lat_ll, lon_ll, lat_ur, lon_ur)
        })
    }

    /// Lowest and highest cells of the rectangle.
    ///
    /// A source is accepted when both extremes are valid, differ, and each
    /// has at most [`max_ties`](Self::max_ties) locations.
    pub fn get_min_max_height(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
    ) -> Result<MinMaxResult> {
        if !check_rectangle(lat_ll, lon_ll, lat_ur, lon_ur)? {
            return Ok(MinMaxResult::nowhere());
        }

        for dataset in RECTANGLE_ORDER {
            let Some(engine) = self.engines.get(&dataset) else {
                continue;
            };
            let result = engine.get_min_max_height(lat_ll, lon_ll, lat_ur, lon_ur)?;
            let accepted = !result.is_nodata()
                && result.min.value != result.max.value
                && result.min.count <= self.max_ties
                && result.max.count <= self.max_ties;
            if accepted {
                return Ok(result);
            }
            debug!(
                dataset = %dataset,
                min = result.min.value,
                max = result.max.value,
                min_count = result.min.count,
                max_count = result.max.count,
                "min/max not accepted, falling through"
            );
        }

        Ok(MinMaxResult::nowhere())
    }

    fn first_extremum(
        &self,
        lat_ll: f64,
        lon_ll: f64,
        lat_ur: f64,
        lon_ur: f64,
        search: impl Fn(&SourceEngine) -> Result<ExtremumResult>,
    ) -> Result<ExtremumResult> {
        if !check_rectangle(lat_ll, lon_ll, lat_ur, lon_ur)? {
            return Ok(ExtremumResult::nowhere());
        }

        for dataset in RECTANGLE_ORDER {
            let Some(engine) = self.engines.get(&dataset) else {
                continue;
            };
            let result = search(engine)?;
            if !result.is_nodata() {
                return Ok(result);
            }
            debug!(dataset = %dataset, "no data in rectangle, falling through");
        }

        Ok(ExtremumResult::nowhere())
    }
}

/// Builder for [`HeightInfo`].
///
/// Datasets are discovered under the data directory:
///
/// | Dataset | Expected path |
/// |---------|---------------|
/// | SRTM1 | `srtm1/` |
/// | OS Terrain 50 | `os_terr50_gb/` |
/// | BD ALTI 75 | `bd_alti75/` |
/// | DGM200 | `dgm200/dgm200_utm32s_f4.bin` |
/// | GEBCO | `gebco/GEBCO_2020.bin` |
/// | Earth2014 | `earth2014/<surface file>` |
/// | ETOPO1 | `etopo1/<surface file>` |
///
/// Tiled datasets and GEBCO also need their `*_map_cache.json` in the cache
/// directory.
pub struct HeightInfoBuilder {
    data_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    file_cache_size: u64,
    max_distance_m: f64,
    max_ties: usize,
    water_bodies: Option<(PathBuf, usize)>,
    earth2014_surface: Earth2014Surface,
    etopo1_surface: Etopo1Surface,
    engines: BTreeMap<Dataset, Arc<SourceEngine>>,
    classifier: Option<Arc<dyn SurfaceClassifier>>,
}

impl Default for HeightInfoBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_dir: None,
            file_cache_size: 1,
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            max_ties: DEFAULT_MAX_TIES,
            water_bodies: None,
            earth2014_surface: Earth2014Surface::default(),
            etopo1_surface: Etopo1Surface::default(),
            engines: BTreeMap::new(),
            classifier: None,
        }
    }
}

impl HeightInfoBuilder {
    /// Create a builder discovering datasets under `data_dir`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: Some(data_dir.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Create a builder from environment variables.
    ///
    /// - `HEIGHTMAP_DATA_DIR`: dataset root (required)
    /// - `HEIGHTMAP_CACHE_DIR`: directory of the min/max caches (default: data dir)
    /// - `HEIGHTMAP_FILE_CACHE_SIZE`: open files kept per dataset (default: 1)
    /// - `HEIGHTMAP_MAX_DISTANCE_M`: DGM200 distance limit (default: 25)
    /// - `HEIGHTMAP_MAX_TIES`: min+max tie limit (default: 50)
    /// - `HEIGHTMAP_WATER_BODIES`: land/water raster (default: none)
    /// - `HEIGHTMAP_WATER_BODIES_CELLS_PER_DEGREE`: raster resolution (default: 720)
    ///
    /// Unparsable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::Config`] if `HEIGHTMAP_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("HEIGHTMAP_DATA_DIR").map_err(|_| {
            HeightError::Config("HEIGHTMAP_DATA_DIR environment variable not set".to_string())
        })?;

        let mut builder = Self::new(data_dir)
            .file_cache_size(env_or("HEIGHTMAP_FILE_CACHE_SIZE", 1))
            .max_distance_m(env_or("HEIGHTMAP_MAX_DISTANCE_M", DEFAULT_MAX_DISTANCE_M))
            .max_ties(env_or("HEIGHTMAP_MAX_TIES", DEFAULT_MAX_TIES));

        if let Ok(cache_dir) = std::env::var("HEIGHTMAP_CACHE_DIR") {
            builder = builder.cache_dir(cache_dir);
        }
        if let Ok(raster) = std::env::var("HEIGHTMAP_WATER_BODIES") {
            let cells_per_degree = env_or(
                "HEIGHTMAP_WATER_BODIES_CELLS_PER_DEGREE",
                DEFAULT_WATER_BODIES_CELLS_PER_DEGREE,
            );
            builder = builder.water_bodies(raster, cells_per_degree);
        }

        Ok(builder)
    }

    /// Directory holding the `*_map_cache.json` files. Defaults to the data
    /// directory.
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Number of open files each discovered engine keeps. Default is 1.
    pub fn file_cache_size(mut self, size: u64) -> Self {
        self.file_cache_size = size;
        self
    }

    /// Distance limit of the first DGM200 tier. Default is 25 m.
    pub fn max_distance_m(mut self, meters: f64) -> Self {
        self.max_distance_m = meters;
        self
    }

    /// Tie limit for min+max answers. Default is 50.
    pub fn max_ties(mut self, ties: usize) -> Self {
        self.max_ties = ties;
        self
    }

    /// Classify points with a water bodies raster.
    pub fn water_bodies<P: AsRef<Path>>(mut self, path: P, cells_per_degree: usize) -> Self {
        self.water_bodies = Some((path.as_ref().to_path_buf(), cells_per_degree));
        self
    }

    pub fn earth2014_surface(mut self, surface: Earth2014Surface) -> Self {
        self.earth2014_surface = surface;
        self
    }

    pub fn etopo1_surface(mut self, surface: Etopo1Surface) -> Self {
        self.etopo1_surface = surface;
        self
    }

    /// Use `engine` for `dataset` instead of discovering it.
    pub fn engine(mut self, dataset: Dataset, engine: Arc<SourceEngine>) -> Self {
        self.engines.insert(dataset, engine);
        self
    }

    /// Use a custom classifier. Takes precedence over
    /// [`water_bodies`](Self::water_bodies).
    pub fn classifier(mut self, classifier: Arc<dyn SurfaceClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Discover the datasets and build the [`HeightInfo`].
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::CacheInconsistent`] if a discovered dataset
    /// lacks its min/max cache, and any error from opening the water bodies
    /// raster.
    pub fn build(self) -> Result<HeightInfo> {
        let mut engines = self.engines.clone();

        if let Some(data_dir) = &self.data_dir {
            let cache_dir = self.cache_dir.as_deref().unwrap_or(data_dir.as_path());
            for dataset in Dataset::ALL {
                if engines.contains_key(&dataset) {
                    continue;
                }
                if let Some(engine) = self.discover(dataset, data_dir, cache_dir)? {
                    engines.insert(dataset, Arc::new(engine));
                }
            }
        }

        let classifier: Arc<dyn SurfaceClassifier> = match (self.classifier, &self.water_bodies) {
            (Some(classifier), _) => classifier,
            (None, Some((path, cells_per_degree))) => {
                info!(path = %path.display(), cells_per_degree, "water bodies raster loaded");
                Arc::new(RasterClassifier::open(path, *cells_per_degree)?)
            }
            (None, None) => {
                warn!("no water bodies raster configured, every point counts as not ocean");
                Arc::new(FixedClassifier(None))
            }
        };

        if engines.is_empty() {
            warn!("no elevation dataset available, every query will return NODATA");
        }

        Ok(HeightInfo {
            engines,
            classifier,
            tiers: point_tiers(self.max_distance_m),
            max_distance_m: self.max_distance_m,
            max_ties: self.max_ties,
        })
    }

    fn grid_source(&self, dataset: Dataset) -> GridSource {
        match dataset {
            Dataset::Earth2014 => GridSource::earth2014(self.earth2014_surface),
            Dataset::Etopo1 => GridSource::etopo1(self.etopo1_surface),
            other => other.grid_source(),
        }
    }

    fn discover(
        &self,
        dataset: Dataset,
        data_dir: &Path,
        cache_dir: &Path,
    ) -> Result<Option<SourceEngine>> {
        let source = self.grid_source(dataset);
        let dir = data_dir.join(dataset.directory());
        let expected = match source.monolithic_file() {
            Some(file_name) => dir.join(file_name),
            None => dir.clone(),
        };
        if !expected.exists() {
            warn!(dataset = %dataset, path = %expected.display(), "dataset not found, skipping");
            return Ok(None);
        }

        let mut builder = SourceEngine::builder(source, &dir).file_cache_size(self.file_cache_size);
        if let Some(cache_file) = dataset.cache_file_name() {
            builder = builder.cache_file(cache_dir.join(cache_file));
        }
        let engine = builder.build()?;
        info!(dataset = %dataset, path = %expected.display(), "dataset enabled");
        Ok(Some(engine))
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{monolithic_source, write_monolithic};
    use std::fs;
    use tempfile::TempDir;

    const NODATA: i16 = -32768;

    /// 101 × 101 nodes every 0.01° from 0°N 0°E.
    fn grid_engine(
        dir: &Path,
        name: &'static str,
        value: impl Fn(usize, usize) -> i16,
    ) -> Arc<SourceEngine> {
        let source = monolithic_source(name, 101, 101, 0.01);
        write_monolithic(dir, &source, value);
        Arc::new(SourceEngine::builder(source, dir).build().unwrap())
    }

    fn constant(dir: &Path, name: &'static str, value: i16) -> Arc<SourceEngine> {
        grid_engine(dir, name, move |_, _| value)
    }

    fn on(surface: SurfaceKind) -> Arc<dyn SurfaceClassifier> {
        Arc::new(FixedClassifier(Some(surface)))
    }

    #[test]
    fn test_acceptance_rules() {
        let mut result = ElevationResult::nowhere(Location::new(0.0, 0.0), None);
        assert!(!Acceptance::Any.accepts(&result, false));

        result.altitude = 0.0;
        result.distance_m = 30.0;
        assert!(Acceptance::Any.accepts(&result, true));
        assert!(!Acceptance::DryLand.accepts(&result, true));
        assert!(Acceptance::DryLand.accepts(&result, false));
        assert!(!Acceptance::NotOcean.accepts(&result, true));
        assert!(!Acceptance::Nearby { max_distance_m: 25.0 }.accepts(&result, false));
        assert!(Acceptance::Nearby { max_distance_m: 50.0 }.accepts(&result, false));

        result.altitude = 3.0;
        assert!(Acceptance::DryLand.accepts(&result, true));
    }

    #[test]
    fn test_nearby_dgm200_wins() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Dgm200, constant(temp_dir.path(), "DGM", 120))
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", 300))
            .classifier(on(SurfaceKind::Land))
            .build()
            .unwrap();

        // about 11 m from the node at 0.5°N
        let result = info.get_height(0.5001, 0.5).unwrap();
        assert_eq!(result.source, "DGM");
        assert_eq!(result.altitude, 120.0);
        assert_eq!(result.surface, Some(SurfaceKind::Land));
    }

    #[test]
    fn test_distant_dgm200_yields_to_srtm() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Dgm200, constant(temp_dir.path(), "DGM", 120))
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", 300))
            .classifier(on(SurfaceKind::Land))
            .build()
            .unwrap();

        // about 30 m from the node at 0.5°N
        let result = info.get_height(0.50027, 0.5).unwrap();
        assert_eq!(result.source, "SRTM");

        let relaxed = HeightInfo::builder()
            .engine(Dataset::Dgm200, Arc::clone(info.engine(Dataset::Dgm200).unwrap()))
            .engine(Dataset::Srtm1, Arc::clone(info.engine(Dataset::Srtm1).unwrap()))
            .classifier(on(SurfaceKind::Land))
            .max_distance_m(40.0)
            .build()
            .unwrap();
        assert_eq!(relaxed.get_height(0.50027, 0.5).unwrap().source, "DGM");
    }

    #[test]
    fn test_ocean_falls_through_to_bathymetry() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Dgm200, constant(temp_dir.path(), "DGM", NODATA))
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", 0))
            .engine(Dataset::Gebco, constant(temp_dir.path(), "GEBCO", -40))
            .classifier(on(SurfaceKind::Ocean))
            .build()
            .unwrap();

        let result = info.get_height(0.5, 0.5).unwrap();
        assert_eq!(result.source, "GEBCO");
        assert_eq!(result.altitude, -40.0);
        assert_eq!(result.surface, Some(SurfaceKind::Ocean));
    }

    #[test]
    fn test_ocean_above_sea_level_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", 5))
            .engine(Dataset::Gebco, constant(temp_dir.path(), "GEBCO", -40))
            .classifier(on(SurfaceKind::Ocean))
            .build()
            .unwrap();

        assert_eq!(info.get_height(0.5, 0.5).unwrap().source, "SRTM");
    }

    #[test]
    fn test_nothing_accepted_is_nodata() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Dgm200, constant(temp_dir.path(), "DGM", NODATA))
            .classifier(on(SurfaceKind::Water))
            .build()
            .unwrap();

        let result = info.get_height(0.5, 0.5).unwrap();
        assert!(result.is_nodata());
        assert_eq!(result.source, "NODATA");
        assert_eq!(result.surface, Some(SurfaceKind::Water));
        assert!(result.attributions.is_empty());

        let empty = HeightInfo::builder().build().unwrap();
        assert!(empty.get_height(0.5, 0.5).unwrap().is_nodata());
        assert!(empty.get_height(95.0, 0.5).is_err());
    }

    #[test]
    fn test_raster_label_is_credited() {
        let temp_dir = TempDir::new().unwrap();
        let raster = temp_dir.path().join("water_bodies.bin");
        fs::write(&raster, vec![1u8; 180 * 360]).unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", 300))
            .water_bodies(&raster, 1)
            .build()
            .unwrap();

        let result = info.get_height(0.5, 0.5).unwrap();
        assert_eq!(result.surface, Some(SurfaceKind::Land));
        assert_eq!(result.attributions.len(), 2);
        assert_eq!(result.attributions[0].name, "SRTM");
        assert_eq!(result.attributions[1], RasterClassifier::ATTRIBUTION);

        // no label, no credit
        let unlabelled = HeightInfo::builder()
            .engine(Dataset::Srtm1, Arc::clone(info.engine(Dataset::Srtm1).unwrap()))
            .build()
            .unwrap();
        assert_eq!(unlabelled.get_height(0.5, 0.5).unwrap().attributions.len(), 1);
    }

    #[test]
    fn test_dgm200_is_queried_once() {
        let temp_dir = TempDir::new().unwrap();
        let dgm = constant(temp_dir.path(), "DGM", 50);
        let info = HeightInfo::builder()
            .engine(Dataset::Dgm200, Arc::clone(&dgm))
            .classifier(on(SurfaceKind::Land))
            .build()
            .unwrap();

        // too far for the first tier, accepted by the second
        let result = info.get_height(0.503, 0.5).unwrap();
        assert_eq!(result.source, "DGM");
        let stats = dgm.file_cache_stats();
        assert_eq!(stats.hit_count + stats.miss_count, 1);
    }

    #[test]
    fn test_rectangle_takes_first_source_with_data() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", NODATA))
            .engine(Dataset::Gebco, grid_engine(temp_dir.path(), "GEBCO", |r, c| (r + c) as i16))
            .build()
            .unwrap();

        // global rows 10..=20 are file rows 80..=90
        let max = info.get_max_height(0.1, 0.1, 0.2, 0.2).unwrap();
        assert_eq!(max.source, "GEBCO");
        assert_eq!(max.extremum.value, 110.0);
        assert_eq!(max.extremum.locations, vec![Location::new(0.1, 0.2)]);

        let min = info.get_min_height(0.1, 0.1, 0.2, 0.2).unwrap();
        assert_eq!(min.extremum.value, 90.0);
        assert_eq!(min.extremum.locations, vec![Location::new(0.2, 0.1)]);

        let inverted = info.get_max_height(0.2, 0.2, 0.1, 0.1).unwrap();
        assert!(inverted.is_nodata());
        assert_eq!(inverted.source, "NODATA");
    }

    #[test]
    fn test_min_max_acceptance() {
        let temp_dir = TempDir::new().unwrap();
        let info = HeightInfo::builder()
            // flat: min equals max
            .engine(Dataset::Terrain50, constant(temp_dir.path(), "FLAT", 10))
            // 110 tied maxima
            .engine(
                Dataset::Srtm1,
                grid_engine(temp_dir.path(), "PLATEAU", |_, c| if c == 10 { 0 } else { 7 }),
            )
            .engine(Dataset::Gebco, grid_engine(temp_dir.path(), "GEBCO", |r, c| (r + c) as i16))
            .build()
            .unwrap();

        let result = info.get_min_max_height(0.1, 0.1, 0.2, 0.2).unwrap();
        assert_eq!(result.source, "GEBCO");
        assert_eq!((result.min.value, result.max.value), (90.0, 110.0));

        let tolerant = HeightInfo::builder()
            .engine(Dataset::Srtm1, Arc::clone(info.engine(Dataset::Srtm1).unwrap()))
            .max_ties(200)
            .build()
            .unwrap();
        let result = tolerant.get_min_max_height(0.1, 0.1, 0.2, 0.2).unwrap();
        assert_eq!(result.source, "PLATEAU");
        assert_eq!(result.min.count, 11);
        assert_eq!(result.max.count, 110);
    }

    #[test]
    fn test_discovery() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path();
        fs::create_dir(data_dir.join("srtm1")).unwrap();
        fs::create_dir(data_dir.join("dgm200")).unwrap();
        fs::write(data_dir.join("dgm200").join("dgm200_utm32s_f4.bin"), b"").unwrap();

        // the SRTM cache is missing
        let result = HeightInfoBuilder::new(data_dir).build();
        assert!(matches!(result, Err(HeightError::CacheInconsistent { .. })));

        fs::write(data_dir.join("srtm1_map_cache.json"), "{}").unwrap();
        let info = HeightInfoBuilder::new(data_dir).build().unwrap();
        assert_eq!(info.datasets(), vec![Dataset::Srtm1, Dataset::Dgm200]);
        assert_eq!(info.max_distance_m(), DEFAULT_MAX_DISTANCE_M);
        assert_eq!(info.max_ties(), DEFAULT_MAX_TIES);
    }

    #[test]
    fn test_discovery_with_separate_cache_dir() {
        let data_dir = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        fs::create_dir(data_dir.path().join("os_terr50_gb")).unwrap();
        fs::write(cache_dir.path().join("terr50_map_cache.json"), "{}").unwrap();

        let info = HeightInfoBuilder::new(data_dir.path())
            .cache_dir(cache_dir.path())
            .build()
            .unwrap();
        assert_eq!(info.datasets(), vec![Dataset::Terrain50]);
    }

    #[test]
    fn test_injected_engine_skips_discovery() {
        let temp_dir = TempDir::new().unwrap();
        // present on disk, but no cache: discovery would fail
        fs::create_dir(temp_dir.path().join("srtm1")).unwrap();

        let info = HeightInfoBuilder::new(temp_dir.path())
            .engine(Dataset::Srtm1, constant(temp_dir.path(), "SRTM", 1))
            .build()
            .unwrap();
        assert_eq!(info.engine(Dataset::Srtm1).unwrap().source().name, "SRTM");
    }

    #[test]
    fn test_from_env() {
        let temp_dir = TempDir::new().unwrap();
        let vars = [
            "HEIGHTMAP_DATA_DIR",
            "HEIGHTMAP_CACHE_DIR",
            "HEIGHTMAP_FILE_CACHE_SIZE",
            "HEIGHTMAP_MAX_DISTANCE_M",
            "HEIGHTMAP_MAX_TIES",
            "HEIGHTMAP_WATER_BODIES",
        ];
        let saved: Vec<_> = vars.iter().map(|v| std::env::var(v).ok()).collect();
        for var in vars {
            std::env::remove_var(var);
        }

        assert!(matches!(
            HeightInfoBuilder::from_env(),
            Err(HeightError::Config(_))
        ));

        std::env::set_var("HEIGHTMAP_DATA_DIR", temp_dir.path());
        let builder = HeightInfoBuilder::from_env().unwrap();
        assert_eq!(builder.data_dir.as_deref(), Some(temp_dir.path()));
        assert_eq!(builder.file_cache_size, 1);
        assert_eq!(builder.max_distance_m, DEFAULT_MAX_DISTANCE_M);
        assert!(builder.water_bodies.is_none());

        std::env::set_var("HEIGHTMAP_FILE_CACHE_SIZE", "4");
        std::env::set_var("HEIGHTMAP_MAX_DISTANCE_M", "12.5");
        std::env::set_var("HEIGHTMAP_MAX_TIES", "not a number");
        std::env::set_var("HEIGHTMAP_WATER_BODIES", temp_dir.path().join("wb.bin"));
        let builder = HeightInfoBuilder::from_env().unwrap();
        assert_eq!(builder.file_cache_size, 4);
        assert_eq!(builder.max_distance_m, 12.5);
        assert_eq!(builder.max_ties, DEFAULT_MAX_TIES);
        assert_eq!(
            builder.water_bodies,
            Some((temp_dir.path().join("wb.bin"), DEFAULT_WATER_BODIES_CELLS_PER_DEGREE))
        );

        for (var, value) in vars.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(var, v),
                None => std::env::remove_var(var),
            }
        }
    }
}
