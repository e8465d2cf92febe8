//! Per-tile min/max summaries used to prune rectangle searches.
//!
//! The cache is a JSON object built offline, one entry per tile:
//!
//! ```json
//! {"N35E138.hgt": {"h_min": -12, "h_max": 3776, "counter_min": 1, "counter_max": 1}}
//! ```
//!
//! It is loaded once and never modified afterwards. [`MinMaxCache::build`]
//! creates it from the files of a dataset.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::GridSource;
use crate::error::{HeightError, Result};
use crate::grid::{IndexWindow, TileNaming, Tiling};
use crate::tile::GridFile;

/// Extremes of one tile.
///
/// `h_max` equals the dataset's NODATA value for a tile without valid cells;
/// `h_min` likewise when no cell is above NODATA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSummary {
    pub h_min: f64,
    pub h_max: f64,
    #[serde(default)]
    pub counter_min: u64,
    #[serde(default)]
    pub counter_max: u64,
}

impl TileSummary {
    /// Exact extremes of `values`, NODATA and NaN excluded.
    pub fn from_values(values: impl IntoIterator<Item = f64>, nodata: f64) -> Self {
        let mut summary = Self {
            h_min: nodata,
            h_max: nodata,
            counter_min: 0,
            counter_max: 0,
        };
        for v in values {
            if v == nodata || v.is_nan() {
                continue;
            }
            if summary.counter_max == 0 || v > summary.h_max {
                summary.h_max = v;
                summary.counter_max = 1;
            } else if v == summary.h_max {
                summary.counter_max += 1;
            }
            if summary.counter_min == 0 || v < summary.h_min {
                summary.h_min = v;
                summary.counter_min = 1;
            } else if v == summary.h_min {
                summary.counter_min += 1;
            }
        }
        summary
    }
}

/// Immutable map from tile key to [`TileSummary`].
#[derive(Debug, Clone, Default)]
pub struct MinMaxCache {
    entries: HashMap<String, TileSummary>,
}

impl MinMaxCache {
    /// Load a cache file.
    ///
    /// # Errors
    ///
    /// Returns [`HeightError::Io`] if the file cannot be read and
    /// [`HeightError::CacheFormat`] if it is not a valid cache.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let entries = serde_json::from_reader(reader).map_err(|source| HeightError::CacheFormat {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { entries })
    }

    /// Build a cache from in-memory entries.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TileSummary)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TileSummary> {
        self.entries.get(key)
    }

    /// Number of tiles in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summarise every tile of `source` found under `data_dir`.
    ///
    /// Tiled datasets are summarised file by file, keyed by file name.
    /// Block-summarised monolithic grids get one entry per block. Other
    /// monolithic grids need no cache and give an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or has the wrong size.
    pub fn build<P: AsRef<Path>>(source: &GridSource, data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let mut entries = HashMap::new();

        match &source.layout.tiling {
            Tiling::Tiled {
                naming,
                stride,
                overlap,
            } => {
                let size = (stride + overlap) as usize;
                let extension = match naming {
                    TileNaming::Hgt => "hgt",
                    _ => "bin",
                };
                for path in files_with_extension(data_dir, extension)? {
                    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    let file = GridFile::open(&path, size, size, source.element, source.byte_order)?;
                    let summary = TileSummary::from_values(file.values(), source.nodata);
                    debug!(tile = name, h_min = summary.h_min, h_max = summary.h_max, "tile summarised");
                    entries.insert(name.to_string(), summary);
                }
            }
            Tiling::Monolithic {
                file_name,
                rows,
                cols,
                blocks: Some(_),
                ..
            } => {
                let file = GridFile::open(
                    data_dir.join(file_name),
                    *rows,
                    *cols,
                    source.element,
                    source.byte_order,
                )?;
                let whole = IndexWindow {
                    row_lo: 0,
                    row_hi: *rows as i64 - 1,
                    col_lo: 0,
                    col_hi: *cols as i64 - 1,
                };
                for (key, region) in source.layout.decompose(&whole) {
                    let tile = &region.tile;
                    let (col_lo, col_hi) = (
                        tile.file_col(region.window.col_lo),
                        tile.file_col(region.window.col_hi),
                    );
                    let values = (region.window.row_lo..=region.window.row_hi)
                        .flat_map(|row| file.row_segment(tile.file_row(row), col_lo, col_hi));
                    entries.insert(key, TileSummary::from_values(values, source.nodata));
                }
            }
            Tiling::Monolithic { blocks: None, .. } => {}
        }

        info!(source = source.name, tiles = entries.len(), "min/max cache built");
        Ok(Self { entries })
    }

    /// Write the cache as JSON, keys sorted.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let sorted: BTreeMap<_, _> = self.entries.iter().collect();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &sorted).map_err(|source| HeightError::CacheFormat {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Files below `dir` with the given extension, sorted, subdirectories
/// included.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
