//! Synthetic grids for unit tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::cache::TileSummary;
use crate::dataset::GridSource;
use crate::grid::{Axis, GridLayout, Snap, TileNaming, Tiling, Wrap};
use crate::projection::CoordinateSystem;
use crate::tile::{ByteOrder, ElementType};
use crate::types::Attribution;

/// Samples per side of a [`quarter_degree_source`] tile.
pub const TILE: usize = 5;

const NODATA: f64 = -32768.0;

/// SRTM-like source with quarter-degree cells: 5 × 5 samples per `.hgt` tile.
pub fn quarter_degree_source() -> GridSource {
    GridSource {
        name: "TINY",
        attribution: Attribution {
            name: "TINY",
            url: "https://example.org/tiny",
        },
        crs: CoordinateSystem::Geographic,
        extent: None,
        element: ElementType::I16,
        byte_order: ByteOrder::BigEndian,
        nodata: NODATA,
        layout: GridLayout {
            x: Axis::new(0.0, 0.25, Snap::Nearest),
            y: Axis::new(0.0, 0.25, Snap::Nearest),
            wrap: Some(Wrap {
                first: -180 * 4,
                period: 360 * 4,
            }),
            tiling: Tiling::Tiled {
                naming: TileNaming::Hgt,
                stride: 4,
                overlap: 1,
            },
        },
        seabed_included: false,
        precision_m: None,
    }
}

/// Write a tile of zeros with some cells set, given as `(file_row, file_col, value)`.
pub fn write_i16_tile(dir: &Path, name: &str, cells: &[(usize, usize, i16)]) {
    let mut values = vec![0i16; TILE * TILE];
    for &(row, col, value) in cells {
        values[row * TILE + col] = value;
    }
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
    fs::write(dir.join(name), bytes).unwrap();
}

/// Write `cache.json` for the named tiles of `dir`, summarising the ones on
/// disk and inventing an entry for the others.
pub fn write_cache(dir: &Path, names: &[&str]) {
    let mut entries = BTreeMap::new();
    for name in names {
        let summary = match fs::read(dir.join(name)) {
            Ok(bytes) => TileSummary::from_values(
                bytes
                    .chunks_exact(2)
                    .map(|b| i16::from_be_bytes([b[0], b[1]]) as f64),
                NODATA,
            ),
            Err(_) => TileSummary {
                h_min: 0.0,
                h_max: 0.0,
                counter_min: 1,
                counter_max: 1,
            },
        };
        entries.insert(name.to_string(), summary);
    }
    fs::write(
        dir.join("cache.json"),
        serde_json::to_string(&entries).unwrap(),
    )
    .unwrap();
}

/// North-up i16 grid in one file, `cell_size` degrees per cell, with its
/// south-west node at 0°N 0°E.
pub fn monolithic_source(name: &'static str, rows: usize, cols: usize, cell_size: f64) -> GridSource {
    GridSource {
        name,
        attribution: Attribution {
            name,
            url: "https://example.org/grid",
        },
        layout: GridLayout {
            x: Axis::new(0.0, cell_size, Snap::Nearest),
            y: Axis::new(0.0, cell_size, Snap::Nearest),
            wrap: None,
            tiling: Tiling::Monolithic {
                file_name: format!("{}.bin", name.to_lowercase()),
                rows,
                cols,
                row_order: crate::grid::RowOrder::NorthUp,
                clamp_rows: false,
                blocks: None,
            },
        },
        ..quarter_degree_source()
    }
}

/// Fill the file of a [`monolithic_source`] from `value(file_row, file_col)`.
pub fn write_monolithic(dir: &Path, source: &GridSource, value: impl Fn(usize, usize) -> i16) {
    let Tiling::Monolithic {
        file_name,
        rows,
        cols,
        ..
    } = &source.layout.tiling
    else {
        panic!("{} is not monolithic", source.name);
    };
    let mut bytes = Vec::with_capacity(rows * cols * 2);
    for row in 0..*rows {
        for col in 0..*cols {
            bytes.extend_from_slice(&value(row, col).to_be_bytes());
        }
    }
    fs::write(dir.join(file_name), bytes).unwrap();
}
