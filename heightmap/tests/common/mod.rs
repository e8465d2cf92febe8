//! Synthetic datasets shared by the integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use heightmap::grid::{Axis, GridLayout, RowOrder, Snap, TileNaming, Tiling, Wrap};
use heightmap::{
    Attribution, ByteOrder, CoordinateSystem, ElementType, GridSource, Location, TileSummary,
};

pub const NODATA: i16 = -32768;

/// Samples per side of a [`quarter_degree`] tile.
pub const TINY: usize = 5;

/// SRTM-like tiles with quarter-degree cells.
pub fn quarter_degree() -> GridSource {
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
        nodata: NODATA as f64,
        layout: GridLayout {
            x: Axis::new(0.0, 0.25, Snap::Nearest),
            y: Axis::new(0.0, 0.25, Snap::Nearest),
            wrap: Some(Wrap {
                first: -720,
                period: 1440,
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

/// Single north-up file with its south-west node at 0°N 0°E.
pub fn single_grid(name: &'static str, rows: usize, cols: usize, cell_size: f64) -> GridSource {
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
                row_order: RowOrder::NorthUp,
                clamp_rows: false,
                blocks: None,
            },
        },
        ..quarter_degree()
    }
}

/// Write a square i16 tile of `fill` with some cells overridden.
pub fn write_tile(path: &Path, samples: usize, fill: i16, cells: &[(usize, usize, i16)]) {
    let mut values = vec![fill; samples * samples];
    for &(row, col, value) in cells {
        values[row * samples + col] = value;
    }
    write_i16(path, &values);
}

/// Write a `rows × cols` i16 grid from `value(file_row, file_col)`.
pub fn write_grid(path: &Path, rows: usize, cols: usize, value: impl Fn(usize, usize) -> i16) {
    let values: Vec<i16> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .map(|(row, col)| value(row, col))
        .collect();
    write_i16(path, &values);
}

fn write_i16(path: &Path, values: &[i16]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
    fs::write(path, bytes).unwrap();
}

/// Exact summary of an i16 tile file.
pub fn summarize_i16(path: &Path) -> TileSummary {
    let bytes = fs::read(path).unwrap();
    let values = bytes
        .chunks_exact(2)
        .map(|b| f64::from(i16::from_be_bytes([b[0], b[1]])));
    TileSummary::from_values(values, NODATA as f64)
}

/// Write a min/max cache summarising the named i16 tiles of `dir`.
pub fn write_cache(cache: &Path, dir: &Path, names: &[&str]) {
    let entries: BTreeMap<_, _> = names
        .iter()
        .map(|name| (name.to_string(), summarize_i16(&dir.join(name))))
        .collect();
    fs::write(cache, serde_json::to_string(&entries).unwrap()).unwrap();
}

pub fn assert_near(actual: Location, expected: Location) {
    assert!(
        (actual.lat - expected.lat).abs() < 1e-9 && (actual.lon - expected.lon).abs() < 1e-9,
        "{actual:?} != {expected:?}"
    );
}
