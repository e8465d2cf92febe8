//! Grid addressing: native coordinates to cells, files and tile regions.
//!
//! Every dataset is described as a global grid of cells. Rows are counted
//! from the south, columns from the west, both as signed indices on an
//! [`Axis`]. A [`Tiling`] then maps global indices to a file and a position
//! inside that file.
//!
//! Tiled datasets split the global grid into square blocks of `stride` cells.
//! Each block lives in its own north-up file of `stride + overlap` cells per
//! side, so with `overlap == 1` (SRTM) the last row and column of a tile
//! repeat the first row and column of its neighbours.
//!
//! Monolithic datasets keep the whole grid in one file, north-up or south-up.
//! They may be summarised in blocks for rectangle pruning (GEBCO).

use std::collections::BTreeMap;

use crate::filename::{bd_alti_tile_name, degree_tile_name, hgt_filename, os_grid_square};

/// How a coordinate is snapped to a cell index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snap {
    /// Round half up to the nearest grid node.
    Nearest,
    /// Floor to the cell containing the coordinate.
    Floor,
}

/// One axis of a global grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    /// Native coordinate of index 0.
    pub origin: f64,
    pub cell_size: f64,
    pub snap: Snap,
}

impl Axis {
    pub const fn new(origin: f64, cell_size: f64, snap: Snap) -> Self {
        Self {
            origin,
            cell_size,
            snap,
        }
    }

    /// Index of the cell holding `coord`.
    pub fn index(&self, coord: f64) -> i64 {
        let t = (coord - self.origin) / self.cell_size;
        match self.snap {
            Snap::Nearest => (t + 0.5).floor() as i64,
            Snap::Floor => t.floor() as i64,
        }
    }

    /// Native coordinate of the lower edge of cell `index`.
    pub fn edge(&self, index: i64) -> f64 {
        self.origin + index as f64 * self.cell_size
    }

    /// Reference coordinate of cell `index`: the grid node for
    /// [`Snap::Nearest`], the cell centre for [`Snap::Floor`].
    pub fn reference(&self, index: i64) -> f64 {
        match self.snap {
            Snap::Nearest => self.edge(index),
            Snap::Floor => self.edge(index) + self.cell_size / 2.0,
        }
    }
}

/// Storage order of rows inside a monolithic file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// First row of the file is the northernmost.
    NorthUp,
    /// First row of the file is the southernmost.
    SouthUp,
}

/// Longitude wrap-around of a global grid: column `first + period` is
/// column `first` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrap {
    pub first: i64,
    pub period: i64,
}

impl Wrap {
    fn normalize(&self, col: i64) -> i64 {
        self.first + (col - self.first).rem_euclid(self.period)
    }

    fn last(&self) -> i64 {
        self.first + self.period - 1
    }
}

/// Filename scheme of a tiled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileNaming {
    /// `N35E138.hgt`, south-west corner in whole degrees.
    Hgt,
    /// `su/SU41.bin`, OS National Grid 10 km squares.
    OsGrid,
    /// `BDALTIV2_75M_FXX_0600_6900_MNT_LAMB93_IGN69.bin`, west and north edge in km.
    BdAlti,
    /// `N35E138`, whole-degree blocks of a monolithic grid.
    DegreeBlock,
}

impl TileNaming {
    /// Relative path and cache key of the block with the given native edges.
    fn name(&self, west: f64, south: f64, north: f64) -> Option<(String, String)> {
        match self {
            TileNaming::Hgt => {
                let name = hgt_filename(south.round() as i32, west.round() as i32);
                Some((name.clone(), name))
            }
            TileNaming::DegreeBlock => {
                let name = degree_tile_name(south.round() as i32, west.round() as i32);
                Some((name.clone(), name))
            }
            TileNaming::OsGrid => {
                let square = os_grid_square(west.round() as i64, south.round() as i64)?;
                let key = format!("{square}.bin");
                Some((format!("{}/{key}", square[..2].to_lowercase()), key))
            }
            TileNaming::BdAlti => {
                let west_km = (west / 1000.0).floor() as i64;
                let north_km = (north / 1000.0).floor() as i64;
                let name = bd_alti_tile_name(west_km, north_km);
                Some((name.clone(), name))
            }
        }
    }
}

/// How the global grid is stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Tiling {
    /// One file per block of `stride × stride` cells, `stride + overlap`
    /// cells per side, north-up.
    Tiled {
        naming: TileNaming,
        stride: i64,
        overlap: i64,
    },
    /// A single file holding the whole grid.
    Monolithic {
        file_name: String,
        rows: usize,
        cols: usize,
        row_order: RowOrder,
        /// Clamp row indices into the grid instead of treating them as
        /// outside (global grids reaching the poles).
        clamp_rows: bool,
        /// Summary blocks used for rectangle pruning.
        blocks: Option<(i64, TileNaming)>,
    },
}

/// Global grid plus its storage layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub x: Axis,
    pub y: Axis,
    pub wrap: Option<Wrap>,
    pub tiling: Tiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowMap {
    /// `file_row = top - row`
    Descending { top: i64 },
    /// `file_row = row - bottom`
    Ascending { bottom: i64 },
}

/// A file on disk and how global indices map into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFile {
    /// Key of the tile in the min/max cache.
    pub key: String,
    /// Path relative to the dataset directory.
    pub file: String,
    pub rows: usize,
    pub cols: usize,
    row_map: RowMap,
    col_base: i64,
}

impl TileFile {
    /// Row inside the file of global row `row`.
    pub fn file_row(&self, row: i64) -> usize {
        match self.row_map {
            RowMap::Descending { top } => (top - row) as usize,
            RowMap::Ascending { bottom } => (row - bottom) as usize,
        }
    }

    /// Column inside the file of global column `col`.
    pub fn file_col(&self, col: i64) -> usize {
        (col - self.col_base) as usize
    }
}

/// A single cell resolved to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub tile: TileFile,
    pub row: i64,
    pub col: i64,
}

impl CellRef {
    pub fn file_row(&self) -> usize {
        self.tile.file_row(self.row)
    }

    pub fn file_col(&self) -> usize {
        self.tile.file_col(self.col)
    }
}

/// An inclusive range of global rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWindow {
    pub row_lo: i64,
    pub row_hi: i64,
    pub col_lo: i64,
    pub col_hi: i64,
}

impl IndexWindow {
    /// Number of cells in the window.
    pub fn cells(&self) -> u64 {
        ((self.row_hi - self.row_lo + 1) * (self.col_hi - self.col_lo + 1)) as u64
    }
}

/// The part of a rectangle search that falls into one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRegion {
    pub tile: TileFile,
    pub window: IndexWindow,
    /// The window covers the whole tile, so the tile's cached extremes are
    /// attained inside the search rectangle.
    pub complete: bool,
}

impl TileRegion {
    /// Global rows of the window in the order they are stored in the file.
    pub fn rows_in_file_order(&self) -> Vec<i64> {
        let rows = self.window.row_lo..=self.window.row_hi;
        match self.tile.row_map {
            RowMap::Descending { .. } => rows.rev().collect(),
            RowMap::Ascending { .. } => rows.collect(),
        }
    }
}

impl GridLayout {
    /// Resolve a native coordinate to the cells that hold it.
    ///
    /// Candidates are ordered by preference. Overlapping tiles add the
    /// neighbouring tiles that repeat the same sample on their edges, so the
    /// caller can fall back to them when the first file is missing. An empty
    /// list means the coordinate lies outside the grid.
    pub fn locate(&self, x: f64, y: f64) -> Vec<CellRef> {
        let row = self.y.index(y);
        let mut col = self.x.index(x);
        if let Some(wrap) = &self.wrap {
            col = wrap.normalize(col);
        }

        match &self.tiling {
            Tiling::Tiled {
                naming,
                stride,
                overlap,
            } => {
                let br = row.div_euclid(*stride);
                let bc = col.div_euclid(*stride);
                let mut cells = vec![(row, col, br, bc)];

                if *overlap > 0 {
                    let row_edge = row == br * stride;
                    let col_edge = col == bc * stride;
                    // the same sample as the last column of the western tile
                    let alias_col = match &self.wrap {
                        Some(wrap) if col == wrap.first => col + wrap.period,
                        _ => col,
                    };
                    let alias_bc = (alias_col - 1).div_euclid(*stride);
                    if row_edge {
                        cells.push((row, col, br - 1, bc));
                    }
                    if col_edge {
                        cells.push((row, alias_col, br, alias_bc));
                    }
                    if row_edge && col_edge {
                        cells.push((row, alias_col, br - 1, alias_bc));
                    }
                }

                cells
                    .into_iter()
                    .filter_map(|(row, col, br, bc)| {
                        let tile = self.tiled_file(*naming, *stride, *overlap, br, bc)?;
                        Some(CellRef { tile, row, col })
                    })
                    .collect()
            }
            Tiling::Monolithic {
                rows,
                cols,
                clamp_rows,
                ..
            } => {
                let (rows, cols) = (*rows as i64, *cols as i64);
                let row = if *clamp_rows {
                    row.clamp(0, rows - 1)
                } else {
                    row
                };
                if !(0..rows).contains(&row) || !(0..cols).contains(&col) {
                    return Vec::new();
                }
                self.monolithic_file()
                    .map(|tile| CellRef { tile, row, col })
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Index window spanned by two native corners.
    ///
    /// Wrapped grids pull the columns into one period, so an upper-right
    /// corner on the antimeridian ends at the last column. Monolithic grids
    /// clip the window to the file. Returns `None` for an empty window.
    pub fn index_window(&self, lower_left: (f64, f64), upper_right: (f64, f64)) -> Option<IndexWindow> {
        let mut window = IndexWindow {
            row_lo: self.y.index(lower_left.1),
            row_hi: self.y.index(upper_right.1),
            col_lo: self.x.index(lower_left.0),
            col_hi: self.x.index(upper_right.0),
        };

        if let Some(wrap) = &self.wrap {
            window.col_lo = window.col_lo.clamp(wrap.first, wrap.last());
            window.col_hi = window.col_hi.clamp(wrap.first, wrap.last());
        }

        if let Tiling::Monolithic {
            rows,
            cols,
            clamp_rows,
            ..
        } = &self.tiling
        {
            let last_row = *rows as i64 - 1;
            if *clamp_rows {
                window.row_lo = window.row_lo.clamp(0, last_row);
                window.row_hi = window.row_hi.clamp(0, last_row);
            } else {
                window.row_lo = window.row_lo.max(0);
                window.row_hi = window.row_hi.min(last_row);
            }
            window.col_lo = window.col_lo.max(0);
            window.col_hi = window.col_hi.min(*cols as i64 - 1);
        }

        (window.row_lo <= window.row_hi && window.col_lo <= window.col_hi).then_some(window)
    }

    /// Split a window at block boundaries into per-tile regions, keyed by the
    /// tile's cache key.
    ///
    /// Works from the lower-left corner: each step takes the block holding
    /// the corner and queues the part above it and the part to its right.
    pub fn decompose(&self, window: &IndexWindow) -> BTreeMap<String, TileRegion> {
        let mut regions = BTreeMap::new();

        let Some(stride) = self.block_stride() else {
            if let Some(tile) = self.monolithic_file() {
                let complete = window.row_lo == 0
                    && window.col_lo == 0
                    && window.row_hi == tile.rows as i64 - 1
                    && window.col_hi == tile.cols as i64 - 1;
                regions.insert(
                    tile.key.clone(),
                    TileRegion {
                        tile,
                        window: *window,
                        complete,
                    },
                );
            }
            return regions;
        };

        let mut work = vec![*window];
        while let Some(rest) = work.pop() {
            let br = rest.row_lo.div_euclid(stride);
            let bc = rest.col_lo.div_euclid(stride);
            let extent = self.block_extent(br, bc);

            if rest.row_hi > extent.row_hi {
                work.push(IndexWindow {
                    row_lo: (br + 1) * stride,
                    row_hi: rest.row_hi,
                    col_lo: rest.col_lo,
                    col_hi: rest.col_hi.min(extent.col_hi),
                });
            }
            if rest.col_hi > extent.col_hi {
                work.push(IndexWindow {
                    row_lo: rest.row_lo,
                    row_hi: rest.row_hi,
                    col_lo: (bc + 1) * stride,
                    col_hi: rest.col_hi,
                });
            }

            let Some(tile) = self.block_file(br, bc) else {
                continue;
            };
            let region = IndexWindow {
                row_lo: rest.row_lo,
                row_hi: rest.row_hi.min(extent.row_hi),
                col_lo: rest.col_lo,
                col_hi: rest.col_hi.min(extent.col_hi),
            };
            regions.insert(
                tile.key.clone(),
                TileRegion {
                    tile,
                    window: region,
                    complete: region == extent,
                },
            );
        }

        regions
    }

    /// Whether rectangle searches need a min/max summary per tile.
    pub fn needs_summaries(&self) -> bool {
        match &self.tiling {
            Tiling::Tiled { .. } => true,
            Tiling::Monolithic { blocks, .. } => blocks.is_some(),
        }
    }

    /// Native reference coordinate `(x, y)` of a global cell.
    pub fn reference(&self, row: i64, col: i64) -> (f64, f64) {
        (self.x.reference(col), self.y.reference(row))
    }

    fn block_stride(&self) -> Option<i64> {
        match &self.tiling {
            Tiling::Tiled { stride, .. } => Some(*stride),
            Tiling::Monolithic { blocks, .. } => blocks.map(|(size, _)| size),
        }
    }

    /// Global index extent of a block, clipped to monolithic grids.
    fn block_extent(&self, br: i64, bc: i64) -> IndexWindow {
        match &self.tiling {
            Tiling::Tiled {
                stride, overlap, ..
            } => IndexWindow {
                row_lo: br * stride,
                row_hi: br * stride + stride + overlap - 1,
                col_lo: bc * stride,
                col_hi: bc * stride + stride + overlap - 1,
            },
            Tiling::Monolithic {
                rows, cols, blocks, ..
            } => {
                let size = blocks.map_or(1, |(size, _)| size);
                IndexWindow {
                    row_lo: (br * size).max(0),
                    row_hi: (br * size + size - 1).min(*rows as i64 - 1),
                    col_lo: (bc * size).max(0),
                    col_hi: (bc * size + size - 1).min(*cols as i64 - 1),
                }
            }
        }
    }

    fn block_file(&self, br: i64, bc: i64) -> Option<TileFile> {
        match &self.tiling {
            Tiling::Tiled {
                naming,
                stride,
                overlap,
            } => self.tiled_file(*naming, *stride, *overlap, br, bc),
            Tiling::Monolithic { blocks, .. } => {
                let (size, naming) = (*blocks)?;
                let (_, key) = naming.name(
                    self.x.edge(bc * size),
                    self.y.edge(br * size),
                    self.y.edge((br + 1) * size),
                )?;
                let mut tile = self.monolithic_file()?;
                tile.key = key;
                Some(tile)
            }
        }
    }

    fn tiled_file(
        &self,
        naming: TileNaming,
        stride: i64,
        overlap: i64,
        br: i64,
        bc: i64,
    ) -> Option<TileFile> {
        let (file, key) = naming.name(
            self.x.edge(bc * stride),
            self.y.edge(br * stride),
            self.y.edge((br + 1) * stride),
        )?;
        let size = stride + overlap;
        Some(TileFile {
            key,
            file,
            rows: size as usize,
            cols: size as usize,
            row_map: RowMap::Descending {
                top: br * stride + size - 1,
            },
            col_base: bc * stride,
        })
    }

    fn monolithic_file(&self) -> Option<TileFile> {
        match &self.tiling {
            Tiling::Tiled { .. } => None,
            Tiling::Monolithic {
                file_name,
                rows,
                cols,
                row_order,
                ..
            } => Some(TileFile {
                key: file_name.clone(),
                file: file_name.clone(),
                rows: *rows,
                cols: *cols,
                row_map: match row_order {
                    RowOrder::NorthUp => RowMap::Descending {
                        top: *rows as i64 - 1,
                    },
                    RowOrder::SouthUp => RowMap::Ascending { bottom: 0 },
                },
                col_base: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quarter-degree tiles with one overlapping sample, like a tiny SRTM.
    fn small_hgt_layout() -> GridLayout {
        GridLayout {
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
        }
    }

    fn north_up_layout(clamp_rows: bool) -> GridLayout {
        GridLayout {
            x: Axis::new(-180.0, 1.0, Snap::Nearest),
            y: Axis::new(-90.0, 1.0, Snap::Nearest),
            wrap: Some(Wrap {
                first: 0,
                period: 360,
            }),
            tiling: Tiling::Monolithic {
                file_name: "world.bin".to_string(),
                rows: 181,
                cols: 361,
                row_order: RowOrder::NorthUp,
                clamp_rows,
                blocks: None,
            },
        }
    }

    #[test]
    fn test_axis_index_rounding() {
        let nearest = Axis::new(0.0, 1.0, Snap::Nearest);
        assert_eq!(nearest.index(2.49), 2);
        assert_eq!(nearest.index(2.5), 3);
        assert_eq!(nearest.index(-0.5), 0);
        assert_eq!(nearest.index(-0.51), -1);

        let floor = Axis::new(0.0, 50.0, Snap::Floor);
        assert_eq!(floor.index(99.9), 1);
        assert_eq!(floor.index(-0.1), -1);
        assert_eq!(floor.reference(1), 75.0);
        assert_eq!(nearest.reference(3), 3.0);
    }

    #[test]
    fn test_locate_inside_tile() {
        let layout = small_hgt_layout();
        let cells = layout.locate(138.5, 35.5);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].tile.key, "N35E138.hgt");
        assert_eq!(cells[0].tile.rows, 5);
        // row 0 is the northern edge
        assert_eq!(cells[0].file_row(), 2);
        assert_eq!(cells[0].file_col(), 2);
    }

    #[test]
    fn test_locate_on_shared_edge_lists_neighbours() {
        let layout = small_hgt_layout();
        let cells = layout.locate(138.5, 36.0);
        let names: Vec<_> = cells.iter().map(|c| c.tile.key.as_str()).collect();
        assert_eq!(names, vec!["N36E138.hgt", "N35E138.hgt"]);
        assert_eq!(cells[0].file_row(), 4);
        assert_eq!(cells[1].file_row(), 0);

        let cells = layout.locate(139.0, 36.0);
        let names: Vec<_> = cells.iter().map(|c| c.tile.key.as_str()).collect();
        assert_eq!(
            names,
            vec!["N36E139.hgt", "N35E139.hgt", "N36E138.hgt", "N35E138.hgt"]
        );
        assert_eq!((cells[3].file_row(), cells[3].file_col()), (0, 4));
    }

    #[test]
    fn test_locate_antimeridian() {
        let layout = small_hgt_layout();
        for lon in [180.0, -180.0] {
            let cells = layout.locate(lon, 10.5);
            assert_eq!(cells[0].tile.key, "N10W180.hgt");
            assert_eq!(cells[0].file_col(), 0);
            assert_eq!(cells[1].tile.key, "N10E179.hgt");
            assert_eq!(cells[1].file_col(), 4);
        }
    }

    #[test]
    fn test_locate_monolithic() {
        let layout = north_up_layout(true);
        let cells = layout.locate(0.0, 90.0);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].file_row(), 0);
        assert_eq!(cells[0].file_col(), 180);

        // wrapped to the first column
        let cells = layout.locate(180.0, -90.0);
        assert_eq!(cells[0].file_row(), 180);
        assert_eq!(cells[0].file_col(), 0);

        let unclamped = GridLayout {
            y: Axis::new(-45.0, 1.0, Snap::Nearest),
            ..north_up_layout(false)
        };
        assert!(unclamped.locate(0.0, -50.0).is_empty());
    }

    #[test]
    fn test_index_window_pulls_antimeridian_inward() {
        let layout = small_hgt_layout();
        let window = layout.index_window((179.0, 10.0), (180.0, 11.0)).unwrap();
        assert_eq!(window.col_hi, 180 * 4 - 1);
        assert_eq!(window.col_lo, 179 * 4);

        let layout = north_up_layout(true);
        let window = layout.index_window((170.0, 80.0), (180.0, 95.0)).unwrap();
        assert_eq!(window.col_hi, 359);
        assert_eq!(window.row_hi, 180);
    }

    #[test]
    fn test_index_window_clips_monolithic() {
        let layout = GridLayout {
            y: Axis::new(-45.0, 1.0, Snap::Nearest),
            ..north_up_layout(false)
        };
        let window = layout.index_window((0.0, -60.0), (1.0, -40.0)).unwrap();
        assert_eq!(window.row_lo, 0);
        assert_eq!(window.row_hi, 5);
        assert!(layout.index_window((0.0, -80.0), (1.0, -70.0)).is_none());
    }

    #[test]
    fn test_decompose_single_tile() {
        let layout = small_hgt_layout();
        let window = layout.index_window((10.25, 20.25), (10.5, 20.75)).unwrap();
        let regions = layout.decompose(&window);
        assert_eq!(regions.len(), 1);
        let region = &regions["N20E010.hgt"];
        assert!(!region.complete);
        assert_eq!(region.window, window);
    }

    #[test]
    fn test_decompose_full_tile_is_complete() {
        let layout = small_hgt_layout();
        let window = layout.index_window((10.0, 20.0), (11.0, 21.0)).unwrap();
        let regions = layout.decompose(&window);
        assert_eq!(regions.len(), 1);
        assert!(regions["N20E010.hgt"].complete);
    }

    #[test]
    fn test_decompose_four_tiles() {
        let layout = small_hgt_layout();
        let window = layout.index_window((10.5, 20.5), (11.5, 21.5)).unwrap();
        let regions = layout.decompose(&window);
        let keys: Vec<_> = regions.keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["N20E010.hgt", "N20E011.hgt", "N21E010.hgt", "N21E011.hgt"]
        );
        // the shared edge row is read from both tiles
        assert_eq!(regions["N20E010.hgt"].window.row_hi, 21 * 4);
        assert_eq!(regions["N21E010.hgt"].window.row_lo, 21 * 4);
        assert!(regions.values().all(|r| !r.complete));

        let covered: u64 = regions.values().map(|r| r.window.cells()).sum();
        // 5 x 5 cells plus the duplicated edge row and column
        assert_eq!(covered, 36);
    }

    #[test]
    fn test_decompose_wide_window_has_complete_tiles() {
        let layout = small_hgt_layout();
        let window = layout.index_window((9.5, 19.5), (12.5, 22.5)).unwrap();
        let regions = layout.decompose(&window);
        assert_eq!(regions.len(), 16);
        assert!(regions["N20E010.hgt"].complete);
        assert!(regions["N21E011.hgt"].complete);
        assert!(!regions["N19E009.hgt"].complete);
    }

    #[test]
    fn test_rows_in_file_order() {
        let layout = small_hgt_layout();
        let window = layout.index_window((10.0, 20.0), (10.5, 20.5)).unwrap();
        let region = &layout.decompose(&window)["N20E010.hgt"];
        let rows = region.rows_in_file_order();
        assert_eq!(rows, vec![82, 81, 80]);
        let file_rows: Vec<_> = rows.iter().map(|r| region.tile.file_row(*r)).collect();
        assert_eq!(file_rows, vec![2, 3, 4]);
    }

    #[test]
    fn test_monolithic_blocks() {
        let layout = GridLayout {
            x: Axis::new(-180.0, 0.5, Snap::Nearest),
            y: Axis::new(-90.0, 0.5, Snap::Nearest),
            wrap: Some(Wrap {
                first: 0,
                period: 720,
            }),
            tiling: Tiling::Monolithic {
                file_name: "blocks.bin".to_string(),
                rows: 360,
                cols: 720,
                row_order: RowOrder::SouthUp,
                clamp_rows: true,
                blocks: Some((2, TileNaming::DegreeBlock)),
            },
        };
        assert!(layout.needs_summaries());

        let window = layout.index_window((10.0, 45.0), (11.0, 45.5)).unwrap();
        let regions = layout.decompose(&window);
        let keys: Vec<_> = regions.keys().cloned().collect();
        assert_eq!(keys, vec!["N45E010", "N45E011"]);
        assert!(regions["N45E010"].complete);
        assert!(!regions["N45E011"].complete);
        assert!(regions.values().all(|r| r.tile.file == "blocks.bin"));
        // south-up: file row equals global row
        assert_eq!(regions["N45E010"].tile.file_row(270), 270);
    }

    #[test]
    fn test_os_grid_tiles() {
        let layout = GridLayout {
            x: Axis::new(0.0, 50.0, Snap::Floor),
            y: Axis::new(0.0, 50.0, Snap::Floor),
            wrap: None,
            tiling: Tiling::Tiled {
                naming: TileNaming::OsGrid,
                stride: 200,
                overlap: 0,
            },
        };
        let cells = layout.locate(441_025.0, 112_480.0);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].tile.file, "su/SU41.bin");
        assert_eq!(cells[0].tile.key, "SU41.bin");
        assert_eq!(cells[0].file_col(), 20);
        assert_eq!(cells[0].file_row(), 199 - 49);
        assert_eq!(layout.reference(cells[0].row, cells[0].col), (441_025.0, 112_475.0));

        // west of the national grid
        assert!(layout.locate(-100.0, 112_480.0).is_empty());
    }

    #[test]
    fn test_bd_alti_tiles() {
        let layout = GridLayout {
            x: Axis::new(0.0, 75.0, Snap::Nearest),
            y: Axis::new(37.5, 75.0, Snap::Nearest),
            wrap: None,
            tiling: Tiling::Tiled {
                naming: TileNaming::BdAlti,
                stride: 1000,
                overlap: 0,
            },
        };
        let cells = layout.locate(652_000.0, 6_862_000.0);
        assert_eq!(
            cells[0].tile.key,
            "BDALTIV2_75M_FXX_0600_6900_MNT_LAMB93_IGN69.bin"
        );
    }
}
