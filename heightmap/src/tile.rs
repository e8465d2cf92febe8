//! Memory-mapped binary grid files.
//!
//! Every dataset stores its cells row-major without header, one fixed-size
//! element per cell. [`GridFile`] maps such a file and decodes cells on demand:
//! the byte offset of `(row, col)` is `(row * cols + col) * element_size`.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{HeightError, Result};

/// Storage type of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Signed 16-bit integer (SRTM, GEBCO, Earth2014, ETOPO1).
    I16,
    /// 32-bit IEEE float (OS Terrain 50, DGM200, BD ALTI 75).
    F32,
    /// Unsigned byte (land/water rasters).
    U8,
}

impl ElementType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            ElementType::I16 => 2,
            ElementType::F32 => 4,
            ElementType::U8 => 1,
        }
    }
}

/// Byte order of multi-byte elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// A memory-mapped grid file of known dimensions.
///
/// # Example
///
/// ```ignore
/// use heightmap::tile::{ByteOrder, ElementType, GridFile};
///
/// let file = GridFile::open("N35E138.hgt", 3601, 3601, ElementType::I16, ByteOrder::BigEndian)?;
/// let elevation = file.value(1800, 1800);
/// ```
pub struct GridFile {
    data: Mmap,
    rows: usize,
    cols: usize,
    element: ElementType,
    byte_order: ByteOrder,
}

impl GridFile {
    /// Map a grid file and check that its size matches `rows × cols` elements.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened or memory-mapped
    /// - The file size doesn't match the declared dimensions
    pub fn open<P: AsRef<Path>>(
        path: P,
        rows: usize,
        cols: usize,
        element: ElementType,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let expected = (rows * cols * element.size()) as u64;
        if size != expected {
            return Err(HeightError::InvalidFileSize {
                path: path.to_path_buf(),
                size,
                expected,
            });
        }

        // SAFETY: The file is opened read-only and the mapping never leaves
        // this struct. Grid files are not modified while the service runs.
        let data = unsafe { Mmap::map(&file)? };

        Ok(Self {
            data,
            rows,
            cols,
            element,
            byte_order,
        })
    }

    /// Number of rows in the file.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the file.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Decode the cell at `(row, col)`, row 0 being the first row of the file.
    ///
    /// Indices past the last row or column are clamped to the edge.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        let row = row.min(self.rows - 1);
        let col = col.min(self.cols - 1);
        let size = self.element.size();
        let offset = (row * self.cols + col) * size;
        self.decode(&self.data[offset..offset + size])
    }

    /// Decode the contiguous cells `col_lo..=col_hi` of one row.
    ///
    /// The range is clipped to the file's columns.
    pub fn row_segment(
        &self,
        row: usize,
        col_lo: usize,
        col_hi: usize,
    ) -> impl Iterator<Item = f64> + '_ {
        let size = self.element.size();
        let row = row.min(self.rows - 1);
        let col_hi = col_hi.min(self.cols - 1);
        let start = (row * self.cols + col_lo.min(col_hi + 1)) * size;
        let end = (row * self.cols + col_hi + 1) * size;

        self.data[start..end]
            .chunks_exact(size)
            .map(move |bytes| self.decode(bytes))
    }

    /// Decode every cell in file order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data
            .chunks_exact(self.element.size())
            .map(move |bytes| self.decode(bytes))
    }

    fn decode(&self, bytes: &[u8]) -> f64 {
        match (self.element, self.byte_order) {
            (ElementType::I16, ByteOrder::BigEndian) => {
                i16::from_be_bytes([bytes[0], bytes[1]]) as f64
            }
            (ElementType::I16, ByteOrder::LittleEndian) => {
                i16::from_le_bytes([bytes[0], bytes[1]]) as f64
            }
            (ElementType::F32, ByteOrder::BigEndian) => {
                f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
            (ElementType::F32, ByteOrder::LittleEndian) => {
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
            (ElementType::U8, _) => bytes[0] as f64,
        }
    }
}
