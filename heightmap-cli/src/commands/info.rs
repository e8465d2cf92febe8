use anyhow::{bail, Context, Result};
use heightmap::grid::Tiling;
use heightmap::{Dataset, ElementType, GridFile, TileSummary};
use std::path::Path;

use super::format_size;

pub fn run(path: &Path, dataset: Dataset) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let source = dataset.grid_source();
    let (rows, cols) = match &source.layout.tiling {
        Tiling::Tiled {
            stride, overlap, ..
        } => {
            let size = (stride + overlap) as usize;
            (size, size)
        }
        Tiling::Monolithic { rows, cols, .. } => (*rows, *cols),
    };

    let file = GridFile::open(path, rows, cols, source.element, source.byte_order)
        .with_context(|| format!("Failed to open {} as {}", path.display(), source.name))?;

    let total = (rows * cols) as u64;
    let void_count = file
        .values()
        .filter(|v| *v == source.nodata || v.is_nan())
        .count() as u64;
    let summary = TileSummary::from_values(file.values(), source.nodata);
    let file_size = std::fs::metadata(path)?.len();

    let element = match source.element {
        ElementType::I16 => "i16",
        ElementType::F32 => "f32",
        ElementType::U8 => "u8",
    };

    // Display information
    println!("File: {}", path.display());
    println!("Dataset: {} ({})", source.name, source.crs.name());
    println!();
    println!("Grid: {}x{} samples, {} {:?}", cols, rows, element, source.byte_order);
    println!("File size: {}", format_size(file_size));
    println!();

    if summary.counter_max > 0 {
        println!(
            "Min elevation: {}m ({} samples)",
            summary.h_min, summary.counter_min
        );
        println!(
            "Max elevation: {}m ({} samples)",
            summary.h_max, summary.counter_max
        );
    }

    if void_count > 0 {
        let void_pct = (void_count as f64 / total as f64) * 100.0;
        println!("Void samples: {} ({:.1}%)", void_count, void_pct);
    }

    Ok(())
}
