pub mod info;
pub mod query;
pub mod search;
pub mod sources;
pub mod summarize;

use anyhow::{Context, Result};
use heightmap::{HeightInfo, HeightInfoBuilder, Location};
use std::path::{Path, PathBuf};

/// Options shared by every command.
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub file_cache_size: u64,
    pub max_distance_m: f64,
    pub max_ties: usize,
    pub water_bodies: Option<(PathBuf, usize)>,
}

impl Settings {
    pub fn data_dir(&self) -> Result<&Path> {
        self.data_dir.as_deref().context(
            "HEIGHTMAP_DATA_DIR environment variable not set. Use --data-dir or set HEIGHTMAP_DATA_DIR",
        )
    }

    pub fn cache_dir(&self) -> Result<&Path> {
        match &self.cache_dir {
            Some(dir) => Ok(dir),
            None => self.data_dir(),
        }
    }

    /// Discover the datasets and build the arbitrator.
    pub fn height_info(&self) -> Result<HeightInfo> {
        let data_dir = self.data_dir()?;
        if !data_dir.exists() {
            anyhow::bail!("Data directory does not exist: {}", data_dir.display());
        }

        let mut builder = HeightInfoBuilder::new(data_dir)
            .cache_dir(self.cache_dir()?)
            .file_cache_size(self.file_cache_size)
            .max_distance_m(self.max_distance_m)
            .max_ties(self.max_ties);
        if let Some((path, cells_per_degree)) = &self.water_bodies {
            builder = builder.water_bodies(path, *cells_per_degree);
        }

        builder.build().context("Failed to set up elevation sources")
    }
}

pub fn format_location(location: &Location) -> String {
    format!("{:.6}, {:.6}", location.lat, location.lon)
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
