use anyhow::{bail, Result};
use heightmap::{Dataset, MinMaxCache};
use std::path::{Path, PathBuf};

use super::Settings;

/// State of the min/max cache of a dataset found on disk.
#[derive(Debug, PartialEq)]
enum CacheState {
    NotNeeded,
    Missing,
    Invalid,
    Tiles(usize),
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheState::NotNeeded => write!(f, "-"),
            CacheState::Missing => write!(f, "missing"),
            CacheState::Invalid => write!(f, "invalid"),
            CacheState::Tiles(count) => write!(f, "{count}"),
        }
    }
}

/// Where `dataset` lives under `data_dir` and how its cache looks, or
/// `None` if the dataset is not there.
fn inspect(dataset: Dataset, data_dir: &Path, cache_dir: &Path) -> Option<(PathBuf, CacheState)> {
    let source = dataset.grid_source();
    let dir = data_dir.join(dataset.directory());
    let path = match source.monolithic_file() {
        Some(file_name) => dir.join(file_name),
        None => dir,
    };
    if !path.exists() {
        return None;
    }

    let cache = match dataset.cache_file_name() {
        None => CacheState::NotNeeded,
        Some(name) => {
            let cache_path = cache_dir.join(name);
            if !cache_path.exists() {
                CacheState::Missing
            } else {
                match MinMaxCache::load(&cache_path) {
                    Ok(cache) => CacheState::Tiles(cache.len()),
                    Err(_) => CacheState::Invalid,
                }
            }
        }
    };
    Some((path, cache))
}

pub fn run(settings: &Settings) -> Result<()> {
    let data_dir = settings.data_dir()?;
    if !data_dir.exists() {
        bail!("Data directory does not exist: {}", data_dir.display());
    }
    let cache_dir = settings.cache_dir()?;

    let found: Vec<_> = Dataset::ALL
        .iter()
        .filter_map(|d| inspect(*d, data_dir, cache_dir).map(|(path, cache)| (*d, path, cache)))
        .collect();

    if found.is_empty() {
        println!("No datasets found in: {}", data_dir.display());
        return Ok(());
    }

    println!(
        "{:<10} {:<16} {:<22} {:>7} {:>8}  PATH",
        "DATASET", "NAME", "GRID", "SEABED", "CACHE"
    );
    println!("{}", "-".repeat(80));

    for (dataset, path, cache) in &found {
        let source = dataset.grid_source();
        println!(
            "{:<10} {:<16} {:<22} {:>7} {:>8}  {}",
            dataset.id(),
            source.name,
            source.crs.name(),
            if source.seabed_included { "yes" } else { "no" },
            cache.to_string(),
            path.display()
        );
    }

    let missing: Vec<_> = Dataset::ALL
        .iter()
        .filter(|d| !found.iter().any(|(f, _, _)| f == *d))
        .map(|d| d.id())
        .collect();
    let unusable: Vec<_> = found
        .iter()
        .filter(|(_, _, cache)| matches!(cache, CacheState::Missing | CacheState::Invalid))
        .map(|(d, _, _)| d.id())
        .collect();

    // Summary
    println!();
    println!("Summary:");
    println!("  Datasets found: {}", found.len());
    if !missing.is_empty() {
        println!("  Not found: {}", missing.join(", "));
    }
    if !unusable.is_empty() {
        println!(
            "  Without a usable cache: {} (run `heightmap summarize <dataset>`)",
            unusable.join(", ")
        );
    }
    println!("  Data directory: {}", data_dir.display());

    Ok(())
}
