use anyhow::{bail, Context, Result};
use heightmap::{Dataset, MinMaxCache};
use std::path::PathBuf;
use tracing::info;

use super::Settings;

pub fn run(settings: &Settings, dataset: Dataset, output: Option<PathBuf>) -> Result<()> {
    let Some(cache_file) = dataset.cache_file_name() else {
        bail!("{dataset} is searched without a min/max cache");
    };
    let output = match output {
        Some(path) => path,
        None => settings.cache_dir()?.join(cache_file),
    };

    let dir = settings.data_dir()?.join(dataset.directory());
    if !dir.exists() {
        bail!("Dataset directory does not exist: {}", dir.display());
    }

    info!(dataset = %dataset, dir = %dir.display(), "summarising");
    let source = dataset.grid_source();
    let cache = MinMaxCache::build(&source, &dir)
        .with_context(|| format!("Failed to summarise {}", dir.display()))?;
    cache
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{} tiles summarised", cache.len());
    println!("Cache written to: {}", output.display());

    Ok(())
}
