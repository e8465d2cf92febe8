use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use heightmap::{Dataset, SearchKind};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Multi-source elevation query tool
#[derive(Parser)]
#[command(name = "heightmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding one sub-directory per dataset
    #[arg(short, long, env = "HEIGHTMAP_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Directory holding the *_map_cache.json files [default: data dir]
    #[arg(long, env = "HEIGHTMAP_CACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Open files kept per dataset
    #[arg(
        short = 'c',
        long,
        env = "HEIGHTMAP_FILE_CACHE_SIZE",
        default_value = "1",
        global = true
    )]
    file_cache_size: u64,

    /// Distance limit in meters for the DGM200 tier
    #[arg(long, env = "HEIGHTMAP_MAX_DISTANCE_M", default_value = "25", global = true)]
    max_distance_m: f64,

    /// Maximum tied locations of a min+max answer
    #[arg(long, env = "HEIGHTMAP_MAX_TIES", default_value = "50", global = true)]
    max_ties: usize,

    /// Land/water raster (CCI water bodies legend)
    #[arg(long, env = "HEIGHTMAP_WATER_BODIES", global = true)]
    water_bodies: Option<PathBuf>,

    /// Cells per degree of the land/water raster
    #[arg(
        long,
        env = "HEIGHTMAP_WATER_BODIES_CELLS_PER_DEGREE",
        default_value = "720",
        global = true
    )]
    water_bodies_cells_per_degree: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the elevation of a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Find the highest cells inside a rectangle
    Max(RectangleArgs),

    /// Find the lowest cells inside a rectangle
    Min(RectangleArgs),

    /// Find the lowest and highest cells inside a rectangle
    Minmax(RectangleArgs),

    /// Display statistics of one grid file
    Info {
        /// Path to the tile or grid file
        path: PathBuf,

        /// Dataset the file belongs to
        #[arg(long, default_value = "srtm1")]
        dataset: Dataset,
    },

    /// Build the min/max cache of a dataset
    Summarize {
        /// Dataset to summarise
        dataset: Dataset,

        /// Output file [default: the dataset's cache file in the cache dir]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the datasets found under the data directory
    Sources,
}

#[derive(Args)]
struct RectangleArgs {
    /// Latitude of the lower-left corner
    #[arg(long, allow_negative_numbers = true)]
    lat_ll: f64,

    /// Longitude of the lower-left corner
    #[arg(long, allow_negative_numbers = true)]
    lon_ll: f64,

    /// Latitude of the upper-right corner
    #[arg(long, allow_negative_numbers = true)]
    lat_ur: f64,

    /// Longitude of the upper-right corner
    #[arg(long, allow_negative_numbers = true)]
    lon_ur: f64,

    /// Query this dataset only instead of arbitrating
    #[arg(short, long)]
    source: Option<Dataset>,

    /// Output result as JSON
    #[arg(short, long)]
    json: bool,
}

impl From<RectangleArgs> for commands::search::Rectangle {
    fn from(args: RectangleArgs) -> Self {
        Self {
            lat_ll: args.lat_ll,
            lon_ll: args.lon_ll,
            lat_ur: args.lat_ur,
            lon_ur: args.lon_ur,
            source: args.source,
            json: args.json,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heightmap=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = commands::Settings {
        data_dir: cli.data_dir,
        cache_dir: cli.cache_dir,
        file_cache_size: cli.file_cache_size,
        max_distance_m: cli.max_distance_m,
        max_ties: cli.max_ties,
        water_bodies: cli
            .water_bodies
            .map(|path| (path, cli.water_bodies_cells_per_degree)),
    };

    match cli.command {
        Commands::Query { lat, lon, json } => commands::query::run(&settings, lat, lon, json),
        Commands::Max(args) => {
            commands::search::run(&settings, SearchKind::Max, args.into())
        }
        Commands::Min(args) => {
            commands::search::run(&settings, SearchKind::Min, args.into())
        }
        Commands::Minmax(args) => {
            commands::search::run(&settings, SearchKind::MinMax, args.into())
        }
        Commands::Info { path, dataset } => commands::info::run(&path, dataset),
        Commands::Summarize { dataset, output } => {
            commands::summarize::run(&settings, dataset, output)
        }
        Commands::Sources => commands::sources::run(&settings),
    }
}
