//! Definitions of the supported elevation datasets.
//!
//! | Dataset | Coverage | Grid | Storage |
//! |---------|----------|------|---------|
//! | SRTM1 / SRTM3 | 60°S-60°N land | 1″ / 3″ | `.hgt` tiles, i16 BE |
//! | OS Terrain 50 | Great Britain | 50 m, British National Grid | 10 km tiles, f32 BE |
//! | DGM200 | Germany | 200 m, UTM 32N | one file, f32 BE |
//! | BD ALTI 75 | France | 75 m, Lambert-93 | 75 km tiles, f32 BE |
//! | GEBCO 2020 | global incl. seabed | 15″ | one file, i16 BE, 1° summary blocks |
//! | Earth2014 | global incl. seabed | 1′ | one file, i16 BE |
//! | ETOPO1 | global incl. seabed | 1′ | one file, i16 LE |

use std::fmt;
use std::str::FromStr;

use crate::error::HeightError;
use crate::grid::{Axis, GridLayout, RowOrder, Snap, TileNaming, Tiling, Wrap};
use crate::projection::{CoordinateSystem, Extent};
use crate::tile::{ByteOrder, ElementType};
use crate::types::Attribution;

/// Static description of one gridded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSource {
    /// Name reported as the result's source.
    pub name: &'static str,
    pub attribution: Attribution,
    pub crs: CoordinateSystem,
    /// WGS84 box outside of which the dataset has no data.
    pub extent: Option<Extent>,
    pub element: ElementType,
    pub byte_order: ByteOrder,
    pub nodata: f64,
    pub layout: GridLayout,
    /// Whether ocean cells carry bathymetry instead of a sea-level value.
    pub seabed_included: bool,
    /// Vertical accuracy estimate in meters, where the producer states one.
    pub precision_m: Option<f64>,
}

/// Samples per degree of the two SRTM resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrtmResolution {
    /// 1 arc-second, 3601 × 3601 samples per tile.
    Srtm1,
    /// 3 arc-seconds, 1201 × 1201 samples per tile.
    Srtm3,
}

impl SrtmResolution {
    /// Intervals per degree; a tile holds one more sample per side.
    pub fn intervals(&self) -> i64 {
        match self {
            SrtmResolution::Srtm1 => 3600,
            SrtmResolution::Srtm3 => 1200,
        }
    }
}

/// Surface variant of Earth2014.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Earth2014Surface {
    /// Topography, bedrock and ice (`TBI`).
    #[default]
    Ice,
    /// Bedrock below ice sheets (`BED`).
    Bedrock,
    /// Surface including lake and ocean water (`SUR`).
    Water,
}

impl Earth2014Surface {
    pub fn file_name(&self) -> &'static str {
        match self {
            Earth2014Surface::Ice => "Earth2014.TBI2014.1min.geod.bin",
            Earth2014Surface::Bedrock => "Earth2014.BED2014.1min.geod.bin",
            Earth2014Surface::Water => "Earth2014.SUR2014.1min.geod.bin",
        }
    }
}

/// Surface variant of ETOPO1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Etopo1Surface {
    /// Top of the ice sheets.
    #[default]
    Ice,
    /// Bedrock.
    Bedrock,
}

impl Etopo1Surface {
    pub fn file_name(&self) -> &'static str {
        match self {
            Etopo1Surface::Ice => "etopo1_ice_g_i2.bin",
            Etopo1Surface::Bedrock => "etopo1_bed_g_i2.bin",
        }
    }
}

impl GridSource {
    /// SRTM `.hgt` tiles at either resolution.
    pub fn srtm(resolution: SrtmResolution) -> Self {
        let intervals = resolution.intervals();
        let cell_size = 1.0 / intervals as f64;
        let (name, url) = match resolution {
            SrtmResolution::Srtm1 => ("SRTMGL1", "https://doi.org/10.5067/MEaSUREs/SRTM/SRTMGL1.003"),
            SrtmResolution::Srtm3 => ("SRTMGL3", "https://doi.org/10.5067/MEaSUREs/SRTM/SRTMGL3.003"),
        };

        Self {
            name,
            attribution: Attribution { name, url },
            crs: CoordinateSystem::Geographic,
            extent: None,
            element: ElementType::I16,
            byte_order: ByteOrder::BigEndian,
            nodata: -32768.0,
            layout: GridLayout {
                x: Axis::new(0.0, cell_size, Snap::Nearest),
                y: Axis::new(0.0, cell_size, Snap::Nearest),
                wrap: Some(Wrap {
                    first: -180 * intervals,
                    period: 360 * intervals,
                }),
                tiling: Tiling::Tiled {
                    naming: TileNaming::Hgt,
                    stride: intervals,
                    overlap: 1,
                },
            },
            seabed_included: false,
            precision_m: Some(16.0),
        }
    }

    pub fn srtm1() -> Self {
        Self::srtm(SrtmResolution::Srtm1)
    }

    /// Ordnance Survey Terrain 50, 50 m cells in 10 km squares.
    pub fn terrain50() -> Self {
        Self {
            name: "OS Terrain 50",
            attribution: Attribution {
                name: "Contains OS data © Crown copyright and database right",
                url: "https://www.ordnancesurvey.co.uk/business-and-government/products/terrain-50.html",
            },
            crs: CoordinateSystem::BritishNationalGrid,
            extent: Some(Extent::new(49.7, -10.0, 62.0, 4.0)),
            element: ElementType::F32,
            byte_order: ByteOrder::BigEndian,
            nodata: -32768.0,
            layout: GridLayout {
                x: Axis::new(0.0, 50.0, Snap::Floor),
                y: Axis::new(0.0, 50.0, Snap::Floor),
                wrap: None,
                tiling: Tiling::Tiled {
                    naming: TileNaming::OsGrid,
                    stride: 200,
                    overlap: 0,
                },
            },
            seabed_included: false,
            precision_m: Some(4.0),
        }
    }

    /// BKG DGM200, one UTM 32N grid covering Germany.
    pub fn dgm200() -> Self {
        Self {
            name: "DGM200",
            attribution: Attribution {
                name: "© GeoBasis-DE / BKG",
                url: "http://www.bkg.bund.de",
            },
            crs: CoordinateSystem::Utm32N,
            extent: Some(Extent::new(47.141612, 5.557084, 55.016964, 15.572619)),
            element: ElementType::F32,
            byte_order: ByteOrder::BigEndian,
            nodata: -9999.0,
            layout: GridLayout {
                x: Axis::new(280_000.0, 200.0, Snap::Nearest),
                y: Axis::new(5_236_000.0, 200.0, Snap::Nearest),
                wrap: None,
                tiling: Tiling::Monolithic {
                    file_name: "dgm200_utm32s_f4.bin".to_string(),
                    rows: 4331,
                    cols: 3207,
                    row_order: RowOrder::NorthUp,
                    clamp_rows: false,
                    blocks: None,
                },
            },
            seabed_included: false,
            precision_m: Some(10.0),
        }
    }

    /// IGN BD ALTI 75 m, 1000 × 1000 cell tiles in Lambert-93.
    ///
    /// Cell centres sit on multiples of 75 m in easting and 37.5 m off them in
    /// northing.
    pub fn bd_alti75() -> Self {
        Self {
            name: "BD ALTI 75m",
            attribution: Attribution {
                name: "BD ALTI®",
                url: "http://professionnels.ign.fr/bdalti",
            },
            crs: CoordinateSystem::Lambert93,
            extent: Some(Extent::new(41.15, -9.86, 51.56, 10.38)),
            element: ElementType::F32,
            byte_order: ByteOrder::BigEndian,
            nodata: -99999.0,
            layout: GridLayout {
                x: Axis::new(0.0, 75.0, Snap::Nearest),
                y: Axis::new(37.5, 75.0, Snap::Nearest),
                wrap: None,
                tiling: Tiling::Tiled {
                    naming: TileNaming::BdAlti,
                    stride: 1000,
                    overlap: 0,
                },
            },
            seabed_included: false,
            precision_m: None,
        }
    }

    /// GEBCO 2020 global grid, summarised in whole-degree blocks.
    pub fn gebco() -> Self {
        Self {
            name: "GEBCO_2020 Grid",
            attribution: Attribution {
                name: "GEBCO_2020 Grid",
                url: "https://www.gebco.net/data_and_products/gridded_bathymetry_data/gebco_2020/",
            },
            crs: CoordinateSystem::Geographic,
            extent: None,
            element: ElementType::I16,
            byte_order: ByteOrder::BigEndian,
            nodata: -32768.0,
            layout: GridLayout {
                x: Axis::new(-180.0, 1.0 / 240.0, Snap::Nearest),
                y: Axis::new(-90.0, 1.0 / 240.0, Snap::Nearest),
                wrap: Some(Wrap {
                    first: 0,
                    period: 86_400,
                }),
                tiling: Tiling::Monolithic {
                    file_name: "GEBCO_2020.bin".to_string(),
                    rows: 43_200,
                    cols: 86_400,
                    row_order: RowOrder::SouthUp,
                    clamp_rows: true,
                    blocks: Some((240, TileNaming::DegreeBlock)),
                },
            },
            seabed_included: true,
            precision_m: None,
        }
    }

    /// Earth2014 one arc-minute grid registered on cell centres.
    pub fn earth2014(surface: Earth2014Surface) -> Self {
        let cell_size = 1.0 / 60.0;
        Self {
            name: "EARTH2014",
            attribution: Attribution {
                name: "EARTH2014",
                url: "http://ddfe.curtin.edu.au/models/Earth2014/",
            },
            crs: CoordinateSystem::Geographic,
            extent: None,
            element: ElementType::I16,
            byte_order: ByteOrder::BigEndian,
            nodata: -32768.0,
            layout: GridLayout {
                x: Axis::new(-180.0 + cell_size / 2.0, cell_size, Snap::Nearest),
                y: Axis::new(-90.0 + cell_size / 2.0, cell_size, Snap::Nearest),
                wrap: Some(Wrap {
                    first: 0,
                    period: 21_600,
                }),
                tiling: Tiling::Monolithic {
                    file_name: surface.file_name().to_string(),
                    rows: 10_800,
                    cols: 21_600,
                    row_order: RowOrder::SouthUp,
                    clamp_rows: true,
                    blocks: None,
                },
            },
            seabed_included: true,
            precision_m: None,
        }
    }

    /// ETOPO1 one arc-minute grid registered on grid nodes.
    ///
    /// The last column repeats the first one (180° = -180°).
    pub fn etopo1(surface: Etopo1Surface) -> Self {
        Self {
            name: "ETOPO1",
            attribution: Attribution {
                name: "ETOPO1",
                url: "https://dx.doi.org/10.7289/V5C8276M",
            },
            crs: CoordinateSystem::Geographic,
            extent: None,
            element: ElementType::I16,
            byte_order: ByteOrder::LittleEndian,
            nodata: -32768.0,
            layout: GridLayout {
                x: Axis::new(-180.0, 1.0 / 60.0, Snap::Nearest),
                y: Axis::new(-90.0, 1.0 / 60.0, Snap::Nearest),
                wrap: Some(Wrap {
                    first: 0,
                    period: 21_600,
                }),
                tiling: Tiling::Monolithic {
                    file_name: surface.file_name().to_string(),
                    rows: 10_801,
                    cols: 21_601,
                    row_order: RowOrder::NorthUp,
                    clamp_rows: true,
                    blocks: None,
                },
            },
            seabed_included: true,
            precision_m: None,
        }
    }

    /// Name of the single file of a monolithic dataset.
    pub fn monolithic_file(&self) -> Option<&str> {
        match &self.layout.tiling {
            Tiling::Monolithic { file_name, .. } => Some(file_name),
            Tiling::Tiled { .. } => None,
        }
    }
}

/// The datasets an arbitrator knows how to discover under a data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dataset {
    Srtm1,
    Terrain50,
    Dgm200,
    BdAlti75,
    Gebco,
    Earth2014,
    Etopo1,
}

impl Dataset {
    pub const ALL: [Dataset; 7] = [
        Dataset::Srtm1,
        Dataset::Terrain50,
        Dataset::Dgm200,
        Dataset::BdAlti75,
        Dataset::Gebco,
        Dataset::Earth2014,
        Dataset::Etopo1,
    ];

    /// Short identifier used on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Dataset::Srtm1 => "srtm1",
            Dataset::Terrain50 => "terr50",
            Dataset::Dgm200 => "dgm200",
            Dataset::BdAlti75 => "bd_alti75",
            Dataset::Gebco => "gebco",
            Dataset::Earth2014 => "earth2014",
            Dataset::Etopo1 => "etopo1",
        }
    }

    /// Default grid definition, using the default surface variants.
    pub fn grid_source(&self) -> GridSource {
        match self {
            Dataset::Srtm1 => GridSource::srtm1(),
            Dataset::Terrain50 => GridSource::terrain50(),
            Dataset::Dgm200 => GridSource::dgm200(),
            Dataset::BdAlti75 => GridSource::bd_alti75(),
            Dataset::Gebco => GridSource::gebco(),
            Dataset::Earth2014 => GridSource::earth2014(Earth2014Surface::default()),
            Dataset::Etopo1 => GridSource::etopo1(Etopo1Surface::default()),
        }
    }

    /// Sub-directory of the data directory holding the dataset's files.
    pub fn directory(&self) -> &'static str {
        match self {
            Dataset::Srtm1 => "srtm1",
            Dataset::Terrain50 => "os_terr50_gb",
            Dataset::Dgm200 => "dgm200",
            Dataset::BdAlti75 => "bd_alti75",
            Dataset::Gebco => "gebco",
            Dataset::Earth2014 => "earth2014",
            Dataset::Etopo1 => "etopo1",
        }
    }

    /// Min/max cache file, for datasets that prune rectangle searches.
    pub fn cache_file_name(&self) -> Option<&'static str> {
        match self {
            Dataset::Srtm1 => Some("srtm1_map_cache.json"),
            Dataset::Terrain50 => Some("terr50_map_cache.json"),
            Dataset::BdAlti75 => Some("bd_alti_75_map_cache.json"),
            Dataset::Gebco => Some("gebco_2020_map_cache.json"),
            Dataset::Dgm200 | Dataset::Earth2014 | Dataset::Etopo1 => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Dataset {
    type Err = HeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Dataset::ALL.iter().map(|d| d.id()).collect();
                HeightError::Config(format!(
                    "unknown dataset '{s}' (expected one of {})",
                    known.join(", ")
                ))
            })
    }
}
