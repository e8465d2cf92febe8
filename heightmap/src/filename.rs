//! Tile filename utilities.
//!
//! Every tiled dataset derives its filenames from the origin of the tile:
//!
//! | Dataset | Example | Origin encoded |
//! |---------|---------|----------------|
//! | SRTM | `N35E138.hgt` | south-west corner, whole degrees |
//! | GEBCO blocks | `N35E138` | south-west corner, whole degrees |
//! | OS Terrain 50 | `su/SU12.bin` | south-west corner of a 10 km square |
//! | BD ALTI 75 | `BDALTIV2_75M_FXX_0600_6900_MNT_LAMB93_IGN69.bin` | west edge and north edge in km |

/// Side of an OS Terrain 50 tile in meters.
pub const OS_GRID_SQUARE_M: i64 = 10_000;

const OS_GRID_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Name of the whole-degree tile whose south-west corner is `(lat, lon)`.
///
/// # Examples
///
/// ```
/// use heightmap::filename::degree_tile_name;
///
/// assert_eq!(degree_tile_name(35, 138), "N35E138");
/// assert_eq!(degree_tile_name(-13, -78), "S13W078");
/// ```
pub fn degree_tile_name(lat: i32, lon: i32) -> String {
    let lat_prefix = if lat >= 0 { 'N' } else { 'S' };
    let lon_prefix = if lon >= 0 { 'E' } else { 'W' };

    format!(
        "{}{:02}{}{:03}",
        lat_prefix,
        lat.unsigned_abs(),
        lon_prefix,
        lon.unsigned_abs()
    )
}

/// SRTM `.hgt` filename for the tile with south-west corner `(lat, lon)`.
pub fn hgt_filename(lat: i32, lon: i32) -> String {
    format!("{}.hgt", degree_tile_name(lat, lon))
}

/// Parse a whole-degree tile name, with or without path and `.hgt` suffix.
///
/// # Examples
///
/// ```
/// use heightmap::filename::parse_degree_tile_name;
///
/// assert_eq!(parse_degree_tile_name("N35E138.hgt"), Some((35, 138)));
/// assert_eq!(parse_degree_tile_name("/data/S12W077.hgt"), Some((-12, -77)));
/// assert_eq!(parse_degree_tile_name("N35E138"), Some((35, 138)));
/// assert_eq!(parse_degree_tile_name("invalid"), None);
/// ```
pub fn parse_degree_tile_name(filename: &str) -> Option<(i32, i32)> {
    let name = base_name(filename);
    let name = name.strip_suffix(".hgt").unwrap_or(name);

    // N00E000
    if name.len() != 7 || !name.is_ascii() {
        return None;
    }

    let bytes = name.as_bytes();
    let lat_sign = match bytes[0] {
        b'N' | b'n' => 1,
        b'S' | b's' => -1,
        _ => return None,
    };
    let lon_sign = match bytes[3] {
        b'E' | b'e' => 1,
        b'W' | b'w' => -1,
        _ => return None,
    };
    let lat: i32 = parse_digits(&name[1..3])?;
    let lon: i32 = parse_digits(&name[4..7])?;

    Some((lat * lat_sign, lon * lon_sign))
}

/// Two-letter OS grid reference of the 10 km square whose south-west corner
/// contains `(easting, northing)`, e.g. `"SU12"`.
///
/// Returns `None` outside the national grid (0-700 km east, 0-1300 km north).
pub fn os_grid_square(easting: i64, northing: i64) -> Option<String> {
    if easting < 0 || northing < 0 {
        return None;
    }
    let e100k = easting / 100_000;
    let n100k = northing / 100_000;
    if e100k > 6 || n100k > 12 {
        return None;
    }

    let mut l1 = (19 - n100k) - (19 - n100k) % 5 + (e100k + 10) / 5;
    let mut l2 = ((19 - n100k) * 5) % 25 + e100k % 5;
    // the grid alphabet has no I
    if l1 > 7 {
        l1 += 1;
    }
    if l2 > 7 {
        l2 += 1;
    }

    Some(format!(
        "{}{}{}{}",
        char::from(b'A' + l1 as u8),
        char::from(b'A' + l2 as u8),
        (easting % 100_000) / OS_GRID_SQUARE_M,
        (northing % 100_000) / OS_GRID_SQUARE_M
    ))
}

/// Parse an OS grid square (`"SU12"`, `"su/SU12.bin"`) back to the easting and
/// northing of its south-west corner.
pub fn parse_os_grid_square(filename: &str) -> Option<(i64, i64)> {
    let name = base_name(filename);
    let name = name.strip_suffix(".bin").unwrap_or(name);
    if name.len() != 4 || !name.is_ascii() {
        return None;
    }

    let bytes = name.as_bytes();
    let letter_index = |b: u8| {
        OS_GRID_LETTERS
            .iter()
            .position(|&l| l == b.to_ascii_uppercase())
            .map(|p| p as i64)
    };
    let l1 = letter_index(bytes[0])?;
    let l2 = letter_index(bytes[1])?;
    let e10k: i64 = parse_digits(&name[2..3])?;
    let n10k: i64 = parse_digits(&name[3..4])?;

    let e100k = (l1 - 2).rem_euclid(5) * 5 + l2 % 5;
    let n100k = (19 - (l1 / 5) * 5) - l2 / 5;
    if !(0..=6).contains(&e100k) || !(0..=12).contains(&n100k) {
        return None;
    }

    Some((
        e100k * 100_000 + e10k * OS_GRID_SQUARE_M,
        n100k * 100_000 + n10k * OS_GRID_SQUARE_M,
    ))
}

/// BD ALTI 75 tile name from the western edge and the northern edge in km.
pub fn bd_alti_tile_name(west_km: i64, north_km: i64) -> String {
    format!("BDALTIV2_75M_FXX_{west_km:04}_{north_km:04}_MNT_LAMB93_IGN69.bin")
}

/// Parse a BD ALTI 75 tile name to `(west_km, north_km)`.
pub fn parse_bd_alti_tile_name(filename: &str) -> Option<(i64, i64)> {
    let name = base_name(filename);
    let rest = name.strip_prefix("BDALTIV2_75M_FXX_")?;
    let rest = rest.strip_suffix("_MNT_LAMB93_IGN69.bin")?;
    let (west, north) = rest.split_once('_')?;
    if west.len() != 4 || north.len() != 4 {
        return None;
    }
    Some((parse_digits(west)?, parse_digits(north)?))
}

fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
