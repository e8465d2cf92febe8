use anyhow::{Context, Result};

use super::{format_location, Settings};

pub fn run(settings: &Settings, lat: f64, lon: f64, json: bool) -> Result<()> {
    let info = settings.height_info()?;

    let result = info
        .get_height(lat, lon)
        .context("Failed to get elevation")?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else if result.is_nodata() {
        println!("void");
    } else {
        println!("{} m", result.altitude);
        println!("Source: {}", result.source);
        println!(
            "Found at: {} ({:.1} m away)",
            format_location(&result.found),
            result.distance_m
        );
        if let Some(precision) = result.precision_m {
            println!("Precision: ±{} m", precision);
        }
        if let Some(surface) = result.surface {
            println!("Surface: {:?}", surface);
        }
        for attribution in &result.attributions {
            println!("Attribution: {} <{}>", attribution.name, attribution.url);
        }
    }

    Ok(())
}
