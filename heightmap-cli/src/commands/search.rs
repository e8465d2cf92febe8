use anyhow::{Context, Result};
use heightmap::{Dataset, Extremum, HeightInfo, SearchKind};
use serde::Serialize;

use super::{format_location, Settings};

/// Corners and options of a rectangle search.
pub struct Rectangle {
    pub lat_ll: f64,
    pub lon_ll: f64,
    pub lat_ur: f64,
    pub lon_ur: f64,
    pub source: Option<Dataset>,
    pub json: bool,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<&'a Extremum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<&'a Extremum>,
}

pub fn run(settings: &Settings, kind: SearchKind, rect: Rectangle) -> Result<()> {
    let info = settings.height_info()?;
    let (source, min, max) = search(&info, kind, &rect)?;

    if rect.json {
        let response = SearchResponse {
            source: &source,
            min: min.as_ref(),
            max: max.as_ref(),
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    let found: Vec<(&str, &Extremum)> = [("Min", min.as_ref()), ("Max", max.as_ref())]
        .into_iter()
        .filter_map(|(label, extremum)| Some((label, extremum?)))
        .collect();
    if found.iter().all(|(_, e)| e.locations.is_empty()) {
        println!("void");
        return Ok(());
    }

    println!("Source: {}", source);
    for (label, extremum) in found {
        println!(
            "{} elevation: {} m ({} location{})",
            label,
            extremum.value,
            extremum.count,
            if extremum.count == 1 { "" } else { "s" }
        );
        for location in &extremum.locations {
            println!("  {}", format_location(location));
        }
    }

    Ok(())
}

type Found = (String, Option<Extremum>, Option<Extremum>);

fn search(info: &HeightInfo, kind: SearchKind, rect: &Rectangle) -> Result<Found> {
    let (lat_ll, lon_ll, lat_ur, lon_ur) = (rect.lat_ll, rect.lon_ll, rect.lat_ur, rect.lon_ur);

    // a single dataset bypasses arbitration
    if let Some(dataset) = rect.source {
        let engine = info.engine(dataset).with_context(|| {
            format!("Dataset {dataset} was not found under the data directory")
        })?;
        return Ok(match kind {
            SearchKind::Max => {
                let r = engine.get_max_height(lat_ll, lon_ll, lat_ur, lon_ur)?;
                (r.source, None, Some(r.extremum))
            }
            SearchKind::Min => {
                let r = engine.get_min_height(lat_ll, lon_ll, lat_ur, lon_ur)?;
                (r.source, Some(r.extremum), None)
            }
            SearchKind::MinMax => {
                let r = engine.get_min_max_height(lat_ll, lon_ll, lat_ur, lon_ur)?;
                (r.source, Some(r.min), Some(r.max))
            }
        });
    }

    Ok(match kind {
        SearchKind::Max => {
            let r = info
                .get_max_height(lat_ll, lon_ll, lat_ur, lon_ur)
                .context("Failed to search rectangle")?;
            (r.source, None, Some(r.extremum))
        }
        SearchKind::Min => {
            let r = info
                .get_min_height(lat_ll, lon_ll, lat_ur, lon_ur)
                .context("Failed to search rectangle")?;
            (r.source, Some(r.extremum), None)
        }
        SearchKind::MinMax => {
            let r = info
                .get_min_max_height(lat_ll, lon_ll, lat_ur, lon_ur)
                .context("Failed to search rectangle")?;
            (r.source, Some(r.min), Some(r.max))
        }
    })
}
