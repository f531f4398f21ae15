//! Interactive viewport exploration.
//!
//! Loads a `GeoJSON` file once, then repeatedly asks for a viewport and
//! prints the server's description. Requests closer together than the
//! throttle interval are skipped.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use extent_narrator_client::client::DEFAULT_SERVER_URL;
use extent_narrator_client::{NarratorClient, RequestThrottle, read_geojson_file};
use extent_narrator_spatial::Reprojector;

use crate::viewport::{parse_bbox, parse_extent};

enum ViewportKind {
    Extent,
    BoundingBox,
    Quit,
}

impl ViewportKind {
    const ALL: &[Self] = &[Self::Extent, Self::BoundingBox, Self::Quit];

    const fn label(&self) -> &'static str {
        match self {
            Self::Extent => "Web Mercator extent (minX,minY,maxX,maxY)",
            Self::BoundingBox => "Lon/lat box (west,south,east,north)",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the explore loop.
///
/// # Errors
///
/// Returns an error if the prompts fail or the `GeoJSON` file cannot be
/// loaded. Failed requests are reported and the loop continues.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let server: String = Input::new()
        .with_prompt("Server URL")
        .default(
            std::env::var("NARRATOR_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
        )
        .interact_text()?;

    let path: String = Input::new()
        .with_prompt("GeoJSON file")
        .interact_text()?;

    let collection = read_geojson_file(&PathBuf::from(path))?;
    println!("Loaded {} features.", collection.features.len());

    let client = NarratorClient::new(&server)?;
    let to_map = Reprojector::wgs84_to_web_mercator()?;
    let throttle = RequestThrottle::default();

    let labels: Vec<&str> = ViewportKind::ALL.iter().map(ViewportKind::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("Viewport")
            .items(&labels)
            .default(0)
            .interact()?;

        let kind = &ViewportKind::ALL[idx];
        if matches!(kind, ViewportKind::Quit) {
            return Ok(());
        }

        let text: String = Input::new().with_prompt("Values").interact_text()?;
        let parsed = match kind {
            ViewportKind::BoundingBox => parse_bbox(&text, &to_map),
            _ => parse_extent(&text),
        };

        let extent = match parsed {
            Ok(extent) => extent,
            Err(e) => {
                println!("Invalid viewport: {e}");
                continue;
            }
        };

        if !throttle.try_acquire() {
            println!(
                "Too soon after the previous request; wait {:?} between requests.",
                throttle.interval()
            );
            continue;
        }

        match client.describe_extent(&extent, &collection).await {
            Ok(resp) => {
                println!();
                println!("{} features in view", resp.feature_count);
                println!();
                println!("{}", resp.description);
                println!();
            }
            Err(e) => {
                log::error!("Describe request failed: {e}");
                println!("Request failed: {e}");
            }
        }
    }
}
