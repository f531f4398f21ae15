#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the extent narrator.
//!
//! Starts the API server, sends one-off describe requests, or runs an
//! interactive loop over a loaded `GeoJSON` file. Without a subcommand
//! the user picks one from a menu.

mod interactive;
mod viewport;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::Select;
use extent_narrator_client::client::DEFAULT_SERVER_URL;
use extent_narrator_client::{NarratorClient, read_geojson_file};
use extent_narrator_server::ServerConfig;
use extent_narrator_spatial::Reprojector;

/// Describe what is visible in a map viewport using an LLM.
#[derive(Parser)]
#[command(name = "extent_narrator")]
#[command(about = "Describe what is visible in a map viewport using an LLM")]
struct Cli {
    /// Subcommand to execute. Shows a menu when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the API server.
    Serve {
        /// Address to bind (overrides `BIND_ADDR`).
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides `PORT`).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Describe one viewport of a `GeoJSON` file.
    Describe {
        /// `GeoJSON` file in WGS84.
        #[arg(long)]
        geojson: PathBuf,

        /// Web Mercator extent as `minX,minY,maxX,maxY`.
        #[arg(
            long,
            allow_hyphen_values = true,
            required_unless_present = "bbox",
            conflicts_with = "bbox"
        )]
        extent: Option<String>,

        /// Lon/lat box as `west,south,east,north`.
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<String>,

        /// Server URL (overrides `NARRATOR_URL`).
        #[arg(long)]
        server: Option<String>,
    },

    /// Load a `GeoJSON` file and describe viewports interactively.
    Interactive,
}

/// Menu entries shown when no subcommand is given.
enum Tool {
    Server,
    ServerInteractive,
    Explore,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::ServerInteractive, Self::Explore];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::ServerInteractive => "Start server (choose address)",
            Self::Explore => "Describe viewports of a GeoJSON file",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { bind, port }) => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Some(Commands::Describe {
            geojson,
            extent,
            bbox,
            server,
        }) => {
            describe(
                &geojson,
                extent.as_deref(),
                bbox.as_deref(),
                server.as_deref(),
            )
            .await?;
        }
        Some(Commands::Interactive) => interactive::run().await?,
        None => menu().await?,
    }

    Ok(())
}

async fn menu() -> Result<(), Box<dyn std::error::Error>> {
    println!("Extent Narrator");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => serve(ServerConfig::from_env()).await?,
        Tool::ServerInteractive => {
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(extent_narrator_server::interactive::run())
            })
            .await??;
        }
        Tool::Explore => interactive::run().await?,
    }

    Ok(())
}

/// Runs the server on its own actix system so it does not nest inside the
/// tokio runtime.
async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(extent_narrator_server::run_server_with(config))
    })
    .await??;
    Ok(())
}

async fn describe(
    geojson: &std::path::Path,
    extent: Option<&str>,
    bbox: Option<&str>,
    server: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = read_geojson_file(geojson)?;

    let extent = match (extent, bbox) {
        (Some(extent), _) => viewport::parse_extent(extent)?,
        (None, Some(bbox)) => viewport::parse_bbox(bbox, &Reprojector::wgs84_to_web_mercator()?)?,
        (None, None) => return Err("either --extent or --bbox is required".into()),
    };

    let client = match server {
        Some(url) => NarratorClient::new(url)?,
        None => NarratorClient::from_env()?,
    };
    log::debug!("Using server {}", client.base_url());

    let resp = client.describe_extent(&extent, &collection).await?;
    println!("{} features in view", resp.feature_count);
    println!();
    println!("{}", resp.description);

    Ok(())
}
