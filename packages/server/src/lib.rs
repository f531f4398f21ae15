#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the extent narrator.
//!
//! Accepts a viewport extent plus a `GeoJSON` document, filters the
//! features to those intersecting the viewport, and returns an
//! AI-generated description from the configured LLM provider.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use extent_narrator_ai::providers::{LlmProvider, create_provider_from_env};
use extent_narrator_server_models::{ApiError, INVALID_GEOJSON};
use extent_narrator_spatial::{Reprojector, SpatialError};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default maximum JSON body size (16 MiB).
pub const DEFAULT_JSON_LIMIT: usize = 16 * 1024 * 1024;

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Maximum accepted JSON body in bytes (`JSON_LIMIT_BYTES`).
    pub json_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and `JSON_LIMIT_BYTES`, falling back to
    /// defaults for missing or unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            json_limit: lookup("JSON_LIMIT_BYTES")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.json_limit),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// LLM provider used for descriptions.
    pub provider: Arc<dyn LlmProvider>,
    /// WGS84 -> Web Mercator, applied to incoming features.
    pub to_map: Reprojector,
    /// Web Mercator -> WGS84, used to derive lon/lat bounds of the extent.
    pub to_lon_lat: Reprojector,
}

impl AppState {
    /// Builds the state around a provider.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the projection definitions fail to load.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Result<Self, SpatialError> {
        Ok(Self {
            provider,
            to_map: Reprojector::wgs84_to_web_mercator()?,
            to_lon_lat: Reprojector::web_mercator_to_wgs84()?,
        })
    }
}

/// Registers every route and the JSON extractor configuration.
pub fn configure(json_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let json_config = web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(|err, _req| {
                log::warn!("Rejected request body: {err}");
                InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(ApiError::new(INVALID_GEOJSON)),
                )
                .into()
            });

        cfg.app_data(json_config)
            .route("/", web::get().to(handlers::index))
            .route("/describe-extent", web::post().to(handlers::describe_extent))
            .route(
                "/features-in-extent",
                web::post().to(handlers::features_in_extent),
            )
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/describe-extent", web::post().to(handlers::describe_extent))
                    .route(
                        "/features-in-extent",
                        web::post().to(handlers::features_in_extent),
                    ),
            );
    }
}

/// Starts the server with settings from the environment.
///
/// Loads `.env`, initializes logging, creates the AI provider from the
/// environment and delegates to [`run_server_with`]. This is a regular
/// async function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the provider cannot be configured
/// or the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    run_server_with(ServerConfig::from_env()).await
}

/// Starts the server with explicit settings.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the provider cannot be configured
/// or the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server_with(config: ServerConfig) -> std::io::Result<()> {
    // Ignore error if a logger was already installed by the CLI.
    pretty_env_logger::try_init_custom_env("RUST_LOG").ok();

    log::info!("Server starting...");

    let provider = create_provider_from_env().map_err(std::io::Error::other)?;
    log::info!("Using AI provider: {}", provider.name());

    let state = web::Data::new(AppState::new(Arc::from(provider)).map_err(std::io::Error::other)?);
    let json_limit = config.json_limit;

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure(json_limit))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
