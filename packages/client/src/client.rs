//! HTTP client for the narrator API.

use extent_narrator_server_models::{
    ApiError, DescribeExtentRequest, DescribeExtentResponse, FeaturesInExtentResponse,
};
use extent_narrator_spatial::{Extent, GeoBoundingBox, Reprojector};
use geojson::FeatureCollection;

use crate::ClientError;

/// Default server URL.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3001";

/// Client for a running narrator server.
pub struct NarratorClient {
    base_url: String,
    http: reqwest::Client,
    to_lon_lat: Reprojector,
}

impl NarratorClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Spatial`] if the projection definitions fail
    /// to load.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            to_lon_lat: Reprojector::web_mercator_to_wgs84()?,
        })
    }

    /// Creates a client from `NARRATOR_URL`, defaulting to
    /// [`DEFAULT_SERVER_URL`].
    ///
    /// # Errors
    ///
    /// See [`NarratorClient::new`].
    pub fn from_env() -> Result<Self, ClientError> {
        let url = std::env::var("NARRATOR_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::new(&url)
    }

    /// The server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request body, deriving the lon/lat bounds of the extent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the extent cannot be reprojected or a
    /// value fails to serialize.
    pub fn request_body(
        &self,
        extent: &Extent,
        geojson: &FeatureCollection,
    ) -> Result<DescribeExtentRequest, ClientError> {
        let lon_lat = self.to_lon_lat.project_extent(extent)?;
        let bbox = GeoBoundingBox::new(lon_lat.min_x, lon_lat.min_y, lon_lat.max_x, lon_lat.max_y);
        Ok(DescribeExtentRequest::new(extent, Some(&bbox), geojson)?)
    }

    /// Asks the server to describe the features within `extent`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] for a non-success status, or
    /// [`ClientError::Http`] if the server cannot be reached.
    pub async fn describe_extent(
        &self,
        extent: &Extent,
        geojson: &FeatureCollection,
    ) -> Result<DescribeExtentResponse, ClientError> {
        log::info!("Requesting description for extent {extent}");
        self.post("describe-extent", &self.request_body(extent, geojson)?)
            .await
    }

    /// Asks the server which features fall within `extent`.
    ///
    /// # Errors
    ///
    /// Same as [`NarratorClient::describe_extent`].
    pub async fn features_in_extent(
        &self,
        extent: &Extent,
        geojson: &FeatureCollection,
    ) -> Result<FeaturesInExtentResponse, ClientError> {
        self.post("features-in-extent", &self.request_body(extent, geojson)?)
            .await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &DescribeExtentRequest,
    ) -> Result<T, ClientError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self.http.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            log::error!("{url} returned {status}: {text}");
            return Err(server_error(status.as_u16(), &text));
        }

        Ok(resp.json().await?)
    }
}

/// Turns an error response into [`ClientError::Server`], using the
/// [`ApiError`] body when the server sent one.
fn server_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => ClientError::Server {
            status,
            message: err.error,
            details: err.details,
        },
        Err(_) => ClientError::Server {
            status,
            message: body.to_string(),
            details: None,
        },
    }
}
