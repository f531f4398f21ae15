//! HTTP handler functions for the extent narrator API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use extent_narrator_ai::AiError;
use extent_narrator_ai::narrate::describe_extent as narrate_extent;
use extent_narrator_server_models::{
    AI_EMPTY_RESPONSE, AI_INTERNAL_ERROR, AI_UPSTREAM_ERROR, ApiError, ApiHealth,
    DescribeExtentRequest, DescribeExtentResponse, FeaturesInExtentResponse, INVALID_EXTENT,
    INVALID_GEOJSON,
};
use extent_narrator_spatial::{
    Extent, GeoBoundingBox, Reprojector, feature_collection_from_value,
    features_in_extent as filter_features,
};
use geojson::FeatureCollection;

use crate::AppState;

/// A request that passed validation.
struct ValidRequest {
    extent: Extent,
    bbox: Option<GeoBoundingBox>,
    collection: FeatureCollection,
}

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Geospatial AI Assistant API is running!")
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_provider: state.provider.name().to_string(),
    })
}

/// `POST /describe-extent`
///
/// Filters the posted features to the extent and returns the AI
/// description of the viewport.
pub async fn describe_extent(
    state: web::Data<AppState>,
    body: web::Json<DescribeExtentRequest>,
) -> HttpResponse {
    let request = match validate(body.into_inner(), &state.to_lon_lat) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match narrate_extent(
        state.provider.as_ref(),
        &state.to_map,
        &request.extent,
        request.bbox.as_ref(),
        &request.collection,
    )
    .await
    {
        Ok(narration) => HttpResponse::Ok().json(DescribeExtentResponse {
            description: narration.description,
            feature_count: narration.feature_count,
        }),
        Err(e) => ai_error_response(e),
    }
}

/// `POST /features-in-extent`
///
/// Same input as `/describe-extent`; returns the intersecting features
/// without calling the AI provider.
pub async fn features_in_extent(
    state: web::Data<AppState>,
    body: web::Json<DescribeExtentRequest>,
) -> HttpResponse {
    let request = match validate(body.into_inner(), &state.to_lon_lat) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let features: Vec<geojson::Feature> =
        filter_features(&request.collection, &request.extent, &state.to_map)
            .into_iter()
            .map(|m| m.feature.clone())
            .collect();

    HttpResponse::Ok().json(FeaturesInExtentResponse {
        count: features.len(),
        features: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
    })
}

/// Validates the raw request body. The `GeoJSON` is checked before the
/// extent.
fn validate(
    body: DescribeExtentRequest,
    to_lon_lat: &Reprojector,
) -> Result<ValidRequest, HttpResponse> {
    let collection = feature_collection_from_value(body.geojson).map_err(|e| {
        log::warn!("Invalid GeoJSON: {e}");
        HttpResponse::BadRequest().json(ApiError::new(INVALID_GEOJSON))
    })?;

    let extent = parse_extent(&body.extent).ok_or_else(|| {
        log::warn!("Invalid extent: {}", body.extent);
        HttpResponse::BadRequest().json(ApiError::new(INVALID_EXTENT))
    })?;

    let bbox = body
        .bbox
        .and_then(|value| {
            serde_json::from_value::<GeoBoundingBox>(value)
                .inspect_err(|e| log::warn!("Ignoring malformed bbox: {e}"))
                .ok()
        })
        .or_else(|| lon_lat_bounds(&extent, to_lon_lat));

    log::info!("Incoming extent (Web Mercator): {extent}");

    Ok(ValidRequest {
        extent,
        bbox,
        collection,
    })
}

/// Parses `[minX, minY, maxX, maxY]`.
fn parse_extent(value: &serde_json::Value) -> Option<Extent> {
    let values = value
        .as_array()?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect::<Option<Vec<f64>>>()?;
    Extent::from_slice(&values).ok()
}

/// Lon/lat bounds of a Web Mercator extent.
fn lon_lat_bounds(extent: &Extent, to_lon_lat: &Reprojector) -> Option<GeoBoundingBox> {
    match to_lon_lat.project_extent(extent) {
        Ok(e) => Some(GeoBoundingBox::new(e.min_x, e.min_y, e.max_x, e.max_y)),
        Err(e) => {
            log::warn!("Failed to derive lon/lat bounds for {extent}: {e}");
            None
        }
    }
}

/// Maps an [`AiError`] onto the response the client sees.
fn ai_error_response(err: AiError) -> HttpResponse {
    match err {
        AiError::Upstream { status, body, .. } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(ApiError::with_details(AI_UPSTREAM_ERROR, body))
        }
        AiError::EmptyResponse { provider } => {
            log::error!("{provider} returned no readable text");
            HttpResponse::InternalServerError().json(ApiError::new(AI_EMPTY_RESPONSE))
        }
        other => {
            log::error!("Error calling AI provider: {other}");
            HttpResponse::InternalServerError().json(ApiError::new(AI_INTERNAL_ERROR))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use actix_web::{App, test};
    use extent_narrator_ai::providers::LlmProvider;
    use serde_json::json;

    use super::*;
    use crate::{AppState, DEFAULT_JSON_LIMIT, configure};

    enum Reply {
        Text(&'static str),
        Upstream(u16, &'static str),
        Empty,
        Transport,
    }

    struct StubProvider {
        reply: Reply,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Upstream(status, body) => Err(AiError::Upstream {
                    provider: "stub",
                    status,
                    body: body.to_string(),
                }),
                Reply::Empty => Err(AiError::EmptyResponse { provider: "stub" }),
                Reply::Transport => Err(AiError::Config {
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    fn state(reply: Reply) -> (web::Data<AppState>, Arc<StubProvider>) {
        let provider = Arc::new(StubProvider {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        let state = AppState::new(provider.clone()).unwrap();
        (web::Data::new(state), provider)
    }

    fn body() -> serde_json::Value {
        json!({
            "extent": [-1_000_000.0, 5_000_000.0, 2_000_000.0, 7_000_000.0],
            "geojson": {
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "id": "paris", "geometry": { "type": "Point", "coordinates": [2.35, 48.85] }, "properties": { "name": "Paris" } },
                    { "type": "Feature", "id": "nyc", "geometry": { "type": "Point", "coordinates": [-74.0, 40.7] }, "properties": { "name": "New York" } },
                    { "type": "Feature", "geometry": null, "properties": {} }
                ]
            }
        })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .configure(configure(DEFAULT_JSON_LIMIT)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn index_reports_running() {
        let (state, _) = state(Reply::Text("unused"));
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert_eq!(body, "Geospatial AI Assistant API is running!");
    }

    #[actix_web::test]
    async fn health_names_provider() {
        let (state, _) = state(Reply::Text("unused"));
        let app = app!(state);

        let resp: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/health").to_request(),
        )
        .await;
        assert_eq!(resp["healthy"], true);
        assert_eq!(resp["aiProvider"], "stub");
    }

    #[actix_web::test]
    async fn describes_extent() {
        let (state, provider) = state(Reply::Text("## Paris\nThe Seine flows here."));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(body())
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp["description"], "## Paris\nThe Seine flows here.");
        assert_eq!(resp["featureCount"], 1);

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Feature ID: paris"));
        assert!(!prompts[0].contains("nyc"));
        assert!(prompts[0].contains("WGS84 lon/lat"));
    }

    #[actix_web::test]
    async fn api_scope_serves_describe_extent() {
        let (state, _) = state(Reply::Text("ok"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/describe-extent")
            .set_json(body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn wraps_single_feature_payload() {
        let (state, _) = state(Reply::Text("ok"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(json!({
                "extent": [-1_000_000.0, 5_000_000.0, 2_000_000.0, 7_000_000.0],
                "geojson": { "type": "Feature", "geometry": { "type": "Point", "coordinates": [2.35, 48.85] }, "properties": null }
            }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["featureCount"], 1);
    }

    #[actix_web::test]
    async fn rejects_missing_features() {
        let (state, provider) = state(Reply::Text("unused"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(json!({ "extent": [0, 0, 1, 1], "geojson": { "type": "FeatureCollection" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = test::read_body_json(resp).await;
        assert_eq!(err.error, INVALID_GEOJSON);
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn geojson_is_validated_before_extent() {
        let (state, _) = state(Reply::Text("unused"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(json!({ "extent": "bad", "geojson": null }))
            .to_request();
        let err: ApiError = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(err.error, INVALID_GEOJSON);
    }

    #[actix_web::test]
    async fn rejects_malformed_extents() {
        let (state, _) = state(Reply::Text("unused"));
        let app = app!(state);

        for extent in [
            json!([0, 0, 1]),
            json!([0, 0, 1, "x"]),
            json!("0,0,1,1"),
            json!([5, 0, 1, 1]),
            serde_json::Value::Null,
        ] {
            let mut payload = body();
            payload["extent"] = extent.clone();
            let req = test::TestRequest::post()
                .uri("/describe-extent")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "extent {extent}");
            let err: ApiError = test::read_body_json(resp).await;
            assert_eq!(err.error, INVALID_EXTENT);
        }
    }

    #[actix_web::test]
    async fn non_json_body_is_bad_request() {
        let (state, _) = state(Reply::Text("unused"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn passes_upstream_status_through() {
        let (state, _) = state(Reply::Upstream(429, "RESOURCE_EXHAUSTED"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let err: ApiError = test::read_body_json(resp).await;
        assert_eq!(err.error, AI_UPSTREAM_ERROR);
        assert_eq!(err.details.as_deref(), Some("RESOURCE_EXHAUSTED"));
    }

    #[actix_web::test]
    async fn empty_ai_response_is_server_error() {
        let (state, _) = state(Reply::Empty);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: ApiError = test::read_body_json(resp).await;
        assert_eq!(err.error, AI_EMPTY_RESPONSE);
    }

    #[actix_web::test]
    async fn transport_failure_is_server_error() {
        let (state, _) = state(Reply::Transport);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: ApiError = test::read_body_json(resp).await;
        assert_eq!(err.error, AI_INTERNAL_ERROR);
    }

    #[actix_web::test]
    async fn malformed_features_are_dropped_not_fatal() {
        let (state, provider) = state(Reply::Text("Paris only."));
        let app = app!(state);

        let payload = json!({
            "extent": [-1_000_000.0, 5_000_000.0, 2_000_000.0, 7_000_000.0],
            "geojson": {
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "id": "paris", "geometry": { "type": "Point", "coordinates": [2.35, 48.85] }, "properties": {} },
                    { "type": "Feature", "id": "short", "geometry": { "type": "Point", "coordinates": [1] }, "properties": {} },
                    { "type": "Feature", "id": "circle", "geometry": { "type": "Circle", "coordinates": [2.35, 48.85] }, "properties": {} }
                ]
            }
        });

        let req = test::TestRequest::post()
            .uri("/features-in-extent")
            .set_json(payload.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(resp["count"], 1);
        assert_eq!(resp["features"]["features"][0]["id"], "paris");

        let req = test::TestRequest::post()
            .uri("/describe-extent")
            .set_json(payload)
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["featureCount"], 1);
        assert_eq!(resp["description"], "Paris only.");

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Feature ID: paris"));
        assert!(!prompts[0].contains("circle"));
    }

    #[actix_web::test]
    async fn features_in_extent_skips_ai() {
        let (state, provider) = state(Reply::Text("unused"));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/features-in-extent")
            .set_json(body())
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp["count"], 1);
        assert_eq!(resp["features"]["features"][0]["id"], "paris");
        assert_eq!(
            resp["features"]["features"][0]["geometry"]["coordinates"],
            json!([2.35, 48.85])
        );
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn parses_integer_extents() {
        let extent = parse_extent(&json!([0, -1, 2, 3])).unwrap();
        assert_eq!(extent.to_array(), [0.0, -1.0, 2.0, 3.0]);
    }
}
