//! API route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{NotFoundError, ValidationError};
use crate::filter;
use crate::ledger::{RaceDraft, RaceLedger};
use crate::standings;
use crate::types::{
    standings_response, DriverResponse, ErrorResponse, HealthResponse, IndexResponse,
    RaceResponse, StandingsResponse, TeamResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    pub catalog: Catalog,
    pub ledger: RaceLedger,
    /// Prefix for resource links, without a trailing slash
    pub base_url: String,
}

impl AppState {
    pub fn new(catalog: Catalog, base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            ledger: RaceLedger::new(),
            base_url: base_url.into(),
        }
    }
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    #[allow(dead_code)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[allow(dead_code)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self::not_found(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/teams/", get(list_teams))
        .route("/teams/{id}/", get(get_team))
        .route("/drivers/", get(list_drivers))
        .route("/drivers/{id}/", get(get_driver))
        .route("/races/", get(list_races).post(create_race))
        .route("/races/{id}/", get(get_race))
        .route("/driver_standings/", get(driver_standings))
        .route("/team_standings/", get(team_standings))
        .with_state(state)
}

/// API entry point.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    Json(IndexResponse::new(&state.base_url))
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<TeamResponse>> {
    let teams = filter::apply(state.catalog.teams(), &query)
        .into_iter()
        .map(|t| TeamResponse::new(t, &state.base_url))
        .collect();
    Json(teams)
}

pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state.catalog.team(id)?;
    Ok(Json(TeamResponse::new(team, &state.base_url)))
}

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<DriverResponse>> {
    let drivers = filter::apply(state.catalog.drivers(), &query)
        .into_iter()
        .map(|d| DriverResponse::new(d, &state.base_url))
        .collect();
    Json(drivers)
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> Result<Json<DriverResponse>, ApiError> {
    let driver = state.catalog.driver(id)?;
    Ok(Json(DriverResponse::new(driver, &state.base_url)))
}

/// Races, most recent first.
pub async fn list_races(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<RaceResponse>> {
    let races = state
        .ledger
        .list(&query)
        .into_iter()
        .map(|r| RaceResponse::new(r, &state.base_url))
        .collect();
    Json(races)
}

/// Record a race result.
pub async fn create_race(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RaceResponse>), ApiError> {
    let draft = RaceDraft::from_value(body);

    let race = state
        .ledger
        .create(&state.catalog, &draft)
        .inspect_err(|e| tracing::warn!("Rejected race submission: {}", e))?;

    tracing::info!(
        id = race.id,
        race = %race.race,
        date = %race.date,
        drivers = race.drivers.len(),
        "Race recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(RaceResponse::new(race, &state.base_url)),
    ))
}

pub async fn get_race(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> Result<Json<RaceResponse>, ApiError> {
    let race = state.ledger.get(id)?;
    Ok(Json(RaceResponse::new(race, &state.base_url)))
}

pub async fn driver_standings(
    State(state): State<Arc<AppState>>,
) -> Json<StandingsResponse<DriverResponse>> {
    let races = state.ledger.snapshot();
    let standings = standings::driver_standings(&state.catalog, &races);
    Json(standings_response(standings, |d| {
        DriverResponse::new(d, &state.base_url)
    }))
}

pub async fn team_standings(
    State(state): State<Arc<AppState>>,
) -> Json<StandingsResponse<TeamResponse>> {
    let races = state.ledger.snapshot();
    let standings = standings::team_standings(&state.catalog, &races);
    Json(standings_response(standings, |t| {
        TeamResponse::new(t, &state.base_url)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::json;
    use tower::ServiceExt;

    const BASE: &str = "http://test";

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(sample_catalog(), BASE))
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    async fn post_race(state: &Arc<AppState>, body: Value) -> Result<RaceResponse, ApiError> {
        create_race(State(state.clone()), Json(body))
            .await
            .map(|(status, Json(race))| {
                assert_eq!(status, StatusCode::CREATED);
                race
            })
    }

    #[tokio::test]
    async fn test_health() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn test_index_links() {
        let Json(response) = index(State(state())).await;
        assert_eq!(response.teams, "http://test/teams/");
        assert_eq!(response.team_standings, "http://test/team_standings/");
    }

    #[tokio::test]
    async fn test_list_teams_with_filter() {
        let state = state();
        let Json(all) = list_teams(State(state.clone()), query(&[])).await;
        assert_eq!(all.len(), 3);

        let Json(filtered) = list_teams(State(state), query(&[("team", "Red")])).await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].url, "http://test/teams/1/");
    }

    #[tokio::test]
    async fn test_get_team_not_found() {
        let err = get_team(State(state()), Path(9)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = get_team(State(state()), Path(0)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_drivers_by_country() {
        let Json(drivers) = list_drivers(State(state()), query(&[("country", "Mon")])).await;
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].driver, "Charles Leclerc");
        assert_eq!(drivers[0].team_url, "http://test/teams/2/");
    }

    #[tokio::test]
    async fn test_get_driver() {
        let Json(driver) = get_driver(State(state()), Path(1)).await.unwrap();
        assert_eq!(driver.driver, "Max Verstappen");
        assert_eq!(driver.url, "http://test/drivers/1/");
    }

    #[tokio::test]
    async fn test_create_then_get_race() {
        let state = state();
        let created = post_race(
            &state,
            json!({"race": "GP1", "date": "2024-03-10", "drivers": {"1": 25, "2": 18}}),
        )
        .await
        .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.url, "http://test/races/1/");

        let Json(fetched) = get_race(State(state), Path(1)).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_race_validation_errors() {
        let state = state();

        let err = post_race(&state, json!({"race": "GP1", "date": "2024-03-10", "drivers": {}}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "at least one driver required");

        let err = post_race(&state, json!({"race": "GP1", "date": "2024-03-10", "drivers": {"999": 10}}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("unknown driver id"));

        let err = post_race(&state, json!({"race": "GP1", "date": "March 10", "drivers": {"1": 1}}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "incorrect date format");

        let err = post_race(&state, json!("GP1")).await.unwrap_err();
        assert_eq!(err.message(), "invalid data");

        assert!(state.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_get_race_not_found() {
        let err = get_race(State(state()), Path(1)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_races_newest_first() {
        let state = state();
        for (name, date) in [("Bahrain", "2024-03-02"), ("Australia", "2024-03-24"), ("Jeddah", "2024-03-09")] {
            post_race(&state, json!({"race": name, "date": date, "drivers": {"1": 1}}))
                .await
                .unwrap();
        }

        let Json(races) = list_races(State(state.clone()), query(&[])).await;
        let ids: Vec<usize> = races.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let Json(races) = list_races(State(state), query(&[("race", "Jed")])).await;
        assert_eq!(races.len(), 1);
        assert_eq!(races[0].race, "Jeddah");
    }

    #[tokio::test]
    async fn test_standings_endpoints() {
        let state = state();
        let Json(empty) = driver_standings(State(state.clone())).await;
        assert!(empty.is_empty());
        let Json(empty) = team_standings(State(state.clone())).await;
        assert!(empty.is_empty());

        post_race(&state, json!({"race": "GP1", "date": "2024-03-10", "drivers": {"1": 25, "2": 18}}))
            .await
            .unwrap();

        let Json(drivers) = driver_standings(State(state.clone())).await;
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[&1].info.id, 1);
        assert_eq!(drivers[&1].score, 25);
        assert_eq!(drivers[&2].info.id, 2);
        assert_eq!(drivers[&2].score, 18);

        let Json(teams) = team_standings(State(state)).await;
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[&1].info.team, "Red Bull Racing");
        assert_eq!(teams[&1].score, 25);
        assert_eq!(teams[&2].info.team, "Ferrari");
        assert_eq!(teams[&2].score, 18);
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::from(ValidationError::InvalidData).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(NotFoundError::new("team", 11)).status(),
            StatusCode::NOT_FOUND
        );
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_router_paths_and_status_codes() {
        let app = router(state());

        let (status, body) = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/races/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"race": "GP1", "date": "2024-03-10", "drivers": {"1": 25, "2": 18}})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
        assert_eq!(body["url"], "http://test/races/1/");

        let (status, body) = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/races/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"race": "GP2", "date": "2024-03-17", "drivers": {}}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "at least one driver required");

        let (status, body) = send(&app, get_request("/races/1/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["race"], "GP1");

        let (status, body) = send(&app, get_request("/driver_standings/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["1"]["score"], 25);
        assert_eq!(body["2"]["info"]["id"], 2);

        let (status, body) = send(&app, get_request("/team_standings/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["1"]["info"]["team"], "Red Bull Racing");

        let (status, body) = send(&app, get_request("/drivers/?country=Mon")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, get_request("/teams/99/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get_request("/races/2/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get_request("/teams/abc/")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
