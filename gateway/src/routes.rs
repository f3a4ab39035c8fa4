//! Game API routes
//!
//! - POST /games: new game (optional region)
//! - GET /games/:id: candidates and history
//! - POST /games/:id/round: region change or fresh round
//! - POST /games/:id/guesses: submit a guess
//! - DELETE /games/:id: discard a game

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use round_engine::{GameError, GuessEntry, Region, REGIONS};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::games::{AppState, GameRecord};

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ========== Request/Response Types ==========

#[derive(Deserialize, Default)]
pub struct RoundRequest {
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Deserialize)]
pub struct GuessRequest {
    pub guess: String,
}

#[derive(Serialize)]
pub struct GameView {
    pub id: Uuid,
    pub region: String,
    /// Autocomplete list for the current pool
    pub candidates: Vec<String>,
    pub history: Vec<GuessEntry>,
    pub solved: bool,
    pub created_at: String,
}

impl GameView {
    fn new(id: Uuid, record: &GameRecord) -> Self {
        let session = &record.session;
        Self {
            id,
            region: session.region().map(|r| r.to_string()).unwrap_or_default(),
            candidates: session.candidates().into_iter().map(String::from).collect(),
            history: session.history().to_vec(),
            solved: session.is_solved(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct GuessResponse {
    /// False when the guess was empty or not a pool country
    pub accepted: bool,
    pub entry: Option<GuessEntry>,
    pub solved: bool,
}

fn game_error(err: GameError) -> (StatusCode, String) {
    let status = match &err {
        GameError::EmptyPool(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GameError::InvalidRegion(_) => StatusCode::BAD_REQUEST,
        GameError::NoActiveRound => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

fn not_found(id: Uuid) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Game {} not found", id))
}

fn parse_region(region: Option<String>) -> Result<Option<Region>, GameError> {
    region.map(|r| r.parse()).transpose()
}

// ========== Route Handlers ==========

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "country-guess-gateway",
        "countries": state.countries.len(),
        "games": state.game_count().await,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_regions() -> Json<Vec<&'static str>> {
    Json(REGIONS.to_vec())
}

async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<RoundRequest>,
) -> ApiResult<(StatusCode, Json<GameView>)> {
    let region = parse_region(req.region).map_err(game_error)?.unwrap_or_default();
    let id = state.create_game(region).await.map_err(game_error)?;

    let games = state.games.read().await;
    let record = games.get(&id).ok_or_else(|| not_found(id))?;
    tracing::info!("Game {} created", id);

    Ok((StatusCode::CREATED, Json(GameView::new(id, record))))
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GameView>> {
    let games = state.games.read().await;
    let record = games.get(&id).ok_or_else(|| not_found(id))?;

    Ok(Json(GameView::new(id, record)))
}

async fn new_round(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RoundRequest>,
) -> ApiResult<Json<GameView>> {
    let region = parse_region(req.region).map_err(game_error)?;

    let mut games = state.games.write().await;
    let record = games.get_mut(&id).ok_or_else(|| not_found(id))?;

    let started = match region {
        Some(region) => record.session.start(region),
        None => record.session.restart(),
    };
    started.map_err(game_error)?;
    record.touch();

    Ok(Json(GameView::new(id, record)))
}

async fn submit_guess(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GuessRequest>,
) -> ApiResult<Json<GuessResponse>> {
    let mut games = state.games.write().await;
    let record = games.get_mut(&id).ok_or_else(|| not_found(id))?;

    let entry = record
        .session
        .submit(&req.guess)
        .map_err(game_error)?
        .cloned();
    record.touch();

    Ok(Json(GuessResponse {
        accepted: entry.is_some(),
        entry,
        solved: record.session.is_solved(),
    }))
}

async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let removed = state.games.write().await.remove(&id);
    if removed.is_some() {
        tracing::info!("Game {} deleted", id);
    }
    removed
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(id))
}

// ========== Router ==========

pub fn game_routes(state: AppState) -> Router {
    Router::new()
        .route("/regions", get(list_regions))
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game).delete(delete_game))
        .route("/games/:id/round", post(new_round))
        .route("/games/:id/guesses", post(submit_guess))
        .with_state(state)
}

/// Health check plus the versioned game API
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/api/v1", game_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
