use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use engine::{Corpus, EngineCache, EngineConfig, MovieId, NotFoundError, Recommendation, SimilarityEngine, DEFAULT_K};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_K }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub poster: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SimilarityEngine>,
}

/// Errors surfaced to HTTP clients as `{ "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
}

impl From<NotFoundError> for ApiError {
    fn from(e: NotFoundError) -> Self { ApiError::NotFound(e.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Load the corpus at `data` and build the engine with the default config.
pub fn build_app(data: String) -> Result<Router> {
    build_app_with(data, EngineConfig::default(), Arc::new(EngineCache::new()))
}

/// Build through a caller-owned cache, so apps over the same corpus and config share one engine.
pub fn build_app_with(data: String, config: EngineConfig, cache: Arc<EngineCache>) -> Result<Router> {
    let corpus = Corpus::load(&data).with_context(|| format!("loading corpus from {data}"))?;
    let engine = cache.get_or_build(Arc::new(corpus), config)?;
    let app_state = AppState { engine };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/movies", get(movies_handler))
        .route("/movies/:id", get(movie_handler))
        .route("/recommend", get(recommend_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

fn summary(engine: &SimilarityEngine, id: MovieId) -> Option<MovieSummary> {
    let movie = engine.corpus().get(id)?;
    Some(MovieSummary { id, title: movie.title.clone(), genres: movie.genres.tags(), poster: movie.poster.clone() })
}

pub async fn movies_handler(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = state.engine.corpus().records().iter().filter_map(|r| summary(&state.engine, r.id)).collect();
    Json(movies)
}

pub async fn movie_handler(State(state): State<AppState>, Path(id): Path<u32>) -> Result<Json<serde_json::Value>, ApiError> {
    let id = MovieId(id);
    let movie = state.engine.corpus().get(id).ok_or_else(|| ApiError::NotFound(format!("movie {id} not found")))?;
    Ok(Json(serde_json::json!({
        "id": id,
        "title": movie.title,
        "overview": movie.overview,
        "genres": movie.genres.tags(),
        "poster": movie.poster,
    })))
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, MAX_K);
    let results = state.engine.recommend(&params.title, k).map_err(|e| {
        tracing::info!(title = %params.title, "recommend: title not found");
        ApiError::from(e)
    })?;
    Ok(Json(RecommendResponse { query: params.title, took_s: start.elapsed().as_secs_f64(), results }))
}
