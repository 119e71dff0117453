use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use crate::core::{AffinityMatrix, AffinityModel, CharacterUniverse, Filter, FilterError};
use crate::models::{
    CharacterSummary, CharactersResponse, ErrorResponse, FilterRequest, FilterResponse,
    HealthResponse,
};
use crate::services::{
    CacheError, CharacterRegistry, LoaderError, MatrixCache, MatrixLoader, SearchUrlBuilder,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub universe: Arc<CharacterUniverse>,
    pub global: Arc<AffinityMatrix>,
    pub registry: Arc<CharacterRegistry>,
    pub loader: Arc<MatrixLoader>,
    pub child_matrix_dir: Arc<PathBuf>,
    pub cache: Arc<MatrixCache>,
    pub search: Arc<SearchUrlBuilder>,
    pub filter: Filter,
}

/// Configure all filter-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/characters", web::get().to(list_characters))
        .route("/filter", web::post().to(run_filter));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.universe.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        characters: state.universe.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// List the character universe with deploy flags
///
/// GET /api/v1/characters
async fn list_characters(state: web::Data<AppState>) -> impl Responder {
    let characters: Vec<CharacterSummary> = state
        .universe
        .iter()
        .map(|name| CharacterSummary {
            name: name.to_string(),
            deployed: state.registry.is_character_deployed(name),
        })
        .collect();

    HttpResponse::Ok().json(CharactersResponse {
        total: characters.len(),
        characters,
    })
}

/// Filter endpoint
///
/// POST /api/v1/filter
///
/// Request body:
/// ```json
/// {
///   "child": "string",
///   "parent1": "string",
///   "parent2": null,
///   "owned1": false,
///   "owned2": false,
///   "ancestors1": ["string"],
///   "ancestors2": [],
///   "xPct": 10.0,
///   "yPct": 20.0,
///   "search": { "searchCount": 100, "blueFactors": [{"kind": "speed", "num": 3}] }
/// }
/// ```
async fn run_filter(
    state: web::Data<AppState>,
    req: web::Json<FilterRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for filter request: field_errors={:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let selection = req.selection();
    let thresholds = req.thresholds(state.filter.thresholds());

    tracing::info!(
        "[{}] Filtering for child {} (parent1={:?}, parent2={:?}, x={}, y={})",
        request_id,
        selection.child,
        selection.parent1.name,
        selection.parent2.name,
        thresholds.x_pct,
        thresholds.y_pct
    );

    // Unknown children never reach the filesystem
    if state.universe.index_of(&selection.child).is_none() {
        return filter_error_response(FilterError::UnknownCharacter(selection.child));
    }

    let loader = state.loader.clone();
    let dir = state.child_matrix_dir.clone();
    let universe = state.universe.clone();
    let child = selection.child.clone();
    let child_matrix = match state
        .cache
        .get_or_load(&selection.child, move || loader.load_child(&dir, &child, &universe))
        .await
    {
        Ok(matrix) => matrix,
        Err(e) => {
            return match &*e {
                CacheError::Load(LoaderError::NotFound(path)) => {
                    tracing::warn!("[{}] No child matrix at {}", request_id, path.display());
                    error_response(StatusCode::NOT_FOUND, "Child matrix not found", e.to_string())
                }
                _ => {
                    tracing::error!("[{}] Failed to load child matrix: {}", request_id, e);
                    error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to load child matrix",
                        e.to_string(),
                    )
                }
            };
        }
    };

    let model = match AffinityModel::new(&state.universe, &state.global, &child_matrix) {
        Ok(model) => model,
        Err(e) => return filter_error_response(e.into()),
    };

    let outcome = match state.filter.run(&model, &selection, Some(thresholds)) {
        Ok(outcome) => outcome,
        Err(e) => return filter_error_response(e),
    };

    let search_url = match state.search.build(
        outcome.whitelist.as_slice(),
        outcome.blacklist.as_slice(),
        &state.registry,
        &req.search,
    ) {
        Ok(url) => url,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid search options", e.to_string());
        }
    };

    tracing::info!(
        "[{}] Returning {} whitelisted and {} blacklisted characters ({:?})",
        request_id,
        outcome.whitelist.len(),
        outcome.blacklist.len(),
        outcome.status
    );

    HttpResponse::Ok().json(FilterResponse {
        request_id,
        whitelist: outcome.whitelist,
        blacklist: outcome.blacklist,
        status: outcome.status,
        stats: outcome.stats,
        search_url,
    })
}

fn filter_error_response(err: FilterError) -> HttpResponse {
    match err {
        FilterError::UnknownCharacter(_) => {
            error_response(StatusCode::BAD_REQUEST, "Character not found", err.to_string())
        }
        FilterError::InvalidThreshold { .. }
        | FilterError::TooManyAncestors { .. }
        | FilterError::SameParent(_) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid filter parameters", err.to_string())
        }
        FilterError::Matrix(_) => {
            tracing::error!("Inconsistent affinity data: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Inconsistent affinity data",
                err.to_string(),
            )
        }
    }
}
