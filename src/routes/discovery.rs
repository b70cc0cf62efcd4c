use std::sync::Arc;

use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::{Facet, FilterError, FilterOptions};
use crate::models::{
    CreateSessionRequest, DiscoveryQuery, ErrorResponse, HealthResponse, ListingResponse,
    SearchRequest, SearchResponse, SessionResponse, ToggleFilterRequest,
};
use crate::services::{run_search, DatasetError, Geocoder, SessionHandle, SessionStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub geocoder: Arc<dyn Geocoder>,
}

/// Configure discovery and detail routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/filters", web::get().to(filter_options))
        .route("/florists", web::get().to(list_florists))
        .route("/florists/{id}", web::get().to(florist_detail))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}", web::delete().to(delete_session))
        .route("/sessions/{id}/search", web::post().to(search))
        .route("/sessions/{id}/search", web::delete().to(reset_search))
        .route("/sessions/{id}/filters", web::post().to(toggle_filter))
        .route("/sessions/{id}/filters", web::delete().to(clear_filters));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn session_not_found(id: &Uuid) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        "Session not found",
        format!("No discovery session {}", id),
    )
}

fn invalid_filter(e: FilterError) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "Invalid filter", e.to_string())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let florists = state.sessions.dataset().len();
    let status = if florists > 0 { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        florists,
        sessions: state.sessions.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Facet values offered as toggles
///
/// GET /api/v1/filters
async fn filter_options() -> impl Responder {
    HttpResponse::Ok().json(FilterOptions::default())
}

/// One-shot listing: search, rank and filter without keeping a session
///
/// GET /api/v1/florists?q=London&price=$$&services=Delivery&categories=Wedding,Events
async fn list_florists(
    state: web::Data<AppState>,
    query: web::Query<DiscoveryQuery>,
) -> impl Responder {
    let mut session = state.sessions.detached();

    let facets = [
        (Facet::Price, &query.price),
        (Facet::Services, &query.services),
        (Facet::Categories, &query.categories),
    ];
    for (facet, param) in facets {
        for value in DiscoveryQuery::values(param) {
            if let Err(e) = session.select_filter(facet, &value) {
                return invalid_filter(e);
            }
        }
    }

    let outcome = match query.q.as_deref() {
        Some(q) => Some(session.search(state.geocoder.as_ref(), q).await),
        None => None,
    };

    let view = session.view();
    tracing::debug!("Listing {} florists (search outcome: {:?})", view.total, outcome);

    HttpResponse::Ok().json(ListingResponse { outcome, view })
}

/// Florist detail lookup
///
/// GET /api/v1/florists/{id}
async fn florist_detail(
    state: web::Data<AppState>,
    path: web::Path<u32>,
) -> impl Responder {
    let id = path.into_inner();

    match state.sessions.dataset().get(id) {
        Ok(florist) => HttpResponse::Ok().json(florist),
        Err(e @ DatasetError::NotFound(_)) => {
            tracing::debug!("Detail lookup failed: {}", e);
            error_response(StatusCode::NOT_FOUND, "Florist not found", e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Dataset error", e.to_string()),
    }
}

/// Create a discovery session
///
/// POST /api/v1/sessions
///
/// Request body (optional):
/// ```json
/// { "query": "London" }
/// ```
async fn create_session(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> impl Responder {
    // An empty body means "no initial query"; anything else must be valid JSON
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        match serde_json::from_slice::<CreateSessionRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    format!("Invalid JSON: {}", e),
                )
            }
        }
    };
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let (session_id, handle) = state.sessions.create().await;

    if let Some(query) = req.query.as_deref() {
        let outcome = run_search(&handle, state.geocoder.as_ref(), query).await;
        tracing::info!("Session {} created with search '{}': {:?}", session_id, query, outcome);
    } else {
        tracing::info!("Session {} created", session_id);
    }

    let view = handle.lock().await.view();
    HttpResponse::Created().json(SessionResponse { session_id, view })
}

async fn lookup(state: &AppState, id: &Uuid) -> Option<SessionHandle> {
    state.sessions.get(id).await
}

/// Current session view
///
/// GET /api/v1/sessions/{id}
async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    let Some(handle) = lookup(&state, &session_id).await else {
        return session_not_found(&session_id);
    };

    let view = handle.lock().await.view();
    HttpResponse::Ok().json(SessionResponse { session_id, view })
}

/// DELETE /api/v1/sessions/{id}
async fn delete_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    if state.sessions.remove(&session_id).await {
        HttpResponse::NoContent().finish()
    } else {
        session_not_found(&session_id)
    }
}

/// Submit a location search
///
/// POST /api/v1/sessions/{id}/search
///
/// Request body:
/// ```json
/// { "query": "London" }
/// ```
///
/// An unresolvable query is not an error: the response carries outcome
/// `unresolved` and the unchanged view.
async fn search(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let session_id = path.into_inner();
    let Some(handle) = lookup(&state, &session_id).await else {
        return session_not_found(&session_id);
    };

    let outcome = run_search(&handle, state.geocoder.as_ref(), &req.query).await;

    tracing::info!("Session {} search '{}': {:?}", session_id, req.query, outcome);

    let view = handle.lock().await.view();
    HttpResponse::Ok().json(SearchResponse {
        session_id,
        outcome,
        view,
    })
}

/// Return to dataset order and the default map view
///
/// DELETE /api/v1/sessions/{id}/search
async fn reset_search(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    let Some(handle) = lookup(&state, &session_id).await else {
        return session_not_found(&session_id);
    };

    let mut session = handle.lock().await;
    session.reset_search();

    HttpResponse::Ok().json(SessionResponse {
        session_id,
        view: session.view(),
    })
}

/// Toggle one facet value
///
/// POST /api/v1/sessions/{id}/filters
///
/// Request body:
/// ```json
/// { "facet": "price|services|categories", "value": "$$" }
/// ```
async fn toggle_filter(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ToggleFilterRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let session_id = path.into_inner();
    let Some(handle) = lookup(&state, &session_id).await else {
        return session_not_found(&session_id);
    };

    let mut session = handle.lock().await;
    match session.toggle_filter(req.facet, &req.value) {
        Ok(selected) => {
            tracing::debug!(
                "Session {} {} {}={}",
                session_id,
                if selected { "selected" } else { "deselected" },
                req.facet,
                req.value
            );
            HttpResponse::Ok().json(SessionResponse {
                session_id,
                view: session.view(),
            })
        }
        Err(e) => invalid_filter(e),
    }
}

/// Clear every facet
///
/// DELETE /api/v1/sessions/{id}/filters
async fn clear_filters(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let session_id = path.into_inner();
    let Some(handle) = lookup(&state, &session_id).await else {
        return session_not_found(&session_id);
    };

    let mut session = handle.lock().await;
    session.clear_filters();

    HttpResponse::Ok().json(SessionResponse {
        session_id,
        view: session.view(),
    })
}
