use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .fallback(not_found);

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(public::login_post))
        .route("/api/users", post(public::users_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{folders, notes, tags};

    Router::new()
        .route("/api/login/refresh", post(protected::refresh_post))
        .route("/api/users/me", get(protected::whoami_get))
        .route("/api/folders", get(folders::folders_get).post(folders::folders_post))
        .route(
            "/api/folders/:id",
            get(folders::folder_get)
                .put(folders::folder_put)
                .delete(folders::folder_delete),
        )
        .route("/api/tags", get(tags::tags_get).post(tags::tags_post))
        .route(
            "/api/tags/:id",
            get(tags::tag_get).put(tags::tag_put).delete(tags::tag_delete),
        )
        .route("/api/notes", get(notes::notes_get).post(notes::notes_post))
        .route(
            "/api/notes/:id",
            get(notes::note_get).put(notes::note_put).delete(notes::note_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unusable CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return Some(CorsLayer::permissive());
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Noteful API",
        "version": version,
        "description": "Personal notes organized into folders and tags",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/api/login (public - token acquisition)",
            "users": "/api/users (public - registration), /api/users/me (protected)",
            "refresh": "/api/login/refresh (protected)",
            "folders": "/api/folders[/:id] (protected)",
            "tags": "/api/tags[/:id] (protected)",
            "notes": "/api/notes[/:id] (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
