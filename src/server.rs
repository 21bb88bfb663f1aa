use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{AppConfig, Environment};
use crate::database::models::EntityKind;
use crate::database::SharedStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{CatalogService, TimetableService};

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub timetable: Arc<TimetableService>,
    pub catalog: Arc<CatalogService>,
    pub store: SharedStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        Self {
            timetable: Arc::new(TimetableService::new(Arc::clone(&store))),
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .nest("/api", api_routes(state.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    }

    router.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    let mut router = timetable_routes().merge(availability_routes());
    for kind in EntityKind::ALL {
        router = router.merge(protected::catalog::routes(kind));
    }

    router.route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn timetable_routes() -> Router<AppState> {
    use protected::timetable;

    Router::new()
        .route("/timetable", post(timetable::create))
        .route("/timetable/check", post(timetable::check))
        .route(
            "/timetable/:id",
            get(timetable::show).put(timetable::update).delete(timetable::delete),
        )
        .route("/timetable/section/:id", get(timetable::by_section))
        .route("/timetable/professor/:id", get(timetable::by_professor))
        .route("/timetable/room/:id", get(timetable::by_room))
}

fn availability_routes() -> Router<AppState> {
    use protected::availability;

    Router::new()
        .route("/professors/:id/availability", get(availability::professor))
        .route("/rooms/:id/availability", get(availability::room))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!(
        "Timetable API listening on http://{} ({} store, {:?} mode)",
        bind_addr,
        state.store.backend(),
        state.config.environment
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
