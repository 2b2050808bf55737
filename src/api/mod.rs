use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{MethodRouter, delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{Repository, Store};
use crate::services::{AuthService, BotService};

pub mod auth;
mod bots;
mod error;
mod observability;
mod system;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Arc<dyn Repository>,

    pub auth: Arc<AuthService>,

    pub bots: Arc<BotService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }
}

/// Wires services over an already-open repository.
pub fn create_app_state(
    config: Config,
    store: Arc<dyn Repository>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let auth = Arc::new(AuthService::from_config(store.clone(), &config.security)?);
    let bots = Arc::new(BotService::new(store.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        auth,
        bots,
        prometheus_handle,
    }))
}

/// Connects the database named in the config, runs migrations and wires services.
pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    create_app_state(config, Arc::new(store), prometheus_handle)
}

/// Registers `path` and its trailing-slash twin.
fn route_both(
    router: Router<Arc<AppState>>,
    path: &str,
    method_router: MethodRouter<Arc<AppState>>,
) -> Router<Arc<AppState>> {
    router
        .route(path, method_router.clone())
        .route(&format!("{path}/"), method_router)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let public_bot_lookup = state.config.server.public_bot_lookup;

    let require_auth = middleware::from_fn_with_state(state.clone(), auth::auth_middleware);
    let protect = |method_router: MethodRouter<Arc<AppState>>| {
        method_router.route_layer(require_auth.clone())
    };

    let bot_by_id = if public_bot_lookup {
        get(bots::get_bot).merge(protect(delete(bots::delete_bot)))
    } else {
        protect(get(bots::get_bot).delete(bots::delete_bot))
    };

    let mut routes = Router::new().route("/", get(system::index));
    routes = route_both(routes, "/login", post(auth::login));
    routes = route_both(routes, "/health", get(system::health));
    routes = route_both(
        routes,
        "/bots",
        protect(get(bots::list_bots).post(bots::create_bot)),
    );
    routes = route_both(routes, "/bots/{bot_id}", bot_by_id);
    routes = route_both(routes, "/me", protect(get(users::me)));
    routes = route_both(
        routes,
        "/metrics",
        protect(get(observability::get_metrics)),
    );

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|s| {
                s.parse::<HeaderValue>()
                    .inspect_err(|_| tracing::warn!("Ignoring invalid CORS origin {s:?}"))
                    .ok()
            })
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    routes
        .with_state(state)
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
}
