use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::fine::crud::FineStore;
use crate::module::user::crud::UserStore;
use crate::module::violation::crud::ViolationStore;
use crate::service::payment_gateway_service::PaymentGateway;
use axum::Router;
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub fines: Arc<FineStore>,
    pub violations: Arc<ViolationStore>,
    pub users: Arc<UserStore>,
    pub infra: Option<InfraClients>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        infra: Option<InfraClients>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            config,
            fines: Arc::new(FineStore::default()),
            violations: Arc::new(ViolationStore::default()),
            users: Arc::new(UserStore::default()),
            infra,
            gateway,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let origins = state
        .config
        .cors_allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(crate::module::fine::route::register_routes(state.clone()))
        .merge(crate::module::violation::route::register_routes(
            state.clone(),
        ))
        .merge(crate::module::user::route::register_routes(state))
        .layer(cors)
}
