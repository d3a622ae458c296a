use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use traffic_fine_api::app::{AppState, build_router};
use traffic_fine_api::config::db::MongoConfig;
use traffic_fine_api::config::environment::AppConfig;
use traffic_fine_api::infra::init_infra;
use traffic_fine_api::service::payment_gateway_service::HttpPaymentGateway;

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    let infra = match MongoConfig::from_app(&config) {
        Some(mongo) => match init_infra(&mongo).await {
            Ok(i) => Some(i),
            Err(e) => {
                warn!(error = %e, "infra init failed; running without persistence");
                None
            }
        },
        None => None,
    };
    let gateway = match HttpPaymentGateway::from_config(&config) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            error!(error = %e, "payment gateway init failed");
            std::process::exit(1);
        }
    };

    info!(
        env = %config.rust_env,
        host = %config.api_host,
        port = config.api_port,
        gateway_base_url = %config.gateway_base_url,
        mongo_enabled = infra.is_some(),
        "traffic-fine-api started"
    );

    let state = AppState::new(config, infra, gateway);
    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
