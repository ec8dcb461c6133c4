mod config;
mod downloader;
mod error;
mod extract;
mod forward;
mod handlers;
mod logging;
mod relay;
mod types;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use config::RelayConfig;
use handlers::AppState;
use relay::Relay;

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(expected) = state.webhook_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

    if token == expected {
        Ok(next.run(req).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn app(state: Arc<AppState>) -> Router {
    let webhook = post(handlers::webhook).fallback(handlers::method_not_allowed);

    let routes = Router::new()
        .route("/", webhook.clone())
        .route("/api/webhook", webhook)
        .route("/api/health", get(handlers::health));
    with_layers(routes, state)
}

fn with_layers(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = RelayConfig::from_env()?;
    info!("Downloader: {}", config.downloader_base_url);
    info!("Send endpoint: {}", config.send_endpoint);
    info!(
        "Platforms: {}",
        config
            .platforms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let state = Arc::new(AppState {
        relay: Relay::new(&config)?,
        webhook_token: config.webhook_token.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
