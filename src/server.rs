use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{Res, api, config::Config, info, spotify::SpotifyClient};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: SpotifyClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let spotify = SpotifyClient::new(&config);
        Self {
            config: Arc::new(config),
            spotify,
        }
    }
}

/// Routes of the service; anything unmatched is looked up in the static directory.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/data", get(api::data))
        .route("/refresh_token", get(api::refresh_token))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_api_server(config: Config) -> Res<()> {
    let addr = config.server_addr;
    let app = build_router(AppState::new(config));

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
