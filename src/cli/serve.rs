use std::{net::SocketAddr, path::PathBuf};

use crate::{config::Config, error, info, server, warning};

pub async fn serve(
    address: Option<SocketAddr>,
    secrets: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    open: bool,
) {
    let mut config = match Config::from_env(secrets).await {
        Ok(config) => config,
        Err(e) => error!("Cannot load configuration. Err: {}", e),
    };

    if let Some(address) = address {
        config.server_addr = address;
    }
    if let Some(static_dir) = static_dir {
        config.static_dir = static_dir;
    }

    if !config.static_dir.is_dir() {
        warning!(
            "Static directory {} not found, only the API routes will answer",
            config.static_dir.display()
        );
    }

    info!("Using Spotify client {}", config.credentials.client_id);
    info!("Redirect URI is {}", config.redirect_uri);

    let web_root = format!("http://{}/", config.server_addr);
    let handle = tokio::spawn(server::start_api_server(config));

    if open && webbrowser::open(&web_root).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            web_root
        );
    }

    match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Server stopped. Err: {}", e),
        Err(e) => error!("Server task failed. Err: {}", e),
    }
}
