mod assets;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;

use crate::{config::MapConfig, preview::PreviewDocument, ramp::Ramp};

struct AppState {
    preview: PreviewDocument,
    ramp: Ramp,
}

pub struct WebServerConfig {
    pub map: MapConfig,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct ColorResponse {
    pub year: i32,
    pub color: String,
    pub unknown: bool,
}

pub fn router(map: &MapConfig) -> Result<Router> {
    let preview = PreviewDocument::from_config(map)
        .with_context(|| format!("Failed to build layers for '{}'", map.name))?;
    let ramp = map.ramp()?;
    let state = Arc::new(AppState { preview, ramp });

    Ok(Router::new()
        .route("/", get(index))
        .route("/:file", get(static_asset))
        .route("/api/preview", get(preview_document))
        .route("/api/color/:year", get(resolve_color))
        .with_state(state))
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig { map, host, port } = config;
    let router = router(&map)?;

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    info!(map = %map.name, tiles = %map.server_base(), "preview live at http://{addr} (Ctrl+C to stop)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down preview server");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn static_asset(Path(file): Path<String>) -> Response {
    match assets::lookup(&file) {
        Some(asset) => asset.into_response(),
        None => assets::not_found(),
    }
}

async fn preview_document(State(state): State<Arc<AppState>>) -> Json<PreviewDocument> {
    Json(state.preview.clone())
}

async fn resolve_color(
    State(state): State<Arc<AppState>>,
    Path(year): Path<i32>,
) -> Json<ColorResponse> {
    Json(ColorResponse {
        year,
        color: state.ramp.resolve(year).to_string(),
        unknown: year == state.ramp.unknown().sentinel,
    })
}
