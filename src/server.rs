use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::crud::DB;
use crate::error::AppError;
use crate::generate::{self, GenerateRequest, GeneratedTopic};
use crate::image::ImageRenderer;
use crate::llm::TextGenerator;
use crate::website::{CreateWebsiteRequest, ValidationError, Website, WebsiteId};

#[derive(Clone)]
pub struct AppState {
    pub db: DB,
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageRenderer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebsiteResponse {
    pub website_id: WebsiteId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-topic", post(generate_topic))
        .route("/api/create-website", post(create_website))
        .route("/api/website/{id}", get(get_website))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server stopped unexpectedly")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn malformed_body(rejection: JsonRejection) -> AppError {
    ValidationError::MalformedBody(rejection.body_text()).into()
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_topic(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GeneratedTopic>, AppError> {
    let Json(request) = payload.map_err(malformed_body)?;
    let topic =
        generate::generate_topic(state.text.as_ref(), state.images.as_ref(), &request).await?;
    Ok(Json(topic))
}

async fn create_website(
    State(state): State<AppState>,
    payload: Result<Json<CreateWebsiteRequest>, JsonRejection>,
) -> Result<Json<CreateWebsiteResponse>, AppError> {
    let Json(request) = payload.map_err(malformed_body)?;
    let website = request.validate(Utc::now())?;

    let website_id = state
        .db
        .create_website(&website)
        .await
        .map_err(AppError::Storage)?;
    tracing::info!(%website_id, topics = website.topics().len(), "published website");

    Ok(Json(CreateWebsiteResponse { website_id }))
}

async fn get_website(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Website>, AppError> {
    let id = raw_id
        .parse::<WebsiteId>()
        .map_err(|_| AppError::InvalidId(raw_id.clone()))?;

    state
        .db
        .get_website(&id)
        .await
        .map_err(AppError::Storage)?
        .map(Json)
        .ok_or(AppError::NotFound)
}
