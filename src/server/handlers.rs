use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

use super::models::{LanguagesResponse, PairInfo, RouteInfo, ServerError};
use super::state::ServerState;
use crate::document::{DocumentResponse, DocumentService, Upload};
use crate::engine::TranslationEngine;

pub fn router<E: TranslationEngine + 'static>(
    service: DocumentService<E>,
    max_upload_bytes: usize,
) -> Router {
    let state = Arc::new(ServerState { service });
    Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages::<E>))
        .route("/translate", post(translate::<E>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(axum::middleware::from_fn(cors_middleware))
}

pub async fn run_server<E: TranslationEngine + 'static>(
    service: DocumentService<E>,
    addr: &str,
    max_upload_bytes: usize,
) -> Result<()> {
    let app = router(service, max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind server address {}", addr))?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert("access-control-allow-methods", HeaderValue::from_static("*"));
    headers.insert("access-control-allow-headers", HeaderValue::from_static("*"));
}

async fn languages<E: TranslationEngine + 'static>(
    State(state): State<Arc<ServerState<E>>>,
) -> Json<LanguagesResponse> {
    let translator = state.service.translator();
    let languages = translator.languages().codes().to_vec();
    let pairs = translator
        .catalog()
        .pairs()
        .map(|(pair, model)| PairInfo {
            source: pair.source.clone(),
            target: pair.target.clone(),
            model: model.to_string(),
        })
        .collect();
    let routes = languages
        .iter()
        .map(|source| RouteInfo {
            source: source.clone(),
            targets: translator.reachable_targets(source),
        })
        .collect();
    Json(LanguagesResponse {
        languages,
        pairs,
        routes,
    })
}

async fn translate<E: TranslationEngine + 'static>(
    State(state): State<Arc<ServerState<E>>>,
    multipart: Multipart,
) -> Result<Json<DocumentResponse>, ServerError> {
    let upload = read_upload(multipart).await?;
    info!(
        "received {} ({} bytes), target {}",
        upload.file_name,
        upload.bytes.len(),
        upload.language
    );
    let response = state.service.translate_document(upload).await?;
    Ok(Json(response))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ServerError> {
    let mut file = None;
    let mut language = None;
    let mut source_language = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::bad_request(err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ServerError::bad_request(err.body_text()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ServerError::bad_request(err.body_text()))?;
                language = Some(value);
            }
            "source_language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ServerError::bad_request(err.body_text()))?;
                source_language = Some(value);
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(ServerError::bad_request("file is required"));
    };
    let language = language
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ServerError::bad_request("language is required"))?;
    Ok(Upload {
        file_name,
        bytes,
        language,
        source_language,
    })
}
