//! Rotas HTTP, estado compartilhado e mapeamento de erros.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ner_report::{
    analyze, config::SUGGESTED_MODELS, Analysis, EntityRow, ErrorKind, ExportError, ExportFormat, ExportSink,
    LabelCount, ModelHandle, ModelProvider, NerConfig, NerError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Estado compartilhado da aplicação
pub struct AppState {
    provider: ModelProvider,
    default_model: String,
    sink: ExportSink,
    /// Handles já carregados, por nome. Handles são somente leitura, então uma
    /// mesma instância atende requisições concorrentes.
    handles: RwLock<HashMap<String, ModelHandle>>,
}

impl AppState {
    pub fn new(config: &NerConfig) -> Self {
        Self {
            provider: ModelProvider::from_config(config),
            default_model: config.default_model.clone(),
            sink: ExportSink::new(config.export_dir.clone()),
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Devolve o handle do modelo, carregando-o na primeira vez (bloqueante).
    pub fn handle(&self, name: &str) -> ner_report::Result<ModelHandle> {
        if let Some(handle) = self.read_handles().get(name).cloned() {
            return Ok(handle);
        }
        let handle = self.provider.load(name)?;
        self.write_handles()
            .entry(name.to_string())
            .or_insert_with(|| handle.clone());
        Ok(handle)
    }

    // o mapa só recebe handles completos, então continua válido após um pânico
    fn read_handles(&self) -> RwLockReadGuard<'_, HashMap<String, ModelHandle>> {
        self.handles.read().unwrap_or_else(|poisoned| {
            warn!("cache de modelos envenenado; recuperando");
            poisoned.into_inner()
        })
    }

    fn write_handles(&self) -> RwLockWriteGuard<'_, HashMap<String, ModelHandle>> {
        self.handles.write().unwrap_or_else(|poisoned| {
            warn!("cache de modelos envenenado; recuperando");
            poisoned.into_inner()
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn model_or_default(&self, model: Option<String>) -> String {
        model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone())
    }
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ExportRequest {
    text: String,
    #[serde(default)]
    model: Option<String>,
    format: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    model: String,
    entities: Vec<EntityRow>,
    statistics: Vec<LabelCount>,
    total: usize,
    html: String,
    processing_ms: u64,
}

#[derive(Serialize)]
struct ExportResponse {
    file: String,
    format: ExportFormat,
    rows: usize,
}

#[derive(Serialize)]
struct ModelsResponse {
    installed: Vec<String>,
    default: String,
    suggested: Vec<&'static str>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

/// Erros da API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Ner(#[from] NerError),

    #[error("erro interno: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ner(NerError::Export(ExportError::UnsupportedFormat(_))) => StatusCode::BAD_REQUEST,
            ApiError::Ner(e) => match e.kind() {
                ErrorKind::ModelNotFound => StatusCode::NOT_FOUND,
                ErrorKind::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Export | ErrorKind::Render => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Ner(e) => match e.kind() {
                ErrorKind::ModelNotFound => "model_not_found",
                ErrorKind::Extraction => "extraction_failed",
                ErrorKind::Export => "export_failed",
                ErrorKind::Render => "render_failed",
            },
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "falha na requisição");
        } else {
            warn!(error = %self, "requisição rejeitada");
        }
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/models", get(models_handler))
        .route("/analyze", post(analyze_handler))
        .route("/export", post(export_handler))
        .route("/render", post(render_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Executa trabalho síncrono (carga de modelo, extração, escrita) fora do runtime
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

fn require_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Digite ou envie um texto para analisar".to_string(),
        ));
    }
    Ok(())
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

async fn models_handler(State(state): State<Arc<AppState>>) -> Result<Json<ModelsResponse>, ApiError> {
    let default = state.default_model().to_string();
    let installed = run_blocking(move || Ok(state.provider.installed())).await?;
    Ok(Json(ModelsResponse {
        installed,
        default,
        suggested: SUGGESTED_MODELS.to_vec(),
    }))
}

/// Análise completa: tabela, estatísticas e visualização embutível
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    require_text(&req.text)?;

    let response = run_blocking(move || {
        let model = state.model_or_default(req.model);
        let handle = state.handle(&model)?;
        let analysis: Analysis = analyze(&handle, &req.text)?;
        let html = analysis.render_fragment(&req.text)?.into_string();
        Ok(AnalyzeResponse {
            model: analysis.model,
            entities: analysis.table.rows(),
            statistics: analysis.statistics.by_count(),
            total: analysis.table.len(),
            html,
            processing_ms: analysis.processing_ms,
        })
    })
    .await?;

    info!(model = %response.model, entities = response.total, "análise concluída");
    Ok(Json(response))
}

/// Analisa e grava o resultado no arquivo fixo do formato pedido
async fn export_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, ApiError> {
    let format: ExportFormat = req.format.parse().map_err(NerError::from)?;
    require_text(&req.text)?;

    let response = run_blocking(move || {
        let model = state.model_or_default(req.model);
        let handle = state.handle(&model)?;
        let analysis = analyze(&handle, &req.text)?;
        let path = state.sink.export_as(&analysis.table, format)?;
        Ok(ExportResponse {
            file: path.display().to_string(),
            format,
            rows: analysis.table.len(),
        })
    })
    .await?;

    Ok(Json(response))
}

/// Página HTML independente com as entidades destacadas
async fn render_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Html<String>, ApiError> {
    require_text(&req.text)?;

    let page = run_blocking(move || {
        let model = state.model_or_default(req.model);
        let handle = state.handle(&model)?;
        let analysis = analyze(&handle, &req.text)?;
        Ok(analysis.render(&req.text)?.into_string())
    })
    .await?;

    Ok(Html(page))
}
