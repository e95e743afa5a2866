//! HTTP routes.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::page::{PageContent, render_page};
use crate::error::{AnalysisError, ClientError, ExportError};
use crate::export::{Exporter, MemorySink};
use crate::models::{AnalysisReport, AnalysisRequest, AnalysisType, ContentCard};
use crate::preferences::{PreferenceStore, Preferences};
use crate::render::{View, render_html};
use crate::service::AnalysisService;
use crate::theme::ThemeState;

/// Shared state for HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Analysis runner.
    pub service: AnalysisService,
    /// PDF exporter.
    pub exporter: Exporter,
    /// Live theme, seeded from preferences.
    pub theme: ThemeState,
    /// Persisted preferences.
    pub preferences: PreferenceStore,
    /// Most recent successful analysis, shown on `GET /`.
    pub last_report: RwLock<Option<AnalysisReport>>,
}

impl AppState {
    /// Bundle the parts, seeding the live theme from preferences.
    pub async fn new(service: AnalysisService, exporter: Exporter, preferences: PreferenceStore) -> Self {
        let theme = ThemeState::new(preferences.get().await.theme);
        Self { service, exporter, theme, preferences, last_report: RwLock::new(None) }
    }
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze_form))
        .route("/export", post(export_pdf))
        .route("/api/analysis-types", get(analysis_types))
        .route("/api/analysis", post(analyze_json))
        .route("/api/preferences", get(get_preferences).put(put_preferences))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error body returned by the JSON endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn status_for_analysis(err: &AnalysisError) -> StatusCode {
        match err {
            AnalysisError::EmptyContext => StatusCode::BAD_REQUEST,
            AnalysisError::Busy => StatusCode::CONFLICT,
            AnalysisError::Client(ClientError::MissingApiKey) => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::Client(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self { status: Self::status_for_analysis(&err), message: err.to_user_message() }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        let status = match &err {
            ExportError::NoContent => StatusCode::BAD_REQUEST,
            ExportError::Busy => StatusCode::CONFLICT,
            ExportError::BrandMarkUnavailable { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "campaign-analyst",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let last = state.last_report.read().await;
    let theme = state.theme.current();

    let Some(report) = last.as_ref() else {
        return Html(render_page(&PageContent { theme, ..PageContent::default() }));
    };

    let result = render_html(&View::from_cards(&report.cards));
    Html(render_page(&PageContent {
        theme,
        selected: report.analysis_type,
        result_html: Some(&result),
        exportable: !report.is_empty(),
        ..PageContent::default()
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeForm {
    #[serde(default)]
    analysis_type: String,
    #[serde(default)]
    context: String,
}

async fn analyze_form(State(state): State<Arc<AppState>>, Form(form): Form<AnalyzeForm>) -> Response {
    let theme = state.theme.current();

    let analysis_type = if form.analysis_type.is_empty() {
        AnalysisType::default()
    } else {
        match form.analysis_type.parse::<AnalysisType>() {
            Ok(t) => t,
            Err(message) => {
                let page = render_page(&PageContent {
                    theme,
                    context: &form.context,
                    error: Some(&message),
                    ..PageContent::default()
                });
                return (StatusCode::BAD_REQUEST, Html(page)).into_response();
            }
        }
    };

    let request = AnalysisRequest { analysis_type, context: form.context.clone() };
    match state.service.run(request).await {
        Ok(report) => {
            let result = render_html(&View::from_cards(&report.cards));
            let page = render_page(&PageContent {
                theme,
                selected: analysis_type,
                context: &form.context,
                result_html: Some(&result),
                exportable: !report.is_empty(),
                error: None,
            });
            *state.last_report.write().await = Some(report);
            Html(page).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Analysis failed");
            let message = err.to_user_message();
            let page = render_page(&PageContent {
                theme,
                selected: analysis_type,
                context: &form.context,
                error: Some(&message),
                ..PageContent::default()
            });
            (ApiError::status_for_analysis(&err), Html(page)).into_response()
        }
    }
}

/// Export the held analysis as a PDF download.
async fn export_pdf(State(state): State<Arc<AppState>>) -> Response {
    let view = match state.last_report.read().await.as_ref() {
        Some(report) => View::from_cards(&report.cards),
        None => View::NoData,
    };
    let sink = MemorySink::new();

    if let Err(err) = state.exporter.export(&view, &state.theme, &sink).await {
        return ApiError::from(err).into_response();
    }

    let Some((file_name, bytes)) = sink.take_last() else {
        return ApiError::from(ExportError::capture("no document was produced")).into_response();
    };

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")), (header::CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response()
}

async fn analysis_types() -> impl IntoResponse {
    Json(AnalysisType::options())
}

/// Response of `POST /api/analysis`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    analysis_type: AnalysisType,
    raw_text: String,
    cards: Vec<ContentCard>,
    html: String,
}

async fn analyze_json(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let report = state.service.run(request).await?;
    let html = render_html(&View::from_cards(&report.cards));

    let response = AnalysisResponse {
        analysis_type: report.analysis_type,
        raw_text: report.raw_text.clone(),
        cards: report.cards.clone(),
        html,
    };
    *state.last_report.write().await = Some(report);
    Ok(Json(response))
}

async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<Preferences> {
    Json(state.preferences.get().await)
}

async fn put_preferences(
    State(state): State<Arc<AppState>>,
    Json(prefs): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    let saved = state.preferences.replace(prefs).await.map_err(|err| {
        tracing::error!(error = %err, "Failed to save preferences");
        ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: err.to_string() }
    })?;
    state.theme.set(saved.theme);
    Ok(Json(saved))
}
