use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use lexng_core::{
    AnalysisPatch, DocumentAnalysis, DocumentSpec, DocumentUpload, Error,
    ErrorKind,
};
use lexng_domains::legal::SAMPLE_DOCUMENT_TEXT;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::docx::{attachment_name, text_to_docx, DOCX_CONTENT_TYPE};
use crate::AppState;

// ── Error helper ──────────────────────────────────────────────────────────

/// JSON error response: `{error, code}` plus `details` in diagnostic mode.
pub(crate) struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn from_error(e: &Error, diagnostics: bool) -> Self {
        let status = match e.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MalformedModelOutput | ErrorKind::TransientNetworkError => {
                StatusCode::BAD_GATEWAY
            },
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!(code = %e.kind(), "request failed: {}", e.diagnostic());
        } else {
            warn!(code = %e.kind(), "request rejected: {}", e);
        }
        let mut body = json!({ "error": e.user_message(), "code": e.kind() });
        if diagnostics {
            body["details"] = json!(e.diagnostic());
        }
        Self { status, body }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub(crate) fn internal(e: impl std::fmt::Display) -> ApiError {
    error!("internal error: {e}");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: json!({ "error": "An unexpected error occurred. Please try again.", "code": "INTERNAL" }),
    }
}

impl AppState {
    fn fail(&self, e: Error) -> ApiError {
        ApiError::from_error(&e, self.dev_diagnostics)
    }

    fn invalid(&self, reason: &str) -> ApiError {
        self.fail(Error::Validation(reason.to_string()))
    }
}

// ── Request body types ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslateBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub from_language: String,
    #[serde(default)]
    pub to_language: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslateAnalysisBody {
    #[serde(default)]
    pub to_language: String,
}

#[derive(Deserialize)]
pub(crate) struct GenerateBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub parties: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RegenerateBody {
    pub document: Option<DocumentAnalysis>,
}

const ACCEPTED_UPLOAD_TYPES: &[&str] = &[
    "application/pdf",
    DOCX_CONTENT_TYPE,
    "text/plain",
];

/// Content type from the part header, else from the file extension.
fn upload_type(content_type: Option<&str>, file_name: &str) -> Option<&'static str> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());
    if let Some(ct) = declared.as_deref() {
        if let Some(known) = ACCEPTED_UPLOAD_TYPES.iter().copied().find(|t| *t == ct) {
            return Some(known);
        }
        if ct != "application/octet-stream" {
            return None;
        }
    }
    let ext = file_name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => Some("application/pdf"),
        Some("docx") => Some(DOCX_CONTENT_TYPE),
        Some("txt") => Some("text/plain"),
        _ => None,
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "completionConfigured": state.service.is_live(),
        "uptimeSecs": state.start_time.elapsed().as_secs(),
    }))
}

pub(crate) async fn list_models(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "models": state.service.list_models().await }))
}

// Analysis

pub(crate) async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file: Option<(String, Option<String>, Bytes)> = None;
    let mut language = String::from("en");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| state.fail(Error::Validation(format!("invalid multipart body: {e}"))))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("document.txt").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| state.fail(Error::Validation(format!("failed to read upload: {e}"))))?;
                file = Some((name, content_type, bytes));
            },
            Some("language") => {
                let value = field.text().await.map_err(|e| {
                    state.fail(Error::Validation(format!("failed to read language field: {e}")))
                })?;
                if !value.trim().is_empty() {
                    language = value.trim().to_string();
                }
            },
            _ => {},
        }
    }

    let Some((document_name, content_type, bytes)) = file else {
        return Err(state.invalid("No file provided"));
    };
    if bytes.len() > state.max_upload_bytes {
        return Err(state.invalid("File size exceeds upload limit"));
    }
    let Some(kind) = upload_type(content_type.as_deref(), &document_name) else {
        return Err(state.invalid("Invalid file type. Please upload PDF, DOCX, or TXT files"));
    };

    let text = if kind == "text/plain" {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        // No PDF/DOCX extraction: these are analysed as the sample CAMA text.
        info!(document = %document_name, kind, "binary upload, analysing sample text");
        SAMPLE_DOCUMENT_TEXT.to_string()
    };

    let id = state
        .service
        .analyze(DocumentUpload {
            document_name,
            text,
            language,
        })
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(json!({ "documentId": id })))
}

// Documents

pub(crate) async fn list_documents(State(state): State<Arc<AppState>>) -> Json<Vec<DocumentAnalysis>> {
    Json(state.service.list_analyses())
}

pub(crate) async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentAnalysis>, ApiError> {
    state
        .service
        .get_analysis(&id)
        .map(Json)
        .ok_or_else(|| state.fail(Error::analysis_not_found(id)))
}

pub(crate) async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<AnalysisPatch>,
) -> Result<Json<DocumentAnalysis>, ApiError> {
    state
        .service
        .update_analysis(&id, &patch)
        .map(Json)
        .ok_or_else(|| state.fail(Error::analysis_not_found(id)))
}

pub(crate) async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.service.delete_analysis(&id) {
        return Err(state.fail(Error::analysis_not_found(id)));
    }
    Ok(Json(json!({ "success": true })))
}

pub(crate) async fn generate_from_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    // The body is optional; anything unparseable counts as absent.
    let inline = serde_json::from_slice::<RegenerateBody>(&body)
        .ok()
        .and_then(|b| b.document);

    let out = state
        .service
        .generate_from_analysis(&id, inline)
        .await
        .map_err(|e| state.fail(e))?;
    let bytes = text_to_docx(&out.document).map_err(internal)?;
    let disposition = format!("attachment; filename=\"{}\"", attachment_name(&out.document_name));

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub(crate) async fn translate_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TranslateAnalysisBody>,
) -> Result<Json<Value>, ApiError> {
    let overlay = state
        .service
        .translate_analysis(&id, &body.to_language)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(json!(overlay)))
}

// Sync

pub(crate) async fn pull_documents(State(state): State<Arc<AppState>>) -> Json<Vec<DocumentAnalysis>> {
    Json(state.service.list_analyses())
}

pub(crate) async fn push_documents(
    State(state): State<Arc<AppState>>,
    Json(documents): Json<Vec<DocumentAnalysis>>,
) -> Json<Value> {
    let saved = state.service.store().save_all(documents);
    info!(saved, "documents pushed");
    Json(json!({ "success": true, "saved": saved }))
}

// SSE store changes

/// Event type sent in place of the events a lagging subscriber missed.
pub(crate) const RESYNC_EVENT: &str = "resync";

pub(crate) async fn document_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let rx = state.service.store().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        let event = match msg {
            Ok(event) => Event::default().json_data(&event),
            // Missed events: the client must refetch the listing.
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "document event subscriber lagged, requesting resync");
                Event::default().json_data(json!({ "type": RESYNC_EVENT }))
            },
        };
        event.ok().map(Ok)
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}

// Translation and free generation

pub(crate) async fn translate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<Value>, ApiError> {
    if body.text.is_empty() || body.from_language.trim().is_empty() || body.to_language.trim().is_empty() {
        return Err(state.invalid("Text, fromLanguage, and toLanguage are required"));
    }
    let result = state
        .service
        .translate(&body.text, &body.from_language, &body.to_language)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(json!(result)))
}

pub(crate) async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<Value>, ApiError> {
    let spec = DocumentSpec {
        kind: body.kind,
        requirements: body.requirements,
        parties: body.parties,
        title: body.title,
    };
    let generated = state
        .service
        .generate_free_document(&spec)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(json!(generated)))
}
