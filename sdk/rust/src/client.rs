use lexng_core::{
    AnalysisPatch, AnalysisTranslation, DocumentAnalysis, DocumentSpec, GeneratedDocument,
    TranslationResult,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ClientError, Result};

/// HTTP client for a running `lexng-server`.
#[derive(Clone)]
pub struct LexngClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    document_id: String,
}

#[derive(Deserialize)]
struct PushResponse {
    #[serde(default)]
    saved: usize,
}

impl LexngClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn document_url(&self, id: &str, suffix: &str) -> String {
        self.url(&format!("/api/documents/{}{suffix}", urlencoding::encode(id)))
    }

    /// Turns a non-2xx response into `ClientError::Api` using the `{error, code}` body.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        Err(ClientError::Api {
            status: status.as_u16(),
            code: body["code"].as_str().map(str::to_string),
            message: body["error"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string()),
        })
    }

    async fn json<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T> {
        let resp = Self::check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// Upload a document for analysis. Returns the new analysis id.
    pub async fn analyze(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        language: &str,
    ) -> Result<String> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("language", language.to_string());
        let resp: AnalyzeResponse =
            Self::json(self.http.post(self.url("/api/analyze")).multipart(form)).await?;
        Ok(resp.document_id)
    }

    pub async fn get_document(&self, id: &str) -> Result<DocumentAnalysis> {
        Self::json(self.http.get(self.document_url(id, ""))).await
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentAnalysis>> {
        Self::json(self.http.get(self.url("/api/documents"))).await
    }

    pub async fn update_document(&self, id: &str, patch: &AnalysisPatch) -> Result<DocumentAnalysis> {
        Self::json(self.http.put(self.document_url(id, "")).json(patch)).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<()> {
        Self::check(self.http.delete(self.document_url(id, "")).send().await?).await?;
        Ok(())
    }

    pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<TranslationResult> {
        let body = json!({ "text": text, "fromLanguage": from, "toLanguage": to });
        Self::json(self.http.post(self.url("/api/translate")).json(&body)).await
    }

    pub async fn translate_document(&self, id: &str, to: &str) -> Result<AnalysisTranslation> {
        let body = json!({ "toLanguage": to });
        Self::json(self.http.post(self.document_url(id, "/translate")).json(&body)).await
    }

    pub async fn generate(&self, spec: &DocumentSpec) -> Result<GeneratedDocument> {
        Self::json(self.http.post(self.url("/api/generate")).json(spec)).await
    }

    /// Regenerated document as DOCX bytes. `inline` is sent when the server may
    /// not hold the record yet.
    pub async fn generate_from_analysis(
        &self,
        id: &str,
        inline: Option<&DocumentAnalysis>,
    ) -> Result<Vec<u8>> {
        let mut req = self.http.post(self.document_url(id, "/generate"));
        if let Some(doc) = inline {
            req = req.json(&json!({ "document": doc }));
        }
        let resp = Self::check(req.send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Bulk upload. Returns how many records the server saved.
    pub async fn push_documents(&self, docs: &[DocumentAnalysis]) -> Result<usize> {
        let resp: PushResponse =
            Self::json(self.http.post(self.url("/api/documents/sync")).json(docs)).await?;
        Ok(resp.saved)
    }

    pub async fn pull_documents(&self) -> Result<Vec<DocumentAnalysis>> {
        Self::json(self.http.get(self.url("/api/documents/sync"))).await
    }
}
