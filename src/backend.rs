use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::RequestError;
use crate::selection::SelectedFile;

#[derive(Debug, Default, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default, rename = "aiResponse")]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    context: &'a str,
    query: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// The backend sends `aiResponse: ""` when no query was asked, so empty means absent.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl UploadReply {
    pub fn render(&self) -> String {
        let analysis = present(&self.analysis).unwrap_or("No analysis available");
        let insight = present(&self.ai_response)
            .or_else(|| present(&self.answer))
            .unwrap_or("No additional insights");

        format!("📊 File Analysis:\n{}\n\n🤖 AI Insights: {}", analysis, insight)
    }
}

impl ChatReply {
    pub fn render(&self) -> String {
        format!(
            "🤖 Mini Chat Response:\n{}",
            present(&self.answer).unwrap_or("No response received")
        )
    }
}

fn classify(err: reqwest::Error) -> RequestError {
    if err.is_builder() {
        RequestError::Setup(err.to_string())
    } else {
        tracing::debug!("request failed without a response: {}", err);
        RequestError::NoResponse
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        BackendClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_config(config: &BackendConfig) -> Self {
        Self::new(config.host.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends the file (and the table query, if any) to `/upload`.
    pub async fn upload(
        &self,
        file: &SelectedFile,
        query: Option<&str>,
    ) -> Result<String, RequestError> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| RequestError::Setup(format!("reading {}: {}", file.path.display(), e)))?;

        let mut part = Part::bytes(bytes).file_name(file.name.clone());
        if !file.mime.is_empty() {
            part = part
                .mime_str(&file.mime)
                .map_err(|e| RequestError::Setup(e.to_string()))?;
        }

        let mut form = Form::new().part("file", part);
        if let Some(query) = query {
            form = form.text("query", query.to_string());
        }

        tracing::info!(file = %file.name, with_query = query.is_some(), "uploading file");
        let request = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form);

        let body = self.send(request).await?;
        let reply: UploadReply = serde_json::from_slice(&body).unwrap_or_default();
        Ok(reply.render())
    }

    /// Asks `/chat` a general question. The context is always empty.
    pub async fn chat(&self, query: &str) -> Result<String, RequestError> {
        tracing::info!("sending chat query");
        let request = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest { context: "", query });

        let body = self.send(request).await?;
        let reply: ChatReply = serde_json::from_slice(&body).unwrap_or_default();
        Ok(reply.render())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, RequestError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.bytes().await {
                Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.message)
                    .filter(|m| !m.is_empty()),
                Err(_) => None,
            };
            tracing::warn!(status = status.as_u16(), ?message, "backend returned an error");
            return Err(RequestError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(classify)?;
        tracing::debug!(status = status.as_u16(), len = body.len(), "backend replied");
        Ok(body.to_vec())
    }
}
