//! HTTP implementations of the network collaborators, talking to formwork-api
//! and an object storage upload endpoint.

use crate::collaborators::{CatalogLookup, SubmissionSink, Uploader};
use crate::error::RemoteError;
use crate::values::FileHandle;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use shared_types::{
    Carrier, CarrierFormResponse, ErrorResponse, FormWithFields, Submission, SubmissionReceipt,
    UploadResponse,
};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpCollaborators {
    base_url: Url,
    upload_url: Url,
    token: RwLock<Option<String>>,
    http_client: reqwest::Client,
}

impl HttpCollaborators {
    /// `base_url` is the formwork-api root, `upload_url` the object storage endpoint
    pub fn new(base_url: &str, upload_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = parse_base(base_url)?;
        let upload_url = Url::parse(upload_url)
            .map_err(|e| RemoteError::Transport(format!("Invalid upload URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            upload_url,
            token: RwLock::new(None),
            http_client,
        })
    }

    /// Bearer token of the current session, set by whoever owns the login
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token.and_then(|t| HeaderValue::from_str(&format!("Bearer {}", t)).ok()) {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(error_for_status(status, &body))
    }
}

#[async_trait]
impl CatalogLookup for HttpCollaborators {
    async fn form_for_carrier(
        &self,
        carrier: Carrier,
    ) -> Result<Option<FormWithFields>, RemoteError> {
        let path = match carrier {
            Carrier::Service(id) => format!("catalog/services/{}/form", id),
            Carrier::Offer(id) => format!("catalog/offers/{}/form", id),
        };
        let url = join(&self.base_url, &path)?;

        let response = self.send(self.http_client.get(url)).await?;
        let body: CarrierFormResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Failed to parse response: {}", e)))?;
        Ok(body.form)
    }
}

#[async_trait]
impl Uploader for HttpCollaborators {
    async fn upload(&self, file: &FileHandle) -> Result<String, RemoteError> {
        let mut part = reqwest::multipart::Part::bytes(file.data.clone())
            .file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .send(self.http_client.post(self.upload_url.clone()).multipart(form))
            .await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Failed to parse response: {}", e)))?;

        debug!(file = %file.file_name, url = %body.url, "Uploaded file");
        Ok(body.url)
    }
}

#[async_trait]
impl SubmissionSink for HttpCollaborators {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, RemoteError> {
        let url = join(&self.base_url, "submissions")?;
        let response = self
            .send(self.http_client.post(url).json(submission))
            .await?;

        response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Failed to parse response: {}", e)))
    }
}

/// Map a non-success response onto the remote error taxonomy
pub fn error_for_status(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized(message),
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        _ => RemoteError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

fn parse_base(base_url: &str) -> Result<Url, RemoteError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).map_err(|e| RemoteError::Transport(format!("Invalid base URL: {}", e)))
}

fn join(base: &Url, path: &str) -> Result<Url, RemoteError> {
    base.join(path)
        .map_err(|e| RemoteError::Transport(format!("Invalid URL path '{}': {}", path, e)))
}
