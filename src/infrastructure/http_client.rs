use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::domain::DomainError;

/// Raw response body with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// File part of a multipart upload
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Multipart form: plain text fields plus one file
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub file: FilePart,
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    /// POST a JSON body and keep the response as bytes (audio endpoints)
    async fn post_json_for_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<HttpBody, DomainError>;

    async fn get_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<HttpBody, DomainError>;

    async fn post_multipart(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: MultipartBody,
    ) -> Result<HttpBody, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(
        request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = request;

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        Ok(response)
    }

    async fn read_body(response: reqwest::Response) -> Result<HttpBody, DomainError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to read response: {}", e)))?;

        Ok(HttpBody {
            bytes,
            content_type,
        })
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let response = Self::send(self.client.post(url).json(body), headers).await?;

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }

    async fn post_json_for_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<HttpBody, DomainError> {
        let response = Self::send(self.client.post(url).json(body), headers).await?;
        Self::read_body(response).await
    }

    async fn get_bytes(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<HttpBody, DomainError> {
        let response = Self::send(self.client.get(url).query(query), headers).await?;
        Self::read_body(response).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: MultipartBody,
    ) -> Result<HttpBody, DomainError> {
        let file = Part::bytes(body.file.bytes.to_vec())
            .file_name(body.file.file_name)
            .mime_str(&body.file.content_type)
            .map_err(|e| DomainError::validation(format!("Invalid content type: {}", e)))?;

        let form = body
            .fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part(body.file.field, file);

        let response = Self::send(self.client.post(url).multipart(form), headers).await?;
        Self::read_body(response).await
    }
}
