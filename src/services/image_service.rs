use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Renders a prompt into raw image bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, file_stem: &str) -> Result<Vec<u8>, ImageError>;
}

/// Hosts an uploaded file and hands back its public URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(
        &self,
        data_uri: String,
        file_name: &str,
        folder: &str,
    ) -> Result<String, ImageError>;
}

/// Wrap PNG bytes as a `data:` URI accepted by the upload API.
pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// ImageKit: prompt-based generation through URL transformations, plus the
/// media library upload API.
#[derive(Clone)]
pub struct ImageKitClient {
    client: reqwest::Client,
    url_endpoint: String,
    upload_url: String,
    private_key: String,
    folder: String,
}

impl ImageKitClient {
    pub fn new(
        url_endpoint: String,
        upload_url: String,
        private_key: String,
        folder: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            url_endpoint: url_endpoint.trim_end_matches('/').to_string(),
            upload_url,
            private_key,
            folder,
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// `{endpoint}/ik-genimg-prompt-{prompt}/{folder}/{stem}.png?tr=w-800,h-800`
    pub fn generation_url(&self, prompt: &str, file_stem: &str) -> String {
        format!(
            "{}/ik-genimg-prompt-{}/{}/{}.png?tr=w-800,h-800",
            self.url_endpoint,
            urlencoding::encode(prompt),
            self.folder,
            file_stem
        )
    }
}

#[async_trait]
impl ImageGenerator for ImageKitClient {
    async fn generate(&self, prompt: &str, file_stem: &str) -> Result<Vec<u8>, ImageError> {
        let url = self.generation_url(prompt, file_stem);
        tracing::debug!("Requesting generated image: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ImageError::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ImageError::InvalidResponse("empty image body".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl MediaStore for ImageKitClient {
    async fn upload(
        &self,
        data_uri: String,
        file_name: &str,
        folder: &str,
    ) -> Result<String, ImageError> {
        let form = reqwest::multipart::Form::new()
            .text("file", data_uri)
            .text("fileName", file_name.to_string())
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImageError::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!("Uploaded {} as {}", file_name, uploaded.url);
        Ok(uploaded.url)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}
