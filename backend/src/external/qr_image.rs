//! QR image generation client
//!
//! Fetches a PNG rendering of a plant code from the external image endpoint,
//! used when the code cannot be rendered locally.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::config::QrConfig;
use crate::error::{AppError, AppResult};
use shared::qr::qr_image_params;

/// QR image endpoint client
#[derive(Clone)]
pub struct QrImageClient {
    client: Client,
    base_url: String,
    size: u32,
}

/// A generated image and its content type
#[derive(Debug, Clone)]
pub struct QrImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl QrImageClient {
    /// Create a new QrImageClient
    pub fn new(config: &QrConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.endpoint.clone(),
            size: config.size,
        }
    }

    /// Edge length in pixels requested for every image
    pub fn size(&self) -> u32 {
        self.size
    }

    fn request(&self, code: &str) -> RequestBuilder {
        self.client
            .get(&self.base_url)
            .query(&qr_image_params(code, self.size))
    }

    /// Fetch the PNG for `code`
    pub async fn fetch(&self, code: &str) -> AppResult<QrImage> {
        tracing::debug!("Requesting QR image for {}", code);

        let response = self
            .request(code)
            .send()
            .await
            .map_err(|e| AppError::QrGeneration(format!("QR request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::QrGeneration(format!(
                "QR endpoint error: {} - {}",
                status, body
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::QrGeneration(format!("Failed to read QR image: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::QrGeneration("QR endpoint returned no data".to_string()));
        }

        Ok(QrImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
