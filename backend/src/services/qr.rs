//! QR download service

use super::read_error;
use crate::error::{AppError, AppResult};
use crate::external::{QrImage, QrImageClient};
use crate::store::Store;
use shared::qr::{qr_download_filename, render_qr_png};

/// A QR image ready to be sent as a file download
#[derive(Debug, Clone)]
pub struct QrDownload {
    pub filename: String,
    pub image: QrImage,
}

#[derive(Clone)]
pub struct QrService {
    store: Store,
    client: QrImageClient,
}

impl QrService {
    pub fn new(store: Store, client: QrImageClient) -> Self {
        Self { store, client }
    }

    /// Render the code of plant `id` as `QR_{code}.png`.
    ///
    /// The image is rendered in-process; the external endpoint is only asked
    /// when that fails.
    pub async fn download(&self, id: i64) -> AppResult<QrDownload> {
        let plant = self
            .store
            .get_plant(id)
            .await
            .map_err(read_error("plants"))?
            .ok_or_else(|| AppError::NotFound(format!("Plant {}", id)))?;

        let image = match render_qr_png(&plant.code, self.client.size()) {
            Ok(bytes) => QrImage {
                content_type: "image/png".to_string(),
                bytes,
            },
            Err(e) => {
                tracing::warn!(id, code = %plant.code, "Local QR rendering failed, using endpoint: {}", e);
                self.client.fetch(&plant.code).await?
            }
        };
        tracing::info!(id, code = %plant.code, bytes = image.bytes.len(), "QR image generated");

        Ok(QrDownload {
            filename: qr_download_filename(&plant.code),
            image,
        })
    }
}
