//! Business logic services for the MADUREX server
//!
//! One service per view. Every service fetches what its view needs from the
//! store and hands the rows to the view model builders in `shared`.

pub mod dashboard;
pub mod detection;
pub mod greenhouse;
pub mod plant;
pub mod qr;

pub use dashboard::DashboardService;
pub use detection::DetectionService;
pub use greenhouse::GreenhouseService;
pub use plant::PlantService;
pub use qr::QrService;

use crate::error::AppError;
use crate::store::StoreError;

/// Map a failed read to `StoreRead`, logging it against the view that issued it
pub(crate) fn read_error(view: &'static str) -> impl Fn(StoreError) -> AppError {
    move |err| {
        tracing::error!(view, error = %err, "Store read failed");
        AppError::store_read(view, err.to_string())
    }
}

/// Map a failed plant write
pub(crate) fn write_error(err: StoreError) -> AppError {
    match err {
        StoreError::PlantNotFound(id) => AppError::NotFound(format!("Plant {}", id)),
        StoreError::DuplicateCode(code) => AppError::Conflict {
            resource: "code".to_string(),
            message: format!("Plant code {} already exists", code),
            message_es: format!("El código {} ya existe", code),
        },
        other => {
            tracing::error!(error = %other, "Store write failed");
            AppError::StoreWrite(other.to_string())
        }
    }
}
