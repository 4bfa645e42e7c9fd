//! External API integrations

pub mod qr_image;

pub use qr_image::{QrImage, QrImageClient};
