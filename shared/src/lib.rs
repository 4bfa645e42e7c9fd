//! Shared types and view models for the MADUREX strawberry monitoring system
//!
//! Everything in this crate is pure: it turns plant and detection rows into
//! render models and markup. The backend server and the WASM module are the
//! only places that perform I/O.

pub mod aggregation;
pub mod dashboard;
pub mod detection_log;
pub mod format;
pub mod greenhouse;
pub mod models;
pub mod qr;
pub mod registry;
pub mod render;
pub mod ripeness;
pub mod session;
pub mod types;
pub mod validation;

pub use aggregation::*;
pub use dashboard::*;
pub use detection_log::*;
pub use format::*;
pub use greenhouse::*;
pub use models::*;
pub use qr::*;
pub use registry::*;
pub use ripeness::*;
pub use session::*;
pub use types::*;
pub use validation::*;
