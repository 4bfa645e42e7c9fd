//! Domain models for the MADUREX server
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
