//! Domain models for the MADUREX strawberry monitoring system

mod detection;
mod plant;

pub use detection::*;
pub use plant::*;
