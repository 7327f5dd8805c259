//! Core types for Proativa production tracking.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod quantity;
pub mod status;
pub mod unit;

pub use id::*;
pub use quantity::Quantity;
pub use status::{BatchStatus, ParseStatusError};
pub use unit::Unit;
