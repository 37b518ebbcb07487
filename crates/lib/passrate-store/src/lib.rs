//! Record models and schema constants for passrate.
//!
//! This crate defines the teacher-result record shared by the normalizer,
//! the control plane, the store, and the HTTP surface.

pub mod models;
pub mod schema;

pub use models::*;
