//! Store interfaces and `SurrealDB` implementation.
//!
//! The store layer owns the connection and the `teachers` collection.

pub mod surreal;

pub use surreal::{StoreEndpoint, StoreError, StoreResult, SurrealResultStore};
