//! Core behaviour for passrate.
//!
//! Reads uploaded result workbooks, normalizes them into teacher-result
//! records, persists them, and serves filtered views and PDF reports.

pub mod control;
pub mod filter;
pub mod parsers;
pub mod report;
pub mod store;
