//! Symptom extraction for clinical narrative.
//!
//! This crate turns free-text complaints ("Patient c/o fever, headache and
//! mild body ache for 3 days") into normalized symptom labels using fixed
//! patterns and vocabulary. It knows nothing about patients or diseases.

pub mod categories;
pub mod extraction;
pub mod vocabulary;

pub use categories::*;
pub use extraction::*;
