//! insight-vault: turn exam material into staged questions, synthesized
//! insight blocks, and a persisted review vault.

pub mod api;
pub mod config;
pub mod digest;
pub mod document;
pub mod genai;
pub mod models;
pub mod staging;
pub mod store;
pub mod workflow;
