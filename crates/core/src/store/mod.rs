//! Whole-document JSON persistence.

mod error;
mod json;

pub use error::StoreError;
pub use json::JsonDocument;
