// src/cloudeval/mod.rs

pub mod batch;
pub mod config;
pub mod conversation;
pub mod extractor;
pub mod record;

// Let's explicitly export RecordExtractor so we don't have to access it via cloudeval::extractor::RecordExtractor
// and instead as cloudeval::RecordExtractor
pub use extractor::RecordExtractor;
