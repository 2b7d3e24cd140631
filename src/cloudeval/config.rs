//! Configuration for record extraction.
//!
//! Provides the [`ExtractorConfig`] struct consumed by
//! [`RecordExtractor`](crate::RecordExtractor). Users construct it manually; no
//! file parsing dependencies are required.
//!
//! # Example
//!
//! ```rust
//! use cloudeval::ExtractorConfig;
//!
//! // Defaults: latency sentinel 8.5, " | " separator, auxiliary context not merged
//! let config = ExtractorConfig::default();
//!
//! // Or opt into merging tools / metadata / run info into the context string
//! let config = ExtractorConfig {
//!     merge_auxiliary_context: true,
//!     ..ExtractorConfig::default()
//! };
//! ```

/// Latency reported when the caller does not measure one.
pub const DEFAULT_LATENCY: f64 = 8.5;

/// Separator placed between context fragments.
pub const CONTEXT_SEPARATOR: &str = " | ";

/// Settings for [`RecordExtractor`](crate::RecordExtractor).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Latency written to records when none is supplied.
    pub default_latency: f64,
    /// Joins system messages (and auxiliary context, when merged) into `context`.
    pub context_separator: String,
    /// Append `Tools: ...`, `Metadata: ...`, `Response created: ...` and `Run ID: ...`
    /// fragments to `context`. Off by default.
    pub merge_auxiliary_context: bool,
}

impl Default for ExtractorConfig {
    /// ```rust
    /// use cloudeval::ExtractorConfig;
    ///
    /// let config = ExtractorConfig::default();
    /// assert_eq!(config.default_latency, 8.5);
    /// assert_eq!(config.context_separator, " | ");
    /// assert!(!config.merge_auxiliary_context);
    /// ```
    fn default() -> Self {
        Self {
            default_latency: DEFAULT_LATENCY,
            context_separator: CONTEXT_SEPARATOR.to_string(),
            merge_auxiliary_context: false,
        }
    }
}
