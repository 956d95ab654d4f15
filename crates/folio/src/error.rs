//! Error types for Folio.
//!
//! All fallible operations return [`FolioError`]. The variants follow the
//! same rules as the rest of the crate:
//!
//! - `Io` errors always bubble up unchanged; they indicate real system problems.
//! - Page-scoped errors (`MalformedInput`, `Rasterization`, `Ocr`, `Timeout`, ...)
//!   are caught at the per-page boundary of document reconstruction and are either
//!   recorded against the page or escalated, depending on [`PageErrorPolicy`].
//! - `Cancelled` always aborts the whole document.
//!
//! An OCR-blank page is *not* an error: it yields a `PageResult` with no paragraphs.
//!
//! [`PageErrorPolicy`]: crate::core::config::PageErrorPolicy
use thiserror::Error;

/// Result type alias using `FolioError`.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Main error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {message}")]
    MalformedInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Rasterization error on page {page_number}: {message}")]
    Rasterization {
        page_number: usize,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Page {page_number} timed out after {seconds} seconds")]
    Timeout { page_number: usize, seconds: u64 },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Page {page_number} failed: {source}")]
    Page {
        page_number: usize,
        #[source]
        source: Box<FolioError>,
    },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<rmp_serde::encode::Error> for FolioError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        FolioError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<rmp_serde::decode::Error> for FolioError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        FolioError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl FolioError {
    error_constructor!(malformed_input, MalformedInput);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(cache, Cache);

    /// Create a Rasterization error for a page.
    pub fn rasterization<S: Into<String>>(page_number: usize, message: S) -> Self {
        Self::Rasterization {
            page_number,
            message: message.into(),
            source: None,
        }
    }

    /// Create a Rasterization error for a page with source.
    pub fn rasterization_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        page_number: usize,
        message: S,
        source: E,
    ) -> Self {
        Self::Rasterization {
            page_number,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error concerns a single page and may be recorded against it
    /// while sibling pages continue.
    pub fn is_page_scoped(&self) -> bool {
        match self {
            FolioError::MalformedInput { .. }
            | FolioError::Rasterization { .. }
            | FolioError::Ocr { .. }
            | FolioError::Cache { .. }
            | FolioError::Serialization { .. }
            | FolioError::Timeout { .. } => true,
            FolioError::Page { source, .. } => source.is_page_scoped(),
            FolioError::Io(_)
            | FolioError::Validation { .. }
            | FolioError::Cancelled(_)
            | FolioError::Other(_) => false,
        }
    }

    /// Short, stable name of the variant, used when recording page failures.
    pub fn kind(&self) -> &'static str {
        match self {
            FolioError::Io(_) => "io",
            FolioError::MalformedInput { .. } => "malformed_input",
            FolioError::Rasterization { .. } => "rasterization",
            FolioError::Ocr { .. } => "ocr",
            FolioError::Validation { .. } => "validation",
            FolioError::Cache { .. } => "cache",
            FolioError::Serialization { .. } => "serialization",
            FolioError::Timeout { .. } => "timeout",
            FolioError::Cancelled(_) => "cancelled",
            FolioError::Page { source, .. } => source.kind(),
            FolioError::Other(_) => "other",
        }
    }
}
