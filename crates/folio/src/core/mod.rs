//! Core orchestration module.
//!
//! - **Configuration** (`config`): layout thresholds, concurrency, error policy, tool settings
//! - **Document reconstruction** (`document`): bounded concurrent page processing with
//!   ordered collection, per-page timeout and cancellation
//! - **Cancellation** (`cancellation`): the token shared between caller and pages
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::core::config::FolioConfig;
//! use folio::core::document::reconstruct_document;
//! use folio::ocr::TesseractEngine;
//! use folio::plugins::ImagePages;
//! use std::sync::Arc;
//!
//! # async fn example() -> folio::Result<()> {
//! let config = FolioConfig::default();
//! let pages = ImagePages::from_files(&["scan-1.png", "scan-2.png"]).await?;
//! let engine = TesseractEngine::new(config.ocr.clone());
//!
//! let result = reconstruct_document(Arc::new(pages), Arc::new(engine), None, &config).await?;
//! println!("{} paragraphs", result.paragraph_count());
//! # Ok(())
//! # }
//! ```

pub mod cancellation;
pub mod config;
pub mod document;
pub(crate) mod process;

pub use cancellation::CancellationToken;
pub use config::{FolioConfig, LayoutConfig, OcrConfig, PageErrorPolicy, RasterConfig};
pub use document::{DocumentReconstructor, reconstruct_document};
