//! Folio - paragraph reconstruction for scanned documents
//!
//! Folio turns per-word OCR output (boxes, text, confidences) into the reading
//! structure of a page: lines, then paragraphs, addressed as
//! `(page_number, paragraph_index, text)`. Whole documents are processed page by
//! page on a bounded worker pool.
//!
//! # Quick Start
//!
//! ```rust
//! use folio::{LayoutConfig, WordRecords, reconstruct_page};
//!
//! let mut records = WordRecords::new();
//! records.push(0, 0, 10, 10, "Hello", 0.9);
//! records.push(15, 0, 10, 10, "World", 0.9);
//!
//! let page = reconstruct_page(1, &records, &LayoutConfig::default()).unwrap();
//! assert_eq!(page.paragraphs[0].text, "Hello World");
//! ```
//!
//! # Architecture
//!
//! - **Layout** (`layout`): pure word → line → paragraph grouping
//! - **Core** (`core`): configuration and concurrent document reconstruction
//! - **Plugins** (`plugins`): rasterizer, OCR engine and cache interfaces
//! - **OCR** (`ocr`): Tesseract subprocess engine and TSV parsing
//! - **PDF** (`pdf`): pdftoppm-based page rendering
//! - **Cache** (`cache`): on-disk page cache
//! - **Export** (`export`): per-page paragraph text files

#![deny(unsafe_code)]

pub mod cache;
pub mod core;
pub mod error;
pub mod export;
pub mod layout;
pub mod ocr;
pub mod pdf;
pub mod plugins;
pub mod types;

pub use error::{FolioError, Result};
pub use types::*;

pub use core::cancellation::CancellationToken;
pub use core::config::{FolioConfig, LayoutConfig, PageErrorPolicy};
pub use core::document::{DocumentReconstructor, reconstruct_document};
pub use layout::{reconstruct_page, reconstruct_page_layout};
