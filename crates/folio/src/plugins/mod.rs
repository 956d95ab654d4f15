//! Collaborator traits consumed by document reconstruction.
//!
//! The reconstruction core never renders or recognizes anything itself. It
//! talks to three narrow interfaces:
//!
//! - [`Rasterizer`] produces the image of one page of a document.
//! - [`OcrEngine`] turns a page image into raw [`WordRecords`].
//! - [`PageCache`] optionally persists finished [`PageResult`]s.
//!
//! All of them must be `Send + Sync`: pages are processed concurrently.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use folio::plugins::OcrEngine;
//! use folio::types::{PageImage, WordRecords};
//! use folio::Result;
//!
//! struct FixedEngine;
//!
//! #[async_trait]
//! impl OcrEngine for FixedEngine {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     async fn recognize(&self, _image: &PageImage) -> Result<WordRecords> {
//!         let mut records = WordRecords::new();
//!         records.push(0, 0, 40, 12, "Clause", 96.0);
//!         Ok(records)
//!     }
//! }
//! ```
mod memory;

pub use memory::ImagePages;

use crate::Result;
use crate::types::{PageImage, PageResult, WordRecords};
use async_trait::async_trait;

/// Produces page images for one document.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render a 1-based page.
    ///
    /// # Errors
    ///
    /// `FolioError::Rasterization` when the page cannot be produced.
    async fn render_page(&self, page_number: usize) -> Result<PageImage>;
}

/// Recognizes words on a page image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// One entry per detected token, in any order. Confidence `<= 0` marks a
    /// rejected token.
    async fn recognize(&self, image: &PageImage) -> Result<WordRecords>;
}

/// Optional persistence of finished pages.
///
/// Implementations are scoped to a single document and to the settings that
/// shape its output. Calls may block: document reconstruction runs them on
/// tokio's blocking pool.
pub trait PageCache: Send + Sync {
    fn load_cached(&self, page_number: usize) -> Result<Option<PageResult>>;

    fn store_cached(&self, result: &PageResult) -> Result<()>;
}
