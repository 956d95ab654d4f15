//! PDF page rendering through poppler's command-line tools.
//!
//! [`PdftoppmRasterizer`] implements [`Rasterizer`](crate::plugins::Rasterizer)
//! for a PDF on disk. It needs `pdfinfo` and `pdftoppm` on `PATH`, or their
//! paths set in [`RasterConfig`](crate::core::config::RasterConfig).
pub mod rendering;

pub use rendering::{PdftoppmRasterizer, parse_page_count};
