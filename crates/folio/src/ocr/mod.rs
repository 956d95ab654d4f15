//! OCR subsystem.
//!
//! Folio does not link an OCR library. [`TesseractEngine`] drives the
//! `tesseract` command-line tool and [`parse_tsv`] turns its TSV report into
//! [`WordRecords`](crate::types::WordRecords). Any other engine plugs in through
//! [`OcrEngine`](crate::plugins::OcrEngine).
//!
//! # Example
//!
//! ```rust
//! use folio::ocr::parse_tsv;
//!
//! let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
//!            5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t95.5\tHello\n";
//! let records = parse_tsv(tsv).unwrap();
//! assert_eq!(records.text, vec!["Hello"]);
//! ```
pub mod tesseract;
pub mod tsv;
pub mod utils;

pub use tesseract::TesseractEngine;
pub use tsv::parse_tsv;
pub use utils::document_key;
