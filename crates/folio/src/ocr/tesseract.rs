//! Tesseract OCR engine driven as a subprocess.

use super::tsv::parse_tsv;
use crate::core::config::OcrConfig;
use crate::core::process::run_tool;
use crate::plugins::OcrEngine;
use crate::types::{PageImage, WordRecords};
use crate::{FolioError, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// Runs `tesseract stdin stdout -l <language> --psm <psm> tsv` per page.
///
/// The page image travels on stdin and the TSV report comes back on stdout, so
/// nothing touches the filesystem.
///
/// # Thread Safety
///
/// Stateless apart from its configuration; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.tesseract_path);
        command
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.psm.to_string())
            .arg("tsv");
        command
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &PageImage) -> Result<WordRecords> {
        self.config.validate()?;

        let page_number = image.page_number;
        let stdout = run_tool(
            self.command(),
            "tesseract",
            Some(image.bytes.clone()),
            self.config.timeout_secs,
            |message| FolioError::ocr(format!("page {}: {}", page_number, message)),
        )
        .await?;

        let tsv = String::from_utf8(stdout).map_err(|e| {
            FolioError::ocr_with_source(format!("page {}: tesseract output is not UTF-8", page_number), e)
        })?;

        let records = parse_tsv(&tsv)?;
        tracing::debug!(page_number, tokens = records.text.len(), "tesseract finished");
        Ok(records)
    }
}
