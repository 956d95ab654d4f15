use crate::core::config::RasterConfig;
use crate::core::process::run_tool;
use crate::ocr::utils::document_key;
use crate::plugins::Rasterizer;
use crate::types::PageImage;
use crate::{FolioError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Rasterizes pages of a PDF file with poppler's `pdftoppm`.
///
/// The page count is read once with `pdfinfo` when the document is opened.
/// Each page is then rendered on demand to PNG on stdout.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    path: PathBuf,
    config: RasterConfig,
    page_count: usize,
    document_key: String,
}

impl PdftoppmRasterizer {
    /// Open `path` and read its page count.
    ///
    /// # Errors
    ///
    /// - `Io` when the file cannot be read or `pdfinfo` cannot be started.
    /// - `MalformedInput` when `pdfinfo` rejects the file or reports no page count.
    pub async fn open(path: impl AsRef<Path>, config: &RasterConfig) -> Result<Self> {
        config.validate()?;

        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await?;
        let document_key = document_key(&bytes);

        let mut command = Command::new(&config.pdfinfo_path);
        command.arg(&path);
        let stdout = run_tool(command, "pdfinfo", None, config.timeout_secs, |message| {
            FolioError::malformed_input(format!("{}: {}", path.display(), message))
        })
        .await?;

        let info = String::from_utf8_lossy(&stdout);
        let page_count = parse_page_count(&info).ok_or_else(|| {
            FolioError::malformed_input(format!("{}: pdfinfo reported no page count", path.display()))
        })?;

        tracing::debug!(path = %path.display(), page_count, "opened PDF");

        Ok(Self {
            path,
            config: config.clone(),
            page_count,
            document_key,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash of the file bytes, suitable as a page cache key.
    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    fn command(&self, page_number: usize) -> Command {
        let page = page_number.to_string();
        let mut command = Command::new(&self.config.pdftoppm_path);
        command
            .arg("-f")
            .arg(&page)
            .arg("-l")
            .arg(&page)
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-png")
            .arg(&self.path);
        command
    }
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn render_page(&self, page_number: usize) -> Result<PageImage> {
        if page_number == 0 || page_number > self.page_count {
            return Err(FolioError::rasterization(
                page_number,
                format!("page out of range (document has {} pages)", self.page_count),
            ));
        }

        let bytes = run_tool(
            self.command(page_number),
            "pdftoppm",
            None,
            self.config.timeout_secs,
            |message| FolioError::rasterization(page_number, message),
        )
        .await?;

        if bytes.is_empty() {
            return Err(FolioError::rasterization(page_number, "pdftoppm produced no image"));
        }

        Ok(PageImage::new(page_number, bytes))
    }
}

/// Extract the `Pages:` value from `pdfinfo` output.
pub fn parse_page_count(pdfinfo_output: &str) -> Option<usize> {
    pdfinfo_output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Lease agreement\n\
                    Producer:       scanner\n\
                    Pages:          12\n\
                    Encrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
    }

    #[test]
    fn test_parse_page_count_missing() {
        assert_eq!(parse_page_count("Title: x\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
        assert_eq!(parse_page_count(""), None);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_io_error() {
        let err = PdftoppmRasterizer::open("/nonexistent/contract.pdf", &RasterConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }

    #[cfg(unix)]
    mod with_fake_tools {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn config(dir: &Path, pdftoppm: &str) -> RasterConfig {
            RasterConfig {
                pdfinfo_path: script(dir, "pdfinfo", "echo 'Pages:          3'"),
                pdftoppm_path: script(dir, "pdftoppm", pdftoppm),
                timeout_secs: 5,
                ..Default::default()
            }
        }

        #[tokio::test]
        async fn test_open_and_render() {
            let dir = tempfile::tempdir().unwrap();
            let pdf = dir.path().join("doc.pdf");
            std::fs::write(&pdf, b"%PDF-1.7").unwrap();

            // Echo the requested page so the test can see which one was rendered.
            let config = config(dir.path(), "printf \"page-$2\"");
            let rasterizer = PdftoppmRasterizer::open(&pdf, &config).await.unwrap();
            assert_eq!(rasterizer.page_count(), 3);
            assert_eq!(rasterizer.document_key(), document_key(b"%PDF-1.7"));

            let image = rasterizer.render_page(2).await.unwrap();
            assert_eq!(image.page_number, 2);
            assert_eq!(image.bytes, b"page-2");
        }

        #[tokio::test]
        async fn test_render_out_of_range() {
            let dir = tempfile::tempdir().unwrap();
            let pdf = dir.path().join("doc.pdf");
            std::fs::write(&pdf, b"%PDF-1.7").unwrap();

            let rasterizer = PdftoppmRasterizer::open(&pdf, &config(dir.path(), "printf png"))
                .await
                .unwrap();
            let err = rasterizer.render_page(4).await.unwrap_err();
            assert!(matches!(err, FolioError::Rasterization { page_number: 4, .. }));
        }

        #[tokio::test]
        async fn test_render_failure_is_page_scoped() {
            let dir = tempfile::tempdir().unwrap();
            let pdf = dir.path().join("doc.pdf");
            std::fs::write(&pdf, b"%PDF-1.7").unwrap();

            let rasterizer = PdftoppmRasterizer::open(&pdf, &config(dir.path(), "echo 'Syntax Error' >&2\nexit 1"))
                .await
                .unwrap();
            let err = rasterizer.render_page(1).await.unwrap_err();
            assert!(matches!(err, FolioError::Rasterization { page_number: 1, .. }));
            assert!(err.is_page_scoped());
        }
    }
}
