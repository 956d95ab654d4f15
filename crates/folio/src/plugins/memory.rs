use super::Rasterizer;
use crate::types::PageImage;
use crate::{FolioError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Pages that are already rasterized, held in memory.
#[derive(Debug, Clone, Default)]
pub struct ImagePages {
    pages: Vec<Vec<u8>>,
}

impl ImagePages {
    /// Encoded page images in page order; the first is page 1.
    pub fn new(pages: Vec<Vec<u8>>) -> Self {
        Self { pages }
    }

    /// Read page images from files, in the given order.
    pub async fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            pages.push(tokio::fs::read(path.as_ref()).await?);
        }
        Ok(Self { pages })
    }
}

#[async_trait]
impl Rasterizer for ImagePages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn render_page(&self, page_number: usize) -> Result<PageImage> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(|bytes| PageImage::new(page_number, bytes.clone()))
            .ok_or_else(|| {
                FolioError::rasterization(
                    page_number,
                    format!("page not found (document has {} pages)", self.pages.len()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_existing_page() {
        let pages = ImagePages::new(vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(pages.page_count(), 2);

        let image = pages.render_page(2).await.unwrap();
        assert_eq!(image.page_number, 2);
        assert_eq!(image.bytes, b"two");
    }

    #[tokio::test]
    async fn test_render_missing_page() {
        let pages = ImagePages::new(vec![b"one".to_vec()]);
        let err = pages.render_page(0).await.unwrap_err();
        assert!(matches!(err, FolioError::Rasterization { page_number: 0, .. }));

        let err = pages.render_page(5).await.unwrap_err();
        assert!(err.to_string().contains("document has 1 pages"));
    }

    #[tokio::test]
    async fn test_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("page_1.png");
        let second = dir.path().join("page_2.png");
        std::fs::write(&first, b"first").unwrap();
        std::fs::write(&second, b"second").unwrap();

        let pages = ImagePages::from_files(&[first, second]).await.unwrap();
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.render_page(1).await.unwrap().bytes, b"first");
    }

    #[tokio::test]
    async fn test_from_missing_file_is_io_error() {
        let err = ImagePages::from_files(&["/nonexistent/page.png"]).await.unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }
}
