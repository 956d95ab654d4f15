//! On-disk cache of reconstructed pages.
//!
//! Each page is stored as MessagePack at
//! `<cache_dir>/<document_key>/<settings_key>-page-<n>.msgpack`. The settings key
//! is [`FolioConfig::cache_fingerprint`]: it changes with any grouping threshold,
//! OCR language or mode, or render resolution, so a run never reads a page that
//! another configuration segmented.
//!
//! Writes go to a temporary file first and are renamed into place, so readers
//! never see a half-written entry even with several processes sharing a directory.

use crate::core::config::FolioConfig;
use crate::plugins::PageCache;
use crate::types::PageResult;
use crate::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageCacheStats {
    pub total_files: usize,
    pub total_size_mb: f64,
}

/// [`PageCache`] backed by one directory per document.
#[derive(Debug, Clone)]
pub struct DiskPageCache {
    document_dir: PathBuf,
    settings_key: String,
}

impl DiskPageCache {
    /// Open (creating if needed) the cache for `document_key` under `cache_dir`,
    /// holding pages reconstructed with `config`.
    pub fn new(cache_dir: impl AsRef<Path>, document_key: &str, config: &FolioConfig) -> Result<Self> {
        if document_key.is_empty() || document_key.contains(['/', '\\']) || document_key.starts_with('.') {
            return Err(FolioError::validation(format!("invalid document cache key: '{}'", document_key)));
        }

        let document_dir = cache_dir.as_ref().join(document_key);
        fs::create_dir_all(&document_dir)
            .map_err(|e| FolioError::cache_with_source("Failed to create cache directory", e))?;

        Ok(Self {
            document_dir,
            settings_key: config.cache_fingerprint(),
        })
    }

    pub fn document_dir(&self) -> &Path {
        &self.document_dir
    }

    fn page_path(&self, page_number: usize) -> PathBuf {
        self.document_dir
            .join(format!("{}-page-{}.msgpack", self.settings_key, page_number))
    }

    /// Remove every cached page of this document, for all settings.
    pub fn clear(&self) -> Result<()> {
        if !self.document_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.document_dir)
            .map_err(|e| FolioError::cache(format!("Failed to read cache directory: {}", e)))?;

        for entry in entries.flatten() {
            if let Some(ext) = entry.path().extension()
                && ext == "msgpack"
            {
                let _ = fs::remove_file(entry.path());
            }
        }

        Ok(())
    }

    pub fn stats(&self) -> Result<PageCacheStats> {
        if !self.document_dir.exists() {
            return Ok(PageCacheStats::default());
        }

        let entries = fs::read_dir(&self.document_dir)
            .map_err(|e| FolioError::cache(format!("Failed to read cache directory: {}", e)))?;

        let mut total_files = 0;
        let mut total_size_bytes = 0u64;

        for entry in entries.flatten() {
            if let Some(ext) = entry.path().extension()
                && ext == "msgpack"
            {
                total_files += 1;
                if let Ok(metadata) = entry.metadata() {
                    total_size_bytes += metadata.len();
                }
            }
        }

        Ok(PageCacheStats {
            total_files,
            total_size_mb: total_size_bytes as f64 / 1024.0 / 1024.0,
        })
    }
}

impl PageCache for DiskPageCache {
    fn load_cached(&self, page_number: usize) -> Result<Option<PageResult>> {
        let path = self.page_path(page_number);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|e| FolioError::cache(format!("Failed to read cache file: {}", e)))?;
        let page: PageResult = rmp_serde::from_slice(&bytes)?;

        if page.page_number != page_number {
            return Err(FolioError::cache(format!(
                "cache entry for page {} holds page {}",
                page_number, page.page_number
            )));
        }

        Ok(Some(page))
    }

    fn store_cached(&self, result: &PageResult) -> Result<()> {
        let path = self.page_path(result.page_number);
        let serialized = rmp_serde::to_vec(result)?;

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let temp_path = self.document_dir.join(format!(
            "{}-page-{}.tmp.{}.{:?}.{}",
            self.settings_key,
            result.page_number,
            std::process::id(),
            std::thread::current().id(),
            timestamp
        ));

        fs::write(&temp_path, &serialized)
            .map_err(|e| FolioError::cache(format!("Failed to write temp cache file: {}", e)))?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            FolioError::cache(format!("Failed to rename cache file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParagraphEntry;

    fn page(page_number: usize, texts: &[&str]) -> PageResult {
        PageResult {
            page_number,
            paragraphs: texts
                .iter()
                .enumerate()
                .map(|(paragraph_index, text)| ParagraphEntry {
                    paragraph_index,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_cache_store_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DiskPageCache::new(temp_dir.path(), "abc123", &FolioConfig::default()).unwrap();

        let stored = page(4, &["Terms and conditions", "Signed"]);
        cache.store_cached(&stored).unwrap();

        assert_eq!(cache.load_cached(4).unwrap(), Some(stored));
        assert!(cache.document_dir().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_cache_miss() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DiskPageCache::new(temp_dir.path(), "abc123", &FolioConfig::default()).unwrap();
        assert!(cache.load_cached(1).unwrap().is_none());
    }

    #[test]
    fn test_layout_change_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DiskPageCache::new(temp_dir.path(), "abc123", &FolioConfig::default()).unwrap();
        cache.store_cached(&page(1, &["text"])).unwrap();

        let mut tighter = FolioConfig::default();
        tighter.layout.line_tolerance = 0.4;
        let other = DiskPageCache::new(temp_dir.path(), "abc123", &tighter).unwrap();
        assert!(other.load_cached(1).unwrap().is_none());
    }

    #[test]
    fn test_ocr_language_change_misses() {
        let temp_dir = tempfile::tempdir().unwrap();
        let english = DiskPageCache::new(temp_dir.path(), "abc123", &FolioConfig::default()).unwrap();
        english.store_cached(&page(1, &["Terms and conditions"])).unwrap();

        let mut config = FolioConfig::default();
        config.ocr.language = "deu".to_string();
        let german = DiskPageCache::new(temp_dir.path(), "abc123", &config).unwrap();
        assert!(german.load_cached(1).unwrap().is_none());

        let mut config = FolioConfig::default();
        config.raster.dpi = 300;
        let sharper = DiskPageCache::new(temp_dir.path(), "abc123", &config).unwrap();
        assert!(sharper.load_cached(1).unwrap().is_none());

        assert!(english.load_cached(1).unwrap().is_some());
    }

    #[test]
    fn test_reopened_cache_hits() {
        let temp_dir = tempfile::tempdir().unwrap();
        let key = crate::ocr::utils::document_key(b"%PDF-1.7 lease");
        let stored = page(2, &["Rent is due"]);

        DiskPageCache::new(temp_dir.path(), &key, &FolioConfig::default())
            .unwrap()
            .store_cached(&stored)
            .unwrap();

        let reopened = DiskPageCache::new(
            temp_dir.path(),
            &crate::ocr::utils::document_key(b"%PDF-1.7 lease"),
            &FolioConfig::default(),
        )
        .unwrap();
        assert_eq!(reopened.load_cached(2).unwrap(), Some(stored));
    }

    #[test]
    fn test_documents_do_not_share_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = DiskPageCache::new(temp_dir.path(), "doc-a", &FolioConfig::default()).unwrap();
        let second = DiskPageCache::new(temp_dir.path(), "doc-b", &FolioConfig::default()).unwrap();

        first.store_cached(&page(1, &["a"])).unwrap();
        assert!(second.load_cached(1).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_is_serialization_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DiskPageCache::new(temp_dir.path(), "abc123", &FolioConfig::default()).unwrap();
        fs::write(cache.page_path(2), b"not msgpack").unwrap();

        let err = cache.load_cached(2).unwrap_err();
        assert!(matches!(err, FolioError::Serialization { .. }));
    }

    #[test]
    fn test_cache_clear_and_stats() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DiskPageCache::new(temp_dir.path(), "abc123", &FolioConfig::default()).unwrap();

        cache.store_cached(&page(1, &["one"])).unwrap();
        cache.store_cached(&page(2, &["two"])).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_files, 2);
        assert!(stats.total_size_mb > 0.0);

        cache.clear().unwrap();
        assert_eq!(cache.stats().unwrap().total_files, 0);
        assert!(cache.load_cached(1).unwrap().is_none());
    }

    #[test]
    fn test_invalid_document_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = DiskPageCache::new(temp_dir.path(), key, &FolioConfig::default()).unwrap_err();
            assert!(matches!(err, FolioError::Validation { .. }));
        }
    }
}
