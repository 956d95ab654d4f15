//! Configuration loading and management.
//!
//! [`FolioConfig`] can be loaded from TOML, YAML, or JSON files, discovered as
//! `folio.toml` in the current directory or any parent, or built in code.
//! Every field has a default, so partial files are valid.

use crate::ocr::utils::digest_key;
use crate::{FolioError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Words on the same baseline may differ in `y` by less than this fraction of the word height.
pub const DEFAULT_LINE_TOLERANCE: f64 = 0.6;

/// Multiplier applied to the median line spacing to get the paragraph-break gap.
pub const DEFAULT_SPACING_MULTIPLIER: f64 = 0.5;

/// Paragraph-break gap in pixels when a page has fewer than two lines.
pub const DEFAULT_FALLBACK_PARAGRAPH_GAP: f64 = 10.0;

/// Main configuration.
///
/// # Example
///
/// ```rust
/// use folio::core::config::{FolioConfig, PageErrorPolicy};
///
/// let config = FolioConfig {
///     error_policy: PageErrorPolicy::Strict,
///     max_concurrent_pages: Some(2),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Geometric grouping parameters
    pub layout: LayoutConfig,

    /// Maximum pages processed concurrently (None = number of CPUs)
    pub max_concurrent_pages: Option<usize>,

    /// What to do when a single page fails
    pub error_policy: PageErrorPolicy,

    /// Per-page limit for rasterization plus OCR (None = no limit)
    pub page_timeout_secs: Option<u64>,

    /// Reuse cached page results
    pub use_cache: bool,

    /// Cache directory (None = `.folio/pages` under the current directory)
    pub cache_dir: Option<PathBuf>,

    /// Tesseract subprocess settings
    pub ocr: OcrConfig,

    /// pdftoppm/pdfinfo subprocess settings
    pub raster: RasterConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            max_concurrent_pages: None,
            error_policy: PageErrorPolicy::default(),
            page_timeout_secs: None,
            use_cache: true,
            cache_dir: None,
            ocr: OcrConfig::default(),
            raster: RasterConfig::default(),
        }
    }
}

/// Grouping thresholds for line and paragraph reconstruction.
///
/// Changing these changes the externally observed segmentation, which is why
/// the cache key includes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Baseline tolerance as a fraction of word height
    pub line_tolerance: f64,

    /// Fraction of the median line spacing that separates paragraphs
    pub spacing_multiplier: f64,

    /// Paragraph gap in pixels used when no line spacing can be measured
    pub fallback_paragraph_gap: f64,

    /// Words need a confidence strictly above this value
    pub min_confidence: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            spacing_multiplier: DEFAULT_SPACING_MULTIPLIER,
            fallback_paragraph_gap: DEFAULT_FALLBACK_PARAGRAPH_GAP,
            min_confidence: 0.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("line_tolerance", self.line_tolerance),
            ("spacing_multiplier", self.spacing_multiplier),
            ("fallback_paragraph_gap", self.fallback_paragraph_gap),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(FolioError::validation(format!(
                    "layout.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if !self.min_confidence.is_finite() || self.min_confidence < 0.0 {
            return Err(FolioError::validation(format!(
                "layout.min_confidence must be >= 0, got {}",
                self.min_confidence
            )));
        }

        Ok(())
    }
}

/// Per-page failure handling during document reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageErrorPolicy {
    /// Record the failure against the page and keep going
    #[default]
    BestEffort,
    /// Fail the whole document on the first page failure
    Strict,
}

/// Tesseract command-line settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path to the `tesseract` executable
    pub tesseract_path: String,

    /// Language code (e.g., "eng", "deu+eng")
    pub language: String,

    /// Page segmentation mode (0-13)
    pub psm: u8,

    /// Subprocess timeout
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            language: "eng".to_string(),
            psm: 3,
            timeout_secs: 120,
        }
    }
}

impl OcrConfig {
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(FolioError::validation(
                "ocr.language cannot be empty. Please specify a valid language code (e.g., 'eng')",
            ));
        }
        if self.psm > 13 {
            return Err(FolioError::validation(format!(
                "ocr.psm must be between 0 and 13, got {}",
                self.psm
            )));
        }
        if self.timeout_secs == 0 {
            return Err(FolioError::validation("ocr.timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

/// pdftoppm/pdfinfo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub pdftoppm_path: String,
    pub pdfinfo_path: String,
    /// Render resolution
    pub dpi: u32,
    pub timeout_secs: u64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            pdftoppm_path: "pdftoppm".to_string(),
            pdfinfo_path: "pdfinfo".to_string(),
            dpi: 200,
            timeout_secs: 120,
        }
    }
}

impl RasterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(36..=1200).contains(&self.dpi) {
            return Err(FolioError::validation(format!(
                "raster.dpi must be between 36 and 1200, got {}",
                self.dpi
            )));
        }
        if self.timeout_secs == 0 {
            return Err(FolioError::validation("raster.timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

impl FolioConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.ocr.validate()?;
        self.raster.validate()?;

        if self.max_concurrent_pages == Some(0) {
            return Err(FolioError::validation("max_concurrent_pages must be greater than 0"));
        }
        if self.page_timeout_secs == Some(0) {
            return Err(FolioError::validation("page_timeout_secs must be greater than 0"));
        }

        Ok(())
    }

    /// Key over every setting that changes a page's reconstruction, stable across processes.
    ///
    /// Covers the grouping thresholds, the tesseract binary, language and segmentation
    /// mode, and the rasterizer binary and resolution. Timeouts and pool settings do
    /// not affect output and are left out.
    pub fn cache_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        let layout = &self.layout;
        for value in [
            layout.line_tolerance,
            layout.spacing_multiplier,
            layout.fallback_paragraph_gap,
            layout.min_confidence,
        ] {
            hasher.update(value.to_bits().to_le_bytes());
        }

        for field in [&self.ocr.tesseract_path, &self.ocr.language] {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([self.ocr.psm]);

        hasher.update(self.raster.pdftoppm_path.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.raster.dpi.to_le_bytes());

        digest_key(hasher.finalize())
    }

    /// Worker pool size.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_pages.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Resolved cache directory.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            let mut path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            path.push(".folio");
            path.push("pages");
            path
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Validation` if the file doesn't exist or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| FolioError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| FolioError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| FolioError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load a file, picking the format from its extension (TOML when unknown).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover `folio.toml` in the current directory or its parents.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(FolioError::Io)?;

        loop {
            let candidate = current.join("folio.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| FolioError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
