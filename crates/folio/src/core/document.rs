//! Document-level reconstruction: fan pages out, collect them back in order.

use crate::core::cancellation::CancellationToken;
use crate::core::config::{FolioConfig, LayoutConfig, PageErrorPolicy};
use crate::layout::reconstruct_page;
use crate::plugins::{OcrEngine, PageCache, Rasterizer};
use crate::types::{DocumentResult, PageFailure, PageRange, PageResult, WordRecords};
use crate::{FolioError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Reconstructs a page range of one document.
///
/// Pages run concurrently on a bounded pool (`FolioConfig::max_concurrent_pages`,
/// default CPU count). The returned [`DocumentResult`] is always in ascending
/// page order, whatever order pages finish in.
///
/// # Example
///
/// ```rust,no_run
/// use folio::core::document::DocumentReconstructor;
/// use folio::core::config::FolioConfig;
/// use folio::ocr::TesseractEngine;
/// use folio::pdf::PdftoppmRasterizer;
/// use folio::types::PageRange;
/// use std::sync::Arc;
///
/// # async fn example() -> folio::Result<()> {
/// let config = FolioConfig::default();
/// let rasterizer = PdftoppmRasterizer::open("contract.pdf", &config.raster).await?;
/// let engine = TesseractEngine::new(config.ocr.clone());
///
/// let result = DocumentReconstructor::new(Arc::new(rasterizer), Arc::new(engine), config)
///     .reconstruct(Some(PageRange::new(3, 7)?))
///     .await?;
///
/// for (page, index, text) in result.triples() {
///     println!("{page}\t{index}\t{text}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct DocumentReconstructor {
    rasterizer: Arc<dyn Rasterizer>,
    engine: Arc<dyn OcrEngine>,
    cache: Option<Arc<dyn PageCache>>,
    config: FolioConfig,
    cancel: CancellationToken,
}

impl DocumentReconstructor {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, engine: Arc<dyn OcrEngine>, config: FolioConfig) -> Self {
        Self {
            rasterizer,
            engine,
            cache: None,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Consult and fill `cache` around each page. Ignored when `config.use_cache` is false.
    pub fn with_cache(mut self, cache: Arc<dyn PageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Reconstruct `range` (the whole document when `None`).
    ///
    /// # Errors
    ///
    /// - `Validation` for an invalid configuration or a range past the last page.
    /// - `Cancelled` when the token fires before every page is done; no partial
    ///   result is returned.
    /// - `Page` wrapping the first page-scoped failure under [`PageErrorPolicy::Strict`].
    ///   Under `BestEffort` such failures are listed in [`DocumentResult::failures`].
    /// - `Io` and other system errors from any page, regardless of policy.
    #[tracing::instrument(skip(self), fields(engine = self.engine.name()))]
    pub async fn reconstruct(&self, range: Option<PageRange>) -> Result<DocumentResult> {
        self.config.validate()?;

        if self.cancel.is_cancelled() {
            return Err(FolioError::Cancelled("reconstruction cancelled before start".to_string()));
        }

        let pages = PageRange::resolve(range, self.rasterizer.page_count())?;
        let first_page = *pages.start();

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let cache = if self.config.use_cache { self.cache.clone() } else { None };

        let mut tasks = JoinSet::new();

        for page_number in pages {
            let job = PageJob {
                rasterizer: Arc::clone(&self.rasterizer),
                engine: Arc::clone(&self.engine),
                cache: cache.clone(),
                layout: self.config.layout,
                timeout_secs: self.config.page_timeout_secs,
            };
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();

            tasks.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(FolioError::Cancelled(format!("page {} abandoned", page_number))),
                    result = async {
                        let _permit = semaphore
                            .acquire()
                            .await
                            .map_err(|e| FolioError::Other(format!("Page pool closed: {}", e)))?;
                        job.run(page_number).await
                    } => result,
                };
                (page_number, result)
            });
        }

        let mut results: Vec<Option<PageResult>> = vec![None; tasks.len()];
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((page_number, Ok(page))) => {
                    results[page_number - first_page] = Some(page);
                }
                Ok((page_number, Err(e))) => {
                    if matches!(e, FolioError::Cancelled(_)) || !e.is_page_scoped() {
                        tasks.abort_all();
                        return Err(e);
                    }

                    match self.config.error_policy {
                        PageErrorPolicy::Strict => {
                            tasks.abort_all();
                            return Err(FolioError::Page {
                                page_number,
                                source: Box::new(e),
                            });
                        }
                        PageErrorPolicy::BestEffort => {
                            tracing::warn!(page_number, error = %e, "page failed, continuing");
                            failures.push(PageFailure::from_error(page_number, &e));
                        }
                    }
                }
                Err(join_err) => {
                    tasks.abort_all();
                    return Err(FolioError::Other(format!("Page task panicked: {}", join_err)));
                }
            }
        }

        failures.sort_by_key(|f| f.page_number);
        let pages: Vec<PageResult> = results.into_iter().flatten().collect();

        tracing::info!(pages = pages.len(), failures = failures.len(), "document reconstructed");

        Ok(DocumentResult { pages, failures })
    }
}

/// Reconstruct `range` of the document behind `rasterizer` without caching.
///
/// Shorthand for [`DocumentReconstructor::new`] followed by
/// [`DocumentReconstructor::reconstruct`].
pub async fn reconstruct_document(
    rasterizer: Arc<dyn Rasterizer>,
    engine: Arc<dyn OcrEngine>,
    range: Option<PageRange>,
    config: &FolioConfig,
) -> Result<DocumentResult> {
    DocumentReconstructor::new(rasterizer, engine, config.clone())
        .reconstruct(range)
        .await
}

struct PageJob {
    rasterizer: Arc<dyn Rasterizer>,
    engine: Arc<dyn OcrEngine>,
    cache: Option<Arc<dyn PageCache>>,
    layout: LayoutConfig,
    timeout_secs: Option<u64>,
}

impl PageJob {
    async fn run(&self, page_number: usize) -> Result<PageResult> {
        if let Some(cache) = &self.cache {
            let cache = Arc::clone(cache);
            match blocking(move || cache.load_cached(page_number)).await {
                Ok(Some(page)) => {
                    tracing::debug!(page_number, "page served from cache");
                    return Ok(page);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(page_number, error = %e, "ignoring unreadable cache entry"),
            }
        }

        let records = match self.timeout_secs {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), self.recognize(page_number))
                .await
                .map_err(|_| FolioError::Timeout { page_number, seconds })??,
            None => self.recognize(page_number).await?,
        };

        let page = reconstruct_page(page_number, &records, &self.layout)?;

        if let Some(cache) = &self.cache {
            let cache = Arc::clone(cache);
            let stored = page.clone();
            if let Err(e) = blocking(move || cache.store_cached(&stored)).await {
                tracing::warn!(page_number, error = %e, "failed to cache page");
            }
        }

        Ok(page)
    }

    async fn recognize(&self, page_number: usize) -> Result<WordRecords> {
        let image = self.rasterizer.render_page(page_number).await?;
        self.engine.recognize(&image).await
    }
}

/// Run synchronous cache I/O on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FolioError::cache(format!("Cache task failed: {}", e)))?
}
