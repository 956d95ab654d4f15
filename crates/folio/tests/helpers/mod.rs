//! In-memory collaborators for document reconstruction tests.
#![allow(dead_code)]

use async_trait::async_trait;
use folio::plugins::{OcrEngine, PageCache, Rasterizer};
use folio::types::{PageImage, PageResult, WordRecords};
use folio::{FolioError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::thread::ThreadId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Pages whose image bytes are their page number, rendered after an optional delay.
#[derive(Default)]
pub struct FakePages {
    pub page_count: usize,
    pub delays_ms: HashMap<usize, u64>,
    pub failing: HashSet<usize>,
}

impl FakePages {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, page_number: usize, delay_ms: u64) -> Self {
        self.delays_ms.insert(page_number, delay_ms);
        self
    }

    pub fn failing_on(mut self, page_number: usize) -> Self {
        self.failing.insert(page_number);
        self
    }
}

#[async_trait]
impl Rasterizer for FakePages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn render_page(&self, page_number: usize) -> Result<PageImage> {
        if let Some(delay) = self.delays_ms.get(&page_number) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }
        if self.failing.contains(&page_number) {
            return Err(FolioError::rasterization(page_number, "corrupt page stream"));
        }
        Ok(PageImage::new(page_number, page_number.to_string().into_bytes()))
    }
}

/// What the fake engine does for a given page.
#[derive(Clone)]
pub enum Behavior {
    Blank,
    Hang,
    Io,
}

/// Recognizes two paragraphs per page, `page <n> heading` and `page <n> body`.
///
/// Tracks how many pages it recognized and the peak number of concurrent calls.
#[derive(Default)]
pub struct FakeEngine {
    pub overrides: HashMap<usize, Behavior>,
    pub delay_ms: u64,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_behavior(mut self, page_number: usize, behavior: Behavior) -> Self {
        self.overrides.insert(page_number, behavior);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn recognize_page(&self, page_number: usize) -> Result<WordRecords> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        match self.overrides.get(&page_number) {
            Some(Behavior::Blank) => return Ok(WordRecords::new()),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Some(Behavior::Io) => {
                return Err(std::io::Error::other("engine process vanished").into());
            }
            None => {}
        }

        Ok(two_paragraphs(page_number))
    }
}

#[async_trait]
impl OcrEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn recognize(&self, image: &PageImage) -> Result<WordRecords> {
        let page_number: usize = String::from_utf8_lossy(&image.bytes)
            .parse()
            .map_err(|_| FolioError::ocr("unexpected image"))?;

        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.recognize_page(page_number).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Records for a heading line and a body line far enough apart to split.
pub fn two_paragraphs(page_number: usize) -> WordRecords {
    let mut records = WordRecords::new();
    let page = format!("page{}", page_number);
    records.push(60, 0, 40, 10, "heading", 90.0);
    records.push(0, 0, 50, 10, page.clone(), 90.0);
    records.push(0, 100, 50, 10, page, 90.0);
    records.push(60, 100, 40, 10, "body", 90.0);
    records
}

/// `PageCache` held in memory.
#[derive(Default)]
pub struct MemoryCache {
    pub pages: Mutex<HashMap<usize, PageResult>>,
    pub fail_loads: bool,
    threads: Mutex<HashSet<ThreadId>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_loads() -> Self {
        Self {
            fail_loads: true,
            ..Default::default()
        }
    }

    pub fn stored_pages(&self) -> Vec<usize> {
        let mut pages: Vec<_> = self.pages.lock().unwrap().keys().copied().collect();
        pages.sort_unstable();
        pages
    }

    /// Threads that loads and stores ran on.
    pub fn call_threads(&self) -> HashSet<ThreadId> {
        self.threads.lock().unwrap().clone()
    }

    fn record_thread(&self) {
        self.threads.lock().unwrap().insert(std::thread::current().id());
    }
}

impl PageCache for MemoryCache {
    fn load_cached(&self, page_number: usize) -> Result<Option<PageResult>> {
        self.record_thread();
        if self.fail_loads {
            return Err(FolioError::cache("cache unreadable"));
        }
        Ok(self.pages.lock().unwrap().get(&page_number).cloned())
    }

    fn store_cached(&self, result: &PageResult) -> Result<()> {
        self.record_thread();
        self.pages.lock().unwrap().insert(result.page_number, result.clone());
        Ok(())
    }
}
