// src/services/session.rs

//! Window search session: the paged scan of one partition.
//!
//! A session walks its calendar year page by page. The service caps the total
//! hits retrievable through one query regardless of the true match count, so
//! every `narrow_interval` pages the session shrinks its upload-time window
//! to just below everything already seen and restarts at page 1. An empty
//! page means the partition is exhausted.

use std::time::Duration;

use crate::models::{HarvestConfig, SearchPage, SearchWindow, SessionStats};
use crate::services::extract;
use crate::services::flickr::PhotoSearch;
use crate::sink::DedupSink;

/// Base pause between retry attempts, scaled by the attempt number.
const RETRY_BACKOFF_MS: u64 = 250;

/// Consecutive skipped pages after which the partition is abandoned. Keeps a
/// dead service from spinning the session through page numbers forever.
const MAX_CONSECUTIVE_SKIPS: u32 = 5;

/// One partition's search session.
pub struct WindowSession<'a> {
    search: &'a dyn PhotoSearch,
    sink: &'a DedupSink,
    window: SearchWindow,
    page_size: u32,
    narrow_interval: u32,
    max_retries: u32,
    stats: SessionStats,
}

impl<'a> WindowSession<'a> {
    pub fn new(
        year: i32,
        search: &'a dyn PhotoSearch,
        sink: &'a DedupSink,
        config: &HarvestConfig,
    ) -> Self {
        Self {
            search,
            sink,
            window: SearchWindow::for_year(year),
            page_size: config.page_size,
            narrow_interval: config.narrow_interval,
            max_retries: config.max_retries,
            stats: SessionStats {
                year,
                ..SessionStats::default()
            },
        }
    }

    /// Scan the partition to exhaustion and report totals.
    pub async fn run(mut self) -> SessionStats {
        let year = self.window.year;
        log::info!("Partition {year}: session starting");

        let mut pages_this_sweep = 0u32;
        let mut consecutive_skips = 0u32;
        loop {
            let Some(page) = self.fetch_page_with_retry().await else {
                // Retries exhausted. The page is skipped, which can silently
                // lose hits; the error log above is the audit trail.
                self.stats.pages_skipped += 1;
                consecutive_skips += 1;
                if consecutive_skips >= MAX_CONSECUTIVE_SKIPS {
                    log::error!(
                        "Partition {year}: abandoned after {consecutive_skips} consecutive page failures"
                    );
                    break;
                }
                self.window.page += 1;
                continue;
            };
            consecutive_skips = 0;
            self.stats.pages_scanned += 1;

            if page.hits.is_empty() {
                break; // partition exhausted
            }

            self.consume_page(&page).await;
            self.window.page += 1;
            pages_this_sweep += 1;

            if pages_this_sweep >= self.narrow_interval {
                pages_this_sweep = 0;
                if self.window.narrow() {
                    log::debug!(
                        "Partition {year}: narrowed window to upper={}",
                        self.window.upper
                    );
                }
            }
        }

        log::info!(
            "Partition {year}: done after {} pages ({} skipped), {} hits, {} written, {} discarded",
            self.stats.pages_scanned,
            self.stats.pages_skipped,
            self.stats.hits_seen,
            self.stats.records_written,
            self.stats.hits_discarded,
        );
        self.stats
    }

    /// Run every hit of one page through extraction and the sink.
    async fn consume_page(&mut self, page: &SearchPage) {
        let year = self.window.year;
        let page_no = self.window.page;

        for hit in &page.hits {
            self.stats.hits_seen += 1;
            self.window.observe_upload(hit.date_upload);

            match extract::extract_via(self.search, hit).await {
                Some(record) => match self.sink.submit(&record) {
                    Ok(true) => self.stats.records_written += 1,
                    Ok(false) => {}
                    Err(e) => {
                        log::error!(
                            "Sink failed for photo {} (year={year} page={page_no}): {e}",
                            hit.id
                        );
                    }
                },
                None => {
                    self.stats.hits_discarded += 1;
                    log::debug!(
                        "Photo {} discarded, no scientific name (year={year} page={page_no})",
                        hit.id
                    );
                }
            }
        }
    }

    /// Fetch the current page, retrying transient failures a bounded number
    /// of times. `None` means the page is abandoned.
    async fn fetch_page_with_retry(&self) -> Option<SearchPage> {
        let mut attempt = 0u32;
        loop {
            match self.search.search(&self.window, self.page_size).await {
                Ok(page) => return Some(page),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        log::error!(
                            "Giving up on year={} page={} after {attempt} attempts: {e}",
                            self.window.year,
                            self.window.page
                        );
                        return None;
                    }
                    log::warn!(
                        "Request failed for year={} page={} (attempt {attempt}): {e}",
                        self.window.year,
                        self.window.page
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                }
            }
        }
    }
}
