// src/services/mod.rs

//! Service layer for the harvester application.
//!
//! This module contains the business logic for:
//! - Search API access (`FlickrClient`, the `PhotoSearch` trait)
//! - Record extraction (`extract`)
//! - Per-partition scanning (`WindowSession`)
//! - Scheduling (`run_harvest`)

pub mod extract;
mod flickr;
mod harvest;
mod session;

pub use flickr::{FlickrClient, PhotoSearch};
pub use harvest::{run_harvest, run_partitions};
pub use session::WindowSession;

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted search service for session and scheduler tests.

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::{AppError, Result};
    use crate::models::{SearchHit, SearchPage, SearchWindow};
    use crate::services::PhotoSearch;

    pub struct MockSearch {
        /// All synthetic hits, sorted by upload time descending, matching the
        /// service's date-posted-desc sort.
        hits: Vec<SearchHit>,
        /// Max hits any single query exposes, emulating the paging ceiling.
        ceiling: usize,
        failing_pages: HashSet<u32>,
        untagged: HashSet<String>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl MockSearch {
        pub fn new(mut hits: Vec<SearchHit>, ceiling: usize) -> Self {
            hits.sort_by_key(|h| std::cmp::Reverse(h.date_upload));
            Self {
                hits,
                ceiling,
                failing_pages: HashSet::new(),
                untagged: HashSet::new(),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            }
        }

        /// Hits for one year with distinct, strictly decreasing upload times.
        pub fn synthetic_hits(year: i32, count: usize) -> Vec<SearchHit> {
            let top = SearchWindow::for_year(year).upper;
            (0..count)
                .map(|i| SearchHit {
                    id: format!("{year}-{i}"),
                    date_upload: top - (i as i64) * 60,
                    ..SearchHit::default()
                })
                .collect()
        }

        /// Make every request for this page number fail.
        pub fn fail_page(&mut self, page: u32) {
            self.failing_pages.insert(page);
        }

        /// Return no machine tags for this photo ID.
        pub fn strip_tags(&mut self, id: &str) {
            self.untagged.insert(id.to_string());
        }

        /// Highest number of simultaneously in-flight search calls observed.
        pub fn max_concurrent_calls(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PhotoSearch for MockSearch {
        async fn search(&self, window: &SearchWindow, page_size: u32) -> Result<SearchPage> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            // Yield so overlapping sessions are observable.
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.failing_pages.contains(&window.page) {
                return Err(AppError::api(
                    format!("mock year={} page={}", window.year, window.page),
                    "scripted failure",
                ));
            }

            let matching: Vec<SearchHit> = self
                .hits
                .iter()
                .filter(|h| h.date_upload >= window.lower && h.date_upload <= window.upper)
                .take(self.ceiling)
                .cloned()
                .collect();

            let start = ((window.page - 1) * page_size) as usize;
            let hits = matching
                .iter()
                .skip(start)
                .take(page_size as usize)
                .cloned()
                .collect();
            Ok(SearchPage {
                hits,
                pages: matching.len().div_ceil(page_size as usize) as u32,
                total: matching.len() as u64,
            })
        }

        async fn fetch_tags(&self, photo_id: &str) -> Result<Vec<String>> {
            if self.untagged.contains(photo_id) {
                return Ok(vec!["justakeyword".to_string()]);
            }
            Ok(vec![format!("dwc:scientificname=Species {photo_id}")])
        }
    }
}
