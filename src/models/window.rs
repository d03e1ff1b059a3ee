// src/models/window.rs

//! Search window state for one partition of the harvest.
//!
//! A partition is one calendar year. Its session scans the year through a
//! window of upload timestamps that shrinks whenever the service's paging
//! ceiling comes into play.

use chrono::{TimeZone, Utc};

/// Mutable scan state for one partition's search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWindow {
    /// Calendar year this window belongs to.
    pub year: i32,
    /// Inclusive lower bound on upload time, epoch seconds.
    pub lower: i64,
    /// Inclusive upper bound on upload time, epoch seconds.
    pub upper: i64,
    /// 1-based page within the current sweep.
    pub page: u32,
    /// Minimum upload timestamp observed during the current sweep.
    pub min_upload_seen: Option<i64>,
}

impl SearchWindow {
    /// Window spanning one whole calendar year.
    pub fn for_year(year: i32) -> Self {
        let lower = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .map(|t| t.timestamp())
            .unwrap_or(0);
        let upper = Utc
            .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
            .single()
            .map(|t| t.timestamp() - 1)
            .unwrap_or(i64::MAX);
        Self {
            year,
            lower,
            upper,
            page: 1,
            min_upload_seen: None,
        }
    }

    /// Track the smallest upload timestamp seen on a result page.
    ///
    /// Timestamps outside the window bounds are ignored: a hit missing its
    /// upload date deserializes to 0, and letting that pin the sweep minimum
    /// would disable narrowing for the rest of the partition.
    pub fn observe_upload(&mut self, timestamp: i64) {
        if timestamp < self.lower || timestamp > self.upper {
            return;
        }
        match self.min_upload_seen {
            Some(min) if min <= timestamp => {}
            _ => self.min_upload_seen = Some(timestamp),
        }
    }

    /// Shrink the window below everything already seen and restart paging.
    ///
    /// The service refuses to paginate past a fixed ceiling of total hits per
    /// query, so instead of requesting deeper pages the upper bound drops to
    /// just below the minimum upload time of the current sweep. Returns false
    /// when no timestamp was observed or the window would become empty, in
    /// which case the caller keeps paging as-is.
    pub fn narrow(&mut self) -> bool {
        let Some(min_seen) = self.min_upload_seen else {
            return false;
        };
        let new_upper = min_seen - 1;
        if new_upper < self.lower {
            return false;
        }
        self.upper = new_upper;
        self.page = 1;
        self.min_upload_seen = None;
        true
    }
}

/// Per-session totals reported when a partition reaches Done.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub year: i32,
    /// Pages fetched, across all sweeps.
    pub pages_scanned: u32,
    /// Pages abandoned after exhausting retries.
    pub pages_skipped: u32,
    /// Hits seen on result pages.
    pub hits_seen: u64,
    /// Records the sink accepted (novel IDs).
    pub records_written: u64,
    /// Hits discarded for lacking a scientific name.
    pub hits_discarded: u64,
}

/// Aggregated totals over all partitions of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestStats {
    pub partitions: u32,
    pub pages_scanned: u32,
    pub pages_skipped: u32,
    pub hits_seen: u64,
    pub records_written: u64,
    pub hits_discarded: u64,
}

impl HarvestStats {
    /// Fold one finished session into the run totals.
    pub fn absorb(&mut self, s: &SessionStats) {
        self.partitions += 1;
        self.pages_scanned += s.pages_scanned;
        self.pages_skipped += s.pages_skipped;
        self.hits_seen += s.hits_seen;
        self.records_written += s.records_written;
        self.hits_discarded += s.hits_discarded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_window_bounds() {
        let w = SearchWindow::for_year(2021);
        assert_eq!(w.lower, 1_609_459_200); // 2021-01-01T00:00:00Z
        assert_eq!(w.upper, 1_640_995_199); // 2021-12-31T23:59:59Z
        assert_eq!(w.page, 1);
    }

    #[test]
    fn test_observe_keeps_minimum() {
        let mut w = SearchWindow::for_year(2021);
        w.observe_upload(1_620_000_000);
        w.observe_upload(1_630_000_000);
        w.observe_upload(1_610_000_000);
        assert_eq!(w.min_upload_seen, Some(1_610_000_000));
    }

    #[test]
    fn test_observe_ignores_out_of_window_timestamps() {
        let mut w = SearchWindow::for_year(2021);
        w.observe_upload(0); // hit with a missing upload date
        w.observe_upload(w.upper + 100);
        assert_eq!(w.min_upload_seen, None);

        w.observe_upload(1_620_000_000);
        w.observe_upload(0);
        assert_eq!(w.min_upload_seen, Some(1_620_000_000));
        assert!(w.narrow(), "a stray zero timestamp must not block narrowing");
        assert_eq!(w.upper, 1_619_999_999);
    }

    #[test]
    fn test_narrow_resets_sweep() {
        let mut w = SearchWindow::for_year(2021);
        w.page = 11;
        w.observe_upload(1_620_000_000);
        assert!(w.narrow());
        assert_eq!(w.upper, 1_619_999_999);
        assert_eq!(w.page, 1);
        assert_eq!(w.min_upload_seen, None);
    }

    #[test]
    fn test_narrow_without_observation_is_noop() {
        let mut w = SearchWindow::for_year(2021);
        let before = w.clone();
        assert!(!w.narrow());
        assert_eq!(w, before);
    }

    #[test]
    fn test_narrow_refuses_empty_window() {
        let mut w = SearchWindow::for_year(2021);
        w.observe_upload(w.lower); // everything at the very start of the year
        assert!(!w.narrow());
    }
}
