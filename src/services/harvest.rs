// src/services/harvest.rs

//! Harvest scheduler.
//!
//! Partitions the scan range into calendar years, newest first, and runs at
//! most `pool_size` window sessions concurrently. The run completes when every
//! partition has reached Done.

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, HarvestConfig, HarvestStats};
use crate::services::flickr::PhotoSearch;
use crate::services::session::WindowSession;
use crate::sink::DedupSink;

/// Run the full harvest over the configured year range.
pub async fn run_harvest(
    config: &Config,
    search: &dyn PhotoSearch,
    sink: &DedupSink,
) -> Result<HarvestStats> {
    let years: Vec<i32> = (config.harvest.year_floor..=HarvestConfig::year_ceiling())
        .rev()
        .collect();
    run_partitions(&years, &config.harvest, search, sink).await
}

/// Run sessions for an explicit set of partitions under the concurrency cap.
pub async fn run_partitions(
    years: &[i32],
    harvest: &HarvestConfig,
    search: &dyn PhotoSearch,
    sink: &DedupSink,
) -> Result<HarvestStats> {
    let pool = harvest.pool_size.max(1);
    log::info!(
        "Scheduling {} partitions with {} concurrent sessions",
        years.len(),
        pool
    );

    let mut stats = HarvestStats::default();
    let mut sessions = stream::iter(years.iter().copied())
        .map(|year| WindowSession::new(year, search, sink, harvest).run())
        .buffer_unordered(pool);

    while let Some(session_stats) = sessions.next().await {
        stats.absorb(&session_stats);
    }

    log::info!(
        "Harvest complete: {} partitions, {} pages ({} skipped), {} hits, {} records written, {} discarded",
        stats.partitions,
        stats.pages_scanned,
        stats.pages_skipped,
        stats.hits_seen,
        stats.records_written,
        stats.hits_discarded,
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchHit, SearchWindow};
    use crate::services::testing::MockSearch;
    use crate::storage::testing::MemoryWriter;

    #[tokio::test]
    async fn test_pool_of_two_over_three_partitions() {
        // Partitions {2020, 2021, 2022} with pool size 2: two sessions start
        // immediately, the third admits only after one reaches Done. One ID
        // appears in two partitions and must be written once.
        let mut hits = Vec::new();
        for year in [2020, 2021, 2022] {
            hits.extend(MockSearch::synthetic_hits(year, 8));
        }
        let mut shared = SearchHit {
            id: "shared".to_string(),
            ..SearchHit::default()
        };
        shared.date_upload = SearchWindow::for_year(2020).lower + 1;
        hits.push(shared.clone());
        shared.date_upload = SearchWindow::for_year(2021).lower + 1;
        hits.push(shared);

        let search = MockSearch::new(hits, usize::MAX);
        let sink = DedupSink::new(Box::new(MemoryWriter::default()), 10_000);
        let harvest = HarvestConfig {
            pool_size: 2,
            page_size: 4,
            narrow_interval: 100,
            max_retries: 0,
            ..HarvestConfig::default()
        };

        let stats = run_partitions(&[2022, 2021, 2020], &harvest, &search, &sink)
            .await
            .unwrap();

        assert_eq!(stats.partitions, 3);
        assert_eq!(stats.hits_seen, 26);
        // 24 synthetic IDs plus one shared ID written exactly once.
        assert_eq!(stats.records_written, 25);
        assert_eq!(sink.records_written().unwrap(), 25);
        assert_eq!(search.max_concurrent_calls(), 2);
    }

    #[tokio::test]
    async fn test_single_empty_partition() {
        let search = MockSearch::new(Vec::new(), usize::MAX);
        let sink = DedupSink::new(Box::new(MemoryWriter::default()), 100);
        let stats = run_partitions(&[2019], &HarvestConfig::default(), &search, &sink)
            .await
            .unwrap();
        assert_eq!(stats.partitions, 1);
        assert_eq!(stats.records_written, 0);
    }
}
