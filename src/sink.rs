// src/sink.rs

//! Deduplicating archive sink.
//!
//! Every search session submits here. One lock guards the seen-ID set and the
//! archive writer together, so the membership check, the insert and the write
//! form a single critical section: at most one write per ID within a run, no
//! matter how submissions interleave.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{PhotoRecord, Term};
use crate::storage::{ArchiveWriter, IMAGE_EXTENSION};

/// Bounded-capacity set of already-written photo IDs.
///
/// When the capacity is exceeded the oldest entries are evicted. A re-admitted
/// ID then merely risks one duplicate row in the archive; deduplication is an
/// approximation bounded by capacity, not a hard guarantee.
#[derive(Debug)]
pub struct SeenSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Insert an ID; returns false if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        while self.ids.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            } else {
                break;
            }
        }
        self.ids.insert(id.to_string());
        self.order.push_back(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

struct SinkInner {
    seen: SeenSet,
    writer: Box<dyn ArchiveWriter>,
}

/// Single serialization point between all sessions and the archive writer.
pub struct DedupSink {
    inner: Mutex<SinkInner>,
}

impl DedupSink {
    pub fn new(writer: Box<dyn ArchiveWriter>, seen_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(SinkInner {
                seen: SeenSet::with_capacity(seen_capacity),
                writer,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SinkInner>> {
        self.inner
            .lock()
            .map_err(|_| AppError::archive("sink lock poisoned"))
    }

    /// Submit one record; returns true if it was novel and written.
    pub fn submit(&self, record: &PhotoRecord) -> Result<bool> {
        let mut inner = self.lock()?;

        // The extractor never produces nameless records; reject anyway.
        if record.scientific_name.is_empty() {
            log::warn!("Sink rejected nameless record {}", record.id);
            return Ok(false);
        }

        if !inner.seen.insert(&record.id) {
            return Ok(false);
        }

        write_record(inner.writer.as_mut(), record)?;
        Ok(true)
    }

    /// Core records written so far.
    pub fn records_written(&self) -> Result<u64> {
        Ok(self.lock()?.writer.records_written())
    }

    /// Flush and close the underlying writer.
    pub fn close(&self) -> Result<()> {
        self.lock()?.writer.close()
    }
}

fn write_record(writer: &mut dyn ArchiveWriter, record: &PhotoRecord) -> Result<()> {
    writer.new_record(&record.id)?;
    writer.add_core_column(Term::ScientificName, &record.scientific_name)?;

    if let Some(lat) = record.latitude {
        writer.add_core_column(Term::DecimalLatitude, &lat.to_string())?;
    }
    if let Some(lon) = record.longitude {
        writer.add_core_column(Term::DecimalLongitude, &lon.to_string())?;
    }
    if let Some(acc) = record.accuracy {
        writer.add_core_column(Term::CoordinatePrecision, &acc.to_string())?;
    }
    if let Some(date) = &record.date_recorded {
        writer.add_core_column(Term::EventDate, date)?;
    }

    // Hard-typed fields above win over same-named tag attributes.
    for (term, value) in &record.attributes {
        match term {
            Term::ScientificName | Term::DecimalLatitude | Term::DecimalLongitude => {}
            Term::CoordinatePrecision if record.accuracy.is_some() => {}
            Term::EventDate if record.date_recorded.is_some() => {}
            term => writer.add_core_column(*term, value)?,
        }
    }

    writer.add_extension_record(
        IMAGE_EXTENSION,
        &[
            ("identifier", record.image_url.clone()),
            ("references", record.link.clone()),
            ("title", record.title.clone()),
            ("description", record.description.clone()),
            ("license", record.license.clone()),
            ("creator", record.photographer.clone()),
            ("thumbnail", record.thumbnail_url.clone()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::testing::MemoryWriter;

    fn record(id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            link: format!("https://www.flickr.com/photos/x/{id}"),
            image_url: String::new(),
            thumbnail_url: String::new(),
            title: String::new(),
            description: String::new(),
            license: String::new(),
            owner: String::new(),
            photographer: String::new(),
            date_recorded: None,
            latitude: None,
            longitude: None,
            accuracy: None,
            scientific_name: "Abies alba".to_string(),
            attributes: Default::default(),
        }
    }

    #[test]
    fn test_duplicate_id_written_once() {
        let sink = DedupSink::new(Box::new(MemoryWriter::default()), 100);
        assert!(sink.submit(&record("a")).unwrap());
        assert!(!sink.submit(&record("a")).unwrap());
        assert!(sink.submit(&record("b")).unwrap());
        assert_eq!(sink.records_written().unwrap(), 2);
    }

    #[test]
    fn test_nameless_record_rejected() {
        let sink = DedupSink::new(Box::new(MemoryWriter::default()), 100);
        let mut r = record("a");
        r.scientific_name = String::new();
        assert!(!sink.submit(&r).unwrap());
        assert_eq!(sink.records_written().unwrap(), 0);
    }

    #[test]
    fn test_concurrent_submits_dedup() {
        let sink = Arc::new(DedupSink::new(Box::new(MemoryWriter::default()), 10_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        sink.submit(&record(&format!("p{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // 8 threads submit the same 500 IDs; exactly 500 writes land.
        assert_eq!(sink.records_written().unwrap(), 500);
    }

    #[test]
    fn test_tag_precision_written_without_geo_block() {
        let mut r = record("a");
        r.attributes
            .insert(Term::CoordinatePrecision, "0.001".to_string());

        let mut writer = MemoryWriter::default();
        write_record(&mut writer, &r).unwrap();
        assert!(
            writer
                .core
                .iter()
                .any(|(id, term, value)| id == "a"
                    && *term == Term::CoordinatePrecision
                    && value == "0.001"),
            "tag-supplied precision must reach the archive"
        );

        // With a geo block the hit's own accuracy wins over the tag.
        r.accuracy = Some(14);
        let mut writer = MemoryWriter::default();
        write_record(&mut writer, &r).unwrap();
        let precision: Vec<_> = writer
            .core
            .iter()
            .filter(|(_, term, _)| *term == Term::CoordinatePrecision)
            .collect();
        assert_eq!(precision.len(), 1);
        assert_eq!(precision[0].2, "14");
    }

    #[test]
    fn test_seen_set_evicts_oldest() {
        let mut seen = SeenSet::with_capacity(2);
        assert!(seen.insert("a"));
        assert!(seen.insert("b"));
        assert!(seen.insert("c")); // evicts "a"
        assert_eq!(seen.len(), 2);
        assert!(seen.insert("a")); // re-admitted: accepted approximation
        assert!(!seen.insert("c"));
    }
}
