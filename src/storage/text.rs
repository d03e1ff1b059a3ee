// src/storage/text.rs

//! Tab-separated text archive writer.
//!
//! Produces two files under the output directory:
//!
//! ```text
//! archive/
//! ├── occurrence.txt    # core file, one row per occurrence
//! └── image.txt         # image extension, rows keyed by occurrence id
//! ```
//!
//! Both carry a header row. Values are sanitized so tabs and newlines never
//! break the row structure.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Term;
use crate::storage::{ArchiveWriter, IMAGE_COLUMNS, IMAGE_EXTENSION};

/// Core column order. `id` leads, Darwin Core terms follow.
const CORE_COLUMNS: [Term; 24] = [
    Term::ScientificName,
    Term::Kingdom,
    Term::Phylum,
    Term::Class,
    Term::Order,
    Term::Family,
    Term::Genus,
    Term::Country,
    Term::StateProvince,
    Term::Locality,
    Term::DecimalLatitude,
    Term::DecimalLongitude,
    Term::CoordinatePrecision,
    Term::EventDate,
    Term::RecordedBy,
    Term::IdentifiedBy,
    Term::Sex,
    Term::LifeStage,
    Term::MinimumElevationInMeters,
    Term::MaximumElevationInMeters,
    Term::MinimumDepthInMeters,
    Term::MaximumDepthInMeters,
    Term::OccurrenceRemarks,
    Term::CatalogNumber,
];

/// Text archive writer backed by buffered files.
pub struct TextArchiveWriter {
    core: BufWriter<File>,
    image: BufWriter<File>,
    current: Option<PendingRecord>,
    written: u64,
}

struct PendingRecord {
    id: String,
    columns: BTreeMap<Term, String>,
}

fn sanitize(value: &str) -> String {
    value
        .replace(['\t', '\n', '\r'], " ")
        .trim()
        .to_string()
}

impl TextArchiveWriter {
    /// Create the output directory and open fresh archive files in it.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut core = BufWriter::new(File::create(dir.join("occurrence.txt"))?);
        let mut header = vec!["id"];
        header.extend(CORE_COLUMNS.iter().map(|t| t.column()));
        writeln!(core, "{}", header.join("\t"))?;

        let mut image = BufWriter::new(File::create(dir.join("image.txt"))?);
        let mut image_header = vec!["coreid"];
        image_header.extend(IMAGE_COLUMNS);
        writeln!(image, "{}", image_header.join("\t"))?;

        Ok(Self {
            core,
            image,
            current: None,
            written: 0,
        })
    }

    fn flush_current(&mut self) -> Result<()> {
        let Some(record) = self.current.take() else {
            return Ok(());
        };
        let mut row = vec![record.id];
        for term in CORE_COLUMNS {
            row.push(record.columns.get(&term).cloned().unwrap_or_default());
        }
        writeln!(self.core, "{}", row.join("\t"))?;
        Ok(())
    }
}

impl ArchiveWriter for TextArchiveWriter {
    fn new_record(&mut self, id: &str) -> Result<()> {
        self.flush_current()?;
        self.current = Some(PendingRecord {
            id: sanitize(id),
            columns: BTreeMap::new(),
        });
        self.written += 1;
        Ok(())
    }

    fn add_core_column(&mut self, term: Term, value: &str) -> Result<()> {
        let record = self
            .current
            .as_mut()
            .ok_or_else(|| AppError::archive("core column without an open record"))?;
        record.columns.insert(term, sanitize(value));
        Ok(())
    }

    fn add_extension_record(&mut self, rowtype: &str, fields: &[(&str, String)]) -> Result<()> {
        if rowtype != IMAGE_EXTENSION {
            return Err(AppError::archive(format!(
                "unsupported extension rowtype: {rowtype}"
            )));
        }
        let coreid = self
            .current
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or_else(|| AppError::archive("extension row without an open record"))?;

        let mut row = vec![coreid];
        for column in IMAGE_COLUMNS {
            let value = fields
                .iter()
                .find(|(name, _)| *name == column)
                .map(|(_, v)| sanitize(v))
                .unwrap_or_default();
            row.push(value);
        }
        writeln!(self.image, "{}", row.join("\t"))?;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }

    fn close(&mut self) -> Result<()> {
        self.flush_current()?;
        self.core.flush()?;
        self.image.flush()?;
        Ok(())
    }
}
