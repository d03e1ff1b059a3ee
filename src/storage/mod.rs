// src/storage/mod.rs

//! Archive writer abstraction.
//!
//! The harvester treats the archive as an opaque sink: one core row per
//! occurrence plus extension rows keyed to it. Writers are not required to be
//! internally thread-safe; the dedup sink serializes all access behind its
//! lock.

pub mod text;

use crate::error::Result;
use crate::models::Term;

// Re-export for convenience
pub use text::TextArchiveWriter;

/// Row type identifier for the image extension file.
pub const IMAGE_EXTENSION: &str = "Image";

/// Column names accepted by the image extension.
pub const IMAGE_COLUMNS: [&str; 7] = [
    "identifier",
    "references",
    "title",
    "description",
    "license",
    "creator",
    "thumbnail",
];

/// Trait for archive output backends.
pub trait ArchiveWriter: Send {
    /// Start a new core record. Flushes any record in progress.
    fn new_record(&mut self, id: &str) -> Result<()>;

    /// Set one core column on the record in progress.
    fn add_core_column(&mut self, term: Term, value: &str) -> Result<()>;

    /// Append one extension row attached to the record in progress.
    fn add_extension_record(&mut self, rowtype: &str, fields: &[(&str, String)]) -> Result<()>;

    /// Number of core records started so far.
    fn records_written(&self) -> u64;

    /// Flush the record in progress and all buffers.
    fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory writer for sink and session tests.

    use super::*;

    #[derive(Debug, Default)]
    pub struct MemoryWriter {
        pub ids: Vec<String>,
        pub core: Vec<(String, Term, String)>,
        pub extensions: Vec<(String, String)>,
        pub closed: bool,
    }

    impl ArchiveWriter for MemoryWriter {
        fn new_record(&mut self, id: &str) -> Result<()> {
            self.ids.push(id.to_string());
            Ok(())
        }

        fn add_core_column(&mut self, term: Term, value: &str) -> Result<()> {
            let id = self.ids.last().cloned().unwrap_or_default();
            self.core.push((id, term, value.to_string()));
            Ok(())
        }

        fn add_extension_record(&mut self, rowtype: &str, _fields: &[(&str, String)]) -> Result<()> {
            let id = self.ids.last().cloned().unwrap_or_default();
            self.extensions.push((id, rowtype.to_string()));
            Ok(())
        }

        fn records_written(&self) -> u64 {
            self.ids.len() as u64
        }

        fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }
}
