//! Struct archiving functionality
//!
//! Archives are CSV files inside the session's `arch` directory, one row per
//! cycle. Records must be flat structs (no nested structs), as the CSV header
//! is taken from the field names.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// Any missing parent directories are created, and an existing file at the
    /// path is truncated.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        Self::from_abs_path(session.arch_root.join(path))
    }

    /// Create a new archiver writing to an absolute path.
    pub fn from_abs_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::CreateError)?;
        }

        let file = File::create(path).map_err(ArchiveError::CreateError)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    ///
    /// # Panics
    /// - If the archiver was default constructed rather than built with
    ///   `from_path`.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            },
            None => crate::raise_error!("Cannot find an initialised writer!")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        phase: &'static str,
        range_m: Option<f64>
    }

    #[test]
    fn test_archive_rows() {
        let path = std::env::temp_dir()
            .join("ovr_util_archive_test")
            .join("rows.csv");

        let mut arch = Archiver::from_abs_path(&path).unwrap();
        arch.serialise(Row { time_s: 0.0, phase: "Monitoring", range_m: None }).unwrap();
        arch.serialise(Row { time_s: 0.1, phase: "Confirming", range_m: Some(1.5) }).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![
            "time_s,phase,range_m",
            "0.0,Monitoring,",
            "0.1,Confirming,1.5"
        ]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    #[should_panic]
    fn test_uninit_archiver_panics() {
        let mut arch = Archiver::default();
        arch.serialise(0u8).ok();
    }
}
