use std::fs::{self, File};
use std::path::{Path, PathBuf};

use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::CosmologicalState;
use serde::{Deserialize, Serialize};

/// One row of the evolution log, recorded after every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// Step index; 0 is the initial state.
    pub step: usize,
    /// Normalised scale factor.
    pub x: f64,
    /// Comoving temperature in MeV.
    pub a_t: f64,
    /// Physical temperature in MeV.
    pub t_phys: f64,
    /// Scale factor.
    pub a: f64,
    /// Cosmic time in seconds.
    pub time_s: f64,
    /// Total energy density in MeV⁴.
    pub rho: f64,
    /// Hubble rate in MeV.
    pub hubble: f64,
    /// Right-hand side `x N / D` of the temperature equation.
    pub fraction: f64,
}

impl SnapshotRow {
    /// Captures the state after step `step`.
    pub fn capture(step: usize, state: &CosmologicalState, fraction: f64) -> Self {
        Self {
            step,
            x: state.x,
            a_t: state.a_t,
            t_phys: state.temperature,
            a: state.a,
            time_s: state.time_seconds(),
            rho: state.rho,
            hubble: state.hubble,
            fraction,
        }
    }
}

/// Destination of evolution log rows.
pub trait OutputSink {
    /// Records one row.
    fn append(&mut self, row: &SnapshotRow) -> Result<(), BbnError>;

    /// Flushes buffered rows.
    fn flush(&mut self) -> Result<(), BbnError>;

    /// File backing the sink, if any.
    fn path(&self) -> Option<&Path> {
        None
    }
}

/// Keeps rows in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rows: Vec<SnapshotRow>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows recorded so far.
    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, row: &SnapshotRow) -> Result<(), BbnError> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BbnError> {
        Ok(())
    }
}

fn csv_error(code: &str, path: &Path, err: impl ToString) -> BbnError {
    BbnError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

/// Writes rows to a CSV file with a header derived from the row fields.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Creates (or truncates) the log at `path`.
    pub fn create(path: &Path) -> Result<Self, BbnError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| csv_error("evolution-mkdir", parent, err))?;
        }
        let writer = csv::Writer::from_path(path).map_err(|err| csv_error("evolution-open", path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Reopens an existing log, keeping only rows up to and including `step`.
    ///
    /// Rows written after the checkpoint being resumed from are dropped so the
    /// continued log matches an uninterrupted run.
    pub fn resume(path: &Path, step: usize) -> Result<Self, BbnError> {
        let kept = if path.exists() {
            read_rows(path)?
                .into_iter()
                .filter(|row| row.step <= step)
                .collect()
        } else {
            Vec::new()
        };
        let mut sink = Self::create(path)?;
        for row in &kept {
            sink.append(row)?;
        }
        Ok(sink)
    }
}

impl OutputSink for CsvSink {
    fn append(&mut self, row: &SnapshotRow) -> Result<(), BbnError> {
        self.writer
            .serialize(row)
            .map_err(|err| csv_error("evolution-write", &self.path, err))
    }

    fn flush(&mut self) -> Result<(), BbnError> {
        self.writer
            .flush()
            .map_err(|err| csv_error("evolution-flush", &self.path, err))
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Reads an evolution log written by [`CsvSink`].
pub fn read_rows(path: &Path) -> Result<Vec<SnapshotRow>, BbnError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| csv_error("evolution-open", path, err))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|err| csv_error("evolution-parse", path, err)))
        .collect()
}
