//! Dataset export
//!
//! Every completed crawl run ends as exactly one CSV artifact named after
//! the source's query URL. Failed properties are simply absent from the
//! artifact; the run's failure list is log material, not dataset material.

mod csv;

pub use csv::{artifact_name, CsvExporter, COLUMNS};

use std::path::PathBuf;
use thiserror::Error;

/// Export failures
///
/// Any of these is fatal to a crawl run: extracted data that cannot be
/// written is a run that produced nothing.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to prepare output directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },
}
