//! CSV artifact writing
//!
//! One artifact per source per run. The file name is derived from the
//! source's query URL so reruns of the same query land on the same file
//! and simply replace it; export is idempotent at the artifact level.

use crate::config::SourceConfig;
use crate::crawl::PropertyRecord;
use crate::export::ExportError;
use std::fs;
use std::path::{Path, PathBuf};

/// Column order of every dataset artifact
pub const COLUMNS: [&str; 11] = [
    "URL",
    "Name",
    "Description",
    "Address",
    "Price",
    "Area",
    "Characteristics",
    "Property Type",
    "Transaction Type",
    "Latitude",
    "Longitude",
];

/// Characters that never survive into an artifact file name
const UNSAFE_CHARS: [char; 11] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*', '&', '='];

/// Derives the artifact file name from a source's query URL
///
/// The leading `https://` is dropped, then every path separator and
/// filesystem-unsafe character (including `&` and `=`, so query parameters
/// stay readable) becomes an underscore. The derivation is deterministic:
/// the same query URL always maps to the same artifact name.
///
/// # Example
///
/// ```
/// use immoharvest::export::artifact_name;
///
/// assert_eq!(
///     artifact_name("https://site.example/srp/?tr=buy&page=1"),
///     "site.example_srp__tr_buy_page_1.csv"
/// );
/// ```
pub fn artifact_name(query_url: &str) -> String {
    let stripped = query_url.strip_prefix("https://").unwrap_or(query_url);

    let mut name = String::with_capacity(stripped.len() + 4);
    for c in stripped.chars() {
        if UNSAFE_CHARS.contains(&c) {
            name.push('_');
        } else {
            name.push(c);
        }
    }
    name.push_str(".csv");
    name
}

/// Writes one CSV artifact per source into the output directory
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    /// Creates an exporter rooted at the given output directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Exports the records of one completed run
    ///
    /// Creates the output directory if needed, then writes the header row
    /// and one row per record, replacing any previous artifact for the same
    /// query URL.
    ///
    /// # Arguments
    ///
    /// * `source` - The source the records came from (names the artifact)
    /// * `records` - Extracted records in discovery order
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written artifact
    /// * `Err(ExportError)` - Directory or write failure
    pub fn export(
        &self,
        source: &SourceConfig,
        records: &[PropertyRecord],
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ExportError::Directory {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let path = self.output_dir.join(artifact_name(&source.url));
        let mut writer = csv::Writer::from_path(&path).map_err(|e| self.write_error(&path, e))?;

        writer
            .write_record(COLUMNS)
            .map_err(|e| self.write_error(&path, e))?;
        for record in records {
            writer
                .write_record(record_row(record))
                .map_err(|e| self.write_error(&path, e))?;
        }
        writer
            .flush()
            .map_err(|e| self.write_error(&path, csv::Error::from(e)))?;

        tracing::debug!("Wrote {} rows to {}", records.len(), path.display());
        Ok(path)
    }

    fn write_error(&self, path: &Path, source: csv::Error) -> ExportError {
        ExportError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Flattens one record into its CSV row; absent fields become empty cells
fn record_row(record: &PropertyRecord) -> Vec<String> {
    vec![
        record.url.to_string(),
        record.name.clone().unwrap_or_default(),
        record.description.clone().unwrap_or_default(),
        record.address.clone().unwrap_or_default(),
        record.price.clone().unwrap_or_default(),
        record.area.clone().unwrap_or_default(),
        if record.characteristics.is_empty() {
            String::new()
        } else {
            record.characteristics.to_json()
        },
        record
            .property_type
            .map(|t| t.to_string())
            .unwrap_or_default(),
        record
            .transaction_type
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default(),
        record.latitude.map(|v| v.to_string()).unwrap_or_default(),
        record.longitude.map(|v| v.to_string()).unwrap_or_default(),
    ]
}
