//! Export to tab-separated CSV and PNG bar charts.
//!
//! Two output formats for a market snapshot:
//! - **CSV**: the cache file's JSON array flattened to one row per record
//! - **PNG**: a bar chart of one numeric metric per currency

pub mod csv;
pub mod plot;

pub use self::csv::{export_csv, export_tsv};
pub use self::plot::render_bar_chart;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("unexpected data shape: {0}")]
    Shape(String),

    #[error("no values to plot")]
    EmptySeries,

    #[error("chart rendering failed: {0}")]
    Chart(String),
}
