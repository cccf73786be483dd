use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn an input file into a dataset. The previous dataset stays active.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a readable spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("the workbook has no worksheet")]
    NoWorksheet,

    #[error("the file has no header row")]
    MissingHeader,

    #[error("not a readable CSV file: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-row photo failure. Rendered as a placeholder, never propagated further.
#[derive(Error, Debug)]
pub enum ImageFetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("home directory not found")]
    NoHomeDir,

    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
