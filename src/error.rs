use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MrfError {
    #[error("malformed input row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("invalid species name: {0:?}")]
    InvalidSpecies(String),

    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("config file not found at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("missing Copernicus Marine credentials")]
    #[diagnostic(help(
        "set COPERNICUSMARINE_SERVICE_USERNAME and COPERNICUSMARINE_SERVICE_PASSWORD or add them to mrf.json"
    ))]
    MissingCredentials,

    #[error("no Copernicus Marine point-subset endpoint configured")]
    #[diagnostic(help(
        "set cmems.base_url in mrf.json to a gateway serving GET <base_url>/point"
    ))]
    MissingCmemsEndpoint,

    #[error("CMEMS request failed: {0}")]
    CmemsHttp(String),

    #[error("CMEMS returned status {status}: {message}")]
    CmemsStatus { status: u16, message: String },

    #[error("GBIF request failed: {0}")]
    GbifHttp(String),

    #[error("GBIF returned status {status}: {message}")]
    GbifStatus { status: u16, message: String },

    #[error("failed to read input table {path}: {message}")]
    TableRead { path: String, message: String },

    #[error("failed to write output table {path}: {message}")]
    TableWrite { path: String, message: String },
}
