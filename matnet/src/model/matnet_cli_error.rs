use matnet_core::{model::network::NetworkError, validation::ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatnetCliError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("failure writing output: {0}")]
    OutputError(String),
    #[error("invalid network file: {0}")]
    SnapshotError(String),
    #[error("failure building network: {source}")]
    NetworkError {
        #[from]
        source: NetworkError,
    },
    #[error("failure validating network: {source}")]
    ValidationError {
        #[from]
        source: ValidationError,
    },
    #[error("failure reading file: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
    #[error("failure writing CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
}
