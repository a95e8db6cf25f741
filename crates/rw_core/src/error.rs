use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("results file not found: {}", .path.display())]
    ResultsFileNotFound { path: PathBuf },

    #[error("could not parse results file {id}: {source}")]
    ResultsParse { id: String, source: serde_json::Error },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown car model in race configuration: {car_model}")]
    UnknownCarModel { car_model: String },

    #[error("tyre {tyre} is not a legal tyre for {car_model}")]
    TyreNotFound { car_model: String, tyre: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
