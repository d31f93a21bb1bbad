use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepgraphError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("unknown package '{0}'")]
    UnknownPackage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DepgraphError>;
