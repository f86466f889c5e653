use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrewlsError {
    #[error(
        "Homebrew 'brew' command not found in PATH and no Cellar exists under {}. \
         Please ensure Homebrew is installed and configured correctly.",
        .0.display()
    )]
    HomebrewNotFound(PathBuf),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BrewlsError>;
