//! Error types for the rehab coach.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Speech playback error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
