//! Error types for Selph

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("module fault: {name} - {message}")]
    Module { name: String, message: String },

    #[error("module busy: {0}")]
    ModuleBusy(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn module(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Module {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
