use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot resolve user data dir {path:?} to an absolute path: {source}")]
    UserDataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown emulation device: {0}")]
    UnknownDevice(String),

    #[error("Failed to start chromedriver: {0}")]
    ServiceStart(#[source] std::io::Error),

    #[error("chromedriver did not accept connections on port {0}")]
    ServiceNotReady(u16),

    #[error("No session held (already released?)")]
    NoSession,

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
