//! Chrome WebDriver session configuration and lifecycle.
//!
//! Translates a small set of session options into a Chrome capabilities
//! payload, opens a session against a locally running chromedriver
//! service, and wraps the result in a handle with two conveniences:
//! window-set normalization and best-effort teardown. An optional
//! launcher starts the chromedriver process itself.
//!
//! The WebDriver wire protocol and browser control are delegated to
//! [`thirtyfour`]; this crate only decides what to ask for.

pub mod browser;
pub mod error;
pub mod service;

pub use browser::chrome::{DeviceName, SessionConfig};
pub use browser::session::{ChromeSession, SessionOps};
pub use error::{Result, SessionError};
pub use service::DriverService;
