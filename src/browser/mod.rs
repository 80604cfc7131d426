pub mod chrome;
pub mod session;

pub use chrome::{DeviceName, SessionConfig};
pub use session::{ChromeSession, SessionOps};
