//! chromedriver process lifecycle.
//!
//! Starting the driver binary is a convenience for callers, not a
//! protocol component: the service is an ordinary child process bound to
//! a port, and the caller owns stopping it.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::Instant;

use crate::error::{Result, SessionError};

const READY_TIMEOUT: Duration = Duration::from_secs(10);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a locally started chromedriver process.
///
/// There is no automatic cleanup: call [`DriverService::stop`] when done,
/// or the process outlives the program.
pub struct DriverService {
    child: Child,
    port: u16,
}

impl DriverService {
    /// Start the chromedriver binary at `driver_path`, bound to `port` and
    /// serving under `/wd/hub`, with its output suppressed.
    ///
    /// Blocks until the service accepts TCP connections, up to a bounded
    /// wait; a service that never comes up (or exits early) is killed and
    /// reported as an error.
    pub async fn start(driver_path: impl AsRef<Path>, port: u16) -> Result<Self> {
        let driver_path = driver_path.as_ref();
        log::debug!("Starting chromedriver {:?} on port {}", driver_path, port);

        let child = Command::new(driver_path)
            .arg(format!("--port={port}"))
            .arg("--url-base=/wd/hub")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(SessionError::ServiceStart)?;

        let mut service = Self { child, port };
        if let Err(e) = service.wait_ready().await {
            let _ = service.child.kill().await;
            return Err(e);
        }
        log::debug!("chromedriver ready at {}", service.url());
        Ok(service)
    }

    async fn wait_ready(&mut self) -> Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        loop {
            if TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return Ok(());
            }
            // A dead child will never start listening.
            if self.child.try_wait()?.is_some() || Instant::now() >= deadline {
                return Err(SessionError::ServiceNotReady(self.port));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Endpoint the service listens on, as dialed by the session builder.
    pub fn url(&self) -> String {
        format!("http://localhost:{}/wd/hub", self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Kill the chromedriver process.
    pub async fn stop(mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }
}
