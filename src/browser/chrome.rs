//! Session configuration and Chrome capability assembly.
//!
//! A [`SessionConfig`] is built once, then consumed by [`SessionConfig::open`]
//! to assemble a capabilities payload and dial the local chromedriver
//! endpoint. The wire protocol itself is thirtyfour's job.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thirtyfour::{Capabilities, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::browser::session::ChromeSession;
use crate::error::{Result, SessionError};

/// Fixed page-load timeout applied right after the session opens.
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Chrome mobile-emulation presets.
///
/// Chrome periodically updates its built-in device list, so a preset may
/// stop being recognized; that surfaces as a capability rejection at
/// session open, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceName {
    #[serde(rename = "Galaxy S5")]
    GalaxyS5,
    #[serde(rename = "Pixel 2")]
    Pixel2,
    #[serde(rename = "iPhone X")]
    IPhoneX,
}

impl DeviceName {
    /// The name Chrome expects in the `mobileEmulation` block.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceName::GalaxyS5 => "Galaxy S5",
            DeviceName::Pixel2 => "Pixel 2",
            DeviceName::IPhoneX => "iPhone X",
        }
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceName {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Galaxy S5" => Ok(DeviceName::GalaxyS5),
            "Pixel 2" => Ok(DeviceName::Pixel2),
            "iPhone X" => Ok(DeviceName::IPhoneX),
            other => Err(SessionError::UnknownDevice(other.to_string())),
        }
    }
}

/// Options for one Chrome session, consumed by [`SessionConfig::open`].
///
/// Every field is optional except the chromedriver port; unset options add
/// nothing to the capabilities payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Port of the locally running chromedriver service.
    pub service_port: u16,
    /// Proxy URL (`protocol://host:port`); `None` adds no proxy argument.
    pub proxy: Option<String>,
    /// Mobile-emulation preset.
    pub device: Option<DeviceName>,
    /// User-agent override; `None` keeps Chrome's default.
    pub user_agent: Option<String>,
    /// Request the performance log (usable to observe network requests).
    pub enable_performance_log: bool,
    /// Run Chrome without a visible window.
    pub headless: bool,
    /// Persistent profile directory (cookies, caches). `None` lets the
    /// driver use a throwaway temp profile.
    pub user_data_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(service_port: u16) -> Self {
        Self {
            service_port,
            proxy: None,
            device: None,
            user_agent: None,
            enable_performance_log: false,
            headless: false,
            user_data_dir: None,
        }
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn device(mut self, device: DeviceName) -> Self {
        self.device = Some(device);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn performance_log(mut self) -> Self {
        self.enable_performance_log = true;
        self
    }

    pub fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Profile directory as an absolute path.
    ///
    /// Relative paths resolve against the current directory; an absolute
    /// path passes through untouched.
    fn resolved_user_data_dir(&self) -> Result<Option<PathBuf>> {
        match &self.user_data_dir {
            None => Ok(None),
            Some(dir) if dir.is_absolute() => Ok(Some(dir.clone())),
            Some(dir) => std::path::absolute(dir)
                .map(Some)
                .map_err(|source| SessionError::UserDataDir {
                    path: dir.clone(),
                    source,
                }),
        }
    }

    /// Chrome launch arguments implied by this configuration.
    ///
    /// The sandbox switches are always present; everything else is
    /// conditional on the matching option.
    fn chrome_args(&self) -> Result<Vec<String>> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-gpu-sandbox".to_string(),
        ];
        if self.headless {
            args.push("--headless".to_string());
        }
        if let Some(user_agent) = &self.user_agent {
            args.push(format!("--user-agent={user_agent}"));
        }
        if let Some(dir) = self.resolved_user_data_dir()? {
            args.push(format!("--user-data-dir={}", dir.display()));
        }
        if let Some(proxy) = &self.proxy {
            args.push(format!("--proxy-server={proxy}"));
        }
        Ok(args)
    }

    /// Assemble the full capabilities payload.
    ///
    /// The `enable-automation` switch is always excluded. A user-agent
    /// override also turns on the network domain of the performance-logging
    /// preferences; the pairing is a convenience, not a protocol
    /// requirement.
    fn build_capabilities(&self) -> Result<Capabilities> {
        let mut chrome = DesiredCapabilities::chrome();
        for arg in self.chrome_args()? {
            chrome.add_arg(&arg)?;
        }

        let mut caps: Capabilities = chrome.into();
        if self.enable_performance_log {
            caps.insert(
                "goog:loggingPrefs".to_string(),
                serde_json::json!({ "performance": "INFO" }),
            );
        }

        let options = caps
            .entry("goog:chromeOptions".to_string())
            .or_insert_with(|| serde_json::json!({}));
        options["excludeSwitches"] = serde_json::json!(["enable-automation"]);
        if self.user_agent.is_some() {
            options["perfLoggingPrefs"] = serde_json::json!({ "enableNetwork": true });
        }
        if let Some(device) = self.device {
            options["mobileEmulation"] = serde_json::json!({ "deviceName": device.as_str() });
        }

        Ok(caps)
    }

    /// Open a session against the local chromedriver endpoint.
    ///
    /// If the session opens but the page-load timeout cannot be set, the
    /// half-constructed session is quit before the error is returned.
    pub async fn open(self) -> Result<ChromeSession> {
        let caps = self.build_capabilities()?;
        let server_url = format!("http://localhost:{}/wd/hub", self.service_port);
        log::debug!("Opening Chrome session at {server_url}");

        let driver = WebDriver::new(&server_url, caps).await?;
        if let Err(e) = driver.set_page_load_timeout(PAGE_LOAD_TIMEOUT).await {
            let _ = driver.quit().await;
            return Err(e.into());
        }

        Ok(ChromeSession::new(driver))
    }
}
