//! Session handle and window-set normalization.
//!
//! The handle does not embed the client type; it delegates through the
//! [`SessionOps`] seam so window cleanup can be exercised without a
//! browser. A handle owns at most one remote session for its lifetime.

use async_trait::async_trait;
use thirtyfour::{WebDriver, WindowHandle};

use crate::error::{Result, SessionError};

/// The capability set the session handle needs from a remote session.
///
/// Implemented for [`thirtyfour::WebDriver`]. All calls are blocking
/// round-trips to the driver service.
#[async_trait]
pub trait SessionOps: Send + Sync {
    /// Handle of the window commands currently target.
    async fn active_window(&self) -> Result<WindowHandle>;

    /// Handles of every open window.
    async fn list_windows(&self) -> Result<Vec<WindowHandle>>;

    /// Close the given window. Focus may land elsewhere afterwards.
    async fn close_window(&self, window: &WindowHandle) -> Result<()>;

    /// Make the given window the target of subsequent commands.
    async fn focus_window(&self, window: &WindowHandle) -> Result<()>;

    /// Close whichever window is currently active.
    async fn close_active_window(&self) -> Result<()>;

    /// Terminate the remote session and the browser with it.
    async fn quit(&self) -> Result<()>;
}

#[async_trait]
impl SessionOps for WebDriver {
    async fn active_window(&self) -> Result<WindowHandle> {
        Ok(self.window().await?)
    }

    async fn list_windows(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.windows().await?)
    }

    async fn close_window(&self, window: &WindowHandle) -> Result<()> {
        // The wire protocol only closes the active window, so target it first.
        self.switch_to_window(window.clone()).await?;
        Ok(self.handle.close_window().await?)
    }

    async fn focus_window(&self, window: &WindowHandle) -> Result<()> {
        Ok(self.switch_to_window(window.clone()).await?)
    }

    async fn close_active_window(&self) -> Result<()> {
        Ok(self.handle.close_window().await?)
    }

    async fn quit(&self) -> Result<()> {
        Ok(WebDriver::quit(self.clone()).await?)
    }
}

/// Handle to one open Chrome session.
///
/// Created by [`crate::SessionConfig::open`]. There is no automatic
/// cleanup: call [`ChromeSession::release`] when done.
pub struct ChromeSession<S: SessionOps = WebDriver> {
    session: Option<S>,
}

impl<S: SessionOps> ChromeSession<S> {
    /// Wrap an already-opened session.
    ///
    /// [`crate::SessionConfig::open`] is the usual entry point; this is
    /// the seam for handing in a different [`SessionOps`] implementation.
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn session(&self) -> Result<&S> {
        self.session.as_ref().ok_or(SessionError::NoSession)
    }

    /// Close every window except the active one, leaving it focused.
    ///
    /// Useful after a long automation run that opened tabs in places we
    /// no longer know about. Stops at the first close failure; windows
    /// not yet visited stay open. A single open window is a no-op.
    pub async fn close_other_windows(&self) -> Result<()> {
        let session = self.session()?;
        let active = session.active_window().await?;
        let mut closed_any = false;
        for window in session.list_windows().await? {
            if window != active {
                session.close_window(&window).await?;
                closed_any = true;
            }
        }
        if closed_any {
            session.focus_window(&active).await?;
        }
        Ok(())
    }

    /// Release the session: close the active window, then quit.
    ///
    /// Best-effort: errors from both steps are discarded.
    /// Calling this on an already-released handle does nothing.
    pub async fn release(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = session.close_active_window().await;
            let _ = session.quit().await;
        }
    }
}

impl ChromeSession<WebDriver> {
    /// The underlying WebDriver client, for page-level work.
    ///
    /// Fails once the session has been released.
    pub fn driver(&self) -> Result<&WebDriver> {
        self.session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn handle(name: &str) -> WindowHandle {
        WindowHandle::from(name.to_string())
    }

    /// In-memory stand-in for a remote session.
    struct FakeSession {
        active: WindowHandle,
        windows: Mutex<Vec<WindowHandle>>,
        focused: Mutex<Option<WindowHandle>>,
        // Window whose close call should fail, if any.
        fail_closing: Option<WindowHandle>,
        quit_calls: Arc<Mutex<usize>>,
        fail_teardown: bool,
    }

    impl FakeSession {
        fn with_windows(active: &str, windows: &[&str]) -> Self {
            Self {
                active: handle(active),
                windows: Mutex::new(windows.iter().map(|w| handle(w)).collect()),
                focused: Mutex::new(None),
                fail_closing: None,
                quit_calls: Arc::new(Mutex::new(0)),
                fail_teardown: false,
            }
        }
    }

    #[async_trait]
    impl SessionOps for FakeSession {
        async fn active_window(&self) -> Result<WindowHandle> {
            Ok(self.active.clone())
        }

        async fn list_windows(&self) -> Result<Vec<WindowHandle>> {
            Ok(self.windows.lock().unwrap().clone())
        }

        async fn close_window(&self, window: &WindowHandle) -> Result<()> {
            if self.fail_closing.as_ref() == Some(window) {
                // Any error will do here.
                return Err(SessionError::NoSession);
            }
            self.windows.lock().unwrap().retain(|w| w != window);
            Ok(())
        }

        async fn focus_window(&self, window: &WindowHandle) -> Result<()> {
            *self.focused.lock().unwrap() = Some(window.clone());
            Ok(())
        }

        async fn close_active_window(&self) -> Result<()> {
            if self.fail_teardown {
                return Err(SessionError::NoSession);
            }
            let active = self.active.clone();
            self.windows.lock().unwrap().retain(|w| w != &active);
            Ok(())
        }

        async fn quit(&self) -> Result<()> {
            *self.quit_calls.lock().unwrap() += 1;
            if self.fail_teardown {
                return Err(SessionError::NoSession);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn close_other_windows_keeps_only_active() {
        let fake = FakeSession::with_windows("w2", &["w1", "w2", "w3", "w4"]);
        let session = ChromeSession::new(fake);

        session.close_other_windows().await.unwrap();

        let fake = session.session.as_ref().unwrap();
        assert_eq!(*fake.windows.lock().unwrap(), vec![handle("w2")]);
        assert_eq!(*fake.focused.lock().unwrap(), Some(handle("w2")));
    }

    #[tokio::test]
    async fn close_other_windows_single_window_is_noop() {
        let fake = FakeSession::with_windows("w1", &["w1"]);
        let session = ChromeSession::new(fake);

        session.close_other_windows().await.unwrap();

        let fake = session.session.as_ref().unwrap();
        assert_eq!(*fake.windows.lock().unwrap(), vec![handle("w1")]);
        // Nothing was closed, so focus was never touched.
        assert_eq!(*fake.focused.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn close_other_windows_stops_at_first_error() {
        let mut fake = FakeSession::with_windows("w1", &["w1", "w2", "w3"]);
        fake.fail_closing = Some(handle("w2"));
        let session = ChromeSession::new(fake);

        assert!(session.close_other_windows().await.is_err());

        // w2 failed to close and w3 was never visited.
        let fake = session.session.as_ref().unwrap();
        assert_eq!(
            *fake.windows.lock().unwrap(),
            vec![handle("w1"), handle("w2"), handle("w3")]
        );
    }

    #[tokio::test]
    async fn close_other_windows_after_release_reports_no_session() {
        let mut session = ChromeSession::new(FakeSession::with_windows("w1", &["w1"]));
        session.release().await;

        assert!(matches!(
            session.close_other_windows().await,
            Err(SessionError::NoSession)
        ));
    }

    #[tokio::test]
    async fn release_without_session_is_fine() {
        let mut session: ChromeSession<FakeSession> = ChromeSession { session: None };
        session.release().await;
    }

    #[tokio::test]
    async fn release_twice_quits_once() {
        let fake = FakeSession::with_windows("w1", &["w1"]);
        let quit_calls = fake.quit_calls.clone();
        let mut session = ChromeSession::new(fake);
        session.release().await;
        session.release().await;
        assert_eq!(*quit_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn release_swallows_teardown_errors() {
        let mut fake = FakeSession::with_windows("w1", &["w1"]);
        fake.fail_teardown = true;
        let mut session = ChromeSession::new(fake);
        session.release().await;
        assert!(session.session.is_none());
    }
}
