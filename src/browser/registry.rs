use crate::{Result, SmokeError, config::Config, timeouts::secs, utils};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// The single supported browser variant. Anything else fails fast at
/// parse time, before a scenario runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
}

impl std::str::FromStr for BrowserKind {
    type Err = SmokeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "chrome" | "chromium" => Ok(Self::Chrome),
            other => Err(SmokeError::UnsupportedBrowser(other.to_string())),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chrome => write!(f, "chrome"),
        }
    }
}

/// Identity of the logical worker owning a session slot. Concurrent
/// scenarios isolate their browsers by running under distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self("main".to_string())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct DriverSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Arc<Page>,
}

/// Keyed map from worker identity to a live browser session.
///
/// At most one session exists per worker; `start` is idempotent and
/// `stop` is a best-effort no-op when the slot is empty.
pub struct SessionRegistry {
    config: Arc<Config>,
    sessions: RwLock<HashMap<WorkerId, DriverSession>>,
}

impl SessionRegistry {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Launch a browser for the worker unless one is already active.
    pub async fn start(&self, worker: &WorkerId, kind: BrowserKind, headless: bool) -> Result<()> {
        if self.sessions.read().await.contains_key(worker) {
            tracing::debug!("Session already active for worker {}", worker);
            return Ok(());
        }

        tracing::info!(
            "Starting {} session: worker={}, headless={}",
            kind,
            worker,
            headless
        );

        let session = self.launch(headless).await?;

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(worker) {
            // Lost a start race; keep the session that got there first.
            drop(sessions);
            tracing::warn!("Worker {} already holds a session, discarding duplicate", worker);
            Self::shutdown(session).await;
            return Ok(());
        }
        sessions.insert(worker.clone(), session);

        Ok(())
    }

    async fn launch(&self, headless: bool) -> Result<DriverSession> {
        let chrome_path = match self.config.browser.chrome_path {
            Some(ref path) => path.clone(),
            None => utils::find_chrome_executable()?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&chrome_path)
            .port(self.config.browser.port)
            .request_timeout(Duration::from_secs(secs::REQUEST))
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");

        if headless {
            builder = builder.arg("--headless=new").window_size(
                self.config.browser.window_width,
                self.config.browser.window_height,
            );
        } else {
            builder = builder.with_head().arg("--start-maximized");
        }

        let browser_config = builder.build().map_err(SmokeError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SmokeError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SmokeError::LaunchFailed(format!("Failed to open initial page: {}", e)))?;

        Ok(DriverSession {
            browser,
            handler_task,
            page: Arc::new(page),
        })
    }

    /// The worker's page handle, or None if no session was started.
    pub async fn page(&self, worker: &WorkerId) -> Option<Arc<Page>> {
        self.sessions
            .read()
            .await
            .get(worker)
            .map(|session| session.page.clone())
    }

    pub async fn is_active(&self, worker: &WorkerId) -> bool {
        self.sessions.read().await.contains_key(worker)
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Terminate the worker's browser if one exists. Termination
    /// failures are logged and swallowed so teardown always completes.
    pub async fn stop(&self, worker: &WorkerId) {
        let session = self.sessions.write().await.remove(worker);

        match session {
            Some(session) => {
                tracing::info!("Stopping browser session for worker {}", worker);
                Self::shutdown(session).await;
            }
            None => tracing::debug!("No active session for worker {}", worker),
        }
    }

    async fn shutdown(mut session: DriverSession) {
        if let Err(e) = session.browser.close().await {
            tracing::warn!("Browser close failed: {}", e);
        }
        if let Err(e) = session.browser.wait().await {
            tracing::debug!("Browser did not exit cleanly: {}", e);
        }
        session.handler_task.abort();
    }
}
