// Browser harness and per-scenario sessions
//
// A `Harness` owns the Playwright server and one launched browser for the
// whole suite. Each scenario gets its own `Session`: a fresh browser context
// (isolated cookies, so an isolated login) with one page and one dialog
// interceptor. Sessions share nothing mutable and can run concurrently.

use crate::config::{BrowserKind, SuiteConfig};
use crate::dialog::DialogInterceptor;
use crate::error::{Error, Result};
use crate::wait::TimeoutTier;
use playwright_rs::protocol::{BrowserContextOptions, Locator};
use playwright_rs::{Browser, BrowserContext, GotoOptions, LaunchOptions, Page, Playwright, WaitUntil};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Suite-wide browser process
pub struct Harness {
    playwright: Playwright,
    browser: Browser,
    config: Arc<SuiteConfig>,
}

impl Harness {
    /// Starts the Playwright server and launches the configured browser.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the driver cannot be
    /// started, or the browser is not installed.
    pub async fn launch(config: SuiteConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            browser = %config.browser,
            headless = config.headless,
            base_url = %config.base_url,
            "launching browser"
        );

        let playwright = Playwright::launch()
            .await
            .map_err(|e| Error::from(e).context("Failed to start Playwright"))?;
        let browser_type = match config.browser {
            BrowserKind::Chromium => playwright.chromium(),
            BrowserKind::Firefox => playwright.firefox(),
            BrowserKind::Webkit => playwright.webkit(),
        };
        let browser = browser_type
            .launch_with_options(LaunchOptions::new().headless(config.headless))
            .await
            .map_err(|e| Error::from(e).context(format!("Failed to launch {}", config.browser)))?;

        Ok(Self {
            playwright,
            browser,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Opens an isolated context and page for one scenario.
    pub async fn new_session(&self) -> Result<Session> {
        let mut options = BrowserContextOptions::builder();
        if let Some(locale) = &self.config.locale {
            options = options.locale(locale.clone());
        }
        let context = self.browser.new_context_with_options(options.build()).await?;
        let page = context.new_page().await?;
        Session::attach(context, page, Arc::clone(&self.config)).await
    }

    /// Closes the browser and shuts the driver down.
    pub async fn close(self) -> Result<()> {
        tracing::info!("closing browser");
        self.browser.close().await?;
        self.playwright.shutdown().await?;
        Ok(())
    }
}

/// One scenario's isolated browser context
pub struct Session {
    id: u64,
    context: BrowserContext,
    page: Page,
    dialogs: DialogInterceptor,
    config: Arc<SuiteConfig>,
}

impl Session {
    /// Wraps an already-open context and page.
    ///
    /// Installs the session's dialog interceptor on `page`; the page must not
    /// have other dialog handlers.
    pub async fn attach(context: BrowserContext, page: Page, config: Arc<SuiteConfig>) -> Result<Self> {
        let dialogs = DialogInterceptor::install(&page).await?;
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, "session opened");
        Ok(Self {
            id,
            context,
            page,
            dialogs,
            config,
        })
    }

    /// Identifier used in log events
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn dialogs(&self) -> &DialogInterceptor {
        &self.dialogs
    }

    pub fn budget(&self, tier: TimeoutTier) -> Duration {
        self.config.budget(tier)
    }

    pub async fn locator(&self, selector: &str) -> Locator {
        self.page.locator(selector).await
    }

    pub fn current_url(&self) -> String {
        self.page.url()
    }

    /// Loads `path` relative to the base URL and waits for the load event.
    ///
    /// Bounded by the long tier; a driver timeout surfaces as
    /// [`Error::NavigationTimeout`].
    pub async fn goto(&self, path: &str) -> Result<()> {
        let url = self.config.url_for(path)?;
        let budget = self.budget(TimeoutTier::Long);
        tracing::debug!(session = self.id, %url, "navigating");

        let options = GotoOptions::new()
            .timeout(budget)
            .wait_until(WaitUntil::Load);
        match self.page.goto(&url, Some(options)).await {
            Ok(_) => Ok(()),
            Err(e) if is_driver_timeout(&e) => Err(Error::NavigationTimeout {
                pattern: url,
                last_url: self.page.url(),
                budget,
            }),
            Err(e) => Err(Error::from(e).context(format!("Failed to load {url}"))),
        }
    }

    /// Closes the context and everything in it.
    pub async fn close(self) -> Result<()> {
        let stray = self.dialogs.stray_dialogs();
        if stray > 0 {
            tracing::warn!(session = self.id, stray, "session saw dialogs nobody armed for");
        }
        self.context.close().await?;
        tracing::debug!(session = self.id, "session closed");
        Ok(())
    }
}

/// True for driver errors reporting an exceeded timeout.
///
/// The Playwright server reports its own timeouts as protocol errors whose
/// message reads `Timeout <n>ms exceeded` (optionally prefixed by the API
/// call, e.g. `page.goto: `).
fn is_driver_timeout(err: &playwright_rs::Error) -> bool {
    match err {
        playwright_rs::Error::Timeout(_) | playwright_rs::Error::NavigationTimeout { .. } => true,
        playwright_rs::Error::ProtocolError(message) => {
            let message = message.trim_start();
            message.starts_with("Timeout")
                || message.contains("TimeoutError")
                || (message.contains("Timeout ") && message.contains("exceeded"))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_side_timeouts_are_recognized() {
        let server = playwright_rs::Error::ProtocolError(
            "Timeout 300ms exceeded.\n=========================== logs ===========================".into(),
        );
        assert!(is_driver_timeout(&server));

        let prefixed = playwright_rs::Error::ProtocolError(
            "page.goto: Timeout 5000ms exceeded. \n TimeoutError: page.goto".into(),
        );
        assert!(is_driver_timeout(&prefixed));

        assert!(is_driver_timeout(&playwright_rs::Error::NavigationTimeout {
            url: "http://10.255.255.1:9999/".into(),
            duration_ms: 300,
        }));
        assert!(is_driver_timeout(&playwright_rs::Error::Timeout("wait".into())));
    }

    #[test]
    fn test_other_protocol_errors_are_not_timeouts() {
        let refused = playwright_rs::Error::ProtocolError(
            "net::ERR_CONNECTION_REFUSED at http://127.0.0.1:1/".into(),
        );
        assert!(!is_driver_timeout(&refused));
    }
}
