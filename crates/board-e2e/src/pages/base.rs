// Shared page-object behavior
//
// Every page object composes a `BasePage` borrowed from the scenario's
// session. Actions run with the standard tier as their actionability budget;
// visibility and URL checks poll with the tier the caller picks.

use crate::config::SuiteConfig;
use crate::error::Result;
use crate::selectors;
use crate::session::Session;
use crate::wait::{self, TimeoutTier, UrlPattern, Visibility};
use playwright_rs::protocol::{CheckOptions, ClickOptions, FillOptions, Locator};

/// Navigation, waits and text assertions shared by all page objects
#[derive(Clone, Copy)]
pub struct BasePage<'s> {
    session: &'s Session,
}

impl<'s> BasePage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn config(&self) -> &'s SuiteConfig {
        self.session.config()
    }

    /// Loads `path` and waits for the network to go quiet.
    pub async fn navigate(&self, path: &str) -> Result<()> {
        self.session.goto(path).await?;
        self.wait_for_idle().await
    }

    pub async fn wait_for_idle(&self) -> Result<()> {
        wait::wait_for_network_idle(self.session.page(), TimeoutTier::Long, self.config()).await
    }

    pub fn current_url(&self) -> String {
        self.session.current_url()
    }

    /// First element matching `selector`. Page objects act on single
    /// elements; strict-mode violations are avoided by construction.
    pub async fn first(&self, selector: &str) -> Locator {
        self.session.locator(selector).await.first()
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        let target = self.first(selector).await;
        target.click(Some(self.click_options())).await?;
        Ok(())
    }

    /// Clears the field and types `value` into it.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let target = self.first(selector).await;
        target.clear(Some(self.fill_options())).await?;
        target.fill(value, Some(self.fill_options())).await?;
        Ok(())
    }

    pub async fn check(&self, selector: &str) -> Result<()> {
        let target = self.first(selector).await;
        let options = CheckOptions::builder().timeout(self.action_timeout()).build();
        target.check(Some(options)).await?;
        Ok(())
    }

    /// Waits for the first match of `selector` to become visible.
    pub async fn expect_visible(&self, selector: &str, tier: TimeoutTier) -> Result<()> {
        self.expect(selector, Visibility::Visible, tier, selector).await
    }

    /// Waits until the first match of `selector` is hidden or absent.
    pub async fn expect_hidden(&self, selector: &str, tier: TimeoutTier) -> Result<()> {
        self.expect(selector, Visibility::Hidden, tier, selector).await
    }

    /// Waits for text containing `text` (case-insensitive) to be visible.
    pub async fn assert_text_visible(&self, text: &str, tier: TimeoutTier) -> Result<()> {
        self.expect(&selectors::text(text), Visibility::Visible, tier, text).await
    }

    pub async fn assert_text_hidden(&self, text: &str, tier: TimeoutTier) -> Result<()> {
        self.expect(&selectors::text(text), Visibility::Hidden, tier, text).await
    }

    /// Waits for text matching the regular expression `pattern`.
    pub async fn assert_text_matches(&self, pattern: &str, tier: TimeoutTier) -> Result<()> {
        regex::Regex::new(pattern)?;
        self.expect(&selectors::text_matching(pattern), Visibility::Visible, tier, pattern)
            .await
    }

    /// Waits until the URL matches `pattern`; returns the matching URL.
    pub async fn wait_for_url(&self, pattern: &UrlPattern, tier: TimeoutTier) -> Result<String> {
        wait::wait_for_url(self.session.page(), pattern, tier, self.config()).await
    }

    /// Standard-tier URL assertion.
    pub async fn assert_url_matches(&self, pattern: &UrlPattern) -> Result<String> {
        self.wait_for_url(pattern, TimeoutTier::Standard).await
    }

    /// [`Self::assert_url_matches`] with a glob such as `**/login`.
    pub async fn assert_url_glob(&self, glob: &str) -> Result<String> {
        self.assert_url_matches(&UrlPattern::glob(glob)?).await
    }

    async fn expect(
        &self,
        selector: &str,
        expected: Visibility,
        tier: TimeoutTier,
        target: &str,
    ) -> Result<()> {
        let locator = self.first(selector).await;
        wait::wait_for_visibility(&locator, expected, tier, self.config(), target).await
    }

    fn action_timeout(&self) -> f64 {
        self.config().budget(TimeoutTier::Standard).as_millis() as f64
    }

    fn click_options(&self) -> ClickOptions {
        ClickOptions::builder().timeout(self.action_timeout()).build()
    }

    fn fill_options(&self) -> FillOptions {
        FillOptions::builder().timeout(self.action_timeout()).build()
    }
}
