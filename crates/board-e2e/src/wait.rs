// Synchronization primitives
//
// Bounded waits for element visibility, URL patterns and network quiescence.
// Every wait polls at the configured interval until its tier budget is spent,
// then fails with the matching timeout error. There is no retry beyond the
// budget.

use crate::config::SuiteConfig;
use crate::error::{Error, Result};
use playwright_rs::protocol::{Locator, Page};
use regex::Regex;
use std::future::Future;
use std::time::{Duration, Instant};

/// Timeout tiers. Budgets come from [`SuiteConfig::budget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeoutTier {
    /// Optional affordances (≈2s), e.g. a dropdown that may already be open
    Short,
    /// Local DOM-state changes and dialog resolution (≈10s)
    Standard,
    /// Full navigations (≈30s)
    Long,
}

impl std::fmt::Display for TimeoutTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimeoutTier::Short => "short",
            TimeoutTier::Standard => "standard",
            TimeoutTier::Long => "long",
        })
    }
}

/// Target state of a visibility wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
        })
    }
}

/// URL matcher used by navigation waits.
///
/// Globs follow Playwright's `waitForURL` convention: `**` spans any
/// characters, `*` spans anything but `/`, and the whole URL must match.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    regex: Regex,
}

impl UrlPattern {
    /// Glob such as `**/login` or `**/posts/**`.
    pub fn glob(glob: &str) -> Result<Self> {
        let mut expr = String::from("^");
        let mut chars = glob.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    expr.push_str(".*");
                }
                '*' => expr.push_str("[^/]*"),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');
        Ok(Self {
            source: glob.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    /// Unanchored regular expression, searched anywhere in the URL.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self {
            source: format!("/{pattern}/"),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Polls `check` until it yields `true` or `budget` elapses.
///
/// Returns `Ok(false)` on timeout so callers can raise the specific error.
/// The check always runs at least once, even with a zero budget.
pub(crate) async fn poll_until<F, Fut>(
    budget: Duration,
    interval: Duration,
    mut check: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    loop {
        if check().await? {
            return Ok(true);
        }
        if start.elapsed() >= budget {
            return Ok(false);
        }
        tokio::time::sleep(interval).await;
    }
}

/// Waits until `locator` reaches the `expected` visibility.
///
/// `target` names the thing being waited for in the error message.
pub async fn wait_for_visibility(
    locator: &Locator,
    expected: Visibility,
    tier: TimeoutTier,
    config: &SuiteConfig,
    target: &str,
) -> Result<()> {
    let budget = config.budget(tier);
    tracing::debug!(target, %expected, %tier, "waiting for element state");

    let reached = poll_until(budget, config.poll_interval(), || async {
        let visible = locator.is_visible().await?;
        Ok(match expected {
            Visibility::Visible => visible,
            Visibility::Hidden => !visible,
        })
    })
    .await?;

    if reached {
        Ok(())
    } else {
        Err(Error::VisibilityTimeout {
            target: target.to_string(),
            expected,
            tier,
            budget,
        })
    }
}

pub async fn wait_for_visible(
    locator: &Locator,
    tier: TimeoutTier,
    config: &SuiteConfig,
) -> Result<()> {
    wait_for_visibility(locator, Visibility::Visible, tier, config, locator.selector()).await
}

pub async fn wait_for_hidden(
    locator: &Locator,
    tier: TimeoutTier,
    config: &SuiteConfig,
) -> Result<()> {
    wait_for_visibility(locator, Visibility::Hidden, tier, config, locator.selector()).await
}

/// Waits until the page URL matches `pattern`; returns the matching URL.
pub async fn wait_for_url(
    page: &Page,
    pattern: &UrlPattern,
    tier: TimeoutTier,
    config: &SuiteConfig,
) -> Result<String> {
    let budget = config.budget(tier);
    tracing::debug!(pattern = pattern.as_str(), %tier, "waiting for URL");

    let reached = poll_until(budget, config.poll_interval(), || async {
        Ok(pattern.matches(&page.url()))
    })
    .await?;

    let last_url = page.url();
    if reached {
        Ok(last_url)
    } else {
        Err(Error::NavigationTimeout {
            pattern: pattern.as_str().to_string(),
            last_url,
            budget,
        })
    }
}

const IDLE_SNAPSHOT: &str =
    "document.readyState + '|' + performance.getEntriesByType('resource').length";

/// Snapshot of the document's load progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadSnapshot {
    pub complete: bool,
    pub resources: u64,
}

impl LoadSnapshot {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let (state, count) = raw.trim().trim_matches('"').split_once('|')?;
        Some(Self {
            complete: state == "complete",
            resources: count.parse().ok()?,
        })
    }
}

/// Tracks how long the resource count has stayed unchanged.
#[derive(Debug, Default)]
pub(crate) struct IdleTracker {
    last: Option<(u64, Instant)>,
}

impl IdleTracker {
    /// Records a snapshot; true once the page is loaded and quiet for `quiet`.
    pub(crate) fn observe(&mut self, snapshot: LoadSnapshot, now: Instant, quiet: Duration) -> bool {
        if !snapshot.complete {
            self.last = None;
            return false;
        }
        match self.last {
            Some((count, since)) if count == snapshot.resources => now.duration_since(since) >= quiet,
            _ => {
                self.last = Some((snapshot.resources, now));
                false
            }
        }
    }
}

/// Waits until the document has loaded and no new resources were fetched for
/// the configured idle window.
pub async fn wait_for_network_idle(
    page: &Page,
    tier: TimeoutTier,
    config: &SuiteConfig,
) -> Result<()> {
    let budget = config.budget(tier);
    let quiet = config.network_idle();
    let mut tracker = IdleTracker::default();
    tracing::debug!(%tier, quiet_ms = quiet.as_millis() as u64, "waiting for network idle");

    let start = Instant::now();
    loop {
        let raw = page.evaluate_value(IDLE_SNAPSHOT).await?;
        if let Some(snapshot) = LoadSnapshot::parse(&raw) {
            if tracker.observe(snapshot, Instant::now(), quiet) {
                return Ok(());
            }
        }
        if start.elapsed() >= budget {
            return Err(Error::NavigationTimeout {
                pattern: "network idle".to_string(),
                last_url: page.url(),
                budget,
            });
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}
