// Suite configuration
//
// Where the application under test lives, which browser drives it, and the
// budgets for each timeout tier. Defaults match the board application's local
// development setup; environment variables override them for CI.

use crate::error::{Error, Result};
use crate::wait::TimeoutTier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default location of the application under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Environment variable overriding [`SuiteConfig::base_url`]
pub const ENV_BASE_URL: &str = "BOARD_E2E_BASE_URL";
/// Environment variable overriding [`SuiteConfig::browser`]
pub const ENV_BROWSER: &str = "BOARD_E2E_BROWSER";
/// Environment variable overriding [`SuiteConfig::headless`]
pub const ENV_HEADLESS: &str = "BOARD_E2E_HEADLESS";
/// Environment variable scaling every timeout tier (e.g. `2.5` on slow CI)
pub const ENV_TIMEOUT_SCALE: &str = "BOARD_E2E_TIMEOUT_SCALE";

/// Browser engine used for every session of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" | "safari" => Ok(BrowserKind::Webkit),
            other => Err(Error::Config(format!(
                "unknown browser '{other}' (expected chromium, firefox or webkit)"
            ))),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Millisecond budgets for the three timeout tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutBudgets {
    /// Optional affordances that may already be in the desired state
    pub short_ms: u64,
    /// Local DOM-state changes and dialog resolution
    pub standard_ms: u64,
    /// Full navigations
    pub long_ms: u64,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            short_ms: 2_000,
            standard_ms: 10_000,
            long_ms: 30_000,
        }
    }
}

impl TimeoutBudgets {
    /// Multiplies every tier by `factor`, keeping at least one millisecond.
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |ms: u64| ((ms as f64 * factor).round() as u64).max(1);
        Self {
            short_ms: scale(self.short_ms),
            standard_ms: scale(self.standard_ms),
            long_ms: scale(self.long_ms),
        }
    }
}

/// Configuration shared by every session of a suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub base_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    /// Locale applied to every browser context (labels are Korean)
    pub locale: Option<String>,
    pub timeouts: TimeoutBudgets,
    /// Interval between polls of element state or URL
    pub poll_interval_ms: u64,
    /// How long resource activity must stay quiet to count as idle
    pub network_idle_ms: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserKind::default(),
            headless: true,
            locale: Some("ko-KR".to_string()),
            timeouts: TimeoutBudgets::default(),
            poll_interval_ms: 100,
            network_idle_ms: 500,
        }
    }
}

impl SuiteConfig {
    /// Creates a configuration pointing at `base_url` with default budgets.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with the `BOARD_E2E_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file '{}': {e}", path.display()))
        })?;
        let config: SuiteConfig = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("invalid config file '{}': {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.browser = browser.parse()?;
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            self.headless = match headless.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(Error::Config(format!(
                        "{ENV_HEADLESS} must be true or false, got '{other}'"
                    )));
                }
            };
        }
        if let Some(scale) = lookup(ENV_TIMEOUT_SCALE) {
            let factor: f64 = scale.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_TIMEOUT_SCALE} must be a number, got '{scale}'"))
            })?;
            if !(factor.is_finite() && factor > 0.0) {
                return Err(Error::Config(format!(
                    "{ENV_TIMEOUT_SCALE} must be positive, got {factor}"
                )));
            }
            self.timeouts = self.timeouts.scaled(factor);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutBudgets) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Checks that the base URL parses and the tiers are ordered.
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL '{}' cannot be used as a base",
                self.base_url
            )));
        }
        let t = &self.timeouts;
        if !(t.short_ms <= t.standard_ms && t.standard_ms <= t.long_ms) {
            return Err(Error::Config(format!(
                "timeout tiers must satisfy short <= standard <= long (got {} / {} / {})",
                t.short_ms, t.standard_ms, t.long_ms
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll interval must be non-zero".into()));
        }
        Ok(())
    }

    /// Budget for a timeout tier.
    pub fn budget(&self, tier: TimeoutTier) -> Duration {
        let ms = match tier {
            TimeoutTier::Short => self.timeouts.short_ms,
            TimeoutTier::Standard => self.timeouts.standard_ms,
            TimeoutTier::Long => self.timeouts.long_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    /// Resolves an application path (`/posts/new`) against the base URL.
    ///
    /// Absolute URLs are returned unchanged.
    pub fn url_for(&self, path: &str) -> Result<String> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(path)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_local_setup() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.browser, BrowserKind::Chromium);
        assert_eq!(config.budget(TimeoutTier::Short), Duration::from_secs(2));
        assert_eq!(config.budget(TimeoutTier::Standard), Duration::from_secs(10));
        assert_eq!(config.budget(TimeoutTier::Long), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn test_overlay_from_environment() {
        let config = SuiteConfig::default()
            .overlay(env(&[
                (ENV_BASE_URL, "http://127.0.0.1:9000"),
                (ENV_BROWSER, "Firefox"),
                (ENV_HEADLESS, "false"),
                (ENV_TIMEOUT_SCALE, "2"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.browser, BrowserKind::Firefox);
        assert!(!config.headless);
        assert_eq!(config.timeouts.standard_ms, 20_000);
        assert_eq!(config.timeouts.long_ms, 60_000);
    }

    #[test]
    fn test_overlay_rejects_bad_values() {
        let err = SuiteConfig::default()
            .overlay(env(&[(ENV_BROWSER, "netscape")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = SuiteConfig::default()
            .overlay(env(&[(ENV_TIMEOUT_SCALE, "-1")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = SuiteConfig::default()
            .overlay(env(&[(ENV_HEADLESS, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_tier_ordering() {
        let config = SuiteConfig::default().with_timeouts(TimeoutBudgets {
            short_ms: 5_000,
            standard_ms: 1_000,
            long_ms: 30_000,
        });
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_url_for_joins_paths() {
        let config = SuiteConfig::new("http://127.0.0.1:4000");
        assert_eq!(
            config.url_for("/posts/new").unwrap(),
            "http://127.0.0.1:4000/posts/new"
        );
        assert_eq!(
            config.url_for("/?categoryId=3").unwrap(),
            "http://127.0.0.1:4000/?categoryId=3"
        );
        assert_eq!(
            config.url_for("http://example.com/login").unwrap(),
            "http://example.com/login"
        );
    }

    #[test]
    fn test_json_file_uses_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.json");
        std::fs::write(
            &path,
            r#"{ "base_url": "http://10.0.0.5:8081", "browser": "webkit" }"#,
        )
        .unwrap();

        let config = SuiteConfig::from_json_file(&path).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8081");
        assert_eq!(config.browser, BrowserKind::Webkit);
        assert_eq!(config.timeouts, TimeoutBudgets::default());
        assert_eq!(config.locale.as_deref(), Some("ko-KR"));
    }
}
