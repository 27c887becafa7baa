// Error types for board-e2e
//
// Every variant is fatal to the scenario step that raised it. Nothing in this
// crate catches and retries these; they propagate to the test runner.

use crate::resolver::EntityKind;
use crate::wait::{TimeoutTier, Visibility};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for board-e2e operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by page objects and synchronization primitives
#[derive(Debug, Error)]
pub enum Error {
    /// Expected content never reached the expected visibility within its tier.
    #[error(
        "Visibility timeout: '{target}' did not become {expected} within {tier} tier ({}ms)",
        .budget.as_millis()
    )]
    VisibilityTimeout {
        target: String,
        expected: Visibility,
        tier: TimeoutTier,
        budget: Duration,
    },

    /// Identifier recovery failed: no container carried the label, or its
    /// `id` attribute did not follow the markup convention.
    #[error("{kind} not found for label '{label}': {reason}")]
    EntityNotFound {
        kind: EntityKind,
        label: String,
        reason: String,
    },

    /// An armed dialog expectation was never resolved.
    #[error("Dialog timeout: no native dialog appeared within {}ms", .budget.as_millis())]
    DialogTimeout { budget: Duration },

    /// The page URL never matched the expected pattern.
    ///
    /// `last_url` is the URL observed on the final poll.
    #[error(
        "Navigation timeout after {}ms waiting for URL matching '{pattern}' (last URL: '{last_url}')",
        .budget.as_millis()
    )]
    NavigationTimeout {
        pattern: String,
        last_url: String,
        budget: Duration,
    },

    /// A scenario expectation that is checked once, not waited for, did not
    /// hold.
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// A second dialog expectation was armed while one is still pending.
    #[error("A dialog expectation is already pending on this session")]
    DialogAlreadyArmed,

    /// Error reported by the browser driver
    #[error("Browser driver error: {0}")]
    Driver(#[from] playwright_rs::Error),

    /// Invalid regular expression supplied to a URL or text wait
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Path could not be joined onto the configured base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid suite configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Returns the innermost error, skipping any context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// True for failures the suite treats as scenario-level signals (as
    /// opposed to driver or configuration breakage).
    pub fn is_scenario_failure(&self) -> bool {
        matches!(
            self.root(),
            Error::VisibilityTimeout { .. }
                | Error::EntityNotFound { .. }
                | Error::DialogTimeout { .. }
                | Error::NavigationTimeout { .. }
                | Error::AssertionFailed(_)
        )
    }
}
