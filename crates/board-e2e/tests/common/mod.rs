// Shared integration-test setup
//
// Each test starts its own stand-in application on a random port and its own
// browser, so tests in a file can run in parallel without sharing state.
// Set BOARD_E2E_BROWSER / BOARD_E2E_HEADLESS to change the browser.

// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use board_e2e::{Harness, Session, SuiteConfig, TimeoutBudgets};
use board_stub::BoardStub;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a `tracing` subscriber honoring `RUST_LOG` (once per binary).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("board_e2e=info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A stub application plus a browser pointed at it
pub struct Board {
    pub stub: BoardStub,
    pub harness: Harness,
}

impl Board {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(|config| config).await
    }

    /// Starts with a configuration adjusted by `tweak`.
    pub async fn start_with<F>(tweak: F) -> anyhow::Result<Self>
    where
        F: FnOnce(SuiteConfig) -> SuiteConfig,
    {
        init_tracing();
        let stub = BoardStub::start().await?;
        let config = tweak(SuiteConfig::from_env()?.with_base_url(stub.url()));
        let harness = Harness::launch(config).await?;
        Ok(Self { stub, harness })
    }

    pub async fn session(&self) -> anyhow::Result<Session> {
        Ok(self.harness.new_session().await?)
    }

    pub async fn finish(self) -> anyhow::Result<()> {
        self.harness.close().await?;
        self.stub.shutdown();
        Ok(())
    }
}

/// Budgets small enough to observe timeouts quickly.
pub fn quick_timeouts() -> TimeoutBudgets {
    TimeoutBudgets {
        short_ms: 300,
        standard_ms: 800,
        long_ms: 5_000,
    }
}
