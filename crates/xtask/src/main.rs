//! Developer tasks for the board end-to-end suite
//!
//! ```text
//! cargo xtask install-browsers --browser chromium
//! cargo xtask serve-stub --port 8081
//! cargo xtask smoke --base-url http://localhost:8081 --scenario ownership-gating
//! ```

use anyhow::{Context, bail};
use board_e2e::{BrowserKind, Harness, Scenario, SuiteConfig};
use board_stub::BoardStub;
use clap::{Parser, Subcommand};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Developer tasks for the board end-to-end suite", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the browser builds matching the bundled Playwright driver
    InstallBrowsers {
        /// chromium, firefox, webkit or all
        #[arg(long, default_value = "chromium")]
        browser: String,
    },

    /// Serve the in-memory board application until interrupted
    ServeStub {
        #[arg(long, default_value_t = 8081)]
        port: u16,
    },

    /// Run end-to-end scenarios against a running application
    Smoke {
        /// Application base URL; starts the in-memory stub when omitted
        #[arg(long)]
        base_url: Option<String>,

        /// JSON configuration file (BOARD_E2E_* variables still apply)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scenario to run (repeatable); runs all when omitted
        #[arg(long = "scenario", value_name = "NAME")]
        scenarios: Vec<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// List scenario names and exit
        #[arg(long)]
        list: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "board_e2e=debug,board_stub=debug,xtask=debug"
    } else {
        "board_e2e=info,board_stub=info,xtask=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::InstallBrowsers { browser } => install_browsers(&browser).await,
        Commands::ServeStub { port } => serve_stub(port).await,
        Commands::Smoke {
            base_url,
            config,
            scenarios,
            headed,
            list,
        } => {
            if list {
                for scenario in Scenario::ALL {
                    println!("{scenario}");
                }
                return Ok(());
            }
            smoke(base_url, config, &scenarios, headed).await
        }
    }
}

async fn install_browsers(browser: &str) -> anyhow::Result<()> {
    let targets: Vec<&str> = if browser == "all" {
        vec!["chromium", "firefox", "webkit"]
    } else {
        vec![browser.parse::<BrowserKind>()?.as_str()]
    };

    let package = format!("playwright@{}", playwright_rs::PLAYWRIGHT_VERSION);
    tracing::info!(%package, ?targets, "installing browsers");

    let status = tokio::process::Command::new("npx")
        .arg("--yes")
        .arg(&package)
        .arg("install")
        .args(&targets)
        .status()
        .await
        .context("failed to run npx (is Node.js installed?)")?;

    if !status.success() {
        bail!("browser installation failed: {status}");
    }
    Ok(())
}

async fn serve_stub(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let stub = BoardStub::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!(url = %stub.url(), "board stub listening; Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    stub.shutdown();
    Ok(())
}

async fn smoke(
    base_url: Option<String>,
    config_file: Option<PathBuf>,
    names: &[String],
    headed: bool,
) -> anyhow::Result<()> {
    let scenarios = if names.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        names
            .iter()
            .map(|name| name.parse::<Scenario>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut config = match &config_file {
        Some(path) => SuiteConfig::from_json_file(path)?
            .overlay(|key| std::env::var(key).ok())?,
        None => SuiteConfig::from_env()?,
    };
    if headed {
        config = config.with_headless(false);
    }

    let stub = match base_url {
        Some(url) => {
            config = config.with_base_url(url);
            None
        }
        None => {
            let stub = BoardStub::start().await?;
            tracing::info!(url = %stub.url(), "no base URL given; using the in-memory stub");
            config = config.with_base_url(stub.url());
            Some(stub)
        }
    };

    let harness = Harness::launch(config).await?;
    let mut failures = Vec::new();
    for scenario in &scenarios {
        let started = Instant::now();
        let session = harness.new_session().await?;
        let outcome = scenario.run(&session).await;
        session.close().await?;

        let elapsed = started.elapsed().as_millis();
        match outcome {
            Ok(()) => println!("PASS  {scenario} ({elapsed}ms)"),
            Err(e) => {
                println!("FAIL  {scenario} ({elapsed}ms)\n      {e}");
                failures.push(*scenario);
            }
        }
    }
    harness.close().await?;
    if let Some(stub) = stub {
        stub.shutdown();
    }

    println!(
        "\n{} passed, {} failed",
        scenarios.len() - failures.len(),
        failures.len()
    );
    if !failures.is_empty() {
        bail!("{} scenario(s) failed", failures.len());
    }
    Ok(())
}
