//! board-e2e: Page-object end-to-end suite for the board web application
//!
//! Drives a real browser through Playwright against a running instance of the
//! board application (users, posts, categories, threaded comments) and checks
//! behavior from the outside: rendered text, URLs and element visibility.
//!
//! # Examples
//!
//! ## Running a scenario
//!
//! ```ignore
//! use board_e2e::{Harness, Scenario, SuiteConfig};
//!
//! #[tokio::main]
//! async fn main() -> board_e2e::Result<()> {
//!     let harness = Harness::launch(SuiteConfig::from_env()?).await?;
//!     let session = harness.new_session().await?;
//!
//!     Scenario::CategoryRoundTrip.run(&session).await?;
//!
//!     session.close().await?;
//!     harness.close().await
//! }
//! ```
//!
//! ## Driving page objects directly
//!
//! ```ignore
//! use board_e2e::pages::{CategoryPage, PostPage};
//! use board_e2e::{TestDataFactory, flows};
//!
//! # async fn demo(session: &board_e2e::Session) -> board_e2e::Result<()> {
//! flows::register_and_login(session, &TestDataFactory::new_user()).await?;
//!
//! let categories = CategoryPage::new(session);
//! let name = TestDataFactory::new_category_name();
//! categories.create(&name).await?;
//! categories.delete(&name).await?;  // accepts the confirm dialog
//!
//! let post = TestDataFactory::new_post();
//! let post_id = flows::publish_post(session, &post).await?;
//! PostPage::new(session).assert_content(&post.title, &post.content).await?;
//! # Ok(()) }
//! ```
//!
//! # Timeouts
//!
//! Every wait names a tier: `Short` for optional affordances, `Standard` for
//! DOM changes and dialogs, `Long` for navigation. Budgets come from
//! [`SuiteConfig`]; nothing retries past its budget.

pub mod config;
pub mod dialog;
mod error;
pub mod fixtures;
pub mod flows;
pub mod pages;
pub mod resolver;
pub mod scenarios;
pub mod selectors;
pub mod session;
pub mod wait;

pub use config::{BrowserKind, SuiteConfig, TimeoutBudgets};
pub use dialog::{DialogDisposition, DialogInterceptor, DialogTicket, ObservedDialog};
pub use error::{Error, Result};
pub use fixtures::{PostFixture, TestDataFactory, UserFixture};
pub use resolver::{EntityKind, EntityResolver, ResolvedEntity};
pub use scenarios::Scenario;
pub use session::{Harness, Session};
pub use wait::{TimeoutTier, UrlPattern, Visibility};
