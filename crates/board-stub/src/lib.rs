//! board-stub: In-memory stand-in for the board web application
//!
//! Serves the pages and form endpoints the end-to-end suite drives (signup,
//! login, posts, categories, threaded comments) with the same markup
//! conventions and Korean labels as the real application. State lives in
//! memory and disappears with the server.
//!
//! ```ignore
//! let stub = board_stub::BoardStub::start().await?;
//! let config = board_e2e::SuiteConfig::new(stub.url());
//! // ... run scenarios ...
//! stub.shutdown();
//! ```

mod render;
mod routes;
mod store;

pub use routes::{
    AppState, CATEGORY_CREATED, CATEGORY_DELETED, CATEGORY_UPDATED, COMMENT_CREATED,
    COMMENT_DELETED, COMMENT_UPDATED, POST_CREATED, POST_DELETED, POST_UPDATED, SESSION_COOKIE,
    SIGNUP_DONE,
};

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Builds the application with fresh, empty state.
pub fn app() -> Router {
    routes::router(AppState::default())
}

/// A running stub server
pub struct BoardStub {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl BoardStub {
    /// Starts the stub on a random available local port.
    pub async fn start() -> std::io::Result<Self> {
        Self::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    /// Starts the stub on `addr`.
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "board stub listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app()).await {
                tracing::error!(error = %e, "board stub stopped");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the running stub
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Waits until the server task ends (it only ends on error).
    pub async fn wait(self) {
        let _ = self.handle.await;
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}
