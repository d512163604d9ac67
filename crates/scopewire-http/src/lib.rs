//! Scopewire inspector
//!
//! Serves the explain snapshot of a scope tree as HTML pages and JSON. Every
//! request takes a fresh snapshot; no handler can register, override or
//! resolve a service.
//!
//! ```no_run
//! # async fn serve() -> anyhow::Result<()> {
//! let root = scopewire::Scope::new("app");
//! let app = scopewire_http::router("/debug/di", root)?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::{HttpError, HttpResult};
pub use routes::router;
pub use state::InspectorState;
