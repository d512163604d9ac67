//! Typed service registry with hierarchical scopes
//!
//! Register constructors or values under a name inferred from their type (or
//! an explicit one), then resolve a memoized singleton, a fresh instance per
//! call, or a fixed value, without casts.
//!
//! ## Quick Start
//!
//! ```rust
//! use scopewire::{invoke, provide, provide_value, Scope};
//!
//! #[derive(Clone)]
//! struct Config {
//!     url: String,
//! }
//!
//! #[derive(Clone)]
//! struct Client {
//!     url: String,
//! }
//!
//! let root = Scope::new("app");
//! provide_value(&root, Config { url: "db://local".into() }).unwrap();
//! provide(&root, |scope| {
//!     let config = invoke::<Config>(scope)?;
//!     Ok(Client { url: config.url })
//! })
//! .unwrap();
//!
//! let request = root.scope("request");
//! let client = invoke::<Client>(&request).unwrap();
//! assert_eq!(client.url, "db://local");
//! ```
//!
//! ## Lifecycles
//!
//! - **Lazy** ([`provide`]): built on first resolution, exactly once even
//!   under concurrent resolution. A failed build is not remembered.
//! - **Eager** ([`provide_value`]): the registered value itself.
//! - **Transient** ([`provide_transient`]): built on every resolution.
//!
//! Registering a taken name returns a [`Fatal`]; [`override_service`] and
//! friends replace instead. [`explain_injector`] produces a serializable
//! snapshot of the scope tree without building anything.

pub mod config;
pub mod error;
pub mod explain;
pub mod facade;
pub mod lifecycle;
pub mod naming;
mod registry;
pub mod scope;
pub mod service;

pub use config::{InjectorOptions, LogSink, OverridePolicy};
pub use error::{BoxError, ConfigError, DiError, DiResult, Fatal, OrAbort, SharedError};
pub use explain::{explain_injector, explain_scope, ExplainInjector, ExplainScope, ExplainService};
pub use facade::{
    invoke, invoke_local, invoke_named, invoke_named_local, must_invoke, must_invoke_named,
    override_named, override_named_transient, override_named_value, override_service,
    override_transient, override_value, provide, provide_named, provide_named_transient,
    provide_named_value, provide_transient, provide_value, Registration,
};
pub use lifecycle::{Capabilities, HealthCheck, Shutdown};
pub use naming::{name, NamingStrategy};
pub use scope::Scope;
pub use service::{Provider, Service, ServiceKind};
