//! Error types for registration and resolution
//!
//! Resolution failures are recoverable and come back as [`DiError`].
//! Programming errors (duplicate registration, a failed `must_*` call) come
//! back as [`Fatal`], and the embedding application decides whether to abort.

use std::sync::Arc;

use thiserror::Error;
use tracing::error;

/// Error type returned by providers and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared form of a provider or hook error, so one failure can be handed to
/// every caller waiting on the same lazy construction.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving or managing services
#[derive(Debug, Clone, Error)]
pub enum DiError {
    #[error("service `{name}` not found in scope `{scope}`, available services: {}", format_available(.available))]
    ServiceNotFound {
        name: String,
        scope: String,
        available: Vec<String>,
    },

    #[error("service `{name}` is registered as `{actual}`, requested as `{expected}`")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("provider of service `{name}` failed: {source}")]
    Provider {
        name: String,
        #[source]
        source: SharedError,
    },

    #[error("provider of service `{name}` panicked: {message}")]
    ProviderPanicked { name: String, message: String },

    #[error("circular dependency: service `{name}` requested while it is being built")]
    CircularDependency { name: String },

    #[error("service `{name}` has already been declared in scope `{scope}`")]
    DuplicateService { name: String, scope: String },

    #[error("health check of service `{name}` failed: {source}")]
    HealthCheck {
        name: String,
        #[source]
        source: SharedError,
    },

    #[error("shutdown of service `{name}` failed: {source}")]
    Shutdown {
        name: String,
        #[source]
        source: SharedError,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    available
        .iter()
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl DiError {
    pub(crate) fn provider(name: &str, err: BoxError) -> Self {
        Self::Provider {
            name: name.to_string(),
            source: Arc::from(err),
        }
    }

    /// The error returned by a failing provider, untouched.
    ///
    /// Downcast it to recover the concrete error type the provider produced.
    pub fn provider_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Provider { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Name of the service this error is about.
    pub fn service_name(&self) -> &str {
        match self {
            Self::ServiceNotFound { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::Provider { name, .. }
            | Self::ProviderPanicked { name, .. }
            | Self::CircularDependency { name }
            | Self::DuplicateService { name, .. }
            | Self::HealthCheck { name, .. }
            | Self::Shutdown { name, .. } => name,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }
}

pub type DiResult<T> = Result<T, DiError>;

/// A programming error surfaced as a value.
///
/// Returned by every `provide*` call (duplicate registration) and every
/// `must_*` call. Call [`Fatal::abort`] to turn it into a panic, or inspect the
/// wrapped [`DiError`] to handle it some other way.
#[derive(Debug, Clone, Error)]
#[error("fatal: {0}")]
pub struct Fatal(#[source] DiError);

impl Fatal {
    pub fn new(err: DiError) -> Self {
        Self(err)
    }

    pub fn error(&self) -> &DiError {
        &self.0
    }

    pub fn into_inner(self) -> DiError {
        self.0
    }

    /// Log the error and panic.
    pub fn abort(self) -> ! {
        error!(service = %self.0.service_name(), "{}", self.0);
        panic!("{}", self)
    }
}

impl From<DiError> for Fatal {
    fn from(err: DiError) -> Self {
        Self(err)
    }
}

/// Extension for `Result<T, Fatal>` that aborts instead of returning the error.
pub trait OrAbort<T> {
    fn or_abort(self) -> T;
}

impl<T> OrAbort<T> for Result<T, Fatal> {
    fn or_abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(fatal) => fatal.abort(),
        }
    }
}

/// Errors raised while loading [`crate::InjectorOptions`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Render a panic payload the way the standard panic hook does.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
