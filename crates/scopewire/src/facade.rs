//! Typed entry points: provide, override and invoke
//!
//! Every function takes an explicit [`Scope`]. Unnamed variants infer the
//! service name from `T` using the tree's naming strategy.
//!
//! `override` is a reserved word, so the unnamed lazy override is
//! [`override_service`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::OverridePolicy;
use crate::error::{BoxError, DiError, DiResult, Fatal};
use crate::lifecycle::{HealthCheck, Hooks, Shutdown};
use crate::scope::Scope;
use crate::service::{AnyService, Provider, Service, ServiceKind};

enum Source<T> {
    Lazy(Provider<T>),
    Eager(T),
    Transient(Provider<T>),
}

/// A service about to be registered.
///
/// The free functions of this module cover the common cases; use the builder
/// directly to declare capabilities:
///
/// ```
/// use scopewire::{BoxError, HealthCheck, Registration, Scope};
///
/// #[derive(Clone)]
/// struct Pool;
///
/// impl HealthCheck for Pool {
///     fn health_check(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let scope = Scope::new("app");
/// Registration::lazy(|_| Ok(Pool))
///     .with_health_check()
///     .provide(&scope)
///     .unwrap();
/// ```
pub struct Registration<T> {
    name: Option<String>,
    source: Source<T>,
    hooks: Hooks<T>,
}

impl<T> Registration<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Built on first resolution, then memoized.
    pub fn lazy<F>(provider: F) -> Self
    where
        F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::from_source(Source::Lazy(Arc::new(provider)))
    }

    /// A value that is already built.
    pub fn eager(value: T) -> Self {
        Self::from_source(Source::Eager(value))
    }

    /// Built anew on every resolution.
    pub fn transient<F>(provider: F) -> Self
    where
        F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::from_source(Source::Transient(Arc::new(provider)))
    }

    fn from_source(source: Source<T>) -> Self {
        Self {
            name: None,
            source,
            hooks: Hooks::default(),
        }
    }

    /// Register under an explicit name instead of the inferred one.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register in `scope`, failing if the name is taken there.
    pub fn provide(self, scope: &Scope) -> Result<(), Fatal> {
        let (name, kind, service) = self.into_service(scope);

        if !scope.registry().set_if_absent(&name, service) {
            return Err(Fatal::new(DiError::DuplicateService {
                name,
                scope: scope.name().to_string(),
            }));
        }

        debug!(service = %name, scope = %scope.name(), kind = %kind, "service injected");
        scope
            .options()
            .logf(|| format!("DI: service {} injected", name));
        Ok(())
    }

    /// Register in `scope`, replacing whatever held the name.
    ///
    /// Consumers that already hold a value from the replaced service keep it.
    /// Later resolutions see the new service, starting unbuilt.
    pub fn override_in(self, scope: &Scope) {
        let (name, kind, service) = self.into_service(scope);
        let previous = scope.registry().set(&name, service);

        if let Some(previous) = previous {
            if scope.options().override_policy == OverridePolicy::ShutdownPrevious {
                if let Err(err) = previous.shutdown() {
                    warn!(service = %name, scope = %scope.name(), error = %err, "shutdown of overridden service failed");
                }
            }
        }

        debug!(service = %name, scope = %scope.name(), kind = %kind, "service overridden");
        scope
            .options()
            .logf(|| format!("DI: service {} overridden", name));
    }

    fn into_service(self, scope: &Scope) -> (String, ServiceKind, Arc<dyn AnyService>) {
        let name = self.name.unwrap_or_else(|| scope.name_of::<T>());
        let service = match self.source {
            Source::Lazy(provider) => Service::lazy(name.clone(), provider, self.hooks),
            Source::Eager(value) => Service::eager(name.clone(), value, self.hooks),
            Source::Transient(provider) => Service::transient(name.clone(), provider, self.hooks),
        };
        let kind = service.kind();
        (name, kind, Arc::new(service))
    }
}

impl<T> Registration<T>
where
    T: HealthCheck + Clone + Send + Sync + 'static,
{
    pub fn with_health_check(mut self) -> Self {
        self.hooks.enable_health_check();
        self
    }
}

impl<T> Registration<T>
where
    T: Shutdown + Clone + Send + Sync + 'static,
{
    pub fn with_shutdown(mut self) -> Self {
        self.hooks.enable_shutdown();
        self
    }
}

// ============================================================================
// Provide
// ============================================================================

/// Register a lazy service under the name inferred from `T`.
pub fn provide<T, F>(scope: &Scope, provider: F) -> Result<(), Fatal>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::lazy(provider).provide(scope)
}

pub fn provide_named<T, F>(scope: &Scope, name: &str, provider: F) -> Result<(), Fatal>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::lazy(provider).named(name).provide(scope)
}

/// Register an already-built value under the name inferred from `T`.
pub fn provide_value<T>(scope: &Scope, value: T) -> Result<(), Fatal>
where
    T: Clone + Send + Sync + 'static,
{
    Registration::eager(value).provide(scope)
}

pub fn provide_named_value<T>(scope: &Scope, name: &str, value: T) -> Result<(), Fatal>
where
    T: Clone + Send + Sync + 'static,
{
    Registration::eager(value).named(name).provide(scope)
}

/// Register a factory called on every resolution.
pub fn provide_transient<T, F>(scope: &Scope, provider: F) -> Result<(), Fatal>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::transient(provider).provide(scope)
}

pub fn provide_named_transient<T, F>(scope: &Scope, name: &str, provider: F) -> Result<(), Fatal>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::transient(provider).named(name).provide(scope)
}

// ============================================================================
// Override
// ============================================================================

/// Replace the lazy service inferred from `T`, registered or not.
pub fn override_service<T, F>(scope: &Scope, provider: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::lazy(provider).override_in(scope)
}

pub fn override_named<T, F>(scope: &Scope, name: &str, provider: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::lazy(provider).named(name).override_in(scope)
}

pub fn override_value<T>(scope: &Scope, value: T)
where
    T: Clone + Send + Sync + 'static,
{
    Registration::eager(value).override_in(scope)
}

pub fn override_named_value<T>(scope: &Scope, name: &str, value: T)
where
    T: Clone + Send + Sync + 'static,
{
    Registration::eager(value).named(name).override_in(scope)
}

pub fn override_transient<T, F>(scope: &Scope, provider: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::transient(provider).override_in(scope)
}

pub fn override_named_transient<T, F>(scope: &Scope, name: &str, provider: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&Scope) -> Result<T, BoxError> + Send + Sync + 'static,
{
    Registration::transient(provider).named(name).override_in(scope)
}

// ============================================================================
// Invoke
// ============================================================================

/// Resolve the service inferred from `T` in `scope` or its ancestors.
pub fn invoke<T>(scope: &Scope) -> DiResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    invoke_named(scope, &scope.name_of::<T>())
}

pub fn invoke_named<T>(scope: &Scope, name: &str) -> DiResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    resolve(scope, name, true)
}

/// Resolve in `scope` only, ignoring ancestors.
pub fn invoke_local<T>(scope: &Scope) -> DiResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    invoke_named_local(scope, &scope.name_of::<T>())
}

pub fn invoke_named_local<T>(scope: &Scope, name: &str) -> DiResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    resolve(scope, name, false)
}

/// Like [`invoke`], for startup wiring: any failure is a [`Fatal`].
pub fn must_invoke<T>(scope: &Scope) -> Result<T, Fatal>
where
    T: Clone + Send + Sync + 'static,
{
    invoke(scope).map_err(Fatal::new)
}

pub fn must_invoke_named<T>(scope: &Scope, name: &str) -> Result<T, Fatal>
where
    T: Clone + Send + Sync + 'static,
{
    invoke_named(scope, name).map_err(Fatal::new)
}

fn resolve<T>(scope: &Scope, name: &str, inherit: bool) -> DiResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (owner, service) = scope.resolve_service(name, inherit)?;
    let typed = service
        .as_any()
        .downcast_ref::<Service<T>>()
        .ok_or_else(|| DiError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: service.type_name(),
        })?;
    typed.get_instance(&owner)
}
