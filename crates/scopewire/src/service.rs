//! The unit of storage: a named, typed slot with a fixed lifecycle

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{panic_message, BoxError, DiError, DiResult};
use crate::lifecycle::{Capabilities, Hooks};
use crate::scope::Scope;

/// Constructor of a service. Receives the scope the service is declared in.
pub type Provider<T> = Arc<dyn Fn(&Scope) -> Result<T, BoxError> + Send + Sync>;

/// Lifecycle of a service, fixed at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Built on first resolution, then memoized
    Lazy,
    /// Value supplied at registration
    Eager,
    /// Built anew on every resolution
    Transient,
}

impl ServiceKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Lazy => "😴",
            Self::Eager => "🔁",
            Self::Transient => "🏭",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lazy => write!(f, "lazy"),
            Self::Eager => write!(f, "eager"),
            Self::Transient => write!(f, "transient"),
        }
    }
}

/// A named service producing values of type `T`.
pub struct Service<T> {
    name: String,
    body: Body<T>,
    hooks: Hooks<T>,
}

enum Body<T> {
    Lazy(LazySlot<T>),
    Eager(T),
    Transient(Provider<T>),
}

impl<T> Service<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn lazy(name: String, provider: Provider<T>, hooks: Hooks<T>) -> Self {
        Self {
            name,
            body: Body::Lazy(LazySlot::new(provider)),
            hooks,
        }
    }

    pub(crate) fn eager(name: String, value: T, hooks: Hooks<T>) -> Self {
        Self {
            name,
            body: Body::Eager(value),
            hooks,
        }
    }

    pub(crate) fn transient(name: String, provider: Provider<T>, hooks: Hooks<T>) -> Self {
        Self {
            name,
            body: Body::Transient(provider),
            hooks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ServiceKind {
        match self.body {
            Body::Lazy(_) => ServiceKind::Lazy,
            Body::Eager(_) => ServiceKind::Eager,
            Body::Transient(_) => ServiceKind::Transient,
        }
    }

    /// Produce the value, building it if needed.
    ///
    /// `scope` is handed to the provider so it can resolve its own
    /// dependencies.
    pub fn get_instance(&self, scope: &Scope) -> DiResult<T> {
        match &self.body {
            Body::Lazy(slot) => slot.get(&self.name, scope),
            Body::Eager(value) => Ok(value.clone()),
            Body::Transient(provider) => call_provider(provider, &self.name, scope),
        }
    }

    /// The current value, if one exists without running a provider.
    fn current(&self) -> Option<T> {
        match &self.body {
            Body::Lazy(slot) => slot.built(),
            Body::Eager(value) => Some(value.clone()),
            Body::Transient(_) => None,
        }
    }
}

/// Type-erased view of a [`Service`], as stored in a registry
pub(crate) trait AnyService: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> ServiceKind;
    fn type_name(&self) -> &'static str;
    fn capabilities(&self) -> Capabilities;
    fn is_built(&self) -> bool;
    fn health_check(&self) -> DiResult<()>;
    fn shutdown(&self) -> DiResult<()>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> AnyService for Service<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ServiceKind {
        Service::kind(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn capabilities(&self) -> Capabilities {
        self.hooks.capabilities()
    }

    fn is_built(&self) -> bool {
        match &self.body {
            Body::Lazy(slot) => slot.is_built(),
            Body::Eager(_) => true,
            Body::Transient(_) => false,
        }
    }

    fn health_check(&self) -> DiResult<()> {
        let (Some(check), Some(value)) = (self.hooks.health_check, self.current()) else {
            return Ok(());
        };
        check(&value).map_err(|err| DiError::HealthCheck {
            name: self.name.clone(),
            source: Arc::from(err),
        })
    }

    fn shutdown(&self) -> DiResult<()> {
        let value = match &self.body {
            Body::Lazy(slot) => slot.take(),
            Body::Eager(value) => Some(value.clone()),
            Body::Transient(_) => None,
        };
        let (Some(hook), Some(value)) = (self.hooks.shutdown, value) else {
            return Ok(());
        };
        hook(&value).map_err(|err| DiError::Shutdown {
            name: self.name.clone(),
            source: Arc::from(err),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn call_provider<T>(provider: &Provider<T>, name: &str, scope: &Scope) -> DiResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(|| provider(scope))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(DiError::provider(name, err)),
        Err(payload) => Err(DiError::ProviderPanicked {
            name: name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Single-flight memoization for lazy services.
///
/// The provider runs without the lock held. Callers arriving while a build is
/// in flight wait for it and receive its outcome, success or failure. A
/// failure is not kept: the next caller starts a fresh attempt.
struct LazySlot<T> {
    provider: Provider<T>,
    state: Mutex<LazyState<T>>,
    settled: Condvar,
}

struct LazyState<T> {
    phase: Phase<T>,
    attempts: u64,
    last_failure: Option<(u64, DiError)>,
}

enum Phase<T> {
    Empty,
    Building { attempt: u64, owner: ThreadId },
    Built(T),
}

impl<T> LazyState<T> {
    fn is_building(&self, attempt: u64) -> bool {
        matches!(self.phase, Phase::Building { attempt: current, .. } if current == attempt)
    }
}

impl<T: Clone> LazySlot<T> {
    fn new(provider: Provider<T>) -> Self {
        Self {
            provider,
            state: Mutex::new(LazyState {
                phase: Phase::Empty,
                attempts: 0,
                last_failure: None,
            }),
            settled: Condvar::new(),
        }
    }

    fn get(&self, name: &str, scope: &Scope) -> DiResult<T> {
        let mut state = self.state.lock();
        loop {
            let in_flight = match &state.phase {
                Phase::Built(value) => return Ok(value.clone()),
                Phase::Building { attempt, owner } => Some((*attempt, *owner)),
                Phase::Empty => None,
            };

            match in_flight {
                Some((attempt, owner)) => {
                    if owner == thread::current().id() {
                        return Err(DiError::CircularDependency {
                            name: name.to_string(),
                        });
                    }
                    while state.is_building(attempt) {
                        self.settled.wait(&mut state);
                    }
                    if let Some((failed, err)) = &state.last_failure {
                        if *failed == attempt {
                            return Err(err.clone());
                        }
                    }
                }
                None => return self.build(&mut state, name, scope),
            }
        }
    }

    fn build(
        &self,
        state: &mut MutexGuard<'_, LazyState<T>>,
        name: &str,
        scope: &Scope,
    ) -> DiResult<T> {
        state.attempts += 1;
        let attempt = state.attempts;
        state.phase = Phase::Building {
            attempt,
            owner: thread::current().id(),
        };

        trace!(service = %name, attempt, "building lazy service");
        let outcome = MutexGuard::unlocked(state, || call_provider(&self.provider, name, scope));

        let result = match outcome {
            Ok(value) => {
                state.phase = Phase::Built(value.clone());
                state.last_failure = None;
                Ok(value)
            }
            Err(err) => {
                state.phase = Phase::Empty;
                state.last_failure = Some((attempt, err.clone()));
                Err(err)
            }
        };
        self.settled.notify_all();
        result
    }

    fn is_built(&self) -> bool {
        matches!(self.state.lock().phase, Phase::Built(_))
    }

    fn built(&self) -> Option<T> {
        match &self.state.lock().phase {
            Phase::Built(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Reset a built slot, handing back the value it held. A build running
    /// on another thread is waited for first so its value is not missed.
    fn take(&self) -> Option<T> {
        let mut state = self.state.lock();
        while let Phase::Building { owner, .. } = &state.phase {
            if *owner == thread::current().id() {
                return None;
            }
            self.settled.wait(&mut state);
        }
        match std::mem::replace(&mut state.phase, Phase::Empty) {
            Phase::Built(value) => Some(value),
            _ => None,
        }
    }
}
