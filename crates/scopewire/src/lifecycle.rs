//! Optional capabilities a service instance may have
//!
//! A generic `T` cannot be asked about a trait at runtime, so capabilities are
//! declared when registering (see [`crate::Registration::with_health_check`]).
//! The declaration only compiles when `T` implements the trait, which keeps
//! the flags reported by [`crate::explain_scope`] honest without ever building
//! a lazy service.

use serde::Serialize;

use crate::error::BoxError;

/// A service that can report whether it is healthy.
pub trait HealthCheck {
    fn health_check(&self) -> Result<(), BoxError>;
}

/// A service that holds resources needing explicit teardown.
pub trait Shutdown {
    fn shutdown(&self) -> Result<(), BoxError>;
}

type Hook<T> = fn(&T) -> Result<(), BoxError>;

/// Hooks attached to one registration
pub(crate) struct Hooks<T> {
    pub(crate) health_check: Option<Hook<T>>,
    pub(crate) shutdown: Option<Hook<T>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            health_check: None,
            shutdown: None,
        }
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            health_check: self.health_check,
            shutdown: self.shutdown,
        }
    }
}

impl<T> Hooks<T> {
    pub(crate) fn capabilities(&self) -> Capabilities {
        Capabilities {
            health_check: self.health_check.is_some(),
            shutdown: self.shutdown.is_some(),
        }
    }
}

impl<T: HealthCheck> Hooks<T> {
    pub(crate) fn enable_health_check(&mut self) {
        self.health_check = Some(<T as HealthCheck>::health_check);
    }
}

impl<T: Shutdown> Hooks<T> {
    pub(crate) fn enable_shutdown(&mut self) {
        self.shutdown = Some(<T as Shutdown>::shutdown);
    }
}

/// Capability flags of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub health_check: bool,
    pub shutdown: bool,
}
