//! Shared state of the inspector routes

use std::sync::Arc;

use scopewire::{explain_injector, ExplainInjector, Scope};

use crate::error::HttpResult;
use crate::templates::Templates;

type SnapshotFn = dyn Fn() -> ExplainInjector + Send + Sync;

/// State shared across all inspector handlers.
///
/// Handlers only ever see snapshots: the scope handle is captured inside the
/// snapshot closure and is not reachable from here.
#[derive(Clone)]
pub struct InspectorState {
    base_path: Arc<str>,
    snapshot: Arc<SnapshotFn>,
    templates: Arc<Templates>,
}

impl InspectorState {
    pub fn new(base_path: &str, scope: Scope) -> HttpResult<Self> {
        Ok(Self {
            base_path: Arc::from(normalize_base_path(base_path)),
            snapshot: Arc::new(move || explain_injector(&scope)),
            templates: Arc::new(Templates::new()?),
        })
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Take a fresh snapshot of the whole tree.
    pub fn snapshot(&self) -> ExplainInjector {
        (self.snapshot)()
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }
}

/// `""`, `"/"` and `"debug/di/"` become `""`, `""` and `"/debug/di"`.
pub(crate) fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
