//! Read-only snapshot of a scope tree, for introspection and display
//!
//! The walk never runs a provider: lifecycle kind and capability flags are
//! fixed at registration, so an unbuilt lazy service stays unbuilt.

use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// Snapshot of a whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainInjector {
    #[serde(rename = "DAG")]
    pub dag: Vec<ExplainScope>,
}

impl ExplainInjector {
    /// Find the node of scope `id` anywhere in the snapshot.
    pub fn find(&self, id: &str) -> Option<&ExplainScope> {
        self.dag.iter().find_map(|scope| scope.find(id))
    }

    /// Every service of the snapshot paired with its scope, depth-first.
    pub fn services(&self) -> Vec<(&ExplainScope, &ExplainService)> {
        let mut out = Vec::new();
        for scope in &self.dag {
            scope.collect_services(&mut out);
        }
        out
    }
}

/// One scope and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainScope {
    #[serde(rename = "ScopeID")]
    pub scope_id: String,
    #[serde(rename = "ScopeName")]
    pub scope_name: String,
    #[serde(rename = "Services")]
    pub services: Vec<ExplainService>,
    #[serde(rename = "Children")]
    pub children: Vec<ExplainScope>,
}

impl ExplainScope {
    pub fn find(&self, id: &str) -> Option<&ExplainScope> {
        if self.scope_id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn collect_services<'a>(&'a self, out: &mut Vec<(&'a ExplainScope, &'a ExplainService)>) {
        out.extend(self.services.iter().map(|service| (self, service)));
        for child in &self.children {
            child.collect_services(out);
        }
    }
}

/// One service of a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainService {
    #[serde(rename = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "ServiceTypeIcon")]
    pub service_type_icon: String,
    #[serde(rename = "IsHealthchecker")]
    pub is_healthchecker: bool,
    #[serde(rename = "IsShutdowner")]
    pub is_shutdowner: bool,
}

/// Snapshot of the tree `scope` belongs to, starting at its root.
pub fn explain_injector(scope: &Scope) -> ExplainInjector {
    ExplainInjector {
        dag: vec![explain_scope(&scope.root())],
    }
}

/// Snapshot of the subtree rooted at `scope`.
pub fn explain_scope(scope: &Scope) -> ExplainScope {
    let services = scope
        .registry()
        .services()
        .into_iter()
        .map(|service| {
            let capabilities = service.capabilities();
            ExplainService {
                service_name: service.name().to_string(),
                service_type_icon: service.kind().icon().to_string(),
                is_healthchecker: capabilities.health_check,
                is_shutdowner: capabilities.shutdown,
            }
        })
        .collect();

    ExplainScope {
        scope_id: scope.id().to_string(),
        scope_name: scope.name().to_string(),
        services,
        children: scope.children().iter().map(explain_scope).collect(),
    }
}
