//! Scope tree
//!
//! Every tree is an arena of nodes owned by its root. A node stores the index
//! of its parent and the indices of its children, so handles never form
//! reference cycles. [`Scope`] is a cheap, cloneable handle to one node.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::InjectorOptions;
use crate::error::{DiError, DiResult};
use crate::registry::Registry;
use crate::service::AnyService;

struct ScopeTree {
    options: InjectorOptions,
    nodes: RwLock<Vec<Arc<ScopeNode>>>,
}

struct ScopeNode {
    index: usize,
    id: String,
    name: String,
    parent: Option<usize>,
    children: RwLock<Vec<usize>>,
    registry: Registry,
}

impl ScopeNode {
    fn new(index: usize, name: &str, parent: Option<usize>) -> Self {
        Self {
            index,
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            parent,
            children: RwLock::new(Vec::new()),
            registry: Registry::new(),
        }
    }
}

/// Handle to a node of a scope tree.
///
/// A scope owns its own registry of services. Resolution looks in this scope
/// first, then walks toward the root.
#[derive(Clone)]
pub struct Scope {
    tree: Arc<ScopeTree>,
    node: Arc<ScopeNode>,
}

impl Scope {
    /// Create the root of a new tree with default options.
    pub fn new(name: &str) -> Self {
        Self::with_options(name, InjectorOptions::default())
    }

    /// Create the root of a new tree.
    pub fn with_options(name: &str, options: InjectorOptions) -> Self {
        let node = Arc::new(ScopeNode::new(0, name, None));
        let tree = Arc::new(ScopeTree {
            options,
            nodes: RwLock::new(vec![Arc::clone(&node)]),
        });

        info!(scope = %name, scope_id = %node.id, "created root scope");
        Self { tree, node }
    }

    /// Create a child scope.
    pub fn scope(&self, name: &str) -> Scope {
        let node = {
            let mut nodes = self.tree.nodes.write();
            let node = Arc::new(ScopeNode::new(nodes.len(), name, Some(self.node.index)));
            nodes.push(Arc::clone(&node));
            node
        };
        self.node.children.write().push(node.index);

        debug!(scope = %name, parent = %self.node.name, scope_id = %node.id, "created child scope");
        self.options()
            .logf(|| format!("DI: scope {} created under {}", name, self.node.name));

        Scope {
            tree: Arc::clone(&self.tree),
            node,
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Options shared by the whole tree.
    pub fn options(&self) -> &InjectorOptions {
        &self.tree.options
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn parent(&self) -> Option<Scope> {
        self.node.parent.map(|index| self.handle(index))
    }

    pub fn root(&self) -> Scope {
        self.handle(0)
    }

    /// Direct children, in creation order.
    pub fn children(&self) -> Vec<Scope> {
        let indices = self.node.children.read().clone();
        indices.into_iter().map(|index| self.handle(index)).collect()
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self) -> Vec<Scope> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(scope) = current {
            current = scope.parent();
            ancestors.push(scope);
        }
        ancestors
    }

    /// Find a scope of this tree by ID.
    pub fn find_scope(&self, id: &str) -> Option<Scope> {
        let node = self.tree.nodes.read().iter().find(|node| node.id == id).cloned()?;
        Some(Scope {
            tree: Arc::clone(&self.tree),
            node,
        })
    }

    /// Name the façade infers for `T` under this tree's naming strategy.
    pub fn name_of<T: ?Sized + 'static>(&self) -> String {
        self.options().naming.name_of::<T>()
    }

    /// Services declared in this scope, in registration order.
    pub fn list_provided_services(&self) -> Vec<String> {
        self.registry().names()
    }

    /// Services of this scope holding a built value.
    pub fn list_invoked_services(&self) -> Vec<String> {
        self.registry()
            .services()
            .into_iter()
            .filter(|service| service.is_built())
            .map(|service| service.name().to_string())
            .collect()
    }

    /// Whether the named service of this scope has been built, without
    /// building it.
    pub fn is_built(&self, name: &str) -> bool {
        self.registry()
            .lookup(name)
            .is_some_and(|service| service.is_built())
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.registry().exists(name)
    }

    /// Run the health check of one service, found through this scope and
    /// its ancestors. Services without a built instance or without a declared
    /// health check report healthy.
    pub fn health_check_named(&self, name: &str) -> DiResult<()> {
        let (_, service) = self.resolve_service(name, true)?;
        service.health_check()
    }

    /// Run the health check of every service declared in this scope.
    pub fn health_check(&self) -> Vec<(String, DiResult<()>)> {
        self.registry()
            .services()
            .into_iter()
            .map(|service| (service.name().to_string(), service.health_check()))
            .collect()
    }

    /// Shut down this scope and its descendants.
    ///
    /// Children go first, most recently created first; then this scope's
    /// services in reverse registration order. Only built instances with a
    /// shutdown hook are called, and lazy services go back to unbuilt. A lazy
    /// build in flight on another thread is waited for, then shut down.
    /// Returns every failure; an empty list means a clean shutdown.
    pub fn shutdown(&self) -> Vec<DiError> {
        let mut failures = Vec::new();

        for child in self.children().into_iter().rev() {
            failures.extend(child.shutdown());
        }

        for service in self.registry().services().into_iter().rev() {
            if let Err(err) = service.shutdown() {
                warn!(scope = %self.name(), service = %service.name(), error = %err, "shutdown failed");
                failures.push(err);
            }
        }

        info!(scope = %self.name(), failures = failures.len(), "scope shut down");
        self.options()
            .logf(|| format!("DI: scope {} shut down", self.name()));
        failures
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.node.registry
    }

    /// Locate a service by name in this scope, then (if `inherit`) in its
    /// ancestors. Returns the owning scope with the service.
    pub(crate) fn resolve_service(
        &self,
        name: &str,
        inherit: bool,
    ) -> DiResult<(Scope, Arc<dyn AnyService>)> {
        if let Some(service) = self.registry().lookup(name) {
            return Ok((self.clone(), service));
        }
        if inherit {
            for ancestor in self.ancestors() {
                if let Some(service) = ancestor.registry().lookup(name) {
                    return Ok((ancestor, service));
                }
            }
        }

        let mut available = self.list_provided_services();
        if inherit {
            for ancestor in self.ancestors() {
                available.extend(ancestor.list_provided_services());
            }
        }
        available.sort();
        available.dedup();

        Err(DiError::ServiceNotFound {
            name: name.to_string(),
            scope: self.name().to_string(),
            available,
        })
    }

    fn handle(&self, index: usize) -> Scope {
        let node = Arc::clone(&self.tree.nodes.read()[index]);
        Scope {
            tree: Arc::clone(&self.tree),
            node,
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.node.id)
            .field("name", &self.node.name)
            .field("services", &self.node.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_links() {
        let root = Scope::new("root");
        let api = root.scope("api");
        let request = api.scope("request");
        let worker = root.scope("worker");

        assert!(root.is_root());
        assert!(!api.is_root());
        assert_eq!(request.parent().unwrap(), api);
        assert_eq!(request.root(), root);
        assert_eq!(root.children(), vec![api.clone(), worker]);
        assert_eq!(request.ancestors(), vec![api, root.clone()]);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_ids_are_unique_and_findable() {
        let root = Scope::new("root");
        let child = root.scope("child");

        assert_ne!(root.id(), child.id());
        assert_eq!(child.find_scope(root.id()).unwrap(), root);
        assert_eq!(root.find_scope(child.id()).unwrap().name(), "child");
        assert!(root.find_scope("missing").is_none());
    }

    #[test]
    fn test_separate_trees_do_not_share_nodes() {
        let a = Scope::new("a");
        let b = Scope::new("b");
        assert_ne!(a, b);
        assert!(a.find_scope(b.id()).is_none());
    }

    #[test]
    fn test_not_found_lists_available() {
        let root = Scope::new("root");
        let err = root
            .resolve_service("nope", true)
            .err()
            .expect("lookup of an undeclared service succeeded");
        match err {
            DiError::ServiceNotFound {
                name,
                scope,
                available,
            } => {
                assert_eq!(name, "nope");
                assert_eq!(scope, "root");
                assert!(available.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
