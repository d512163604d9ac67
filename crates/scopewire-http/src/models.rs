//! View models handed to the templates
//!
//! Built from an [`ExplainInjector`] snapshot, never from a live scope.

use scopewire::{ExplainInjector, ExplainScope, ExplainService};
use serde::Serialize;

const INDENT_PX: usize = 24;

#[derive(Debug, Serialize)]
pub struct IndexPage<'a> {
    pub title: &'a str,
    pub base_path: &'a str,
    pub scope_count: usize,
    pub service_count: usize,
}

impl<'a> IndexPage<'a> {
    pub fn new(base_path: &'a str, snapshot: &ExplainInjector) -> Self {
        let scope_count = snapshot.dag.iter().map(count_scopes).sum();
        Self {
            title: "Scopewire inspector",
            base_path,
            scope_count,
            service_count: snapshot.services().len(),
        }
    }
}

/// `{base}/scope?scope_id=..`
pub fn scope_link(base_path: &str, scope_id: &str) -> String {
    format!("{}/scope?scope_id={}", base_path, urlencoding::encode(scope_id))
}

/// `{base}/service?scope_id=..&service_name=..`
pub fn service_link(base_path: &str, scope_id: &str, service_name: &str) -> String {
    format!(
        "{}/service?scope_id={}&service_name={}",
        base_path,
        urlencoding::encode(scope_id),
        urlencoding::encode(service_name)
    )
}

/// One scope of the tree page, flattened with its depth.
#[derive(Debug, Serialize)]
pub struct ScopeRow<'a> {
    pub depth: usize,
    pub indent: usize,
    pub scope_id: &'a str,
    pub scope_name: &'a str,
    pub link: String,
    pub services: Vec<ServiceRow<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ScopePage<'a> {
    pub title: String,
    pub base_path: &'a str,
    pub scopes: Vec<ScopeRow<'a>>,
}

impl<'a> ScopePage<'a> {
    pub fn new(base_path: &'a str, title: String, roots: &'a [ExplainScope]) -> Self {
        let mut scopes = Vec::new();
        for root in roots {
            flatten(base_path, root, 0, &mut scopes);
        }
        Self {
            title,
            base_path,
            scopes,
        }
    }
}

fn flatten<'a>(
    base_path: &str,
    scope: &'a ExplainScope,
    depth: usize,
    out: &mut Vec<ScopeRow<'a>>,
) {
    out.push(ScopeRow {
        depth,
        indent: depth * INDENT_PX,
        scope_id: &scope.scope_id,
        scope_name: &scope.scope_name,
        link: scope_link(base_path, &scope.scope_id),
        services: scope
            .services
            .iter()
            .map(|service| ServiceRow::new(base_path, scope, service))
            .collect(),
    });
    for child in &scope.children {
        flatten(base_path, child, depth + 1, out);
    }
}

fn count_scopes(scope: &ExplainScope) -> usize {
    1 + scope.children.iter().map(count_scopes).sum::<usize>()
}

#[derive(Debug, Serialize)]
pub struct ServiceRow<'a> {
    pub scope_id: &'a str,
    pub scope_name: &'a str,
    pub scope_link: String,
    pub link: String,
    pub service: &'a ExplainService,
}

impl<'a> ServiceRow<'a> {
    pub fn new(base_path: &str, scope: &'a ExplainScope, service: &'a ExplainService) -> Self {
        Self {
            scope_id: &scope.scope_id,
            scope_name: &scope.scope_name,
            scope_link: scope_link(base_path, &scope.scope_id),
            link: service_link(base_path, &scope.scope_id, &service.service_name),
            service,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServicePage<'a> {
    pub title: String,
    pub base_path: &'a str,
    pub services: Vec<ServiceRow<'a>>,
}

impl<'a> ServicePage<'a> {
    pub fn new(
        base_path: &'a str,
        title: String,
        services: &[(&'a ExplainScope, &'a ExplainService)],
    ) -> Self {
        let services = services
            .iter()
            .map(|&(scope, service)| ServiceRow::new(base_path, scope, service))
            .collect();
        Self {
            title,
            base_path,
            services,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopewire::{explain_injector, provide_named_value, Scope};

    #[test]
    fn test_scope_rows_are_depth_first() {
        let root = Scope::new("root");
        let a = root.scope("a");
        a.scope("a1");
        root.scope("b");
        provide_named_value(&a, "x", 1_u8).unwrap();

        let snapshot = explain_injector(&root);
        let page = ScopePage::new("", "Scopes".to_string(), &snapshot.dag);

        let names: Vec<_> = page.scopes.iter().map(|row| row.scope_name).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
        let depths: Vec<_> = page.scopes.iter().map(|row| row.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1]);
        assert_eq!(page.scopes[2].indent, 2 * INDENT_PX);
        assert_eq!(page.scopes[1].services.len(), 1);

        let index = IndexPage::new("", &snapshot);
        assert_eq!(index.scope_count, 4);
        assert_eq!(index.service_count, 1);
    }

    #[test]
    fn test_service_link_is_encoded() {
        assert_eq!(
            service_link("/di", "abc", "alloc::sync::Arc<app::Db>"),
            "/di/service?scope_id=abc&service_name=alloc%3A%3Async%3A%3AArc%3Capp%3A%3ADb%3E"
        );
        assert_eq!(scope_link("", "abc"), "/scope?scope_id=abc");
    }
}
