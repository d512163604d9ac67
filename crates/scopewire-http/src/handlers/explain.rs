//! Pages and JSON built from the explain snapshot

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use scopewire::ExplainInjector;
use serde::Deserialize;

use crate::{
    error::{HttpError, HttpResult},
    models::{IndexPage, ScopePage, ServicePage},
    state::InspectorState,
    templates,
};

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    pub scope_id: Option<String>,
}

/// Landing page with tree totals
pub async fn index(State(state): State<InspectorState>) -> HttpResult<Html<String>> {
    let snapshot = state.snapshot();
    let page = IndexPage::new(state.base_path(), &snapshot);
    Ok(Html(state.templates().render(templates::INDEX, &page)?))
}

/// Scope tree, or the subtree of `?scope_id=`
pub async fn scope_tree(
    State(state): State<InspectorState>,
    Query(query): Query<ScopeQuery>,
) -> HttpResult<Html<String>> {
    let snapshot = state.snapshot();

    let html = match query.scope_id.as_deref() {
        Some(id) => {
            let scope = snapshot
                .find(id)
                .ok_or_else(|| HttpError::ScopeNotFound(id.to_string()))?;
            let page = ScopePage::new(
                state.base_path(),
                format!("Scope {}", scope.scope_name),
                std::slice::from_ref(scope),
            );
            state.templates().render(templates::SCOPE, &page)?
        }
        None => {
            let page = ScopePage::new(state.base_path(), "Scopes".to_string(), &snapshot.dag);
            state.templates().render(templates::SCOPE, &page)?
        }
    };

    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct ServiceQuery {
    pub scope_id: Option<String>,
    pub service_name: Option<String>,
}

/// Every service of the tree with its scope, narrowed by `?scope_id=` and
/// `?service_name=`
pub async fn services(
    State(state): State<InspectorState>,
    Query(query): Query<ServiceQuery>,
) -> HttpResult<Html<String>> {
    let snapshot = state.snapshot();

    if let Some(id) = query.scope_id.as_deref() {
        if snapshot.find(id).is_none() {
            return Err(HttpError::ScopeNotFound(id.to_string()));
        }
    }

    let matching: Vec<_> = snapshot
        .services()
        .into_iter()
        .filter(|(scope, _)| query.scope_id.as_deref().map_or(true, |id| scope.scope_id == id))
        .filter(|(_, service)| {
            query
                .service_name
                .as_deref()
                .map_or(true, |name| service.service_name == name)
        })
        .collect();

    let title = match query.service_name.as_deref() {
        Some(name) if matching.is_empty() => {
            return Err(HttpError::ServiceNotFound(name.to_string()));
        }
        Some(name) => format!("Service {name}"),
        None => "Services".to_string(),
    };

    let page = ServicePage::new(state.base_path(), title, &matching);
    Ok(Html(state.templates().render(templates::SERVICE, &page)?))
}

/// Raw snapshot
pub async fn explain(State(state): State<InspectorState>) -> Json<ExplainInjector> {
    Json(state.snapshot())
}
