//! Inspector route definitions

use axum::{middleware, routing::get, Router};
use scopewire::Scope;

use crate::{
    error::HttpResult,
    handlers::explain,
    middleware::logging::logging_middleware,
    state::InspectorState,
};

/// Inspector routes mounted under `base_path`, serving snapshots of the tree
/// `scope` belongs to.
///
/// - `GET {base}/` index
/// - `GET {base}/scope` scope tree, `?scope_id=` narrows to one subtree
/// - `GET {base}/service` flat service list
/// - `GET {base}/api/explain` JSON snapshot
pub fn router(base_path: &str, scope: Scope) -> HttpResult<Router> {
    let state = InspectorState::new(base_path, scope)?;
    let base = state.base_path().to_string();

    let mut routes = Router::new()
        .route(&format!("{base}/"), get(explain::index))
        .route(&format!("{base}/scope"), get(explain::scope_tree))
        .route(&format!("{base}/service"), get(explain::services))
        .route(&format!("{base}/api/explain"), get(explain::explain));

    if !base.is_empty() {
        routes = routes.route(&base, get(explain::index));
    }

    Ok(routes
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state))
}
