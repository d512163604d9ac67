//! Tests for the inspector routes

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use scopewire::{
    explain_injector, provide, provide_named_transient, provide_named_value, BoxError,
    ExplainInjector, HealthCheck, Registration, Scope, Shutdown,
};
use tower::ServiceExt;

fn tree() -> (Scope, Scope) {
    let root = Scope::new("root");
    provide_named_value(&root, "config", 1_u8).unwrap();
    provide(&root, |_| Ok(String::from("pool"))).unwrap();

    let request = root.scope("request");
    provide_named_transient(&request, "request.id", |_| Ok(7_u64)).unwrap();
    (root, request)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_index() {
    let (root, _) = tree();
    let app = scopewire_http::router("/di", root).unwrap();

    let (status, body) = get(app.clone(), "/di/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("2 scopes, 3 services."));

    let (status, _) = get(app, "/di").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_scope_tree_page() {
    let (root, request) = tree();
    let app = scopewire_http::router("", root.clone()).unwrap();

    let (status, body) = get(app, "/scope").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(root.id()));
    assert!(body.contains(request.id()));
    assert!(body.contains(">alloc::string::String</a>"));
    assert!(body.contains(">config</a>"));
    assert!(body.contains(">request.id</a>"));
    assert!(body.contains("😴 <a"));
    assert!(body.contains("🔁 <a"));
    assert!(body.contains("🏭 <a"));
    // Service names are percent-encoded into their detail links.
    assert!(body.contains("alloc%3A%3Astring%3A%3AString"));
}

#[derive(Debug, Clone)]
struct Socket;

impl HealthCheck for Socket {
    fn health_check(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl Shutdown for Socket {
    fn shutdown(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_pages_flag_hooked_services() {
    let (root, _) = tree();
    Registration::lazy(|_| Ok(Socket))
        .named("socket")
        .with_health_check()
        .with_shutdown()
        .provide(&root)
        .unwrap();
    let app = scopewire_http::router("", root.clone()).unwrap();

    let (status, body) = get(app.clone(), "/scope").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">socket</a> 🫀 🙅"));
    assert!(!body.contains(">config</a> 🫀"));

    let (status, body) = get(app, "/service?service_name=socket").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("🫀 yes"));
    assert!(body.contains("🙅 yes"));
    assert!(!root.is_built("socket"));
}

#[tokio::test]
async fn test_scope_page_for_one_subtree() {
    let (root, request) = tree();
    let app = scopewire_http::router("", root.clone()).unwrap();

    let (status, body) = get(app.clone(), &format!("/scope?scope_id={}", request.id())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("request.id"));
    assert!(!body.contains(">config</a>"));

    let (status, body) = get(app, "/scope?scope_id=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("scope_not_found"));
}

#[tokio::test]
async fn test_service_page() {
    let (root, _) = tree();
    let app = scopewire_http::router("/", root).unwrap();

    let (status, body) = get(app, "/service").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("config"));
    assert!(body.contains("request.id"));
    assert!(body.contains(">request</a>"));
}

#[tokio::test]
async fn test_service_detail() {
    let (root, request) = tree();
    let app = scopewire_http::router("/di", root.clone()).unwrap();

    let uri = format!("/di/service?scope_id={}&service_name=config", root.id());
    let (status, body) = get(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Service config"));
    assert!(body.contains(">config</a>"));
    assert!(!body.contains("request.id"));

    let (status, body) = get(
        app.clone(),
        "/di/service?service_name=alloc%3A%3Astring%3A%3AString",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">alloc::string::String</a>"));
    assert!(!body.contains(">config</a>"));

    let (status, body) = get(app.clone(), &format!("/di/service?scope_id={}", request.id())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">request.id</a>"));
    assert!(!body.contains(">config</a>"));
}

#[tokio::test]
async fn test_service_detail_not_found() {
    let (root, request) = tree();
    let app = scopewire_http::router("", root).unwrap();

    let (status, body) = get(app.clone(), "/service?service_name=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("service_not_found"));

    // Declared, but not in the requested scope.
    let uri = format!("/service?scope_id={}&service_name=config", request.id());
    let (status, body) = get(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("service_not_found"));

    let (status, body) = get(app, "/service?scope_id=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("scope_not_found"));
}

#[tokio::test]
async fn test_explain_json_matches_snapshot() {
    let (root, request) = tree();
    let app = scopewire_http::router("/di", request.clone()).unwrap();

    let (status, body) = get(app, "/di/api/explain").await;
    assert_eq!(status, StatusCode::OK);

    let served: ExplainInjector = serde_json::from_str(&body).unwrap();
    assert_eq!(served, explain_injector(&root));
    assert!(body.contains(r#""ScopeName":"root""#));
}

#[tokio::test]
async fn test_inspection_does_not_build_services() {
    let (root, _) = tree();
    let app = scopewire_http::router("", root.clone()).unwrap();

    for uri in ["/", "/scope", "/service", "/api/explain"] {
        let (status, _) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert!(!root.is_built(&scopewire::name::<String>()));
    assert_eq!(root.list_invoked_services(), vec!["config"]);
}

#[tokio::test]
async fn test_unknown_route() {
    let (root, _) = tree();
    let app = scopewire_http::router("/di", root).unwrap();

    let (status, _) = get(app, "/elsewhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
