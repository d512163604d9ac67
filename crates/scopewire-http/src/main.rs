//! Serve the inspector over a demonstration scope tree

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scopewire::{
    invoke, provide, provide_named_value, provide_transient, provide_value, BoxError,
    HealthCheck, InjectorOptions, Registration, Scope, Shutdown,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scopewire-inspect", version, about = "Browse a scopewire scope tree")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Path prefix of the inspector routes
    #[arg(long, default_value = "/")]
    base_path: String,

    /// Injector options (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of request scopes to create under the root
    #[arg(long, default_value_t = 2)]
    requests: usize,
}

#[derive(Debug, Clone)]
struct AppConfig {
    database_url: String,
}

#[derive(Debug, Clone)]
struct Database {
    url: String,
}

impl HealthCheck for Database {
    fn health_check(&self) -> Result<(), BoxError> {
        if self.url.is_empty() {
            return Err("database url is empty".into());
        }
        Ok(())
    }
}

impl Shutdown for Database {
    fn shutdown(&self) -> Result<(), BoxError> {
        info!(url = %self.url, "closing database");
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct RequestId(u64);

#[derive(Debug, Clone)]
struct Session {
    user: String,
}

fn build_tree(options: InjectorOptions, requests: usize) -> anyhow::Result<Scope> {
    let root = Scope::with_options("app", options);

    provide_value(
        &root,
        AppConfig {
            database_url: "postgres://localhost/app".to_string(),
        },
    )?;
    Registration::lazy(|scope| {
        let config = invoke::<AppConfig>(scope)?;
        Ok(Arc::new(Database {
            url: config.database_url,
        }))
    })
    .provide(&root)?;
    Registration::lazy(|scope| {
        let config = invoke::<AppConfig>(scope)?;
        Ok(Database {
            url: config.database_url,
        })
    })
    .named("database.replica")
    .with_health_check()
    .with_shutdown()
    .provide(&root)?;

    let next_id = Arc::new(AtomicU64::new(1));
    for i in 0..requests {
        let request = root.scope(&format!("request-{}", i + 1));
        let ids = Arc::clone(&next_id);
        provide_transient(&request, move |_| Ok(RequestId(ids.fetch_add(1, Ordering::Relaxed))))?;
        provide(&request, move |_| {
            Ok(Session {
                user: format!("user-{}", i + 1),
            })
        })?;
        provide_named_value(&request, "request.timeout_ms", 30_000_u64)?;
    }

    // Build one singleton so the tree shows both states.
    let db = invoke::<Arc<Database>>(&root)?;
    info!(url = %db.url, "database ready");

    if let Some(request) = root.children().first() {
        let session = invoke::<Session>(request)?;
        let id = invoke::<RequestId>(request)?;
        info!(user = %session.user, request_id = id.0, "sample request resolved");
    }

    Ok(root)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let options = match &args.config {
        Some(path) => InjectorOptions::from_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => InjectorOptions::default(),
    };

    let root = build_tree(options, args.requests)?;
    let app = scopewire_http::router(&args.base_path, root.clone())?;

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;
    info!(addr = %args.addr, base_path = %args.base_path, "inspector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for ctrl-c");
            }
        })
        .await?;

    for failure in root.shutdown() {
        warn!(error = %failure, "shutdown failure");
    }
    Ok(())
}
