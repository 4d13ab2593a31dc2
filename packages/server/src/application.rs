use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api::{AppState, AuthConfig};
use api::auth::LocalIdentity;
use axum::http::{header, Method};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Load settings, open the record store and serve until Ctrl+C or SIGTERM.
pub async fn launch() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().context("Failed to load settings")?;
    info!(?settings, "Loaded settings");

    let store = settings.storage.open();
    let identity = LocalIdentity::new(store.clone(), settings.auth.token_ttl());
    let state = AppState::new(
        store,
        Arc::new(identity),
        AuthConfig {
            anon_key: settings.auth.anon_key.clone(),
        },
    );

    let addr = settings
        .server
        .addr()
        .context("Invalid server host or port")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app(state, settings.server.nest_path().as_deref()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// The API router, optionally nested under `base_path`, with CORS and request tracing.
pub fn app(state: AppState, base_path: Option<&str>) -> Router {
    let routes = api::router(state);
    let routes = match base_path {
        Some(path) => Router::new().nest(path, routes),
        None => routes,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    routes.layer(TraceLayer::new_for_http()).layer(cors)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use store::MemoryStore;
    use tower::ServiceExt;

    fn state() -> AppState {
        let store: Arc<dyn store::RecordStore> = Arc::new(MemoryStore::new());
        let identity = LocalIdentity::new(store.clone(), chrono::Duration::hours(1));
        AppState::new(
            store,
            Arc::new(identity),
            AuthConfig {
                anon_key: String::new(),
            },
        )
    }

    async fn get(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_routes_at_root() {
        assert_eq!(get(app(state(), None), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_routes_nested_under_base_path() {
        let app = app(state(), Some("/make-server"));
        assert_eq!(get(app.clone(), "/make-server/health").await, StatusCode::OK);
        assert_eq!(get(app, "/health").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let response = app(state(), None)
            .oneshot(
                Request::options("/students")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
