use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

/// Axum app bound on an ephemeral local port, stopped when dropped.
pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Clone, Default)]
struct Assets {
    files: Arc<HashMap<String, Vec<u8>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

/// Serves fixed files under `/assets/{name}` and counts requests per name.
pub struct AssetServer {
    server: TestServer,
    assets: Assets,
}

impl AssetServer {
    pub async fn spawn(files: Vec<(&str, Vec<u8>)>) -> Self {
        let assets = Assets {
            files: Arc::new(
                files
                    .into_iter()
                    .map(|(name, bytes)| (name.to_string(), bytes))
                    .collect(),
            ),
            hits: Arc::default(),
        };
        let router = Router::new()
            .route("/assets/{*name}", get(serve_asset))
            .with_state(assets.clone());
        Self {
            server: TestServer::spawn(router).await,
            assets,
        }
    }

    pub fn url(&self, name: &str) -> String {
        self.server.url(&format!("/assets/{name}"))
    }

    pub fn hits(&self, name: &str) -> usize {
        self.assets
            .hits
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or_default()
    }
}

async fn serve_asset(State(assets): State<Assets>, Path(name): Path<String>) -> Response {
    *assets.hits.lock().unwrap().entry(name.clone()).or_default() += 1;
    match assets.files.get(&name) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Clone)]
struct Inbox {
    tx: mpsc::UnboundedSender<serde_json::Value>,
    status: StatusCode,
}

/// Records every JSON body POSTed to `/callback`.
pub struct CallbackReceiver {
    server: TestServer,
    rx: mpsc::UnboundedReceiver<serde_json::Value>,
}

impl CallbackReceiver {
    pub async fn spawn() -> Self {
        Self::with_status(StatusCode::OK).await
    }

    pub async fn with_status(status: StatusCode) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = Router::new()
            .route("/callback", post(record_callback))
            .with_state(Inbox { tx, status });
        Self {
            server: TestServer::spawn(router).await,
            rx,
        }
    }

    pub fn url(&self) -> String {
        self.server.url("/callback")
    }

    pub async fn next(&mut self, timeout: Duration) -> Option<serde_json::Value> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    pub fn try_next(&mut self) -> Option<serde_json::Value> {
        self.rx.try_recv().ok()
    }
}

async fn record_callback(
    State(inbox): State<Inbox>,
    axum::Json(body): axum::Json<serde_json::Value>,
) -> StatusCode {
    let _ = inbox.tx.send(body);
    inbox.status
}
