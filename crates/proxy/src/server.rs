use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use ipfsx_api::DEFAULT_PROXY_PORT;

use crate::ProxyError;

/// Headers that describe the connection, not the payload. Never relayed.
/// `content-length` is recomputed for the buffered body.
const STRIPPED_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// TCP port to listen on (0 = OS-assigned).
    pub port: u16,
    /// Upstream origin requests are forwarded to.
    pub upstream: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PROXY_PORT,
            upstream: "http://127.0.0.1:5001".to_string(),
        }
    }
}

struct Upstream {
    origin: String,
    http: reqwest::Client,
}

/// The dev proxy server.
///
/// Forwards everything under `/api` to the configured upstream and
/// stamps permissive CORS headers on the way back. Preflights are
/// answered locally; anything off the prefix is 404.
pub struct ProxyServer {
    port: u16,
    upstream: Arc<Upstream>,
    cancel: CancellationToken,
    local_addr: tokio::sync::Mutex<Option<SocketAddr>>,
}

impl ProxyServer {
    /// Creates a new server for the given config.
    pub fn new(config: ProxyConfig) -> Arc<Self> {
        Arc::new(Self {
            port: config.port,
            upstream: Arc::new(Upstream {
                origin: config.upstream.trim_end_matches('/').to_string(),
                http: reqwest::Client::new(),
            }),
            cancel: CancellationToken::new(),
            local_addr: tokio::sync::Mutex::new(None),
        })
    }

    /// Returns the local address the server is listening on.
    ///
    /// Only available after [`run`](Self::run) binds the socket.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Gracefully shuts down the server.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Runs the server until cancellation.
    pub async fn run(self: &Arc<Self>) -> Result<(), ProxyError> {
        let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        let listener = TcpListener::bind(addr).await?;

        let local_addr = listener.local_addr()?;
        *self.local_addr.lock().await = Some(local_addr);
        tracing::info!(upstream = %self.upstream.origin, "proxy listening on {local_addr}");

        let app = router(Arc::clone(&self.upstream));
        let cancel = self.cancel.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("proxy shutting down");
            })
            .await?;
        Ok(())
    }
}

fn router(upstream: Arc<Upstream>) -> Router {
    Router::new()
        .route("/api", any(forward))
        .route("/api/*path", any(forward))
        .layer(CorsLayer::permissive())
        .with_state(upstream)
}

/// Relays one request to the upstream, prefix and all.
async fn forward(State(upstream): State<Arc<Upstream>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let url = format!("{}{path_and_query}", upstream.origin);

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("failed to read request body: {e}"),
            )
                .into_response();
        }
    };

    let mut headers = parts.headers;
    // The upstream must see its own host, not ours.
    headers.remove(header::HOST);
    for name in STRIPPED_HEADERS {
        headers.remove(name);
    }

    tracing::debug!(method = %parts.method, %url, "forwarding");
    let result = upstream
        .http
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await;

    let res = match result {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(%url, "upstream error: {e}");
            return (StatusCode::BAD_GATEWAY, format!("upstream error: {e}")).into_response();
        }
    };

    let mut builder = Response::builder().status(res.status());
    for (name, value) in res.headers() {
        if !is_stripped(name) {
            builder = builder.header(name, value);
        }
    }
    match res.bytes().await {
        Ok(bytes) => builder
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response()),
        Err(e) => (StatusCode::BAD_GATEWAY, format!("upstream body error: {e}")).into_response(),
    }
}

fn is_stripped(name: &HeaderName) -> bool {
    STRIPPED_HEADERS.contains(&name.as_str())
}
