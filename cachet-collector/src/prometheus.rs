//! HTTP endpoint serving the registry in the Prometheus text format.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cachet_collector::prometheus::{MetricsServer, ServerConfig};
//! use cachet_collector::Registry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::builder()
//!         .listen_addr("0.0.0.0:9470")
//!         .metrics_path("/metrics")
//!         .build();
//!
//!     let server = MetricsServer::new(config, Arc::new(Registry::new()));
//!     server.start();
//!
//!     // Metrics available at http://localhost:9470/metrics
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::{Registry, ServerError, TEXT_CONTENT_TYPE};

/// Configuration for the metrics endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:9470")
    pub listen_addr: String,
    /// Path for metrics endpoint (e.g., "/metrics")
    pub metrics_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9470".to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a new builder for ServerConfig.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    listen_addr: Option<String>,
    metrics_path: Option<String>,
}

impl ServerConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the metrics path.
    pub fn metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Build the ServerConfig.
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            metrics_path: self.metrics_path.unwrap_or(defaults.metrics_path),
        }
    }
}

/// Serves a [`Registry`] over HTTP.
#[derive(Debug, Clone)]
pub struct MetricsServer {
    config: ServerConfig,
    registry: Arc<Registry>,
}

impl MetricsServer {
    /// Create a new server for `registry`.
    pub fn new(config: ServerConfig, registry: Arc<Registry>) -> Self {
        Self { config, registry }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr: SocketAddr =
            self.config
                .listen_addr
                .parse()
                .map_err(|source| ServerError::InvalidAddress {
                    addr: self.config.listen_addr.clone(),
                    source,
                })?;
        Ok(TcpListener::bind(addr).await?)
    }

    /// Start the HTTP server in a background task.
    ///
    /// The server runs until the runtime shuts down. Returns a `JoinHandle`
    /// that can be used to await the server or abort it.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let server = self.clone();
        tokio::spawn(async move {
            if let Err(e) = server.run(std::future::pending()).await {
                error!(error = %e, "metrics server stopped");
            }
        })
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    ///
    /// Connections already accepted keep running to completion in their own
    /// tasks.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), ServerError> {
        info!(
            addr = %listener.local_addr()?,
            path = %self.config.metrics_path,
            "serving metrics"
        );

        tokio::pin!(shutdown);
        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("metrics server shutting down");
                    return Ok(());
                }
            };

            let io = TokioIo::new(stream);
            let metrics_path = self.config.metrics_path.clone();
            let registry = self.registry.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let metrics_path = metrics_path.clone();
                    let registry = registry.clone();

                    async move { handle_request(req, &metrics_path, &registry).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(peer = %peer, error = %e, "metrics connection error");
                }
            });
        }
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    metrics_path: &str,
    registry: &Registry,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path();
    debug!(method = %req.method(), path, "metrics request");

    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Ok(text_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method Not Allowed".to_string(),
        ));
    }

    let response = if path == metrics_path {
        text_response(StatusCode::OK, TEXT_CONTENT_TYPE, registry.render().await)
    } else if path == "/health" || path == "/healthz" {
        text_response(StatusCode::OK, "text/plain", "OK".to_string())
    } else if path == "/" {
        text_response(
            StatusCode::OK,
            "text/html; charset=utf-8",
            landing_page(metrics_path),
        )
    } else {
        text_response(StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string())
    };

    Ok(response)
}

fn text_response(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>Cachet Exporter</title></head>\n\
         <body>\n\
         <h1>Cachet Exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        metrics_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collector, Desc};
    use async_trait::async_trait;
    use cachet_types::MetricSample;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::{mpsc, oneshot};

    struct Up;

    #[async_trait]
    impl Collector for Up {
        fn describe(&self) -> Vec<Desc> {
            vec![Desc::new("cachet_up", "Cachet API is up and accepting requests", &[])]
        }

        async fn collect(&self, sink: &mpsc::Sender<MetricSample>) {
            let _ = sink.send(MetricSample::new("cachet_up", 1.0)).await;
        }
    }

    async fn start_test_server() -> (SocketAddr, oneshot::Sender<()>) {
        let registry = Arc::new(Registry::new());
        registry.register(Arc::new(Up)).unwrap();

        let server = MetricsServer::new(
            ServerConfig::builder()
                .listen_addr("127.0.0.1:0")
                .metrics_path("/metrics")
                .build(),
            registry,
        );
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = stop_rx.await;
                })
                .await
                .unwrap();
        });

        (addr, stop_tx)
    }

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::builder()
            .listen_addr("127.0.0.1:8080")
            .metrics_path("/custom-metrics")
            .build();

        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.metrics_path, "/custom-metrics");
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.listen_addr, "0.0.0.0:9470");
        assert_eq!(config.metrics_path, "/metrics");
    }

    #[test]
    fn test_landing_page_links_metrics() {
        assert!(landing_page("/probe").contains("<a href=\"/probe\">Metrics</a>"));
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_address() {
        let server = MetricsServer::new(
            ServerConfig::builder().listen_addr("not-an-address").build(),
            Arc::new(Registry::new()),
        );
        let err = server.bind().await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_serves_metrics() {
        let (addr, _stop) = start_test_server().await;

        let response = get(addr, "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("text/plain; version=0.0.4"));
        assert!(response.contains("# TYPE cachet_up gauge\n"));
        assert!(response.contains("cachet_up 1\n"));
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let (addr, _stop) = start_test_server().await;

        let health = get(addr, "/health").await;
        assert!(health.starts_with("HTTP/1.1 200"));
        assert!(health.ends_with("OK"));

        let missing = get(addr, "/nope").await;
        assert!(missing.starts_with("HTTP/1.1 404"));
    }

    #[tokio::test]
    async fn test_landing_page_served_at_root() {
        let (addr, _stop) = start_test_server().await;

        let root = get(addr, "/").await;
        assert!(root.starts_with("HTTP/1.1 200"));
        assert!(root.contains("<h1>Cachet Exporter</h1>"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let (addr, stop) = start_test_server().await;
        stop.send(()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(TcpStream::connect(addr).await.is_err());
    }
}
