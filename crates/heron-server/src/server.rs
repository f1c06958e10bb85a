//! The HTTP/1.1 listener.
//!
//! One task per connection. Each request has its body read under
//! [`BodyLimits`](crate::BodyLimits), is wrapped in a
//! [`BufferedExtractor`] and handed to the [`Dispatcher`]; the resulting
//! [`RuntimeResult`] is written back with [`into_response`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use heron_core::{RequestId, RuntimeResult};
use heron_extract::BufferedExtractor;
use heron_runtime::Dispatcher;
use http::{Request, StatusCode};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use crate::body::read_body;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::response::{into_response, HttpResponse, REQUEST_ID_HEADER};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Serves one [`Dispatcher`] over HTTP/1.1.
pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Creates a server. Nothing is bound until it runs.
    #[must_use]
    pub fn new(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The dispatcher requests go to.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Runs until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|err| ServerError::InvalidAddress {
            addr: self.config.http_addr().to_string(),
            reason: err.to_string(),
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Accepts on `listener` until `shutdown` fires, then waits up to the
    /// shutdown timeout for open connections to finish.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();
        let limiter = server
            .config
            .max_connections()
            .map(|max| Arc::new(Semaphore::new(max)));

        loop {
            tokio::select! {
                accepted = accept(&listener, limiter.as_ref()) => match accepted {
                    Ok((stream, remote_addr, permit)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(err) = server.handle_connection(stream, remote_addr, shutdown).await {
                                debug!(remote_addr = %remote_addr, error = %err, "connection error");
                            }
                            drop(permit);
                            drop(token);
                        });
                    }
                    Err(err) => error!(error = %err, "failed to accept connection"),
                },

                () = shutdown.recv() => {
                    info!("shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        info!(
            active = tracker.active_connections(),
            timeout = ?shutdown_timeout,
            "waiting for open connections"
        );
        tokio::select! {
            () = tracker.wait_for_shutdown() => info!("all connections closed"),
            () = tokio::time::sleep(shutdown_timeout) => {
                warn!(active = tracker.active_connections(), "shutdown timeout reached");
            }
        }

        info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle(request).await) }
        });

        let mut builder = http1::Builder::new();
        builder.keep_alive(self.config.keep_alive());
        let conn = builder.serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => return result,
            () = shutdown.recv() => {
                debug!(remote_addr = %remote_addr, "closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
            }
        }
        conn.await
    }

    /// Handles one request: body read and dispatch, bounded by the request timeout.
    ///
    /// A caller-supplied `x-request-id` that parses as a UUID is reused,
    /// otherwise a fresh one is generated. Either way it is echoed back.
    pub async fn handle<B>(&self, request: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();

        let timeout = self.config.request_timeout();
        let result = match tokio::time::timeout(timeout, self.dispatch(request_id, request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(request_id = %request_id, timeout = ?timeout, "request timed out");
                RuntimeResult::status_text(StatusCode::GATEWAY_TIMEOUT)
            }
        };

        into_response(result, request_id)
    }

    async fn dispatch<B>(&self, request_id: RequestId, request: Request<B>) -> RuntimeResult
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let (mut parts, body) = request.into_parts();
        let body = match read_body(body, &mut parts.headers, self.config.body_limits()).await {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    http.method = %parts.method,
                    http.path = parts.uri.path(),
                    status = err.status_code().as_u16(),
                    "{err}"
                );
                return err.into_result();
            }
        };

        let request = Request::from_parts(parts, body);
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let extractor = BufferedExtractor::new(request);

        self.dispatcher
            .process_request_with_id(request_id, &method, &path, &extractor)
            .await
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

async fn accept(
    listener: &TcpListener,
    limiter: Option<&Arc<Semaphore>>,
) -> std::io::Result<(TcpStream, SocketAddr, Option<OwnedSemaphorePermit>)> {
    let permit = match limiter {
        Some(limiter) => Some(
            Arc::clone(limiter)
                .acquire_owned()
                .await
                .map_err(std::io::Error::other)?,
        ),
        None => None,
    };
    let (stream, remote_addr) = listener.accept().await?;
    Ok((stream, remote_addr, permit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::RuntimeApp;
    use std::time::Duration;

    fn empty_dispatcher() -> Arc<Dispatcher> {
        Arc::new(Dispatcher::builder(RuntimeApp::default()).build().unwrap())
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let config = ServerConfig::builder().http_addr("not-a-valid-address").build();
        let server = Server::new(config, empty_dispatcher());

        let err = server.run_with_shutdown(ShutdownSignal::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
        assert!(err.to_string().contains("invalid address"));
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let config = ServerConfig::builder()
            .http_addr("127.0.0.1:0")
            .shutdown_timeout(Duration::from_millis(100))
            .build();
        let server = Server::new(config, empty_dispatcher());

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;
        assert!(result.is_ok_and(|run| run.is_ok()));
    }
}
