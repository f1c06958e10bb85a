//! # Heron Server
//!
//! Embedded HTTP/1.1 transport for a [`heron_runtime::Dispatcher`], built on
//! hyper and Tokio.
//!
//! - bounded body reading with `gzip`/`deflate` decoding ([`read_body`])
//! - per-request timeout (504) and `x-request-id` propagation
//! - one `Set-Cookie` header per result cookie ([`into_response`])
//! - graceful shutdown on SIGTERM/SIGINT or a [`ShutdownSignal`]
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use heron_core::RuntimeApp;
//! use heron_runtime::Dispatcher;
//! use heron_server::{Server, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::builder(RuntimeApp::default()).build()?;
//! let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!
//! Server::new(config, Arc::new(dispatcher)).run().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/heron-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod config;
mod error;
mod response;
mod server;
mod shutdown;

pub use body::{read_body, BodyLimits};
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::ServerError;
pub use response::{into_response, HttpResponse, ResponseBody, REQUEST_ID_HEADER};
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
