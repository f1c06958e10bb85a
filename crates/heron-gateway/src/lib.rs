//! # Heron Gateway
//!
//! Serverless transport: a [`GatewayHandler`] turns HTTP-API-style gateway
//! events into dispatches and the results into [`GatewayResponse`]s.
//!
//! ```rust
//! use std::sync::Arc;
//! use heron_core::{Args, Reply, RuntimeApp, RuntimeController, RuntimeRoute};
//! use heron_extract::GatewayEvent;
//! use heron_gateway::GatewayHandler;
//! use heron_runtime::{ControllerDef, ControllerRegistry, Dispatcher};
//! use http::Method;
//!
//! struct Health;
//!
//! let registry = ControllerRegistry::new().with(
//!     "health",
//!     ControllerDef::builder(|_| Ok(Health))
//!         .method("ping", |_this: Arc<Health>, _args: Args| async move { Ok(Reply::text("pong")) })
//!         .build(),
//! );
//! let app = RuntimeApp::new([
//!     RuntimeController::new("health").route(RuntimeRoute::new(Method::GET, "/ping", "ping")),
//! ]);
//! let dispatcher = Dispatcher::builder(app).registry(registry).build().unwrap();
//! let handler = GatewayHandler::new(Arc::new(dispatcher));
//!
//! let mut event = GatewayEvent::default();
//! event.route_key = "GET /ping".to_string();
//! event.raw_path = "/ping".to_string();
//!
//! # tokio_test::block_on(async {
//! let response = handler.handle(event).await;
//! assert_eq!(response.status_code, 200);
//! assert_eq!(response.body, "pong");
//! assert!(!response.is_base64_encoded);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/heron-gateway/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod response;

pub use error::GatewayError;
pub use handler::{GatewayHandler, DEFAULT_MAX_BODY_BYTES};
pub use response::GatewayResponse;
