//! # Heron Runtime
//!
//! The transport-agnostic dispatch pipeline.
//!
//! - [`ControllerRegistry`] maps handler ids to [`ControllerDef`]s: a
//!   constructor plus tables of init hooks, instance methods and static methods.
//! - [`ControllerManager`] constructs and initializes a controller at most once,
//!   on first use, however many requests race for it.
//! - [`Dispatcher`] ties route matching, input extraction, validation,
//!   invocation and result shaping together.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use heron_core::{Args, Reply, RuntimeApp, RuntimeController, RuntimeInput, RuntimeRoute};
//! use heron_extract::BufferedExtractor;
//! use heron_runtime::{ControllerDef, ControllerRegistry, Dispatcher, MapEnvironment};
//! use http::{Method, Request, StatusCode};
//!
//! struct Users;
//!
//! let registry = ControllerRegistry::new().with(
//!     "users",
//!     ControllerDef::builder(|_| Ok(Users))
//!         .method("get", |_this: Arc<Users>, args: Args| async move {
//!             Ok(Reply::json(serde_json::json!({ "id": args.i64(0) })))
//!         })
//!         .build(),
//! );
//!
//! let app = RuntimeApp::new([RuntimeController::new("users").route(
//!     RuntimeRoute::new(Method::GET, "/users/:id", "get").input(RuntimeInput::path("id", "integer")),
//! )]);
//!
//! let dispatcher = Dispatcher::builder(app)
//!     .registry(registry)
//!     .environment(MapEnvironment::new())
//!     .build()
//!     .unwrap();
//!
//! let request = Request::get("/users/42").body(Bytes::new()).unwrap();
//! let extractor = BufferedExtractor::new(request);
//!
//! # tokio_test::block_on(async {
//! let result = dispatcher.process_request(&Method::GET, "/users/42", &extractor).await;
//! assert_eq!(result.status_code, StatusCode::OK);
//! assert_eq!(result.body_text(), Some(r#"{"id":42}"#));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/heron-runtime/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
mod dispatcher;
mod environment;
mod error;
mod manager;

pub use controller::{ConstructorArgs, ControllerBuilder, ControllerDef, ControllerRegistry, Instance};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use environment::{Environment, MapEnvironment, ProcessEnvironment};
pub use error::BuildError;
pub use manager::ControllerManager;
