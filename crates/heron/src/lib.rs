//! # Heron
//!
//! **Transport-agnostic request dispatch for controller-based handlers**
//!
//! One [`Dispatcher`](runtime::Dispatcher) serves both an embedded HTTP
//! listener and serverless gateway events:
//!
//! - **Route matching** on method and path, literals before parameters
//! - **Lazy controllers** constructed and initialized at most once, on first use
//! - **Input extraction** from path, query, headers, cookies and body
//! - **Aggregated validation** against declared types before any handler runs
//! - **Uniform results** serialized by each transport onto its own wire format
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use heron::prelude::*;
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_optional_file("heron.toml")?.load()?;
//!     init_logging(&LogConfig::from(&config.logging))?;
//!
//!     let registry = ControllerRegistry::new().with(
//!         "greeter",
//!         ControllerDef::builder(|args: ConstructorArgs| {
//!             Ok(Greeter { greeting: args.get(0).unwrap_or("hello").to_string() })
//!         })
//!         .method("greet", |this: Arc<Greeter>, args: Args| async move {
//!             Ok(Reply::text(format!("{}, {}", this.greeting, args.str(0).unwrap_or("world"))))
//!         })
//!         .build(),
//!     );
//!
//!     let app = RuntimeApp::new([RuntimeController::new("greeter")
//!         .ctor_arg("GREETING")
//!         .route(
//!             RuntimeRoute::new(http::Method::GET, "/greet/:name", "greet")
//!                 .input(RuntimeInput::path("name", "string")),
//!         )]);
//!
//!     let dispatcher = Dispatcher::builder(app).registry(registry).build()?;
//!     Server::new(ServerConfig::from(&config), Arc::new(dispatcher)).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! transport ──► (method, path, extractor) ──► Router ──► extract ──► validate ──► controller
//!                                                                                    │
//! transport ◄── serialize ◄────────────── RuntimeResult ◄── shape reply ◄────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/heron/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use heron_config as config;
pub use heron_core as core;
pub use heron_extract as extract;
pub use heron_gateway as gateway;
pub use heron_router as router;
pub use heron_runtime as runtime;
pub use heron_server as server;
pub use heron_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use heron::prelude::*;
///
/// let reply = Reply::text("ok");
/// assert_eq!(reply.into_result().body_text(), Some("ok"));
/// ```
pub mod prelude {
    pub use heron_core::{
        Arg, Args, DispatchError, FieldErrors, HandlerError, HandlerResult, InputLocation, Reply, RequestId,
        RuntimeApp, RuntimeController, RuntimeInput, RuntimeResult, RuntimeRoute, SchemaValidator, SetCookie,
        Validator,
    };

    pub use heron_extract::{BufferedExtractor, EventExtractor, GatewayEvent, InputExtractor};

    pub use heron_runtime::{
        ConstructorArgs, ControllerDef, ControllerRegistry, Dispatcher, Environment, MapEnvironment,
        ProcessEnvironment,
    };

    pub use heron_server::{Server, ServerConfig, ShutdownSignal};

    pub use heron_gateway::{GatewayHandler, GatewayResponse};

    pub use heron_config::{ConfigLoader, HeronConfig};

    pub use heron_telemetry::{init_logging, LogConfig};
}
