//! # Heron Config
//!
//! Typed configuration for Heron services.
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! # max_connections = 1024
//!
//! [body]
//! max_bytes = 1048576
//! decompress = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! include_location = false
//! ```
//!
//! Every field can be overridden from the environment as
//! `HERON__SECTION__KEY`, e.g. `HERON__BODY__MAX_BYTES=65536`.

#![doc(html_root_url = "https://docs.rs/heron-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HeronConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use schema::{BodySection, LogFormat, LoggingConfig, ServerSection};
