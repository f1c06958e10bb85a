//! # Heron Core
//!
//! Shared types for the Heron request dispatcher.
//!
//! - [`RuntimeApp`], [`RuntimeController`], [`RuntimeRoute`], [`RuntimeInput`] - the
//!   static application descriptor
//! - [`Arg`], [`Args`], [`NativeRequest`] - handler arguments
//! - [`Reply`] and [`RuntimeResult`] - what handlers return and what transports send
//! - [`DispatchError`], [`HandlerError`], [`FieldErrors`] - the error taxonomy
//! - [`Validator`] and [`SchemaValidator`] - input coercion and validation
//! - [`RequestId`] - UUID v7 dispatch identifier

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arg;
mod cookie;
mod error;
mod model;
mod reply;
mod request_id;
mod result;
pub mod schema;
mod validate;

pub use arg::{Arg, Args, NativeRequest};
pub use cookie::{SameSite, SetCookie};
pub use error::{status_description, DispatchError, FieldErrors, HandlerError, HandlerResult};
pub use model::{is_array_type, InputLocation, RuntimeApp, RuntimeController, RuntimeInput, RuntimeRoute};
pub use reply::{Reply, ReplyBody};
pub use request_id::RequestId;
pub use result::{ResultBody, RuntimeResult, APPLICATION_JSON, OCTET_STREAM, TEXT_PLAIN};
pub use validate::{SchemaValidator, TypeDef, Validator};
