//! Event-to-dispatch adapter.

use std::sync::Arc;

use heron_config::HeronConfig;
use heron_core::{DispatchError, RequestId};
use heron_extract::{EventExtractor, GatewayEvent};
use heron_runtime::Dispatcher;
use http::Method;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::response::GatewayResponse;

/// Default body limit, matching the embedded server.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Runs gateway events through a [`Dispatcher`].
///
/// Construct one per process and reuse it for every invocation: controller
/// instances live in the dispatcher and survive across events.
#[derive(Debug, Clone)]
pub struct GatewayHandler {
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
}

impl GatewayHandler {
    /// Creates a handler with the default body limit.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Creates a handler limited by the `body` section of `config`.
    #[must_use]
    pub fn from_config(dispatcher: Arc<Dispatcher>, config: &HeronConfig) -> Self {
        Self::new(dispatcher).with_max_body_bytes(config.body.max_bytes)
    }

    /// Sets the decoded body limit.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Largest accepted decoded body.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Dispatches one event.
    ///
    /// The event's request id is reused when it is a UUID. Oversize bodies
    /// get a 413 and unparseable methods a 400, both without dispatching.
    pub async fn handle(&self, event: GatewayEvent) -> GatewayResponse {
        let request_id = RequestId::parse(&event.request_context.request_id).unwrap_or_default();
        debug!(
            request_id = %request_id,
            gateway_request_id = %event.request_context.request_id,
            route_key = %event.route_key,
            "gateway event received"
        );

        let result = match self.method(&event) {
            Ok(method) => {
                let path = event.path().to_string();
                let extractor = EventExtractor::new(event);
                self.dispatcher
                    .process_request_with_id(request_id, &method, &path, &extractor)
                    .await
            }
            Err(err) => {
                warn!(request_id = %request_id, status = err.status_code().as_u16(), "{err}");
                err.into_result()
            }
        };

        GatewayResponse::from(result)
    }

    /// Parses a JSON event, dispatches it and serializes the response.
    pub async fn handle_json(&self, payload: &str) -> Result<String, GatewayError> {
        let event: GatewayEvent = serde_json::from_str(payload).map_err(GatewayError::InvalidEvent)?;
        let response = self.handle(event).await;
        serde_json::to_string(&response).map_err(GatewayError::Encode)
    }

    fn method(&self, event: &GatewayEvent) -> Result<Method, DispatchError> {
        if event.decoded_body_len() > self.max_body_bytes {
            return Err(DispatchError::payload_too_large(self.max_body_bytes));
        }
        let method = event.method();
        Method::from_bytes(method.as_bytes())
            .map_err(|_| DispatchError::bad_request(format!("invalid method '{method}'")))
    }
}
