//! The request dispatch pipeline.
//!
//! ```text
//! (method, path) ──► router ──► extract inputs ──► validate ──► controller ──► Reply ──► RuntimeResult
//!                      │             │                 │             │
//!                     404           400               400           500
//! ```
//!
//! Any failing step ends the dispatch with that error's plain-text result.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use heron_core::{
    DispatchError, HandlerError, InputLocation, RequestId, RuntimeApp, RuntimeResult, RuntimeRoute,
    SchemaValidator, Validator,
};
use heron_extract::InputExtractor;
use heron_router::{pattern_params, Router};
use http::Method;
use tracing::{debug, error, field, info_span, warn, Instrument, Span};

use crate::controller::ControllerRegistry;
use crate::environment::{Environment, ProcessEnvironment};
use crate::error::BuildError;
use crate::manager::ControllerManager;

struct RouteEntry {
    route: RuntimeRoute,
    manager: Arc<ControllerManager>,
}

/// Dispatches requests for one [`RuntimeApp`].
///
/// Holds the route table, one [`ControllerManager`] per controller and the
/// validator. Everything is built up front; dispatching only reads.
pub struct Dispatcher {
    router: Router<RouteEntry>,
    managers: HashMap<String, Arc<ControllerManager>>,
    validator: Arc<dyn Validator>,
}

impl Dispatcher {
    /// Starts building a dispatcher for `app`.
    #[must_use]
    pub fn builder(app: RuntimeApp) -> DispatcherBuilder {
        DispatcherBuilder {
            app,
            registry: ControllerRegistry::new(),
            validator: None,
            environment: None,
        }
    }

    /// Number of routes served.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// The manager for `handler_id`.
    #[must_use]
    pub fn manager(&self, handler_id: &str) -> Option<&Arc<ControllerManager>> {
        self.managers.get(handler_id)
    }

    /// Dispatches one request under a fresh [`RequestId`].
    pub async fn process_request(
        &self,
        method: &Method,
        path: &str,
        extractor: &dyn InputExtractor,
    ) -> RuntimeResult {
        self.process_request_with_id(RequestId::new(), method, path, extractor)
            .await
    }

    /// Dispatches one request.
    ///
    /// Never fails: errors are turned into their plain-text result.
    pub async fn process_request_with_id(
        &self,
        request_id: RequestId,
        method: &Method,
        path: &str,
        extractor: &dyn InputExtractor,
    ) -> RuntimeResult {
        let span = info_span!(
            "dispatch",
            request_id = %request_id,
            http.method = %method,
            http.path = %path,
            controller = field::Empty,
            handler = field::Empty,
        );

        async move {
            match self.dispatch(method, path, extractor).await {
                Ok(result) => {
                    debug!(status = result.status_code.as_u16(), "dispatch complete");
                    result
                }
                Err(err) => {
                    log_failure(&err);
                    err.into_result()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        extractor: &dyn InputExtractor,
    ) -> Result<RuntimeResult, DispatchError> {
        let matched = self
            .router
            .match_route(method, path)
            .ok_or_else(|| DispatchError::not_found(format!("no route for {method} {path}")))?;
        let entry = matched.value;
        let route = &entry.route;

        let span = Span::current();
        span.record("controller", entry.manager.handler_id());
        span.record("handler", route.target_method.as_str());
        debug!(pattern = matched.pattern, "route matched");

        let raw = route
            .inputs
            .iter()
            .map(|input| extractor.extract(input, &matched.params))
            .collect::<Result<Vec<_>, _>>()?;
        let args = self.validator.validate(&route.inputs, raw)?;
        debug!(inputs = args.len(), "inputs validated");

        let outcome = if route.static_method {
            entry
                .manager
                .invoke_static_method(&route.target_method, args)
                .await
        } else {
            entry
                .manager
                .invoke_instance_method(&route.target_method, args)
                .await
        };
        let reply = outcome.map_err(HandlerError::into_dispatch)?;

        Ok(reply.into_result())
    }
}

fn log_failure(err: &DispatchError) {
    if err.is_client_error() {
        match err.field_errors() {
            Some(fields) => warn!(status = err.status_code().as_u16(), fields = ?fields.fields, "{err}"),
            None => warn!(status = err.status_code().as_u16(), "{err}"),
        }
    } else {
        let mut causes = Vec::new();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        error!(status = err.status_code().as_u16(), cause = %causes.join(": "), "{err}");
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.router.len())
            .field("controllers", &self.managers.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
///
/// Defaults: an empty registry, [`SchemaValidator::new`] and the process
/// environment.
pub struct DispatcherBuilder {
    app: RuntimeApp,
    registry: ControllerRegistry,
    validator: Option<Arc<dyn Validator>>,
    environment: Option<Arc<dyn Environment>>,
}

impl DispatcherBuilder {
    /// Sets the controller registry.
    #[must_use]
    pub fn registry(mut self, registry: ControllerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets the environment constructor arguments are read from.
    #[must_use]
    pub fn environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Arc::new(environment));
        self
    }

    /// Checks the app and builds the route table.
    ///
    /// Fails on colliding or malformed patterns, on pattern parameters that
    /// differ from the route's path inputs, and on declared types the
    /// validator does not support. Handler ids missing from the registry are
    /// only detected at dispatch.
    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let validator: Arc<dyn Validator> = match self.validator {
            Some(validator) => validator,
            None => Arc::new(SchemaValidator::new()),
        };
        let environment: Arc<dyn Environment> = match self.environment {
            Some(environment) => environment,
            None => Arc::new(ProcessEnvironment),
        };
        let registry = Arc::new(self.registry);

        let mut router = Router::new();
        let mut managers = HashMap::new();

        for controller in self.app.controllers {
            if managers.contains_key(&controller.handler_id) {
                return Err(BuildError::DuplicateController {
                    handler_id: controller.handler_id,
                });
            }
            let manager = Arc::new(ControllerManager::new(
                &controller,
                Arc::clone(&registry),
                Arc::clone(&environment),
            ));

            for mut route in controller.routes {
                check_route(&controller.handler_id, &route, validator.as_ref())?;
                for input in &mut route.inputs {
                    input.multi_valued = validator.is_list(&input.declared_type);
                }
                let (method, pattern) = (route.method.clone(), route.path_pattern.clone());
                router.insert(
                    method,
                    &pattern,
                    RouteEntry {
                        route,
                        manager: Arc::clone(&manager),
                    },
                )?;
            }

            managers.insert(controller.handler_id, manager);
        }

        debug!(routes = router.len(), controllers = managers.len(), "dispatcher built");
        Ok(Dispatcher {
            router,
            managers,
            validator,
        })
    }
}

fn check_route(handler_id: &str, route: &RuntimeRoute, validator: &dyn Validator) -> Result<(), BuildError> {
    let in_pattern: BTreeSet<String> = pattern_params(&route.path_pattern)?.into_iter().collect();
    let in_inputs: BTreeSet<String> = route
        .inputs
        .iter()
        .filter(|input| input.location == InputLocation::Path)
        .map(|input| input.name.clone())
        .collect();

    if in_pattern != in_inputs {
        return Err(BuildError::PathParams {
            handler_id: handler_id.to_string(),
            method: route.method.clone(),
            pattern: route.path_pattern.clone(),
            pattern_params: in_pattern.into_iter().collect(),
            path_inputs: in_inputs.into_iter().collect(),
        });
    }

    if let Some(input) = route
        .inputs
        .iter()
        .find(|input| !validator.supports(&input.declared_type))
    {
        return Err(BuildError::UnsupportedType {
            handler_id: handler_id.to_string(),
            method: route.method.clone(),
            pattern: route.path_pattern.clone(),
            declared_type: input.declared_type.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{RuntimeController, RuntimeInput};
    use heron_router::RouterError;

    fn app(routes: Vec<RuntimeRoute>) -> RuntimeApp {
        let controller = routes
            .into_iter()
            .fold(RuntimeController::new("users"), RuntimeController::route);
        RuntimeApp::new([controller])
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let app = app(vec![
            RuntimeRoute::new(Method::GET, "/users/:id", "get").input(RuntimeInput::path("id", "string")),
            RuntimeRoute::new(Method::GET, "/users/{key}/", "find").input(RuntimeInput::path("key", "string")),
        ]);
        let err = Dispatcher::builder(app).build().unwrap_err();
        assert!(matches!(err, BuildError::Route(RouterError::Conflict { .. })));
    }

    #[test]
    fn test_path_params_must_match_inputs() {
        let missing_input = app(vec![RuntimeRoute::new(Method::GET, "/users/:id", "get")]);
        assert!(matches!(
            Dispatcher::builder(missing_input).build(),
            Err(BuildError::PathParams { .. })
        ));

        let extra_input = app(vec![RuntimeRoute::new(Method::GET, "/users", "list")
            .input(RuntimeInput::path("id", "string"))]);
        assert!(matches!(
            Dispatcher::builder(extra_input).build(),
            Err(BuildError::PathParams { .. })
        ));
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let app = app(vec![RuntimeRoute::new(Method::POST, "/users", "create")
            .input(RuntimeInput::body("UserPayload"))]);
        let err = Dispatcher::builder(app).build().unwrap_err();
        assert!(err.to_string().contains("UserPayload"));
    }

    #[test]
    fn test_duplicate_handler_id_rejected() {
        let app = RuntimeApp::new([
            RuntimeController::new("users").route(RuntimeRoute::new(Method::GET, "/users", "list")),
            RuntimeController::new("users").route(RuntimeRoute::new(Method::GET, "/people", "list")),
        ]);
        let err = Dispatcher::builder(app).build().unwrap_err();
        assert!(matches!(err, BuildError::DuplicateController { ref handler_id } if handler_id == "users"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let app = app(vec![RuntimeRoute::new(Method::GET, "/users/:", "get")]);
        assert!(matches!(
            Dispatcher::builder(app).build(),
            Err(BuildError::Route(RouterError::InvalidPattern { .. }))
        ));
    }

    #[test]
    fn test_unknown_handler_id_builds() {
        let app = app(vec![RuntimeRoute::new(Method::GET, "/users", "list")]);
        let dispatcher = Dispatcher::builder(app).build().unwrap();
        assert_eq!(dispatcher.route_count(), 1);
        assert!(dispatcher.manager("users").is_some_and(|m| !m.is_ready()));
    }
}
