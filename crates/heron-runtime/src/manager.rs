//! Lazy, at-most-once controller lifecycle.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use heron_core::{Args, DispatchError, HandlerResult, Reply, RuntimeController};
use tracing::{debug, info, warn};

use crate::controller::{ConstructorArgs, ControllerDef, ControllerRegistry, Instance};
use crate::environment::Environment;

type Initializing = Shared<BoxFuture<'static, Result<Instance, Arc<DispatchError>>>>;

/// Owns one controller's definition lookup and its single instance.
///
/// The first caller of [`get_instance`](Self::get_instance) installs the
/// initialization future: construction followed by the init hook. Every
/// caller, including ones arriving later, awaits that same future, so a
/// caller that is dropped midway does not restart it. If construction or
/// init fails the future is discarded and a later call starts over.
pub struct ControllerManager {
    handler_id: String,
    ctor_arg_sources: Vec<String>,
    init_method: Option<String>,
    registry: Arc<ControllerRegistry>,
    environment: Arc<dyn Environment>,
    class: OnceLock<Arc<ControllerDef>>,
    instance: OnceLock<Instance>,
    initializing: Mutex<Option<Initializing>>,
}

impl ControllerManager {
    /// Creates a manager for `controller`. Nothing is resolved yet.
    pub fn new(
        controller: &RuntimeController,
        registry: Arc<ControllerRegistry>,
        environment: Arc<dyn Environment>,
    ) -> Self {
        Self {
            handler_id: controller.handler_id.clone(),
            ctor_arg_sources: controller.ctor_arg_sources.clone(),
            init_method: controller.init_method.clone(),
            registry,
            environment,
            class: OnceLock::new(),
            instance: OnceLock::new(),
            initializing: Mutex::new(None),
        }
    }

    /// The controller's handler id.
    #[must_use]
    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    /// True once an instance has been constructed and initialized.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Resolves the controller definition, caching it on success.
    pub fn get_class(&self) -> Result<Arc<ControllerDef>, DispatchError> {
        if let Some(class) = self.class.get() {
            return Ok(Arc::clone(class));
        }
        let class = self.registry.get(&self.handler_id).ok_or_else(|| {
            DispatchError::internal(format!("no controller registered for handler id '{}'", self.handler_id))
        })?;
        Ok(Arc::clone(self.class.get_or_init(|| class)))
    }

    /// Returns the ready instance, constructing and initializing it first if needed.
    pub async fn get_instance(&self) -> Result<Instance, DispatchError> {
        if let Some(instance) = self.instance.get() {
            return Ok(Arc::clone(instance));
        }

        let initializing = {
            let mut slot = self.initializing.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(initializing) => initializing.clone(),
                None => slot.insert(self.initialize()?).clone(),
            }
        };

        match initializing.clone().await {
            Ok(instance) => {
                let ready = self.instance.get_or_init(|| instance);
                self.clear_initializing(&initializing);
                Ok(Arc::clone(ready))
            }
            Err(err) => {
                self.clear_initializing(&initializing);
                warn!(controller = %self.handler_id, error = %err, "controller initialization failed");
                Err(DispatchError::internal_with_source(
                    format!("controller '{}' failed to initialize", self.handler_id),
                    err,
                ))
            }
        }
    }

    fn initialize(&self) -> Result<Initializing, DispatchError> {
        let class = self.get_class()?;
        let args = self.constructor_args();
        let handler_id = self.handler_id.clone();
        let init_method = self.init_method.clone();

        let future = async move {
            let instance = class.construct(args)?;
            debug!(controller = %handler_id, "controller constructed");

            if let Some(init) = &init_method {
                class.run_init(init, Arc::clone(&instance)).await?;
            }
            info!(
                controller = %handler_id,
                init_method = init_method.as_deref().unwrap_or("-"),
                "controller initialized"
            );
            Ok::<_, DispatchError>(instance)
        };
        Ok(future.map(|result| result.map_err(Arc::new)).boxed().shared())
    }

    fn clear_initializing(&self, finished: &Initializing) {
        let mut slot = self.initializing.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(finished)) {
            *slot = None;
        }
    }

    fn constructor_args(&self) -> ConstructorArgs {
        ConstructorArgs::new(
            self.ctor_arg_sources
                .iter()
                .map(|source| (source.clone(), self.environment.var(source))),
        )
    }

    /// Calls an instance method on the ready instance.
    pub async fn invoke_instance_method(&self, name: &str, args: Args) -> HandlerResult<Reply> {
        let instance = self.get_instance().await?;
        self.get_class()?.call(name, instance, args).await
    }

    /// Calls a static method without constructing an instance.
    pub async fn invoke_static_method(&self, name: &str, args: Args) -> HandlerResult<Reply> {
        self.get_class()?.call_static(name, args).await
    }
}

impl std::fmt::Debug for ControllerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerManager")
            .field("handler_id", &self.handler_id)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MapEnvironment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        dsn: String,
    }

    fn registry(attempts: Arc<AtomicUsize>) -> Arc<ControllerRegistry> {
        let def = ControllerDef::builder(|args: ConstructorArgs| {
            Ok(Flaky {
                dsn: args.get(0).unwrap_or_default().to_string(),
            })
        })
        .init("connect", move |_this: Arc<Flaky>| {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("connection refused");
                }
                Ok(())
            }
        })
        .method("dsn", |this: Arc<Flaky>, _args: Args| async move { Ok(Reply::text(this.dsn.clone())) })
        .build();
        Arc::new(ControllerRegistry::new().with("flaky", def))
    }

    fn manager(registry: Arc<ControllerRegistry>) -> ControllerManager {
        let controller = RuntimeController::new("flaky")
            .ctor_arg("DSN")
            .init_method("connect");
        let env = MapEnvironment::new().with("DSN", "mem://db");
        ControllerManager::new(&controller, registry, Arc::new(env))
    }

    #[tokio::test]
    async fn test_failed_init_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = manager(registry(Arc::clone(&attempts)));

        let err = manager.get_instance().await.unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!manager.is_ready());

        let reply = manager.invoke_instance_method("dsn", Args::default()).await.unwrap();
        assert_eq!(reply.into_result().body_text(), Some("mem://db"));
        assert!(manager.is_ready());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_restart_init() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let init_started = Arc::new(AtomicUsize::new(0));
        let (ctor_count, init_count) = (Arc::clone(&constructed), Arc::clone(&init_started));

        let def = ControllerDef::builder(move |_| {
            ctor_count.fetch_add(1, Ordering::SeqCst);
            Ok(Flaky { dsn: String::new() })
        })
        .init("connect", move |_this: Arc<Flaky>| {
            let init_count = Arc::clone(&init_count);
            async move {
                init_count.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                Ok(())
            }
        })
        .build();
        let manager = manager(Arc::new(ControllerRegistry::new().with("flaky", def)));

        let first = tokio::time::timeout(std::time::Duration::from_millis(50), manager.get_instance()).await;
        assert!(first.is_err());
        assert!(!manager.is_ready());

        manager.get_instance().await.unwrap();
        assert!(manager.is_ready());
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert_eq!(init_started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_handler_id() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let controller = RuntimeController::new("ghost");
        let manager = ControllerManager::new(&controller, registry(attempts), Arc::new(MapEnvironment::new()));

        assert!(manager.get_class().is_err());
        let err = manager.invoke_static_method("anything", Args::default()).await.unwrap_err();
        assert_eq!(err.into_dispatch().status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_static_call_does_not_construct() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = manager(registry(Arc::clone(&attempts)));
        assert!(manager.invoke_static_method("missing", Args::default()).await.is_err());
        assert!(!manager.is_ready());
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }
}
