//! Controller definitions and the registry that maps handler ids to them.
//!
//! A [`ControllerDef`] is what a class is to a dynamic runtime: a constructor,
//! named init hooks, and two method tables, one taking an instance and one
//! taking none. Definitions are built with typed closures and erased to
//! [`Any`], so a registry can hold controllers of unrelated types.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use heron_core::{Args, Reply};
//! use heron_runtime::{ControllerDef, ControllerRegistry};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let def = ControllerDef::builder(|args| {
//!     Ok(Greeter {
//!         greeting: args.get(0).unwrap_or("Hello").to_string(),
//!     })
//! })
//! .method("greet", |this: Arc<Greeter>, args: Args| async move {
//!     let name = args.str(0).unwrap_or("world").to_string();
//!     Ok(Reply::text(format!("{}, {name}!", this.greeting)))
//! })
//! .static_method("ping", |_args: Args| async { Ok(Reply::text("pong")) })
//! .build();
//!
//! let registry = ControllerRegistry::new().with("greeter", def);
//! assert!(registry.contains("greeter"));
//! ```

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use heron_core::{Args, DispatchError, HandlerResult, Reply};

/// A constructed controller, type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

type ErasedConstructor = Arc<dyn Fn(ConstructorArgs) -> anyhow::Result<Instance> + Send + Sync>;
type ErasedInit = Arc<dyn Fn(Instance) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
type ErasedMethod = Arc<dyn Fn(Instance, Args) -> BoxFuture<'static, HandlerResult<Reply>> + Send + Sync>;
type ErasedStatic = Arc<dyn Fn(Args) -> BoxFuture<'static, HandlerResult<Reply>> + Send + Sync>;

/// Constructor arguments resolved from the environment.
///
/// The constructor receives every declared source as one ordered list,
/// whatever their number. Unset sources are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructorArgs {
    values: Vec<(String, Option<String>)>,
}

impl ConstructorArgs {
    /// Creates the argument list from `(source, value)` pairs.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Value at `index`, if the source was set.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|(_, value)| value.as_deref())
    }

    /// Value of the source named `name`, if set.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(source, _)| source == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Value of `name`, or an error naming the missing source.
    pub fn require(&self, name: &str) -> anyhow::Result<&str> {
        self.by_name(name)
            .ok_or_else(|| anyhow::anyhow!("constructor argument '{name}' is not set"))
    }

    /// `(source, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(source, value)| (source.as_str(), value.as_deref()))
    }

    /// Number of declared sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no sources were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A registered controller class.
#[derive(Clone)]
pub struct ControllerDef {
    type_name: &'static str,
    constructor: Option<ErasedConstructor>,
    inits: HashMap<String, ErasedInit>,
    methods: HashMap<String, ErasedMethod>,
    statics: HashMap<String, ErasedStatic>,
}

impl ControllerDef {
    /// Starts a definition for a controller built by `constructor`.
    pub fn builder<T, F>(constructor: F) -> ControllerBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(ConstructorArgs) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let erased: ErasedConstructor = Arc::new(move |args: ConstructorArgs| -> anyhow::Result<Instance> {
            let instance: Instance = Arc::new(constructor(args)?);
            Ok(instance)
        });
        ControllerBuilder {
            def: Self::empty(type_name::<T>(), Some(erased)),
            _marker: PhantomData,
        }
    }

    /// Starts a definition that only has static methods.
    ///
    /// Instance routes on such a controller fail at dispatch.
    pub fn static_only(name: &'static str) -> ControllerBuilder<()> {
        ControllerBuilder {
            def: Self::empty(name, None),
            _marker: PhantomData,
        }
    }

    fn empty(type_name: &'static str, constructor: Option<ErasedConstructor>) -> Self {
        Self {
            type_name,
            constructor,
            inits: HashMap::new(),
            methods: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    /// Rust type name of the controller.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True if an instance method named `name` exists.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// True if a static method named `name` exists.
    #[must_use]
    pub fn has_static_method(&self, name: &str) -> bool {
        self.statics.contains_key(name)
    }

    pub(crate) fn construct(&self, args: ConstructorArgs) -> Result<Instance, DispatchError> {
        let constructor = self.constructor.as_ref().ok_or_else(|| {
            DispatchError::internal(format!("controller {} has no constructor", self.type_name))
        })?;
        constructor(args).map_err(|e| {
            DispatchError::internal_with_source(format!("failed to construct controller {}", self.type_name), e)
        })
    }

    pub(crate) async fn run_init(&self, name: &str, instance: Instance) -> Result<(), DispatchError> {
        let init = self.inits.get(name).ok_or_else(|| {
            DispatchError::internal(format!("controller {} has no init method '{name}'", self.type_name))
        })?;
        init(instance).await.map_err(|e| {
            DispatchError::internal_with_source(format!("init method '{name}' of {} failed", self.type_name), e)
        })
    }

    pub(crate) async fn call(&self, name: &str, instance: Instance, args: Args) -> HandlerResult<Reply> {
        let method = self.methods.get(name).ok_or_else(|| {
            DispatchError::internal(format!("controller {} has no method '{name}'", self.type_name))
        })?;
        method(instance, args).await
    }

    pub(crate) async fn call_static(&self, name: &str, args: Args) -> HandlerResult<Reply> {
        let method = self.statics.get(name).ok_or_else(|| {
            DispatchError::internal(format!("controller {} has no static method '{name}'", self.type_name))
        })?;
        method(args).await
    }
}

impl fmt::Debug for ControllerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        let mut statics: Vec<_> = self.statics.keys().collect();
        statics.sort();
        f.debug_struct("ControllerDef")
            .field("type_name", &self.type_name)
            .field("constructible", &self.constructor.is_some())
            .field("methods", &methods)
            .field("statics", &statics)
            .finish_non_exhaustive()
    }
}

/// Typed builder for a [`ControllerDef`].
pub struct ControllerBuilder<T> {
    def: ControllerDef,
    _marker: PhantomData<fn() -> T>,
}

fn mismatch<T, R, E>() -> BoxFuture<'static, Result<R, E>>
where
    R: Send + 'static,
    E: From<DispatchError> + Send + 'static,
{
    let result: Result<R, E> = Err(E::from(DispatchError::internal(format!(
        "controller instance is not a {}",
        type_name::<T>()
    ))));
    Box::pin(async move { result })
}

impl<T: Send + Sync + 'static> ControllerBuilder<T> {
    /// Adds an init hook that can be named by a controller's `init_method`.
    pub fn init<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let erased: ErasedInit = Arc::new(move |instance: Instance| -> BoxFuture<'static, anyhow::Result<()>> {
            match instance.downcast::<T>() {
                Ok(this) => Box::pin(hook(this)),
                Err(_) => mismatch::<T, _, _>(),
            }
        });
        self.def.inits.insert(name.into(), erased);
        self
    }

    /// Adds an instance method.
    pub fn method<F, Fut>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(Arc<T>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Reply>> + Send + 'static,
    {
        let erased: ErasedMethod =
            Arc::new(move |instance: Instance, args: Args| -> BoxFuture<'static, HandlerResult<Reply>> {
                match instance.downcast::<T>() {
                    Ok(this) => Box::pin(method(this, args)),
                    Err(_) => mismatch::<T, _, _>(),
                }
            });
        self.def.methods.insert(name.into(), erased);
        self
    }

    /// Adds a static method, called without an instance.
    pub fn static_method<F, Fut>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Reply>> + Send + 'static,
    {
        let erased: ErasedStatic =
            Arc::new(move |args: Args| -> BoxFuture<'static, HandlerResult<Reply>> { Box::pin(method(args)) });
        self.def.statics.insert(name.into(), erased);
        self
    }

    /// Finishes the definition.
    #[must_use]
    pub fn build(self) -> ControllerDef {
        self.def
    }
}

/// Maps handler ids to controller definitions.
///
/// Built once at startup, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    defs: HashMap<String, Arc<ControllerDef>>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, replacing any earlier one for `handler_id`.
    pub fn register(&mut self, handler_id: impl Into<String>, def: ControllerDef) {
        self.defs.insert(handler_id.into(), Arc::new(def));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, handler_id: impl Into<String>, def: ControllerDef) -> Self {
        self.register(handler_id, def);
        self
    }

    /// The definition for `handler_id`.
    #[must_use]
    pub fn get(&self, handler_id: &str) -> Option<Arc<ControllerDef>> {
        self.defs.get(handler_id).cloned()
    }

    /// True if `handler_id` is registered.
    #[must_use]
    pub fn contains(&self, handler_id: &str) -> bool {
        self.defs.contains_key(handler_id)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::Arg;

    struct Counter {
        start: i64,
    }

    fn counter_def() -> ControllerDef {
        ControllerDef::builder(|args: ConstructorArgs| {
            let start = args.require("START")?.parse()?;
            Ok(Counter { start })
        })
        .method("add", |this: Arc<Counter>, args: Args| async move {
            Ok(Reply::json((this.start + args.i64(0).unwrap_or(0)).into()))
        })
        .build()
    }

    #[test]
    fn test_constructor_args() {
        let args = ConstructorArgs::new([("A".to_string(), Some("1".to_string())), ("B".to_string(), None)]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(0), Some("1"));
        assert_eq!(args.get(1), None);
        assert_eq!(args.by_name("A"), Some("1"));
        assert!(args.require("B").is_err());
        assert_eq!(args.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_construct_and_call() {
        let def = counter_def();
        let instance = def
            .construct(ConstructorArgs::new([("START".to_string(), Some("10".to_string()))]))
            .unwrap();
        let reply = def
            .call("add", instance, Args::new(vec![Some(Arg::Json(5.into()))]))
            .await
            .unwrap();
        assert_eq!(reply.into_result().body_text(), Some("15"));
    }

    #[test]
    fn test_constructor_failure_is_internal() {
        let err = counter_def().construct(ConstructorArgs::default()).unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_method_is_internal() {
        let def = counter_def();
        let instance = def
            .construct(ConstructorArgs::new([("START".to_string(), Some("0".to_string()))]))
            .unwrap();
        let err = def.call("missing", instance, Args::default()).await.unwrap_err();
        assert_eq!(err.into_dispatch().status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_internal() {
        let def = counter_def();
        let wrong: Instance = Arc::new("not a counter");
        assert!(def.call("add", wrong, Args::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_static_only() {
        let def = ControllerDef::static_only("Health")
            .static_method("ping", |_args: Args| async { Ok(Reply::text("pong")) })
            .build();
        assert!(def.has_static_method("ping"));
        assert!(def.construct(ConstructorArgs::default()).is_err());
        let reply = def.call_static("ping", Args::default()).await.unwrap();
        assert_eq!(reply.into_result().body_text(), Some("pong"));
    }

    #[test]
    fn test_registry() {
        let mut registry = ControllerRegistry::new();
        assert!(registry.is_empty());
        registry.register("counter", counter_def());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("counter").is_some_and(|d| d.has_method("add")));
        assert!(registry.get("other").is_none());
    }
}
