//! Static registry of controllers, middlewares and function targets.
//!
//! Controllers annotated with `#[controller]` submit a [`ControllerEntry`] at
//! link time; middlewares and functions can do the same through
//! [`register_middleware!`](crate::register_middleware) and
//! [`register_function!`](crate::register_function). [`Registry::discovered`]
//! collects every submission, and the explicit `register_*` methods cover
//! programmatic registration.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::controller::{Controller, InvokeError};
use crate::declaration::{ControllerDeclaration, MiddlewareArg};
use crate::error::{Error, Result};
use crate::message::{Request, Response};
use crate::middleware::{self, Middleware, MiddlewareError};
use crate::scanner::QualifiedName;

/// Builds a middleware from its declared literal arguments.
pub type MiddlewareFactory =
    dyn Fn(&[MiddlewareArg]) -> Result<Arc<dyn Middleware>, MiddlewareError> + Send + Sync;

/// A named function target; receives the request and its captures in declared order.
pub type FunctionHandler =
    dyn Fn(&Request, &[String]) -> Result<Response, InvokeError> + Send + Sync;

/// Link-time registration of a controller type.
pub struct ControllerEntry {
    /// Fully qualified type name, equal to `declaration().type_name`.
    pub type_name: &'static str,
    pub declaration: fn() -> ControllerDeclaration,
    pub create: fn() -> Box<dyn Controller>,
}

inventory::collect!(ControllerEntry);

/// Link-time registration of a middleware factory.
pub struct MiddlewareEntry {
    pub name: &'static str,
    pub factory: fn(&[MiddlewareArg]) -> Result<Arc<dyn Middleware>, MiddlewareError>,
}

inventory::collect!(MiddlewareEntry);

/// Link-time registration of a function target.
pub struct FunctionEntry {
    pub name: &'static str,
    pub handler: fn(&Request, &[String]) -> Result<Response, InvokeError>,
}

inventory::collect!(FunctionEntry);

/// Construct a default controller value; used as the `create` hook of entries.
pub fn instantiate<C>() -> Box<dyn Controller>
where
    C: Controller + Default + 'static,
{
    Box::new(C::default())
}

/// A controller known to the registry.
#[derive(Clone, Debug)]
pub struct RegisteredController {
    pub type_name: String,
    pub declaration: fn() -> ControllerDeclaration,
    pub create: fn() -> Box<dyn Controller>,
}

/// Lookup tables for everything a compiled route may reference by name.
pub struct Registry {
    controllers: BTreeMap<String, RegisteredController>,
    middlewares: HashMap<String, Arc<MiddlewareFactory>>,
    functions: HashMap<String, Arc<FunctionHandler>>,
}

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::discovered()));

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding only the built-in middlewares.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            controllers: BTreeMap::new(),
            middlewares: HashMap::new(),
            functions: HashMap::new(),
        };
        middleware::register_builtins(&mut registry);
        registry
    }

    /// Built-ins plus every link-time submission.
    #[must_use]
    pub fn discovered() -> Self {
        let mut registry = Self::new();
        for entry in inventory::iter::<ControllerEntry> {
            registry.insert_controller(RegisteredController {
                type_name: entry.type_name.to_string(),
                declaration: entry.declaration,
                create: entry.create,
            });
        }
        for entry in inventory::iter::<MiddlewareEntry> {
            registry.register_middleware(entry.name, entry.factory);
        }
        for entry in inventory::iter::<FunctionEntry> {
            registry.register_function(entry.name, entry.handler);
        }
        debug!(
            controllers = registry.controllers.len(),
            middlewares = registry.middlewares.len(),
            functions = registry.functions.len(),
            "Registry discovered"
        );
        registry
    }

    /// The process-wide discovered registry, built on first use.
    #[must_use]
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    pub fn register_controller<C>(&mut self) -> &mut Self
    where
        C: Controller + Default + 'static,
    {
        self.insert_controller(RegisteredController {
            type_name: C::declaration().type_name,
            declaration: C::declaration,
            create: instantiate::<C>,
        });
        self
    }

    pub fn register_middleware<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[MiddlewareArg]) -> Result<Arc<dyn Middleware>, MiddlewareError>
            + Send
            + Sync
            + 'static,
    {
        self.middlewares.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn register_function<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Request, &[String]) -> Result<Response, InvokeError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(handler));
        self
    }

    fn insert_controller(&mut self, controller: RegisteredController) {
        self.controllers
            .insert(controller.type_name.clone(), controller);
    }

    #[must_use]
    pub fn controller(&self, type_name: &str) -> Option<&RegisteredController> {
        self.controllers.get(type_name)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &RegisteredController> {
        self.controllers.values()
    }

    #[must_use]
    pub fn middleware_factory(&self, name: &str) -> Option<&MiddlewareFactory> {
        self.middlewares.get(name).map(|f| &**f)
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionHandler> {
        self.functions.get(name).map(|f| &**f)
    }

    /// Resolve a scanned type name against registered controllers.
    ///
    /// A registered name matches when it equals the scanned name or ends with
    /// `::` followed by it. `Ok(None)` means the type is not a controller.
    pub fn controller_for(&self, name: &QualifiedName) -> Result<Option<&RegisteredController>> {
        let full = name.to_string();
        let suffix = format!("::{full}");
        let matches: Vec<&RegisteredController> = self
            .controllers
            .values()
            .filter(|c| c.type_name == full || c.type_name.ends_with(&suffix))
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            many => {
                let candidates: Vec<&str> = many.iter().map(|c| c.type_name.as_str()).collect();
                Err(Error::compilation(format!(
                    "`{full}` matches several registered controllers: {}",
                    candidates.join(", ")
                )))
            }
        }
    }
}

/// Submit a middleware factory to the link-time registry.
///
/// ```rust,ignore
/// routeforge::register_middleware!("RequireJson", RequireJson::from_args);
/// ```
#[macro_export]
macro_rules! register_middleware {
    ($name:expr, $factory:path) => {
        $crate::inventory::submit! {
            $crate::registry::MiddlewareEntry {
                name: $name,
                factory: $factory,
            }
        }
    };
}

/// Submit a function target to the link-time registry.
#[macro_export]
macro_rules! register_function {
    ($name:expr, $handler:path) => {
        $crate::inventory::submit! {
            $crate::registry::FunctionEntry {
                name: $name,
                handler: $handler,
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{HttpMethod, RouteDeclaration};

    #[derive(Default)]
    struct Gauge;

    impl Controller for Gauge {
        fn declaration() -> ControllerDeclaration {
            ControllerDeclaration::new("app::gauge::Gauge", "gauge")
                .with_route(RouteDeclaration::new(HttpMethod::Get, "", "index"))
        }

        fn invoke(&mut self, method: &str, _args: Vec<String>) -> Result<Response, InvokeError> {
            match method {
                "index" => Ok(Response::new(200)),
                _ => Err(InvokeError::UnknownMethod {
                    method: method.to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct OtherGauge;

    impl Controller for OtherGauge {
        fn declaration() -> ControllerDeclaration {
            ControllerDeclaration::new("other::gauge::Gauge", "")
        }

        fn invoke(&mut self, method: &str, _args: Vec<String>) -> Result<Response, InvokeError> {
            Err(InvokeError::UnknownMethod {
                method: method.to_string(),
            })
        }
    }

    fn qualified(module: &str, name: &str) -> QualifiedName {
        QualifiedName::new(module, name)
    }

    #[test]
    fn test_builtin_middlewares_present() {
        let registry = Registry::new();
        assert!(registry.middleware_factory("SetHeader").is_some());
        assert!(registry.middleware_factory("BearerAuth").is_some());
        assert!(registry.middleware_factory("Tracing").is_some());
        assert!(registry.middleware_factory("Cors").is_none());
    }

    #[test]
    fn test_controller_suffix_resolution() {
        let mut registry = Registry::new();
        registry.register_controller::<Gauge>();

        let found = registry.controller_for(&qualified("gauge", "Gauge")).unwrap();
        assert_eq!(found.map(|c| c.type_name.as_str()), Some("app::gauge::Gauge"));
        assert!(registry
            .controller_for(&qualified("user", "Gauge"))
            .unwrap()
            .is_none());

        let mut controller = (found.unwrap().create)();
        assert_eq!(controller.invoke("index", vec![]).unwrap().status, 200);
    }

    #[test]
    fn test_ambiguous_resolution_is_compilation_error() {
        let mut registry = Registry::new();
        registry.register_controller::<Gauge>();
        registry.register_controller::<OtherGauge>();

        let err = registry
            .controller_for(&qualified("gauge", "Gauge"))
            .unwrap_err();
        assert!(matches!(err, Error::Compilation(_)));
    }

    #[test]
    fn test_function_registration() {
        let mut registry = Registry::new();
        registry.register_function("hello", |_req, _vars| Ok(Response::text(200, "hi")));
        let handler = registry.function("hello").unwrap();
        let resp = handler(&Request::new(http::Method::GET, "/"), &[]).unwrap();
        assert_eq!(resp.body_str(), Some("hi"));
        assert!(registry.function("bye").is_none());
    }
}
