use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cache::RouteCache;
use crate::compiler::{CompiledRoute, DispatchTarget};
use crate::controller::{parse_body, ControllerContext, InvokeError};
use crate::error::Result;
use crate::message::{Request, Response};
use crate::middleware::instantiate;
use crate::registry::Registry;
use crate::router::{Lookup, RouteTable};
use crate::template::TemplateEngine;

/// Matches requests against the cached route table and runs their pipelines.
pub struct Dispatcher {
    cache: Arc<RouteCache>,
    registry: Arc<Registry>,
    not_found: Response,
    engine: Option<Arc<dyn TemplateEngine>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        cache: Arc<RouteCache>,
        registry: Arc<Registry>,
        not_found: Response,
        engine: Option<Arc<dyn TemplateEngine>>,
    ) -> Self {
        Self {
            cache,
            registry,
            not_found,
            engine,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Make sure the cache is built, load it, and dispatch `req` against it.
    pub fn dispatch(&self, req: Request) -> Result<Response> {
        self.cache.ensure(false)?;
        let table = self.cache.load()?;
        self.dispatch_with_table(&table, req)
    }

    /// Dispatch `req` against an already loaded table.
    ///
    /// Misses produce the configured not-found response or a 405 carrying an
    /// `Allow` header. A matched route runs its middlewares in order around
    /// the target; a target missing from the registry is answered with a bare
    /// 404.
    pub fn dispatch_with_table(&self, table: &RouteTable, mut req: Request) -> Result<Response> {
        let start = Instant::now();
        let method = req.method.clone();
        let path = req.path.clone();

        let matched = match table.lookup(&method, &path) {
            Lookup::Found(matched) => matched,
            Lookup::NotFound => {
                debug!(method = %method, path = %path, "Dispatch miss: not found");
                return Ok(self.not_found.clone());
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow: Vec<&str> = allowed.iter().map(http::Method::as_str).collect();
                debug!(
                    method = %method,
                    path = %path,
                    allow = ?allow,
                    "Dispatch miss: method not allowed"
                );
                return Ok(Response::error(405, "Method Not Allowed")
                    .with_header("Allow", allow.join(", ")));
            }
        };

        let route = Arc::clone(&matched.route);
        req.path_params = matched.path_params;
        let pipeline = instantiate(&route.middlewares, &self.registry)?;
        let response = pipeline.handle(req, |req| self.invoke_target(&route, req))?;

        info!(
            method = %method,
            path = %path,
            route_pattern = %route.path,
            target = %route.target,
            middlewares = pipeline.len(),
            status = response.status,
            duration_us = start.elapsed().as_micros() as u64,
            "Request dispatched"
        );
        Ok(response)
    }

    /// The innermost pipeline step.
    fn invoke_target(&self, route: &CompiledRoute, req: Request) -> Result<Response> {
        let args = captured_args(route, &req)?;
        match &route.target {
            DispatchTarget::Function { name, .. } => {
                let Some(function) = self.registry.function(name) else {
                    return Ok(self.target_absent(&route.target));
                };
                match function(&req, &args) {
                    Err(e) if e.is_target_absent() => Ok(self.target_absent(&route.target)),
                    result => Ok(result?),
                }
            }
            DispatchTarget::Controller {
                type_name, method, ..
            } => {
                let Some(registered) = self.registry.controller(type_name) else {
                    return Ok(self.target_absent(&route.target));
                };
                // Stale handler names answer 404 before the body is parsed.
                if !(registered.declaration)()
                    .routes
                    .iter()
                    .any(|r| r.handler == *method)
                {
                    return Ok(self.target_absent(&route.target));
                }
                let mut controller = (registered.create)();
                if let Some(receiver) = controller.context_receiver() {
                    let body = parse_body(&req)?;
                    receiver.set_request_context(ControllerContext {
                        request: req,
                        body,
                        engine: self.engine.clone(),
                    });
                }
                match controller.invoke(method, args) {
                    Err(e) if e.is_target_absent() => Ok(self.target_absent(&route.target)),
                    result => Ok(result?),
                }
            }
        }
    }

    /// Always a bare 404, whatever the configured not-found response looks like.
    fn target_absent(&self, target: &DispatchTarget) -> Response {
        warn!(target = %target, "Route target no longer exists, answering 404");
        Response::new(404)
    }
}

/// Path captures in the target's parameter order.
fn captured_args(
    route: &CompiledRoute,
    req: &Request,
) -> std::result::Result<Vec<String>, InvokeError> {
    let vars = route.target.vars();
    let args: Vec<String> = vars
        .iter()
        .filter_map(|var| req.get_path_param(var).map(str::to_string))
        .collect();
    if args.len() != vars.len() {
        let method = match &route.target {
            DispatchTarget::Function { name, .. } => name,
            DispatchTarget::Controller { method, .. } => method,
        };
        return Err(InvokeError::Arity {
            method: method.clone(),
            expected: vars.len(),
            actual: args.len(),
        });
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{
        ControllerDeclaration, HttpMethod, MiddlewareDeclaration, RouteDeclaration,
    };
    use crate::error::Error;
    use crate::Controller;

    #[derive(Default)]
    struct Echo {
        context: Option<ControllerContext>,
    }

    impl crate::controller::AcceptsContext for Echo {
        fn set_request_context(&mut self, context: ControllerContext) {
            self.context = Some(context);
        }
    }

    impl Controller for Echo {
        fn declaration() -> ControllerDeclaration {
            ControllerDeclaration::new("tests::Echo", "").with_route(
                RouteDeclaration::new(HttpMethod::Post, "items/{id}", "show").with_params(["id"]),
            )
        }

        fn invoke(
            &mut self,
            method: &str,
            args: Vec<String>,
        ) -> std::result::Result<Response, InvokeError> {
            match method {
                "show" => {
                    let body = self.context.as_ref().and_then(|c| c.body.clone());
                    Ok(Response::json(
                        200,
                        &serde_json::json!({ "args": args, "body": body }),
                    ))
                }
                _ => Err(InvokeError::UnknownMethod {
                    method: method.to_string(),
                }),
            }
        }

        fn context_receiver(&mut self) -> Option<&mut dyn crate::controller::AcceptsContext> {
            Some(self)
        }
    }

    fn controller_route(
        method: HttpMethod,
        path: &str,
        handler: &str,
        vars: &[&str],
    ) -> CompiledRoute {
        CompiledRoute {
            method,
            path: path.to_string(),
            target: DispatchTarget::Controller {
                type_name: "tests::Echo".to_string(),
                method: handler.to_string(),
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            middlewares: Vec::new(),
        }
    }

    fn dispatcher() -> (tempfile::TempDir, Dispatcher) {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = Registry::new();
        registry.register_controller::<Echo>();
        registry.register_function("ping", |_req, vars| {
            Ok(Response::text(200, format!("pong {}", vars.join(","))))
        });
        let registry = Arc::new(registry);
        let cache = RouteCache::new(dir.path(), dir.path(), Arc::clone(&registry), vec![]).unwrap();
        let not_found = Response::error(404, "Not Found");
        let dispatcher = Dispatcher::new(Arc::new(cache), registry, not_found, None);
        (dir, dispatcher)
    }

    fn table(routes: Vec<CompiledRoute>) -> RouteTable {
        RouteTable::new(routes).unwrap()
    }

    #[test]
    fn test_controller_receives_args_and_body() {
        let (_dir, d) = dispatcher();
        let t = table(vec![controller_route(HttpMethod::Post, "/items/{id}", "show", &["id"])]);
        let req =
            Request::new(http::Method::POST, "/items/9").with_json(&serde_json::json!({ "n": 1 }));
        let resp = d.dispatch_with_table(&t, req).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(
            resp.body_json().unwrap(),
            serde_json::json!({ "args": ["9"], "body": { "n": 1 } })
        );
    }

    #[test]
    fn test_function_target() {
        let (_dir, d) = dispatcher();
        let t = table(vec![CompiledRoute::function(HttpMethod::Get, "/ping/{a}", "ping", ["a"])]);
        let resp = d
            .dispatch_with_table(&t, Request::new(http::Method::GET, "/ping/x"))
            .unwrap();
        assert_eq!(resp.body_str(), Some("pong x"));
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let (_dir, d) = dispatcher();
        let t = table(vec![
            controller_route(HttpMethod::Get, "/r", "show", &[]),
            controller_route(HttpMethod::Delete, "/r", "show", &[]),
        ]);
        let resp = d
            .dispatch_with_table(&t, Request::new(http::Method::PUT, "/r"))
            .unwrap();
        assert_eq!(resp.status, 405);
        assert_eq!(resp.get_header("Allow"), Some("GET, DELETE"));
    }

    #[test]
    fn test_absent_targets_answer_not_found() {
        let (_dir, d) = dispatcher();
        let mut gone_type = controller_route(HttpMethod::Get, "/gone", "show", &[]);
        if let DispatchTarget::Controller { type_name, .. } = &mut gone_type.target {
            *type_name = "tests::Removed".to_string();
        }
        let t = table(vec![
            controller_route(HttpMethod::Get, "/renamed", "old_name", &[]),
            gone_type,
            CompiledRoute::function(HttpMethod::Get, "/nofn", "missing", Vec::<String>::new()),
        ]);
        for path in ["/renamed", "/gone", "/nofn", "/unknown"] {
            let resp = d
                .dispatch_with_table(&t, Request::new(http::Method::GET, path))
                .unwrap();
            assert_eq!(resp.status, 404, "{path}");
        }
    }

    #[test]
    fn test_malformed_json_body_is_an_error() {
        let (_dir, d) = dispatcher();
        let t = table(vec![controller_route(HttpMethod::Post, "/b", "show", &[])]);
        let req = Request::new(http::Method::POST, "/b")
            .with_header("content-type", "application/json")
            .with_body("{nope");
        assert!(matches!(d.dispatch_with_table(&t, req), Err(Error::Body(_))));
    }

    #[test]
    fn test_removed_handler_is_404_before_body_parsing() {
        let (_dir, d) = dispatcher();
        let t = table(vec![controller_route(HttpMethod::Post, "/old", "removed", &[])]);
        let req = Request::new(http::Method::POST, "/old")
            .with_header("content-type", "application/json")
            .with_body("{bad");
        let resp = d.dispatch_with_table(&t, req).unwrap();
        assert_eq!(resp, Response::new(404));
    }

    #[test]
    fn test_route_middlewares_run() {
        let (_dir, d) = dispatcher();
        let route = controller_route(HttpMethod::Get, "/h", "show", &[]).with_middleware(
            MiddlewareDeclaration::new("SetHeader", vec!["X-Route".into(), "yes".into()]),
        );
        let resp = d
            .dispatch_with_table(&table(vec![route]), Request::new(http::Method::GET, "/h"))
            .unwrap();
        assert_eq!(resp.get_header("X-Route"), Some("yes"));
    }
}
