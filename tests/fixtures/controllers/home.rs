use routeforge::{controller, Response};

/// Lives at the root: no base path and no request context.
#[derive(Default)]
pub struct HomeController;

#[controller]
impl HomeController {
    #[route(POST)]
    pub fn index() -> Response {
        Response::text(200, "home")
    }

    #[route]
    pub fn landing(&self) -> Response {
        Response::html(200, "<h1>welcome</h1>")
    }

    #[route(GET, "health")]
    pub fn health() -> Response {
        Response::json(200, &serde_json::json!({ "status": "ok" }))
    }
}
