use routeforge::{controller, Response};

#[derive(Default)]
pub struct AdminController;

#[controller("admin")]
#[middleware(BearerAuth("s3cret"), SetHeader("Cache-Control", "no-store"))]
impl AdminController {
    #[route(GET, "stats")]
    pub fn stats(&self) -> Response {
        Response::json(200, &serde_json::json!({ "requests": 42 }))
    }
}
