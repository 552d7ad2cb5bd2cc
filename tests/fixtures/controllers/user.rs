use routeforge::{controller, ControllerBase, Response};
use serde_json::json;

#[derive(Default)]
pub struct UserController {
    base: ControllerBase,
}

#[controller("api/user", context = base)]
#[middleware(SetHeader("X-Controller", "user"))]
impl UserController {
    #[route(GET, "{id}")]
    #[middleware(SetHeader("X-Handler", "get_user"))]
    pub fn get_user(&self, id: u64) -> Response {
        let verbose = self.base.query_parameter("verbose", "no");
        self.base.json(&json!({ "id": id, "verbose": verbose }), 200)
    }

    #[route(POST)]
    pub fn create(&self) -> Response {
        let body = self.base.body().cloned().unwrap_or(serde_json::Value::Null);
        self.base.json(&json!({ "created": body }), 201)
    }

    #[route(GET, "{id}/posts/{post}")]
    pub fn user_post(&self, id: u64, post: String) -> Response {
        self.base.json(&json!({ "user": id, "post": post }), 200)
    }

    #[route(DELETE, "{id}")]
    #[route(PATCH, "{id}/archive")]
    pub fn remove(&mut self, id: u64) -> Result<Response, String> {
        if id == 0 {
            return Err("user 0 is protected".to_string());
        }
        Ok(self.base.no_content())
    }

    pub fn not_routed(&self) -> u64 {
        7
    }
}
