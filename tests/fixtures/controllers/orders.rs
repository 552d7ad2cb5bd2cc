use routeforge::{controller, Response};

/// Routes wrapped in `Record` middlewares; the test binary registers `Record`.
#[derive(Default)]
pub struct OrderController;

#[controller("orders")]
#[middleware(Record("class-1"), Record("class-2"), NotRegistered(true))]
impl OrderController {
    #[route(GET, r"{id:\d+}")]
    #[middleware(Record("method-1"), Record("method-2"))]
    pub fn show(&self, id: u32) -> Response {
        Response::text(200, format!("order {id}"))
    }

    #[route(GET, "{slug}")]
    pub fn by_slug(&self, slug: String) -> Response {
        Response::text(200, format!("slug {slug}"))
    }
}
