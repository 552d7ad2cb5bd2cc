// Shared by the controllers; discovered by the scanner but never registered.

/* pub struct CommentedOut; */

pub struct Helper {
    pub label: &'static str,
}
