//! Provider notification endpoints.

mod handlers;
mod routes;

pub use handlers::receive_notify;
pub use routes::notify_routes;
