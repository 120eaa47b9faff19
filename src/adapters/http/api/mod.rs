//! Signed machine-to-machine API.

mod handlers;
mod routes;

pub use handlers::{call_gateway, ping};
pub use routes::api_routes;
