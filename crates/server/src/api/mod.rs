pub mod handlers;
pub mod middleware;
pub mod rank;
pub mod routes;

pub use routes::create_router;
