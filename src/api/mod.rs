pub mod constants;
pub mod middleware;
pub mod services;

pub use services::configure_routes;
