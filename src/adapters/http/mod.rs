//! HTTP adapter: routes, DTOs, and handlers for the proxy API.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::app_router;
