//! HTTP surface for Filebox.
//!
//! Browser-facing routes: form posts answered with redirects, listings and
//! detail views answered with JSON.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
