//! # Observability Module
//!
//! - **Structured Logging**: pretty or JSON logs via `tracing-subscriber`
//! - **Request Tracing**: request IDs propagated through a span and echoed
//!   back in the `x-request-id` response header
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{middleware, Router};
//! use gist_rss_node::observability::{init_logging, request_id_middleware, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//!
//! let app: Router<()> = Router::new().layer(middleware::from_fn(request_id_middleware));
//! ```

mod logging;
pub mod middleware;

pub use logging::{init_logging, LogFormat};
pub use middleware::{request_id_middleware, REQUEST_ID_HEADER};
