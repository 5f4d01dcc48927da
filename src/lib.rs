//! # Global Exception Handler
//!
//! Global exception handling middleware for axum.
//!
//! Handlers throw by returning `Err(Thrown)`; a tower layer catches the
//! exception, finds the rule registered for its type (the most specific one
//! when exception types form a hierarchy) and writes the configured status
//! code and body, rendered through content negotiation.
//!
//! ## Features
//!
//! - **Type-based rules**: map an error type to a status code and a body
//! - **Most specific wins**: declared type hierarchies are resolved deepest first
//! - **Flexible bodies**: fixed values, functions of the exception, or full control
//! - **Content negotiation**: JSON out of the box, pluggable output formatters
//! - **Observers**: side-effect hooks for logging every caught exception
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use global_exception_handler::prelude::*;
//! use axum::{error_handling::HandleErrorLayer, routing::get};
//! use serde_json::json;
//! use tower::ServiceBuilder;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("{0}")]
//! struct RecordNotFoundException(String);
//!
//! async fn find_product() -> Result<&'static str, Thrown> {
//!     Err(RecordNotFoundException("Record could not be found".into()).into())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = ExceptionHandlerLayer::configure(|x| {
//!         x.map::<RecordNotFoundException>()
//!             .to_status_code(StatusCode::NOT_FOUND)
//!             .with_body(json!({ "message": "An exception occured" }));
//!     });
//!
//!     let app = Router::new()
//!         .route("/api/productnotfound", get(find_product))
//!         .layer(
//!             ServiceBuilder::new()
//!                 .layer(HandleErrorLayer::new(|err: BoxError| async move {
//!                     (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
//!                 }))
//!                 .layer(handler),
//!         );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod body;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod exception;
pub mod negotiation;
pub mod registry;

// Re-export core types
pub use body::{BodyProducer, DefaultMessage, default_message_formatter};
pub use config::HandlerSettings;
pub use context::{HandlerContext, RequestHead, ResponseContext};
pub use dispatch::{Dispatcher, ErrorObserver, Outcome, TracingObserver};
pub use error::{BoxError, HandlerError, Result};
pub use exception::{
    Exception, ExceptionFilter, ExceptionHandlerLayer, ExceptionHandlerMiddleware, Thrown,
    TypeCatalog,
};
pub use negotiation::{JsonFormatter, MediaType, Negotiator, OutputFormatter, PlainTextFormatter};
pub use registry::{ExceptionHandlerConfiguration, ExceptionRule};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use global_exception_handler::prelude::*;
/// ```
pub mod prelude {
    pub use crate::body::{BodyProducer, default_message_formatter};
    pub use crate::context::{HandlerContext, ResponseContext};
    pub use crate::dispatch::{Dispatcher, ErrorObserver, Outcome, TracingObserver};
    pub use crate::error::{BoxError, HandlerError};
    pub use crate::exception::{Exception, ExceptionFilter, ExceptionHandlerLayer, Thrown};
    pub use crate::negotiation::{OutputFormatter, PlainTextFormatter};
    pub use crate::registry::ExceptionHandlerConfiguration;
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
