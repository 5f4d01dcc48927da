//! Exceptions and the filter seam
//!
//! An exception is any `Error + Send + Sync + 'static` value raised while a
//! request is processed. Filters turn a caught exception into a response.

use crate::context::RequestHead;
use crate::error::Result;
use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

mod catalog;
mod layer;
mod thrown;

pub use catalog::TypeCatalog;
pub use layer::{ExceptionHandlerLayer, ExceptionHandlerMiddleware};
pub use thrown::Thrown;

/// A thrown exception, seen through its trait object
pub type Exception = dyn std::error::Error + Send + Sync + 'static;

/// The ExceptionFilter trait
///
/// Filters handle errors thrown during request processing.
/// They return the response to send, `None` when they leave the exception to
/// the host, or fail with a [`HandlerError`](crate::HandlerError) that
/// propagates to the host's own fault boundary.
#[async_trait]
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    async fn catch(
        &self,
        exception: &Exception,
        request: RequestHead,
    ) -> Result<Option<Response>>;
}

#[async_trait]
impl<F: ExceptionFilter + ?Sized> ExceptionFilter for Arc<F> {
    async fn catch(
        &self,
        exception: &Exception,
        request: RequestHead,
    ) -> Result<Option<Response>> {
        (**self).catch(exception, request).await
    }
}
