//! Body producers
//!
//! Every rule writes its body through [`BodyProducer`]. The three shapes a
//! rule can be configured with (a fixed value, a function of the exception,
//! and a function with full access to the response) are thin adapters over
//! that one trait.

use crate::context::{HandlerContext, ResponseContext};
use crate::error::BoxError;
use crate::exception::Exception;
use async_trait::async_trait;
use serde::Serialize;

mod default_message;

pub use default_message::{DefaultMessage, DefaultMessageFormatter, default_message_formatter};

/// Writes the body of an exception response.
///
/// Implement this directly when the body needs asynchronous work; the
/// dispatcher awaits the producer before the response is handed back.
///
/// # Example
///
/// ```rust,ignore
/// struct AuditedBody { audit: AuditLog }
///
/// #[async_trait]
/// impl BodyProducer for AuditedBody {
///     async fn produce(
///         &self,
///         exception: &Exception,
///         response: &mut ResponseContext,
///         handler: &HandlerContext,
///     ) -> Result<(), BoxError> {
///         let ticket = self.audit.record(handler.request_id(), exception).await?;
///         response.write_serialized(&json!({ "ticket": ticket }))?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait BodyProducer: Send + Sync + 'static {
    async fn produce(
        &self,
        exception: &Exception,
        response: &mut ResponseContext,
        handler: &HandlerContext,
    ) -> Result<(), BoxError>;
}

/// A fixed body, serialized through content negotiation on every dispatch
pub struct StaticBody<T> {
    value: T,
}

#[async_trait]
impl<T> BodyProducer for StaticBody<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn produce(
        &self,
        _exception: &Exception,
        response: &mut ResponseContext,
        _handler: &HandlerContext,
    ) -> Result<(), BoxError> {
        response.write_serialized(&self.value)?;
        Ok(())
    }
}

/// A body derived from the exception alone
pub struct ExceptionBody<F> {
    build: F,
}

#[async_trait]
impl<F, R> BodyProducer for ExceptionBody<F>
where
    F: Fn(&Exception) -> R + Send + Sync + 'static,
    R: Serialize + Send,
{
    async fn produce(
        &self,
        exception: &Exception,
        response: &mut ResponseContext,
        _handler: &HandlerContext,
    ) -> Result<(), BoxError> {
        let body = (self.build)(exception);
        response.write_serialized(&body)?;
        Ok(())
    }
}

/// Full control over the response, synchronously
pub struct BodyWriter<F> {
    write: F,
}

#[async_trait]
impl<F> BodyProducer for BodyWriter<F>
where
    F: Fn(&Exception, &mut ResponseContext, &HandlerContext) -> Result<(), BoxError>
        + Send
        + Sync
        + 'static,
{
    async fn produce(
        &self,
        exception: &Exception,
        response: &mut ResponseContext,
        handler: &HandlerContext,
    ) -> Result<(), BoxError> {
        (self.write)(exception, response, handler)
    }
}

/// Serialize `value` for every matching exception
pub fn from_value<T>(value: T) -> StaticBody<T>
where
    T: Serialize + Send + Sync + 'static,
{
    StaticBody { value }
}

/// Build the body from the exception
pub fn from_fn<F, R>(build: F) -> ExceptionBody<F>
where
    F: Fn(&Exception) -> R + Send + Sync + 'static,
    R: Serialize + Send,
{
    ExceptionBody { build }
}

/// Write the body with access to the response and handler context
pub fn from_writer<F>(write: F) -> BodyWriter<F>
where
    F: Fn(&Exception, &mut ResponseContext, &HandlerContext) -> Result<(), BoxError>
        + Send
        + Sync
        + 'static,
{
    BodyWriter { write }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestHead;
    use crate::negotiation::Negotiator;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("Invalid request")]
    struct ArgumentException;

    #[derive(Serialize)]
    struct TestResponse {
        message: String,
    }

    fn contexts() -> (ResponseContext, HandlerContext) {
        let head = RequestHead::default();
        let handler = HandlerContext::new(&head, None, StatusCode::BAD_REQUEST);
        (ResponseContext::new(head, Arc::new(Negotiator::new())), handler)
    }

    #[tokio::test]
    async fn test_static_body() {
        let (mut response, handler) = contexts();
        let producer = from_value(TestResponse {
            message: "Conflict".to_string(),
        });

        producer
            .produce(&ArgumentException, &mut response, &handler)
            .await
            .unwrap();
        assert_eq!(response.body(), br#"{"message":"Conflict"}"#);
    }

    #[tokio::test]
    async fn test_exception_body_sees_exception() {
        let (mut response, handler) = contexts();
        let producer = from_fn(|e: &Exception| json!({ "message": e.to_string() }));

        producer
            .produce(&ArgumentException, &mut response, &handler)
            .await
            .unwrap();
        assert_eq!(response.body(), br#"{"message":"Invalid request"}"#);
    }

    #[tokio::test]
    async fn test_writer_has_full_control() {
        let (mut response, handler) = contexts();
        let producer = from_writer(|_, response: &mut ResponseContext, handler: &HandlerContext| {
            response.set_status(StatusCode::IM_A_TEAPOT);
            response.write(handler.request_id().to_string());
            Ok(())
        });

        producer
            .produce(&ArgumentException, &mut response, &handler)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.body(), handler.request_id().to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_writer_failure_is_returned() {
        let (mut response, handler) = contexts();
        let producer = from_writer(|_, _, _| Err("stream closed".into()));

        let err = producer
            .produce(&ArgumentException, &mut response, &handler)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "stream closed");
    }
}
