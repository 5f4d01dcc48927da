use crate::body::BodyProducer;
use crate::context::{HandlerContext, ResponseContext};
use crate::error::BoxError;
use crate::exception::Exception;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Standard exception body
///
/// ```json
/// { "statusCode": 500, "message": "connection reset", "timestamp": "2026-10-16T09:30:00Z" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultMessage {
    pub status_code: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Writes a [`DefaultMessage`] built from the exception's `Display` text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessageFormatter;

#[async_trait]
impl BodyProducer for DefaultMessageFormatter {
    async fn produce(
        &self,
        exception: &Exception,
        response: &mut ResponseContext,
        handler: &HandlerContext,
    ) -> Result<(), BoxError> {
        let message = DefaultMessage {
            status_code: response.status().as_u16(),
            message: exception.to_string(),
            timestamp: handler.occurred_at(),
        };
        response.write_serialized(&message)?;
        Ok(())
    }
}

pub fn default_message_formatter() -> DefaultMessageFormatter {
    DefaultMessageFormatter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestHead;
    use crate::negotiation::Negotiator;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct UpstreamException;

    #[tokio::test]
    async fn test_writes_status_message_and_timestamp() {
        let head = RequestHead::default();
        let handler = HandlerContext::new(&head, None, StatusCode::BAD_GATEWAY);
        let mut response = ResponseContext::new(head, Arc::new(Negotiator::new()));
        response.set_status(StatusCode::BAD_GATEWAY);

        default_message_formatter()
            .produce(&UpstreamException, &mut response, &handler)
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["statusCode"], 502);
        assert_eq!(body["message"], "connection reset");
        let timestamp: DateTime<Utc> = serde_json::from_value(body["timestamp"].clone()).unwrap();
        assert_eq!(timestamp, handler.occurred_at());
    }
}
