use crate::context::RequestHead;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Auxiliary data for body producers, created per dispatch and dropped once
/// the body has been written.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    request_id: Uuid,
    occurred_at: DateTime<Utc>,
    matched_type: Option<&'static str>,
    status_code: StatusCode,
}

impl HandlerContext {
    /// Build a context for the given request.
    ///
    /// An `x-request-id` header holding a UUID is reused, otherwise a fresh
    /// v4 id is generated.
    pub fn new(
        request: &RequestHead,
        matched_type: Option<&'static str>,
        status_code: StatusCode,
    ) -> Self {
        let request_id = request
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .unwrap_or_else(Uuid::new_v4);

        Self {
            request_id,
            occurred_at: Utc::now(),
            matched_type,
            status_code,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Type name of the matched rule, `None` on the default formatter path
    pub fn matched_type(&self) -> Option<&'static str> {
        self.matched_type
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reuses_request_id_header() {
        let id = Uuid::new_v4();
        let mut head = RequestHead::default();
        head.headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );

        let ctx = HandlerContext::new(&head, Some("NotFound"), StatusCode::NOT_FOUND);
        assert_eq!(ctx.request_id(), id);
        assert_eq!(ctx.matched_type(), Some("NotFound"));
        assert_eq!(ctx.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_generates_request_id_when_header_is_invalid() {
        let mut head = RequestHead::default();
        head.headers
            .insert(REQUEST_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

        let ctx = HandlerContext::new(&head, None, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.request_id().get_version_num(), 4);
        assert!(ctx.matched_type().is_none());
    }
}
