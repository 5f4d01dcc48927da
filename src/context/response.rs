use crate::error::{HandlerError, Result};
use crate::negotiation::{MediaType, Negotiator};
use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, Version,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;

/// The parts of the failed request that survive into exception handling
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
        }
    }
}

impl Default for RequestHead {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::default(),
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
        }
    }
}

/// Mutable response under construction for one failed request.
///
/// Starts as an empty `500 Internal Server Error`. Producers either write raw
/// bytes with [`write`](Self::write) or hand over a value with
/// [`write_object`](Self::write_object), which picks an output formatter from
/// the request's `Accept` header.
pub struct ResponseContext {
    request: RequestHead,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    negotiator: Arc<Negotiator>,
}

impl ResponseContext {
    pub fn new(request: RequestHead, negotiator: Arc<Negotiator>) -> Self {
        Self {
            request,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            body: Vec::new(),
            negotiator,
        }
    }

    pub fn request(&self) -> &RequestHead {
        &self.request
    }

    /// The raw `Accept` header of the request, if present and readable
    pub fn accept(&self) -> Option<&str> {
        self.request
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn set_content_type(&mut self, media_type: MediaType) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(media_type.into()));
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append raw content to the body
    pub fn write(&mut self, content: impl AsRef<[u8]>) {
        self.body.extend_from_slice(content.as_ref());
    }

    /// Replace the body with a negotiated rendering of `value`
    pub fn write_object(&mut self, value: &serde_json::Value) -> Result<()> {
        let negotiator = Arc::clone(&self.negotiator);
        let accept = self
            .request
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok());
        let (formatter, media_type) = negotiator.select(accept);

        let rendered = formatter.format(value)?;
        let content_type = HeaderValue::from_str(media_type)
            .map_err(|e| HandlerError::format(media_type, e.to_string()))?;

        tracing::debug!("Writing exception body as {}", media_type);
        self.headers.insert(CONTENT_TYPE, content_type);
        self.body = rendered;
        Ok(())
    }

    /// Serialize `value` and write it through content negotiation
    pub fn write_serialized<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.write_object(&value)
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl std::fmt::Debug for ResponseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseContext")
            .field("request", &self.request)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(accept: Option<&'static str>) -> ResponseContext {
        let mut head = RequestHead::default();
        if let Some(accept) = accept {
            head.headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }
        ResponseContext::new(head, Arc::new(Negotiator::new()))
    }

    #[test]
    fn test_starts_as_internal_server_error() {
        let ctx = context(None);
        assert_eq!(ctx.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn test_write_appends_raw_content() {
        let mut ctx = context(None);
        ctx.write("<Message>");
        ctx.write(b"Not Thrown Message</Message>");
        assert_eq!(ctx.body(), b"<Message>Not Thrown Message</Message>");
        assert!(ctx.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_write_object_sets_content_type() {
        let mut ctx = context(Some("application/json"));
        ctx.write_object(&json!({ "message": "An exception occured" }))
            .unwrap();

        assert_eq!(ctx.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(ctx.body(), br#"{"message":"An exception occured"}"#);
    }

    #[test]
    fn test_into_response_keeps_status_headers_and_body() {
        let mut ctx = context(None);
        ctx.set_status(StatusCode::NOT_FOUND);
        ctx.set_content_type(MediaType::TextPlain);
        ctx.write("missing");

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
