use crate::context::RequestHead;
use crate::error::BoxError;
use crate::exception::{ExceptionFilter, Thrown};
use crate::registry::ExceptionHandlerConfiguration;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer that routes thrown exceptions through an [`ExceptionFilter`]
///
/// The filter is shared behind an `Arc`; to swap rules at runtime build a new
/// dispatcher and a new layer rather than mutating the old one.
///
/// Exceptions the filter leaves unhandled go back to the host untouched: a
/// service error is returned as the service error, a thrown response is
/// passed through as the handler produced it.
///
/// # Example
///
/// ```rust,ignore
/// let handler = ExceptionHandlerLayer::configure(|x| {
///     x.map::<RecordNotFoundException>()
///         .to_status_code(StatusCode::NOT_FOUND)
///         .with_body(json!({ "message": "An exception occured" }));
/// });
///
/// let app = Router::new()
///     .route("/api/productnotfound", get(find_product))
///     .layer(
///         ServiceBuilder::new()
///             .layer(HandleErrorLayer::new(|err: BoxError| async move {
///                 (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
///             }))
///             .layer(handler),
///     );
/// ```
#[derive(Clone)]
pub struct ExceptionHandlerLayer {
    filter: Arc<dyn ExceptionFilter>,
}

impl ExceptionHandlerLayer {
    pub fn new<F: ExceptionFilter>(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    pub fn shared(filter: Arc<dyn ExceptionFilter>) -> Self {
        Self { filter }
    }

    /// Configure rules in a closure and build the layer in one go
    pub fn configure<C>(configure: C) -> Self
    where
        C: FnOnce(&mut ExceptionHandlerConfiguration),
    {
        let mut config = ExceptionHandlerConfiguration::new();
        configure(&mut config);
        config.layer()
    }
}

impl<S> Layer<S> for ExceptionHandlerLayer {
    type Service = ExceptionHandlerMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionHandlerMiddleware {
            inner,
            filter: Arc::clone(&self.filter),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionHandlerMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
}

impl<S> Service<Request<Body>> for ExceptionHandlerMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let filter = Arc::clone(&self.filter);
        let head = RequestHead::from_request(&request);

        // take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match inner.call(request).await {
                Ok(response) => {
                    let Some(thrown) = response.extensions().get::<Thrown>().cloned() else {
                        return Ok(response);
                    };
                    tracing::debug!("{} {} threw: {}", head.method, head.uri, thrown.exception());
                    let handled = filter.catch(thrown.exception(), head).await?;
                    Ok(handled.unwrap_or(response))
                }
                Err(err) => {
                    let err: BoxError = err.into();
                    tracing::debug!("{} {} failed: {}", head.method, head.uri, err);
                    match filter.catch(err.as_ref(), head).await? {
                        Some(response) => Ok(response),
                        None => Err(err),
                    }
                }
            }
        })
    }
}
