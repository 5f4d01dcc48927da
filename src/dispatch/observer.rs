use crate::context::ResponseContext;
use crate::exception::Exception;
use async_trait::async_trait;

/// Side-effect hook run once per dispatch, typically for logging.
///
/// The observer only sees the response context, so it cannot change the
/// status or body that dispatch settles on. It runs after the status has
/// been resolved and before the body is produced.
#[async_trait]
pub trait ErrorObserver: Send + Sync + 'static {
    async fn on_error(&self, exception: &Exception, response: &ResponseContext);
}

#[async_trait]
impl<F> ErrorObserver for F
where
    F: Fn(&Exception, &ResponseContext) + Send + Sync + 'static,
{
    async fn on_error(&self, exception: &Exception, response: &ResponseContext) {
        self(exception, response)
    }
}

/// Logs every exception at `error` level through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[async_trait]
impl ErrorObserver for TracingObserver {
    async fn on_error(&self, exception: &Exception, response: &ResponseContext) {
        tracing::error!(
            method = %response.request().method,
            uri = %response.request().uri,
            status = response.status().as_u16(),
            "Unhandled exception: {}",
            exception
        );
    }
}
