use crate::error::BoxError;
use crate::exception::Exception;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;
use std::sync::Arc;

/// An exception thrown out of a handler.
///
/// Handlers return `Err(Thrown)` (usually through `?`) and the
/// [`ExceptionHandlerLayer`](crate::ExceptionHandlerLayer) picks it up from the
/// response extensions. Without the layer the client sees a bare 500.
///
/// ```rust,ignore
/// async fn find_product() -> Result<Json<Product>, Thrown> {
///     let product = repository.find(id).ok_or(RecordNotFoundException)?;
///     Ok(Json(product))
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Thrown(Arc<Exception>);

impl Thrown {
    /// Wrap an already boxed error, keeping its concrete type visible for dispatch
    pub fn from_boxed(error: BoxError) -> Self {
        Self(Arc::from(error))
    }

    pub fn exception(&self) -> &Exception {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Arc<Exception> {
        self.0
    }
}

impl<E> From<E> for Thrown
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self(Arc::new(error))
    }
}

impl IntoResponse for Thrown {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("Record could not be found")]
    struct RecordNotFoundException;

    #[test]
    fn test_into_response_carries_exception() {
        let thrown = Thrown::from(RecordNotFoundException);
        let mut response = thrown.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let carried = response.extensions_mut().remove::<Thrown>().unwrap();
        assert!(carried.exception().is::<RecordNotFoundException>());
    }

    #[test]
    fn test_boxed_error_keeps_concrete_type() {
        let boxed: BoxError = Box::new(RecordNotFoundException);
        let thrown = Thrown::from_boxed(boxed);
        assert!(thrown.exception().is::<RecordNotFoundException>());
        assert_eq!(thrown.exception().to_string(), "Record could not be found");
    }
}
