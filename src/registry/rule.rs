use crate::body::BodyProducer;
use axum::http::StatusCode;
use std::any::TypeId;
use std::sync::Arc;

/// Status code and body producer registered for one exception type
#[derive(Clone)]
pub struct ExceptionRule {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) status_code: StatusCode,
    /// `None` defers the body to the default formatter
    pub(crate) producer: Option<Arc<dyn BodyProducer>>,
}

impl ExceptionRule {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn has_body(&self) -> bool {
        self.producer.is_some()
    }
}

impl std::fmt::Debug for ExceptionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionRule")
            .field("type_name", &self.type_name)
            .field("status_code", &self.status_code)
            .field("has_body", &self.has_body())
            .finish()
    }
}
