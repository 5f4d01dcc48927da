//! Dispatcher
//!
//! Selects the most specific rule for a thrown exception and writes its
//! response. A dispatcher is immutable: it is shared across concurrent
//! requests without locking, and changing rules means building a new one.

use crate::body::BodyProducer;
use crate::config::HandlerSettings;
use crate::context::{HandlerContext, RequestHead, ResponseContext};
use crate::error::{HandlerError, Result};
use crate::exception::{Exception, ExceptionFilter, TypeCatalog};
use crate::negotiation::Negotiator;
use crate::registry::ExceptionRule;
use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

mod observer;

pub use observer::{ErrorObserver, TracingObserver};

/// How a dispatch was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A rule matched; carries the rule's type name
    Matched(&'static str),
    /// No rule matched and the default formatter wrote the body
    Defaulted,
    /// No rule matched and no default formatter is configured
    Unhandled,
}

pub struct Dispatcher {
    /// Deepest types first
    rules: Vec<ExceptionRule>,
    catalog: TypeCatalog,
    default_formatter: Option<Arc<dyn BodyProducer>>,
    observer: Option<Arc<dyn ErrorObserver>>,
    negotiator: Arc<Negotiator>,
    settings: HandlerSettings,
}

impl Dispatcher {
    pub(crate) fn new(
        rules: Vec<ExceptionRule>,
        catalog: TypeCatalog,
        default_formatter: Option<Arc<dyn BodyProducer>>,
        observer: Option<Arc<dyn ErrorObserver>>,
        negotiator: Arc<Negotiator>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            rules,
            catalog,
            default_formatter,
            observer,
            negotiator,
            settings,
        }
    }

    /// Rules in dispatch order
    pub fn rules(&self) -> &[ExceptionRule] {
        &self.rules
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// A fresh response context wired to this dispatcher's formatters
    pub fn response_context(&self, request: RequestHead) -> ResponseContext {
        ResponseContext::new(request, Arc::clone(&self.negotiator))
    }

    /// The first rule, in depth order, that the exception is an instance of
    pub fn resolve(&self, exception: &Exception) -> Option<&ExceptionRule> {
        let lineage = self.catalog.lineage_of(exception);
        if lineage.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| lineage.contains(&rule.type_id))
    }

    /// Write the status and body for `exception` into `response`.
    ///
    /// Producer failures are returned, never retried or handled again.
    pub async fn handle(
        &self,
        exception: &Exception,
        response: &mut ResponseContext,
    ) -> Result<Outcome> {
        match self.resolve(exception) {
            Some(rule) => {
                tracing::debug!(
                    "Exception {} matched rule {} -> {}",
                    exception,
                    rule.type_name,
                    rule.status_code
                );
                response.set_status(rule.status_code);
                let handler = HandlerContext::new(
                    response.request(),
                    Some(rule.type_name),
                    rule.status_code,
                );
                self.notify(exception, response).await;

                let producer = rule.producer.as_ref().or(self.default_formatter.as_ref());
                if let Some(producer) = producer {
                    self.produce(
                        producer.as_ref(),
                        rule.type_name,
                        exception,
                        response,
                        &handler,
                    )
                    .await?;
                }
                Ok(Outcome::Matched(rule.type_name))
            }
            None => match &self.default_formatter {
                Some(producer) => {
                    tracing::debug!("No rule for {}, using default formatter", exception);
                    let status = self.settings.default_status;
                    response.set_status(status);
                    let handler = HandlerContext::new(response.request(), None, status);
                    self.notify(exception, response).await;
                    self.produce(
                        producer.as_ref(),
                        "default formatter",
                        exception,
                        response,
                        &handler,
                    )
                    .await?;
                    Ok(Outcome::Defaulted)
                }
                None => {
                    if self.settings.log_unhandled {
                        tracing::warn!(
                            "No rule or default formatter for exception: {}",
                            exception
                        );
                    }
                    self.notify(exception, response).await;
                    Ok(Outcome::Unhandled)
                }
            },
        }
    }

    async fn notify(&self, exception: &Exception, response: &ResponseContext) {
        if let Some(observer) = &self.observer {
            observer.on_error(exception, response).await;
        }
    }

    async fn produce(
        &self,
        producer: &dyn BodyProducer,
        type_name: &'static str,
        exception: &Exception,
        response: &mut ResponseContext,
        handler: &HandlerContext,
    ) -> Result<()> {
        producer
            .produce(exception, response, handler)
            .await
            .map_err(|source| {
                tracing::error!("Body producer for {} failed: {}", type_name, source);
                HandlerError::producer_failed(type_name, source)
            })
    }
}

#[async_trait]
impl ExceptionFilter for Dispatcher {
    async fn catch(
        &self,
        exception: &Exception,
        request: RequestHead,
    ) -> Result<Option<Response>> {
        let mut response = self.response_context(request);
        match self.handle(exception, &mut response).await? {
            Outcome::Unhandled => Ok(None),
            _ => Ok(Some(response.into_response())),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rules", &self.rules)
            .field("catalog", &self.catalog)
            .field("has_default_formatter", &self.default_formatter.is_some())
            .field("has_observer", &self.observer.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
