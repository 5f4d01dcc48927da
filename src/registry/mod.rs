//! Rule registry
//!
//! [`ExceptionHandlerConfiguration`] accumulates rules during startup and is
//! consumed by [`build`](ExceptionHandlerConfiguration::build), which freezes it
//! into an immutable [`Dispatcher`].

use crate::body::{self, BodyProducer};
use crate::config::HandlerSettings;
use crate::context::{HandlerContext, ResponseContext};
use crate::dispatch::{Dispatcher, ErrorObserver};
use crate::error::BoxError;
use crate::exception::{Exception, ExceptionHandlerLayer, TypeCatalog};
use crate::negotiation::{Negotiator, OutputFormatter};
use axum::http::StatusCode;
use serde::Serialize;
use std::any::{TypeId, type_name};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::error::Error;
use std::marker::PhantomData;
use std::sync::Arc;

mod rule;

pub use rule::ExceptionRule;

/// Builder for exception rules
///
/// # Example
///
/// ```rust,ignore
/// let mut config = ExceptionHandlerConfiguration::new();
/// config.extends::<Level2ExceptionB, Level1ExceptionB>();
/// config
///     .map::<RecordNotFoundException>()
///     .to_status_code(StatusCode::NOT_FOUND)
///     .with_body(json!({ "message": "An exception occured" }));
/// config.on_error(|e: &Exception, _: &ResponseContext| tracing::warn!("{e}"));
///
/// let dispatcher = config.build();
/// ```
pub struct ExceptionHandlerConfiguration {
    rules: HashMap<TypeId, ExceptionRule>,
    registration_order: Vec<TypeId>,
    catalog: TypeCatalog,
    default_formatter: Option<Arc<dyn BodyProducer>>,
    observer: Option<Arc<dyn ErrorObserver>>,
    negotiator: Negotiator,
    settings: HandlerSettings,
}

impl ExceptionHandlerConfiguration {
    /// Empty configuration: no rules, no default formatter, JSON output only
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            registration_order: Vec::new(),
            catalog: TypeCatalog::new(),
            default_formatter: None,
            observer: None,
            negotiator: Negotiator::new(),
            settings: HandlerSettings::default(),
        }
    }

    /// Start a rule for exceptions of type `T` and its declared descendants
    pub fn map<T>(&mut self) -> RuleCreator<'_, T>
    where
        T: Error + Send + Sync + 'static,
    {
        RuleCreator {
            config: self,
            _exception: PhantomData,
        }
    }

    /// Declare `Child` as a direct descendant of `Parent`
    pub fn extends<Child, Parent>(&mut self) -> &mut Self
    where
        Child: Error + Send + Sync + 'static,
        Parent: Error + Send + Sync + 'static,
    {
        self.catalog.extends::<Child, Parent>();
        self
    }

    /// Declare several relations at once
    pub fn hierarchy<F>(&mut self, declare: F) -> &mut Self
    where
        F: FnOnce(&mut TypeCatalog),
    {
        declare(&mut self.catalog);
        self
    }

    pub fn on_error<O: ErrorObserver>(&mut self, observer: O) -> &mut Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Replace the fallback producer used when no rule matches
    pub fn use_default_message_formatter<P: BodyProducer>(&mut self, formatter: P) -> &mut Self {
        self.default_formatter = Some(Arc::new(formatter));
        self
    }

    /// Status written when no rule matches and the default formatter runs
    pub fn default_status_code(&mut self, status: StatusCode) -> &mut Self {
        self.settings.default_status = status;
        self
    }

    pub fn with_settings(&mut self, settings: HandlerSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Add an output formatter for content negotiation
    pub fn formatter<F: OutputFormatter>(&mut self, formatter: F) -> &mut Self {
        self.negotiator.add(formatter);
        self
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn insert_rule(&mut self, rule: ExceptionRule) {
        let type_id = rule.type_id;
        // first registration fixes the tie-break position
        if self.rules.insert(type_id, rule).is_none() {
            self.registration_order.push(type_id);
        }
    }

    /// Freeze the configuration.
    ///
    /// Rules are ordered once by inheritance depth, deepest first, so that
    /// the most specific rule is the first one dispatch meets. Rules at the
    /// same depth keep their registration order.
    pub fn build(mut self) -> Dispatcher {
        let catalog = self.catalog;
        let mut ordered = self.registration_order;
        ordered.sort_by_key(|id| Reverse(catalog.depth_of(*id)));

        let rules: Vec<ExceptionRule> = ordered
            .iter()
            .filter_map(|id| self.rules.remove(id))
            .collect();

        tracing::info!(
            "Exception handler built with {} rules: [{}]",
            rules.len(),
            rules
                .iter()
                .map(|rule| format!("{} -> {}", rule.type_name, rule.status_code.as_u16()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Dispatcher::new(
            rules,
            catalog,
            self.default_formatter,
            self.observer,
            Arc::new(self.negotiator),
            self.settings,
        )
    }

    /// Build and wrap the dispatcher in a tower layer
    pub fn layer(self) -> ExceptionHandlerLayer {
        ExceptionHandlerLayer::new(self.build())
    }
}

impl Default for ExceptionHandlerConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

/// First step of a rule: the exception type is known, the status is not
pub struct RuleCreator<'a, T> {
    config: &'a mut ExceptionHandlerConfiguration,
    _exception: PhantomData<fn() -> T>,
}

impl<'a, T> RuleCreator<'a, T>
where
    T: Error + Send + Sync + 'static,
{
    /// Register the rule with its status code.
    ///
    /// Registering the same type again replaces the previous rule, body
    /// included. Until a body is attached the default formatter writes it.
    pub fn to_status_code(self, status: StatusCode) -> RuleHandle<'a> {
        let type_id = TypeId::of::<T>();
        self.config.catalog.declare::<T>();
        self.config.insert_rule(ExceptionRule {
            type_id,
            type_name: type_name::<T>(),
            status_code: status,
            producer: None,
        });

        tracing::debug!("Mapped {} to {}", type_name::<T>(), status);
        RuleHandle {
            config: self.config,
            type_id,
        }
    }
}

/// Registered rule awaiting an optional body
pub struct RuleHandle<'a> {
    config: &'a mut ExceptionHandlerConfiguration,
    type_id: TypeId,
}

impl<'a> RuleHandle<'a> {
    /// Respond with a fixed value, serialized through content negotiation
    pub fn with_body<B>(self, value: B) -> &'a mut ExceptionHandlerConfiguration
    where
        B: Serialize + Send + Sync + 'static,
    {
        self.with_producer(body::from_value(value))
    }

    /// Respond with a value built from the exception
    pub fn with_body_fn<F, R>(self, build: F) -> &'a mut ExceptionHandlerConfiguration
    where
        F: Fn(&Exception) -> R + Send + Sync + 'static,
        R: Serialize + Send,
    {
        self.with_producer(body::from_fn(build))
    }

    /// Write the response directly
    pub fn with_body_writer<F>(self, write: F) -> &'a mut ExceptionHandlerConfiguration
    where
        F: Fn(&Exception, &mut ResponseContext, &HandlerContext) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.with_producer(body::from_writer(write))
    }

    pub fn with_producer<P>(self, producer: P) -> &'a mut ExceptionHandlerConfiguration
    where
        P: BodyProducer,
    {
        if let Some(rule) = self.config.rules.get_mut(&self.type_id) {
            rule.producer = Some(Arc::new(producer));
        }
        self.config
    }
}
