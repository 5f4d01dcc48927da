//! Content negotiation for exception bodies
//!
//! Bodies are handed over as `serde_json::Value` and rendered by the first
//! [`OutputFormatter`] whose media types satisfy the request's `Accept`
//! header. JSON is always installed first and doubles as the fallback when
//! nothing acceptable is registered.

use crate::error::Result;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

mod formatters;

pub use formatters::{JsonFormatter, PlainTextFormatter};

/// Media types produced by the built-in formatters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, IntoStaticStr)]
pub enum MediaType {
    #[strum(serialize = "application/json")]
    ApplicationJson,
    #[strum(serialize = "text/json")]
    TextJson,
    #[strum(serialize = "application/problem+json")]
    ProblemJson,
    #[strum(serialize = "text/plain")]
    TextPlain,
}

/// Renders a response body for a set of media types
pub trait OutputFormatter: Send + Sync + 'static {
    /// Media types this formatter writes, preferred first
    fn media_types(&self) -> &[&'static str];

    fn format(&self, value: &serde_json::Value) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    essence: String,
    quality: f32,
}

impl MediaRange {
    fn matches(&self, media_type: &str) -> bool {
        if self.essence == "*/*" {
            return true;
        }
        match self.essence.strip_suffix("/*") {
            Some(top_level) => media_type
                .split('/')
                .next()
                .is_some_and(|t| t.eq_ignore_ascii_case(top_level)),
            None => self.essence.eq_ignore_ascii_case(media_type),
        }
    }
}

/// Parse an `Accept` header into media ranges, highest quality first.
///
/// Ranges with `q=0` are dropped; an unreadable weight counts as 1.
fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(|part| {
            let mut params = part.split(';');
            let essence = params.next()?.trim().to_ascii_lowercase();
            if essence.is_empty() {
                return None;
            }

            let quality = params
                .filter_map(|param| param.split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
                .map(|(_, value)| value.trim().parse::<f32>().unwrap_or(1.0))
                .unwrap_or(1.0);

            Some(MediaRange { essence, quality })
        })
        .filter(|range| range.quality > 0.0)
        .collect();

    // stable: equal weights keep header order
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Ordered set of output formatters
pub struct Negotiator {
    formatters: Vec<Arc<dyn OutputFormatter>>,
    fallback: Arc<dyn OutputFormatter>,
}

impl Negotiator {
    /// A negotiator with only the JSON formatter installed
    pub fn new() -> Self {
        let json: Arc<dyn OutputFormatter> = Arc::new(JsonFormatter::default());
        Self {
            formatters: vec![Arc::clone(&json)],
            fallback: json,
        }
    }

    /// Append a formatter; earlier formatters win for wildcard ranges
    pub fn add<F: OutputFormatter>(&mut self, formatter: F) -> &mut Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Pick a formatter and the media type it should announce.
    pub fn select(&self, accept: Option<&str>) -> (&dyn OutputFormatter, &'static str) {
        if let Some(accept) = accept {
            for range in parse_accept(accept) {
                for formatter in &self.formatters {
                    if let Some(media_type) = formatter
                        .media_types()
                        .iter()
                        .copied()
                        .find(|media_type| range.matches(media_type))
                    {
                        return (formatter.as_ref(), media_type);
                    }
                }
            }
        }

        let media_type = self
            .fallback
            .media_types()
            .first()
            .copied()
            .unwrap_or_else(|| MediaType::ApplicationJson.into());
        (self.fallback.as_ref(), media_type)
    }
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new()
    }
}
