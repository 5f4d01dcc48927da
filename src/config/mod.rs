use crate::error::{HandlerError, Result};
use axum::http::StatusCode;
use std::env;

pub const DEFAULT_STATUS_KEY: &str = "EXCEPTION_HANDLER_DEFAULT_STATUS";
pub const LOG_UNHANDLED_KEY: &str = "EXCEPTION_HANDLER_LOG_UNHANDLED";

/// Environment-driven handler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Status written when no rule matches and the default formatter runs
    pub default_status: StatusCode,
    /// Emit a warning for exceptions that no rule matched
    pub log_unhandled: bool,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            default_status: StatusCode::INTERNAL_SERVER_ERROR,
            log_unhandled: true,
        }
    }
}

impl HandlerSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(DEFAULT_STATUS_KEY) {
            let code = raw
                .trim()
                .parse::<u16>()
                .map_err(|e| HandlerError::settings(DEFAULT_STATUS_KEY, e.to_string()))?;
            settings.default_status = StatusCode::from_u16(code)
                .map_err(|e| HandlerError::settings(DEFAULT_STATUS_KEY, e.to_string()))?;
        }

        if let Some(raw) = lookup(LOG_UNHANDLED_KEY) {
            settings.log_unhandled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(HandlerError::settings(
                        LOG_UNHANDLED_KEY,
                        format!("expected a boolean, got '{}'", other),
                    ));
                }
            };
        }

        Ok(settings)
    }
}
