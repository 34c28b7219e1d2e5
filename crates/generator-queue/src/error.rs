//! Error types for queue configuration and operations.
//!
//! Every failure raised by this crate is a [`QueueError`]. Callers can tell
//! queue failures apart from any other error by downcasting to this type or by
//! comparing [`QueueError::name`] against [`QueueError::NAME`], and can branch
//! programmatically on [`QueueError::error_type`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

/// Open-ended diagnostic record attached to an error.
pub type ErrorDetails = Map<String, Value>;

/// `details.type` reported for every configuration failure.
pub const INVALID_ARGS_TYPE: &str = "INVALID_HOOK_ARGS";

/// Outcome of a single configuration predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputError {
    pub input_name: String,
    pub valid: bool,
}

impl InputError {
    /// Create a failing entry for the named input.
    pub fn invalid(input_name: impl Into<String>) -> Self {
        Self {
            input_name: input_name.into(),
            valid: false,
        }
    }
}

/// Comprehensive error type for all queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Invalid arguments passed to generator queue: {}", join_input_names(.input_errors))]
    InvalidConfiguration { input_errors: Vec<InputError> },

    #[error("Unknown configuration key: {key}")]
    UnknownConfigurationKey { key: String },

    #[error("Queue max size reached: {size} > {capacity}")]
    CapacityExceeded { size: usize, capacity: u64 },

    #[error("Queue capacity would be exceeded: {size} > {capacity}")]
    CapacityRejected { size: usize, capacity: u64 },

    #[error("Configuration loading failed: {message}")]
    ConfigurationLoad { message: String },

    #[error("{message}")]
    Custom {
        message: String,
        details: Option<ErrorDetails>,
    },
}

impl QueueError {
    /// Discriminator shared by every queue error.
    pub const NAME: &'static str = "GeneratorQueueError";

    /// Construct an error from a message and optional caller-supplied details.
    pub fn new(message: impl Into<String>, details: Option<ErrorDetails>) -> Self {
        Self::Custom {
            message: message.into(),
            details,
        }
    }

    /// Name identifying this error kind.
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Human-readable description.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Build the merged diagnostic record.
    ///
    /// The record always starts with `userMessage` and a null `originalError`.
    /// Variant fields are layered on top, and caller-supplied details passed to
    /// [`QueueError::new`] are merged last so they can override the defaults.
    pub fn details(&self) -> ErrorDetails {
        let mut record = Map::new();
        record.insert("userMessage".to_string(), Value::from(self.user_message()));
        record.insert("originalError".to_string(), Value::Null);

        match self {
            Self::InvalidConfiguration { input_errors } => {
                record.insert(
                    "inputErrors".to_string(),
                    serde_json::to_value(input_errors).unwrap_or(Value::Null),
                );
                record.insert("type".to_string(), Value::from(INVALID_ARGS_TYPE));
            }
            Self::UnknownConfigurationKey { key } => {
                record.insert("unknownKey".to_string(), Value::from(key.as_str()));
                record.insert("type".to_string(), Value::from(INVALID_ARGS_TYPE));
            }
            Self::CapacityExceeded { size, capacity }
            | Self::CapacityRejected { size, capacity } => {
                record.insert("size".to_string(), Value::from(*size));
                record.insert("capacity".to_string(), Value::from(*capacity));
            }
            Self::ConfigurationLoad { .. } => {
                record.insert("type".to_string(), Value::from(INVALID_ARGS_TYPE));
            }
            Self::Custom { details, .. } => {
                if let Some(details) = details {
                    for (key, value) in details {
                        record.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        record
    }

    /// Value of `details.type`, if any.
    pub fn error_type(&self) -> Option<String> {
        self.details()
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Input entries that failed validation, empty for other variants.
    pub fn input_errors(&self) -> &[InputError] {
        match self {
            Self::InvalidConfiguration { input_errors } => input_errors,
            _ => &[],
        }
    }

    /// Check if error originates from configuration validation or loading
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::UnknownConfigurationKey { .. }
                | Self::ConfigurationLoad { .. }
        )
    }

    /// Check if error was raised by a capacity check
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::CapacityRejected { .. }
        )
    }
}

fn join_input_names(input_errors: &[InputError]) -> String {
    input_errors
        .iter()
        .map(|e| e.input_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
