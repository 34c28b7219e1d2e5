//! Queue configuration, validation and loading.
//!
//! Options reach the queue in one of three ways:
//! - typed [`QueueOptions`], checked by [`QueueOptions::validate`]
//! - a loosely typed argument map (for example decoded JSON), checked key by
//!   key by [`validate_args`] before conversion
//! - layered settings sources (file + `GQ__*` environment) read through
//!   [`QueueSettings::load`]
//!
//! Configuration is fixed once a queue is constructed; changing behaviour
//! means building a new queue.

use crate::error::{InputError, QueueError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Upper bound (exclusive) for the queue capacity.
///
/// Matches the largest length an unsigned 32-bit index can describe.
pub const HARD_MAX_CAPACITY: u64 = 4_294_967_295;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: u64 = 1024;

/// Environment prefix used by [`QueueSettings::load`].
pub const ENV_PREFIX: &str = "GQ";

/// Behaviour selected when a dispatch pushes the queue above its capacity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Append, then fail the call. The appended items are kept.
    #[default]
    Error,
    /// Capacity is advisory only.
    Allow,
    /// Refuse the whole batch before appending anything.
    Reject,
}

impl OverflowPolicy {
    /// Map the boolean "throw on max size" flag onto a policy.
    pub fn from_throw_flag(throw_on_max_size: bool) -> Self {
        if throw_on_max_size {
            Self::Error
        } else {
            Self::Allow
        }
    }

    /// Parse the textual name of a policy.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "allow" => Some(Self::Allow),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Self::from_throw_flag(*flag)),
            Value::String(name) => Self::parse(name),
            _ => None,
        }
    }
}

/// Ordering discipline of the queue. Only FIFO exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueOrdering {
    #[default]
    #[serde(rename = "FIFO")]
    Fifo,
}

impl QueueOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
        }
    }
}

/// Validated queue configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueOptions {
    pub capacity: u64,
    pub overflow_policy: OverflowPolicy,
    pub ordering: QueueOrdering,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            overflow_policy: OverflowPolicy::Error,
            ordering: QueueOrdering::Fifo,
        }
    }
}

impl QueueOptions {
    /// Create options with the given capacity and default policy and ordering.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn with_overflow_policy(mut self, overflow_policy: OverflowPolicy) -> Self {
        self.overflow_policy = overflow_policy;
        self
    }

    /// Check the typed options. Policy and ordering are valid by construction.
    pub fn validate(&self) -> Result<(), QueueError> {
        if capacity_in_range(self.capacity) {
            Ok(())
        } else {
            Err(QueueError::InvalidConfiguration {
                input_errors: vec![InputError::invalid(ArgField::Capacity.key())],
            })
        }
    }

    /// Validate a loosely typed argument map and convert it to options.
    ///
    /// Keys that are absent keep their default value. An `initialState` entry
    /// is validated but does not contribute to the options.
    pub fn from_args(args: &Map<String, Value>) -> Result<Self, QueueError> {
        validate_args(args)?;

        let mut options = Self::default();
        for (key, value) in args {
            match ArgField::from_key(key) {
                Some(ArgField::Capacity) => {
                    if let Some(capacity) = value.as_u64() {
                        options.capacity = capacity;
                    }
                }
                Some(ArgField::ThrowOnMaxSize | ArgField::OverflowPolicy) => {
                    if let Some(policy) = OverflowPolicy::from_value(value) {
                        options.overflow_policy = policy;
                    }
                }
                Some(ArgField::Ordering) => options.ordering = QueueOrdering::Fifo,
                Some(ArgField::InitialState) | None => {}
            }
        }

        Ok(options)
    }
}

/// Known keys of the argument map, aliases included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgField {
    Capacity,
    ThrowOnMaxSize,
    OverflowPolicy,
    Ordering,
    InitialState,
}

impl ArgField {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "capacity" | "queueMaxSize" => Some(Self::Capacity),
            "throwErrorOnMaxSizeReach" => Some(Self::ThrowOnMaxSize),
            "overflowPolicy" => Some(Self::OverflowPolicy),
            "ordering" | "kind" => Some(Self::Ordering),
            "initialState" => Some(Self::InitialState),
            _ => None,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::ThrowOnMaxSize => "throwErrorOnMaxSizeReach",
            Self::OverflowPolicy => "overflowPolicy",
            Self::Ordering => "ordering",
            Self::InitialState => "initialState",
        }
    }

    /// Option slot written by this key. Aliases share a slot.
    fn slot(&self) -> Self {
        match self {
            Self::ThrowOnMaxSize => Self::OverflowPolicy,
            other => *other,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Capacity => value.as_u64().is_some_and(capacity_in_range),
            Self::ThrowOnMaxSize => value.is_boolean(),
            Self::OverflowPolicy => OverflowPolicy::from_value(value).is_some(),
            Self::Ordering => value.as_str() == Some(QueueOrdering::Fifo.as_str()),
            Self::InitialState => value.is_array(),
        }
    }
}

fn capacity_in_range(capacity: u64) -> bool {
    capacity > 0 && capacity < HARD_MAX_CAPACITY
}

/// Validate every entry of a loosely typed argument map.
///
/// Unknown keys are rejected up front. All known keys are then evaluated,
/// and every failing entry is reported under the name the caller used.
/// Aliases of the same option may not appear together.
pub fn validate_args(args: &Map<String, Value>) -> Result<(), QueueError> {
    let mut fields = Vec::with_capacity(args.len());
    for (key, value) in args {
        let field = ArgField::from_key(key).ok_or_else(|| QueueError::UnknownConfigurationKey {
            key: key.clone(),
        })?;
        fields.push((key, field, value));
    }

    // Two keys writing the same slot are ambiguous; both are reported.
    let input_errors: Vec<InputError> = fields
        .iter()
        .filter(|(_, field, value)| {
            !field.accepts(value)
                || fields
                    .iter()
                    .filter(|(_, other, _)| other.slot() == field.slot())
                    .count()
                    > 1
        })
        .map(|(key, _, _)| InputError::invalid(key.as_str()))
        .collect();

    if input_errors.is_empty() {
        return Ok(());
    }

    tracing::debug!(
        failed = input_errors.len(),
        "Queue arguments failed validation"
    );
    Err(QueueError::InvalidConfiguration { input_errors })
}

/// Queue settings as read from layered configuration sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub capacity: Option<u64>,
    pub overflow_policy: Option<OverflowPolicy>,
    pub ordering: Option<QueueOrdering>,
}

impl QueueSettings {
    /// Load settings from an optional file and `GQ__*` environment variables.
    ///
    /// The file format follows its extension (toml, json or yaml). Environment
    /// variables override the file, e.g. `GQ__CAPACITY=64`.
    pub fn load(path: Option<&Path>) -> Result<Self, QueueError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Same as [`QueueSettings::load`] with a custom environment prefix.
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, QueueError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading queue settings from file");
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| QueueError::ConfigurationLoad {
                message: e.to_string(),
            })?;

        settings
            .try_deserialize()
            .map_err(|e| QueueError::ConfigurationLoad {
                message: e.to_string(),
            })
    }

    /// Convert to validated options, filling gaps with defaults.
    pub fn into_options(self) -> Result<QueueOptions, QueueError> {
        let defaults = QueueOptions::default();
        let options = QueueOptions {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            overflow_policy: self.overflow_policy.unwrap_or(defaults.overflow_policy),
            ordering: self.ordering.unwrap_or(defaults.ordering),
        };

        options.validate()?;
        Ok(options)
    }
}
