//! Selection settings.
//!
//! Settings come either from a JSON object (every field optional) or from
//! the bare directive form `pushproxy [prefix]`, which only sets the prefix.

use corelib::{HashAlgorithm, DEFAULT_REPLICAS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::labels::PrefixTrim;

/// Path prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "/metrics";

/// Upper bound on virtual nodes per upstream.
pub const MAX_REPLICAS: usize = 10_000;

/// When the cached ring is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Build on the first request and keep that ring for the selector's
    /// lifetime. Upstreams added later are never selected; removed ones
    /// produce no selection.
    #[default]
    Never,
    /// Rebuild whenever the pool's identifier set differs from the ring's.
    OnMembershipChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Path prefix under which labels are encoded.
    pub prefix: String,
    pub prefix_trim: PrefixTrim,
    /// Virtual nodes per upstream.
    pub replicas: usize,
    pub hash: HashAlgorithm,
    pub refresh: RefreshPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            prefix_trim: PrefixTrim::default(),
            replicas: DEFAULT_REPLICAS,
            hash: HashAlgorithm::default(),
            refresh: RefreshPolicy::default(),
        }
    }
}

impl SelectionConfig {
    /// Settings from directive arguments: none keeps the default prefix,
    /// one sets it, more is an error.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        match args {
            [] => Ok(Self::default()),
            [prefix] => {
                let config = Self {
                    prefix: prefix.as_ref().to_owned(),
                    ..Self::default()
                };
                config.validate()?;
                Ok(config)
            }
            _ => Err(ConfigError::TooManyArguments(args.len())),
        }
    }

    /// Parse and validate a JSON settings object.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.replicas == 0 || self.replicas > MAX_REPLICAS {
            return Err(ConfigError::InvalidReplicas);
        }
        Ok(())
    }
}
