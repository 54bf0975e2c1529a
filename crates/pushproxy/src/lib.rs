//! Label-aware upstream selection for a Pushgateway-style proxy.
//!
//! Write requests encode their grouping labels in the URL path
//! (`/metrics/job/api/instance/host-1`). This crate turns such a path into a
//! canonical label set and routes it through a consistent hash ring, so every
//! push for one label set reaches the same upstream:
//!
//! - [`labels`]: path parsing, `@base64` value decoding, name validation
//! - [`config`]: selection settings and directive parsing
//! - [`upstream`]: the seam through which the host exposes its pool
//! - [`selector`]: the lazily built ring and the per-request decision

pub mod config;
pub mod error;
pub mod labels;
pub mod selector;
pub mod upstream;

pub use config::{RefreshPolicy, SelectionConfig, DEFAULT_PREFIX, MAX_REPLICAS};
pub use error::{ConfigError, SelectError};
pub use labels::{split_labels, LabelSet, PrefixTrim};
pub use selector::{Decision, PushgatewaySelector};
pub use upstream::Upstream;
