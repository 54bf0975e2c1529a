//! Label extraction from push paths.
//!
//! Paths look like `<prefix>/<name1>/<value1>/<name2>/<value2>/...`. A name
//! carrying the `@base64` suffix marks its value as URL-safe base64 without
//! padding, which lets values contain `/` or be empty.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use corelib::key::render_map;
use corelib::RingKey;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SelectError;

/// Name suffix marking a base64-encoded value.
pub const BASE64_SUFFIX: &str = "@base64";

/// Label names starting with this are reserved for internal use.
pub const RESERVED_LABEL_PREFIX: &str = "__";

/// Metric label name grammar.
static LABEL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").expect("Invalid label name pattern")
});

/// URL-safe alphabet, no padding on encode, lenient about trailing bits.
const LABEL_VALUE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// How the configured prefix is removed from the request path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixTrim {
    /// Trim every leading character that occurs anywhere in the prefix.
    ///
    /// Compatible with existing deployments. With prefix `/metrics` a first
    /// label named `instance` loses its leading `i`.
    #[default]
    CharacterSet,
    /// Remove the prefix itself, then leading slashes. The prefix only
    /// matches whole path segments; otherwise the path is used as is.
    Literal,
}

impl PrefixTrim {
    pub fn strip<'a>(self, path: &'a str, prefix: &str) -> &'a str {
        match self {
            PrefixTrim::CharacterSet => path.trim_start_matches(|c: char| prefix.contains(c)),
            PrefixTrim::Literal => path
                .strip_prefix(prefix)
                .filter(|rest| {
                    rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/')
                })
                .unwrap_or(path)
                .trim_start_matches('/'),
        }
    }
}

/// Canonical label set of one push.
///
/// Entries are kept sorted by name, and the ring key is rendered from that
/// order, so equal sets always hash alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair; a repeated name keeps the last value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl RingKey for LabelSet {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(render_map(self.iter()))
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        f.write_str("}")
    }
}

/// Decode an `@base64` label value. Trailing `=` are ignored.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn decode_base64(value: &str) -> Result<String, base64::DecodeError> {
    let bytes = LABEL_VALUE_ENGINE.decode(value.trim_end_matches('='))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Encode a label value for use after an `@base64` name.
pub fn encode_base64(value: &str) -> String {
    LABEL_VALUE_ENGINE.encode(value)
}

/// True if `name` may be used as a label name in a push path.
pub fn is_valid_label_name(name: &str) -> bool {
    LABEL_NAME_RE.is_match(name) && !name.starts_with(RESERVED_LABEL_PREFIX)
}

/// Extract the label set encoded in `path` below `prefix`.
///
/// A remainder of at most one byte means "no labels" and yields an empty
/// set.
pub fn split_labels(path: &str, prefix: &str, trim: PrefixTrim) -> Result<LabelSet, SelectError> {
    let labels = trim.strip(path, prefix);
    let mut result = LabelSet::new();
    if labels.len() <= 1 {
        return Ok(result);
    }

    let components: Vec<&str> = labels.split('/').collect();
    if components.len() % 2 != 0 {
        return Err(SelectError::MalformedPath(labels.to_owned()));
    }

    for pair in components.chunks_exact(2) {
        let (name, value) = (pair[0], pair[1]);
        let trimmed = name.strip_suffix(BASE64_SUFFIX).unwrap_or(name);
        if !is_valid_label_name(trimmed) {
            return Err(SelectError::InvalidLabelName(trimmed.to_owned()));
        }

        if name.len() == trimmed.len() {
            result.insert(name, value);
            continue;
        }

        let decoded = decode_base64(value).map_err(|source| SelectError::InvalidEncoding {
            name: trimmed.to_owned(),
            value: value.to_owned(),
            source,
        })?;
        result.insert(trimmed, decoded);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/metrics";

    fn split(path: &str) -> Result<LabelSet, SelectError> {
        split_labels(path, PREFIX, PrefixTrim::CharacterSet)
    }

    #[test]
    fn test_plain_and_base64_labels() {
        let path = format!("/metrics/job/api/instance@base64/{}", encode_base64("instance-1"));
        let labels = split(&path).unwrap();

        let expected: LabelSet = [("job", "api"), ("instance", "instance-1")].into_iter().collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_prefix_only_yields_no_labels() {
        assert!(split("/metrics").unwrap().is_empty());
        assert!(split("/metrics/").unwrap().is_empty());
        assert!(split("").unwrap().is_empty());
    }

    #[test]
    fn test_single_leftover_byte_is_no_labels() {
        // "x" is not in the prefix set and survives trimming, but one byte
        // is still treated as "no labels".
        assert!(split("/metrics/x").unwrap().is_empty());
    }

    #[test]
    fn test_odd_components_rejected() {
        assert_eq!(split("/metrics/job"), Err(SelectError::MalformedPath("job".into())));
        assert!(matches!(split("/metrics/job/api/zone"), Err(SelectError::MalformedPath(_))));
    }

    #[test]
    fn test_trailing_slash_makes_path_odd() {
        assert!(matches!(split("/metrics/job/api/"), Err(SelectError::MalformedPath(_))));
    }

    #[test]
    fn test_reserved_prefix_rejected() {
        assert_eq!(
            split("/metrics/job/api/__reserved/x"),
            Err(SelectError::InvalidLabelName("__reserved".into()))
        );
    }

    #[test]
    fn test_reserved_prefix_rejected_with_base64_suffix() {
        assert_eq!(
            split("/metrics/job/api/__name__@base64/eA"),
            Err(SelectError::InvalidLabelName("__name__".into()))
        );
    }

    #[test]
    fn test_grammar_violations_rejected() {
        for bad in ["1abc", "with-dash", "dot.ted", ""] {
            let path = format!("/metrics/job/api/{bad}/v");
            assert_eq!(split(&path), Err(SelectError::InvalidLabelName(bad.into())), "{bad}");
        }
    }

    #[test]
    fn test_bad_base64_rejected() {
        let err = split("/metrics/job@base64/not-valid-base64!!").unwrap_err();
        match err {
            SelectError::InvalidEncoding { name, value, .. } => {
                assert_eq!(name, "job");
                assert_eq!(value, "not-valid-base64!!");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_base64_padding_is_ignored() {
        let labels = split("/metrics/job@base64/YXBp==").unwrap();
        assert_eq!(labels.get("job"), Some("api"));
    }

    #[test]
    fn test_base64_empty_value() {
        let labels = split("/metrics/job/api/zone@base64/=").unwrap();
        assert_eq!(labels.get("zone"), Some(""));
    }

    #[test]
    fn test_base64_value_may_contain_slash() {
        let path = format!("/metrics/job@base64/{}", encode_base64("a/b"));
        assert_eq!(split(&path).unwrap().get("job"), Some("a/b"));
    }

    #[test]
    fn test_plain_value_is_verbatim() {
        let labels = split("/metrics/job/some%20value").unwrap();
        assert_eq!(labels.get("job"), Some("some%20value"));
    }

    #[test]
    fn test_repeated_name_keeps_last_value() {
        let labels = split("/metrics/job/a/job/b").unwrap();
        assert_eq!(labels.get("job"), Some("b"));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_character_set_trim_eats_label_letters() {
        // 'i' occurs in "/metrics", 'n' does not.
        let labels = split("/metrics/instance/host-1").unwrap();
        assert_eq!(labels.get("nstance"), Some("host-1"));
    }

    #[test]
    fn test_literal_trim_keeps_label_names() {
        let labels =
            split_labels("/metrics/instance/host-1", PREFIX, PrefixTrim::Literal).unwrap();
        assert_eq!(labels.get("instance"), Some("host-1"));
        assert!(split_labels("/metrics", PREFIX, PrefixTrim::Literal).unwrap().is_empty());
    }

    #[test]
    fn test_literal_trim_without_prefix_uses_whole_path() {
        let labels = split_labels("/job/api", PREFIX, PrefixTrim::Literal).unwrap();
        assert_eq!(labels.get("job"), Some("api"));
    }

    #[test]
    fn test_literal_trim_matches_whole_segments() {
        let labels = split_labels("/metricsjob/api", PREFIX, PrefixTrim::Literal).unwrap();
        assert_eq!(labels.get("metricsjob"), Some("api"));
        assert_eq!(labels.get("job"), None);

        let labels = split_labels("/metrics/job/api", "/metrics/", PrefixTrim::Literal).unwrap();
        assert_eq!(labels.get("job"), Some("api"));
    }

    #[test]
    fn test_ring_key_ignores_insertion_order() {
        let a: LabelSet = [("job", "api"), ("zone", "eu")].into_iter().collect();
        let b: LabelSet = [("zone", "eu"), ("job", "api")].into_iter().collect();
        assert_eq!(a.ring_bytes(), b.ring_bytes());
        assert_eq!(a.ring_bytes().as_ref(), b"map[job:api zone:eu]");
    }

    #[test]
    fn test_display() {
        let set: LabelSet = [("job", "api"), ("env", "prod")].into_iter().collect();
        assert_eq!(set.to_string(), r#"{env="prod", job="api"}"#);
    }
}
