//! Ring keys.
//!
//! Anything routed through the ring is reduced to a byte string first. For
//! maps the bytes are a canonical rendering with entries sorted by key, so
//! two maps holding the same pairs hash identically no matter how they were
//! built.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// A value that can be hashed onto the ring.
pub trait RingKey {
    /// Canonical bytes fed to the partitioner.
    fn ring_bytes(&self) -> Cow<'_, [u8]>;
}

impl RingKey for [u8] {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> RingKey for [u8; N] {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl RingKey for Vec<u8> {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl RingKey for str {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl RingKey for String {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl<T: RingKey + ?Sized> RingKey for &T {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        (**self).ring_bytes()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> RingKey for BTreeMap<K, V> {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        let mut pairs: Vec<(&str, &str)> = self
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        // BTreeMap order follows K's Ord, which need not be string order.
        pairs.sort_unstable();
        Cow::Owned(render_map(pairs))
    }
}

impl<K: AsRef<str>, V: AsRef<str>, S> RingKey for HashMap<K, V, S> {
    fn ring_bytes(&self) -> Cow<'_, [u8]> {
        let mut pairs: Vec<(&str, &str)> = self
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        pairs.sort_unstable();
        Cow::Owned(render_map(pairs))
    }
}

/// Render sorted pairs as `map[k1:v1 k2:v2]`.
///
/// The caller is responsible for sorting; this only formats. The rendering
/// is not injective: values containing `' '` or `':'` can alias another map
/// (`{job="a zone:b"}` renders like `{job="a", zone="b"}`), and such maps
/// share an owner.
pub fn render_map<'a, I>(sorted_pairs: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(b"map[");
    for (i, (name, value)) in sorted_pairs.into_iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        out.extend_from_slice(name.as_bytes());
        out.push(b':');
        out.extend_from_slice(value.as_bytes());
    }
    out.push(b']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_rendering_is_sorted() {
        let mut map = HashMap::new();
        map.insert("job", "api");
        map.insert("instance", "i-1");
        assert_eq!(map.ring_bytes().as_ref(), b"map[instance:i-1 job:api]");
    }

    #[test]
    fn test_hash_and_btree_maps_agree() {
        let mut hashed = HashMap::new();
        let mut ordered = BTreeMap::new();
        for (k, v) in [("zone", "eu"), ("job", "api"), ("env", "prod")] {
            hashed.insert(k.to_string(), v.to_string());
            ordered.insert(k, v);
        }
        assert_eq!(hashed.ring_bytes(), ordered.ring_bytes());
    }

    #[test]
    fn test_empty_map() {
        let map: BTreeMap<String, String> = BTreeMap::new();
        assert_eq!(map.ring_bytes().as_ref(), b"map[]");
    }

    #[test]
    fn test_separator_in_value_aliases_other_map() {
        let mut merged = BTreeMap::new();
        merged.insert("job", "a zone:b");
        let mut split = BTreeMap::new();
        split.insert("job", "a");
        split.insert("zone", "b");

        assert_ne!(merged, split);
        assert_eq!(merged.ring_bytes(), split.ring_bytes());
    }

    #[test]
    fn test_str_and_bytes_agree() {
        assert_eq!("key".ring_bytes(), b"key".ring_bytes());
    }
}
