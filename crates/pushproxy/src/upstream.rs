//! The host's view of a backend.

use std::sync::Arc;

use corelib::NodeId;

/// A pool entry the selector can route to.
///
/// The dial address doubles as the ring identifier, so it must be unique
/// within a pool.
pub trait Upstream {
    fn dial(&self) -> &str;
}

impl Upstream for str {
    fn dial(&self) -> &str {
        self
    }
}

impl Upstream for String {
    fn dial(&self) -> &str {
        self
    }
}

impl Upstream for NodeId {
    fn dial(&self) -> &str {
        self.as_str()
    }
}

impl<T: Upstream + ?Sized> Upstream for &T {
    fn dial(&self) -> &str {
        (**self).dial()
    }
}

impl<T: Upstream + ?Sized> Upstream for Arc<T> {
    fn dial(&self) -> &str {
        (**self).dial()
    }
}

impl<T: Upstream + ?Sized> Upstream for Box<T> {
    fn dial(&self) -> &str {
        (**self).dial()
    }
}
