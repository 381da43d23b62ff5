//! ServiceName - Cheap-to-clone service identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Service identifier with cheap cloning.
///
/// Internally uses `Arc<str>` so cloning only increments a reference count.
/// Service names are created once at registration time and cloned on every
/// submit, flush, and dispatch context, so the cheap clone pays off.
///
/// # Examples
/// ```
/// use contracts::ServiceName;
///
/// let name: ServiceName = "geocoder".into();
/// let name2 = name.clone();
/// assert_eq!(name, name2);
/// assert_eq!(name.as_str(), "geocoder");
/// ```
#[derive(Clone)]
pub struct ServiceName(Arc<str>);

impl ServiceName {
    /// Create a new ServiceName from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ServiceName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ServiceName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Borrow<str> so HashMap<ServiceName, _> can be probed with &str
impl Borrow<str> for ServiceName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ServiceName {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<Arc<str>> for ServiceName {
    #[inline]
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceName({:?})", self.0)
    }
}

impl PartialEq for ServiceName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for ServiceName {}

impl PartialEq<str> for ServiceName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for ServiceName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

// Hash must match str hash for Borrow<str> lookups
impl Hash for ServiceName {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for ServiceName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

/// Name of a dispatcher registered in the service type registry.
///
/// Plain newtype; type names are looked up rarely (once per flush) so the
/// `Arc<str>` treatment of [`ServiceName`] is not warranted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceTypeName(String);

impl ServiceTypeName {
    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identifier, which no registry accepts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<str> for ServiceTypeName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceTypeName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ServiceTypeName {
    #[inline]
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ServiceTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_is_cheap() {
        let name: ServiceName = "weather".into();
        let name2 = name.clone();

        assert_eq!(name.as_str().as_ptr(), name2.as_str().as_ptr());
    }

    #[test]
    fn test_equality() {
        let name: ServiceName = "geo".into();
        assert_eq!(name, "geo");
        assert_eq!(name, ServiceName::from("geo"));
    }

    #[test]
    fn test_hashmap_key() {
        let mut map: HashMap<ServiceName, i32> = HashMap::new();
        map.insert("svc1".into(), 1);
        map.insert("svc2".into(), 2);

        // Lookup with &str via Borrow
        assert_eq!(map.get("svc1"), Some(&1));
        assert_eq!(map.get("svc2"), Some(&2));
    }

    #[test]
    fn test_serde() {
        let name: ServiceName = "echo".into();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"echo\"");

        let back: ServiceName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn test_type_name() {
        let ty: ServiceTypeName = "call".into();
        assert_eq!(ty.as_str(), "call");
        assert!(!ty.is_empty());
        assert!(ServiceTypeName::from("").is_empty());
    }
}
