//! Keyed registry of shared orchestration objects.
//!
//! The orchestration daemon keeps one process-wide directory through which
//! orchs find each other (e.g. AclOrch looking up CrmOrch). Entries are
//! keyed either by an explicit name or by the Rust type name of a marker
//! type, so `directory.set::<CrmOrch>(handle)` and
//! `directory.get::<CrmOrch>()` agree on the key without a string literal.
//!
//! # Differences from the C++ `Directory<T>`
//!
//! - Lookups return `Result` instead of throwing on a missing key.
//! - Lookups never create entries (no `operator[]` auto-vivification).
//! - `clear` and `is_empty` are methods of the registry itself, so test
//!   fixtures reset it through the same type that enforces key uniqueness.

use std::any::type_name;
use std::collections::BTreeMap;

use log::debug;
use thiserror::Error;

/// Error type for Directory lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("Directory entry not found: {key}")]
    NotFound { key: String },
}

/// A registry of shared objects keyed by name.
///
/// `T` is usually a cheap handle such as `Arc<Mutex<SomeOrch>>`.
///
/// # Example
///
/// ```
/// use sonic_orch_common::Directory;
///
/// struct PortsOrch;
///
/// let mut dir: Directory<u32> = Directory::new();
/// dir.set::<PortsOrch>(7);
/// assert_eq!(dir.get::<PortsOrch>(), Ok(&7));
///
/// dir.clear();
/// assert!(dir.is_empty());
/// assert!(dir.get::<PortsOrch>().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Directory<T> {
    values: BTreeMap<String, T>,
}

impl<T> Default for Directory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Directory<T> {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Returns the key used for entries registered under type `K`.
    pub fn key_of<K: ?Sized>() -> &'static str {
        type_name::<K>()
    }

    /// Registers `value` under the type name of `K`.
    ///
    /// Returns the previously registered value, if any.
    pub fn set<K: ?Sized>(&mut self, value: T) -> Option<T> {
        self.insert(Self::key_of::<K>(), value)
    }

    /// Registers `value` under an explicit key.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        let key = key.into();
        let previous = self.values.insert(key.clone(), value);
        if previous.is_some() {
            debug!("Directory: replaced entry {}", key);
        }
        previous
    }

    /// Looks up the value registered under the type name of `K`.
    pub fn get<K: ?Sized>(&self) -> Result<&T, DirectoryError> {
        self.get_named(Self::key_of::<K>())
    }

    /// Looks up the value registered under `key`.
    ///
    /// **This never creates entries.**
    pub fn get_named(&self, key: &str) -> Result<&T, DirectoryError> {
        self.values.get(key).ok_or_else(|| DirectoryError::NotFound {
            key: key.to_string(),
        })
    }

    /// Returns true if a value is registered under the type name of `K`.
    pub fn contains<K: ?Sized>(&self) -> bool {
        self.contains_named(Self::key_of::<K>())
    }

    /// Returns true if a value is registered under `key`.
    pub fn contains_named(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes the value registered under the type name of `K`.
    pub fn remove<K: ?Sized>(&mut self) -> Option<T> {
        self.values.remove(Self::key_of::<K>())
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes every entry.
    ///
    /// Values already handed out by `get` are clones of handles and stay
    /// valid; only lookups by key are affected.
    pub fn clear(&mut self) {
        debug!("Directory: clearing {} entries", self.values.len());
        self.values.clear();
    }

    /// Returns the registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
