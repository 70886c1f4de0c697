// Record trait for anything the flat-file store can hold

use serde::{Serialize, de::DeserializeOwned};

/// Core trait that any storable record must implement
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Lookup key for this record (e.g. a book's name)
    ///
    /// Keys are not unique: several records may share one, and lookups
    /// take the first match in sequence order.
    fn key(&self) -> &str;

    /// Whether this record answers to the given key
    fn has_key(&self, key: &str) -> bool {
        self.key() == key
    }
}
