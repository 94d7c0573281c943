//! In-process property bags.
//!
//! [`MemoryBag`] stores properties in an ordered map and can be told to fail
//! specific queries, which makes it the stand-in for a remote class object
//! anywhere COM is unavailable.  [`PlainErrorObject`] is an error object
//! without the property-bag capability.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::bag::{ErrorObject, PropertyBag};
use crate::errors::QueryFailure;
use crate::variant::Variant;

#[derive(Debug, Clone)]
enum Entry {
    Value(Variant),
    Failure(i32),
}

/// An ordered, in-memory [`PropertyBag`].
#[derive(Debug, Default)]
pub struct MemoryBag {
    entries: RefCell<BTreeMap<String, Entry>>,
}

impl MemoryBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(self, name: &str, value: impl Into<Variant>) -> Self {
        self.set(name, value);
        self
    }

    /// Make every query for `name` fail with `code`.
    pub fn with_failure(self, name: &str, code: i32) -> Self {
        self.entries
            .borrow_mut()
            .insert(name.to_owned(), Entry::Failure(code));
        self
    }

    pub fn set(&self, name: &str, value: impl Into<Variant>) {
        self.entries
            .borrow_mut()
            .insert(name.to_owned(), Entry::Value(value.into()));
    }

    pub fn remove(&self, name: &str) {
        self.entries.borrow_mut().remove(name);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PropertyBag for MemoryBag {
    fn get(&self, name: &str) -> Result<Option<Variant>, QueryFailure> {
        match self.entries.borrow().get(name) {
            Some(Entry::Value(value)) => Ok(Some(value.clone())),
            Some(Entry::Failure(code)) => Err(QueryFailure(*code)),
            None => Ok(None),
        }
    }
}

impl ErrorObject for MemoryBag {
    fn property_bag(self: Rc<Self>) -> Option<Rc<dyn PropertyBag>> {
        Some(self)
    }
}

/// An error object carrying only a description.
///
/// Its capability query always fails, so capturing it yields no error info.
#[derive(Debug, Clone)]
pub struct PlainErrorObject {
    description: String,
}

impl PlainErrorObject {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl ErrorObject for PlainErrorObject {
    fn property_bag(self: Rc<Self>) -> Option<Rc<dyn PropertyBag>> {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::status;

    #[test]
    fn test_memory_bag_lookup() {
        let bag = MemoryBag::new()
            .with("ProviderName", "WinFirewall")
            .with("StatusCode", 5_u32);
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("ProviderName"), Ok(Some(Variant::from("WinFirewall"))));
        assert_eq!(bag.get("StatusCode"), Ok(Some(Variant::U32(5))));
        assert_eq!(bag.get("Operation"), Ok(None));
    }

    #[test]
    fn test_memory_bag_failure() {
        let bag = MemoryBag::new().with_failure("Message", status::WBEM_E_FAILED);
        assert_eq!(bag.get("Message"), Err(QueryFailure(status::WBEM_E_FAILED)));
    }

    #[test]
    fn test_memory_bag_set_and_remove() {
        let bag = MemoryBag::new();
        assert!(bag.is_empty());
        bag.set("__CLASS", "MSFT_NetFirewallRule");
        bag.set("__CLASS", "MSFT_NetFirewallProfile");
        assert_eq!(bag.get("__CLASS"), Ok(Some(Variant::from("MSFT_NetFirewallProfile"))));
        bag.remove("__CLASS");
        assert_eq!(bag.get("__CLASS"), Ok(None));
    }

    #[test]
    fn test_capability_query() {
        let bag = Rc::new(MemoryBag::new());
        assert!(bag.property_bag().is_some());
        let plain = Rc::new(PlainErrorObject::new("no bag here"));
        assert_eq!(plain.description(), "no bag here");
        assert!(plain.property_bag().is_none());
    }
}
