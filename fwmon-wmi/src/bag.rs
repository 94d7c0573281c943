//! The interop seam: named property access and the capability query.
//!
//! [`PropertyBag`] is implemented by anything exposing named, dynamically
//! typed fields (a WMI class object on Windows, [`MemoryBag`] elsewhere).
//! [`ErrorObject`] is what the ambient slot holds; asking it for a property
//! bag view may legitimately fail.
//!
//! Both traits take `&self`.  Implementations whose underlying query is not
//! read-only use interior mutability, so callers can query through shared
//! references.
//!
//! [`MemoryBag`]: crate::memory::MemoryBag

use std::rc::Rc;

use crate::errors::QueryFailure;
use crate::variant::Variant;

/// Well-known property holding a remote object's declared class name.
pub const CLASS_PROPERTY: &str = "__CLASS";

/// An object exposing named, dynamically-typed properties.
pub trait PropertyBag {
    /// Look up `name`.
    ///
    /// - `Ok(Some(value))` -- the property exists (the value may still be
    ///   [`Variant::Empty`] or [`Variant::Null`]).
    /// - `Ok(None)` -- the property does not exist.
    /// - `Err(_)` -- the query itself failed.
    fn get(&self, name: &str) -> Result<Option<Variant>, QueryFailure>;
}

/// An error object as found in the ambient "last error" slot.
pub trait ErrorObject {
    /// Capability query: obtain the property-bag view of this error object.
    ///
    /// Returns `None` when the object does not support that view.
    fn property_bag(self: Rc<Self>) -> Option<Rc<dyn PropertyBag>>;
}
