//! The per-thread ambient "last error" slot.
//!
//! A failing interop call leaves its error object in a slot owned by the
//! calling thread.  [`take_last_error`] reads and clears it, which is what
//! [`ErrorInfoBag::capture`] does.
//!
//! # Ordering
//!
//! Capture **immediately** after the failing call, on the same thread and
//! before issuing any other call that could overwrite the slot.  Another
//! thread never sees this thread's error object.
//!
//! On Windows the slot falls through to the COM per-thread error object
//! (`GetErrorInfo`) when nothing was stored here explicitly.
//!
//! [`ErrorInfoBag::capture`]: crate::error_info::ErrorInfoBag::capture

use std::cell::Cell;
use std::rc::Rc;

use crate::bag::ErrorObject;

thread_local! {
    static LAST_ERROR: Cell<Option<Rc<dyn ErrorObject>>> = const { Cell::new(None) };
}

/// Store `error` as this thread's last error, replacing any previous one.
pub fn set_last_error(error: Rc<dyn ErrorObject>) {
    let _ = LAST_ERROR.try_with(|slot| slot.set(Some(error)));
}

/// Read and clear this thread's last error.
pub fn take_last_error() -> Option<Rc<dyn ErrorObject>> {
    LAST_ERROR
        .try_with(Cell::take)
        .ok()
        .flatten()
        .or_else(take_com_error)
}

#[cfg(windows)]
fn take_com_error() -> Option<Rc<dyn ErrorObject>> {
    crate::wbem::take_com_error()
}

#[cfg(not(windows))]
fn take_com_error() -> Option<Rc<dyn ErrorObject>> {
    None
}

/// Read this thread's last error without clearing it.
///
/// Only the slot set through [`set_last_error`] is inspected; the COM
/// error object cannot be read without clearing it.
pub fn peek_last_error() -> Option<Rc<dyn ErrorObject>> {
    LAST_ERROR
        .try_with(|slot| {
            let current = slot.take();
            slot.set(current.clone());
            current
        })
        .ok()
        .flatten()
}

/// `true` if [`set_last_error`] stored an error on this thread that has not
/// been taken yet.
pub fn has_last_error() -> bool {
    peek_last_error().is_some()
}

/// Drop this thread's last error, if any.
pub fn clear_last_error() {
    let _ = LAST_ERROR.try_with(Cell::take);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBag, PlainErrorObject};

    #[test]
    fn test_slot_empty_by_default() {
        assert!(!has_last_error());
        assert!(peek_last_error().is_none());
    }

    #[test]
    fn test_take_clears_slot() {
        set_last_error(Rc::new(PlainErrorObject::new("boom")));
        assert!(has_last_error());
        assert!(take_last_error().is_some());
        assert!(!has_last_error());
        assert!(take_last_error().is_none());
    }

    #[test]
    fn test_peek_keeps_slot() {
        set_last_error(Rc::new(MemoryBag::new()));
        assert!(peek_last_error().is_some());
        assert!(peek_last_error().is_some());
        assert!(has_last_error());
    }

    #[test]
    fn test_set_replaces_previous() {
        let first: Rc<dyn ErrorObject> = Rc::new(PlainErrorObject::new("first"));
        let second = Rc::new(MemoryBag::new().with("ProviderName", "second"));
        set_last_error(first.clone());
        set_last_error(second);
        let taken = take_last_error().unwrap();
        let bag = taken.property_bag().unwrap();
        assert_eq!(
            bag.get("ProviderName").unwrap(),
            Some(crate::variant::Variant::from("second"))
        );
        // The replaced object is no longer referenced by the slot.
        assert_eq!(Rc::strong_count(&first), 1);
    }

    #[test]
    fn test_clear_last_error() {
        set_last_error(Rc::new(PlainErrorObject::new("boom")));
        clear_last_error();
        assert!(!has_last_error());
        clear_last_error();
    }

    #[test]
    fn test_slot_is_per_thread() {
        set_last_error(Rc::new(PlainErrorObject::new("main")));
        let seen_elsewhere = std::thread::spawn(has_last_error).join().unwrap();
        assert!(!seen_elsewhere);
        assert!(has_last_error());
    }
}
