//! Status codes and base error types for `fwmon_wmi`.
//!
//! [`Exception`] carries the code / message / location triple every raised
//! error has.  [`ManagementError`](crate::management::ManagementError)
//! composes it with the remote class name and the captured error info.

use std::borrow::Cow;

use thiserror::Error;

/// HRESULT / WBEMSTATUS values observed at the property-bag boundary.
pub mod status {
    /// Success.
    pub const S_OK: i32 = 0;
    /// WBEM_E_FAILED -- unspecified failure.
    pub const WBEM_E_FAILED: i32 = 0x8004_1001_u32 as i32;
    /// WBEM_E_NOT_FOUND -- the named property does not exist.
    pub const WBEM_E_NOT_FOUND: i32 = 0x8004_1002_u32 as i32;
    /// WBEM_E_TYPE_MISMATCH -- the value cannot be coerced to the requested type.
    pub const WBEM_E_TYPE_MISMATCH: i32 = 0x8004_1005_u32 as i32;
}

/// A genuine failure reported by a property query.
///
/// "Not found" is never a `QueryFailure`; [`PropertyBag::get`] reports it as
/// `Ok(None)`.
///
/// [`PropertyBag::get`]: crate::bag::PropertyBag::get
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("property query failed: HRESULT 0x{0:08X}")]
pub struct QueryFailure(pub i32);

impl QueryFailure {
    /// The raw HRESULT of the failed query.
    pub fn code(&self) -> i32 {
        self.0
    }
}

/// Base error: status code, message and source location.
///
/// Both strings are `Cow<'static, str>` so a literal is held by reference
/// and anything built at runtime is held by copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", describe(.code, .message, .location))]
pub struct Exception {
    code: Option<i32>,
    message: Cow<'static, str>,
    location: Cow<'static, str>,
}

impl Exception {
    pub fn new(
        code: Option<i32>,
        message: impl Into<Cow<'static, str>>,
        location: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            location: location.into(),
        }
    }

    /// Status code, if one was supplied.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Human-readable message (empty if none was supplied).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Location string (empty if none was supplied).
    pub fn location(&self) -> &str {
        &self.location
    }
}

fn describe(code: &Option<i32>, message: &str, location: &str) -> String {
    let mut text = if message.is_empty() {
        String::from("management operation failed")
    } else {
        message.to_owned()
    };
    if !location.is_empty() {
        text.push_str(" at ");
        text.push_str(location);
    }
    if let Some(code) = code {
        text.push_str(&format!(" (HRESULT 0x{code:08X})"));
    }
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(status::WBEM_E_NOT_FOUND as u32, 0x8004_1002);
        assert_eq!(status::WBEM_E_TYPE_MISMATCH as u32, 0x8004_1005);
        assert!(status::WBEM_E_FAILED < 0);
    }

    #[test]
    fn test_query_failure_display() {
        let failure = QueryFailure(status::WBEM_E_FAILED);
        assert_eq!(failure.code(), status::WBEM_E_FAILED);
        assert_eq!(
            failure.to_string(),
            "property query failed: HRESULT 0x80041001"
        );
    }

    #[test]
    fn test_exception_display_full() {
        let e = Exception::new(Some(5), "access denied", "Firewall::open");
        assert_eq!(
            e.to_string(),
            "access denied at Firewall::open (HRESULT 0x00000005)"
        );
    }

    #[test]
    fn test_exception_display_defaults() {
        let e = Exception::default();
        assert_eq!(e.code(), None);
        assert_eq!(e.message(), "");
        assert_eq!(e.location(), "");
        assert_eq!(e.to_string(), "management operation failed");
    }

    #[test]
    fn test_exception_message_borrowed_or_owned() {
        let borrowed = Exception::new(None, "static text", "");
        let owned = Exception::new(None, format!("built {}", 42), String::from("here"));
        assert_eq!(borrowed.message(), "static text");
        assert_eq!(owned.message(), "built 42");
        assert_eq!(owned.location(), "here");
    }
}
