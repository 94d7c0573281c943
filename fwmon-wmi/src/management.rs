//! [`ManagementError`]: the error raised for a failed management operation.
//!
//! Construction never fails.  By default every instance captures the
//! ambient last error into an [`ErrorInfoBag`] at the moment it is built,
//! so build it right at the failure site.  When a remote object is supplied
//! its `__CLASS` is copied into the error; if that query fails the class
//! name is simply left empty.

use std::borrow::Cow;

use thiserror::Error;

use crate::bag::{PropertyBag, CLASS_PROPERTY};
use crate::error_info::ErrorInfoBag;
use crate::errors::Exception;
use crate::variant::Variant;

/// Full diagnostic context for a failed remote-management operation.
///
/// `Clone` copies the class name and shares the (immutable) error info.
#[derive(Debug, Clone, Error)]
#[error("{base}{}", class_suffix(.class_name))]
pub struct ManagementError {
    base: Exception,
    class_name: String,
    error_info: ErrorInfoBag,
}

impl ManagementError {
    /// No code, message or class name; captures the ambient error info.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn from_code(code: i32) -> Self {
        Self::builder().code(code).build()
    }

    pub fn from_message(message: impl Into<Cow<'static, str>>) -> Self {
        Self::builder().message(message).build()
    }

    pub fn builder<'a>() -> ManagementErrorBuilder<'a> {
        ManagementErrorBuilder::default()
    }

    pub fn base(&self) -> &Exception {
        &self.base
    }

    pub fn code(&self) -> Option<i32> {
        self.base.code()
    }

    pub fn message(&self) -> &str {
        self.base.message()
    }

    pub fn location(&self) -> &str {
        self.base.location()
    }

    /// Class of the remote object that raised the error, or `""` if unknown.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn error_info(&self) -> ErrorInfoBag {
        self.error_info.clone()
    }
}

impl Default for ManagementError {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ManagementError> for Exception {
    fn from(err: ManagementError) -> Self {
        err.base
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for ManagementError {
    fn from(err: windows::core::Error) -> Self {
        Self::builder()
            .code(err.code().0)
            .message(err.message())
            .build()
    }
}

fn class_suffix(class_name: &str) -> String {
    if class_name.is_empty() {
        String::new()
    } else {
        format!(" [class {class_name}]")
    }
}

#[derive(Default)]
enum ErrorInfoSource {
    #[default]
    Ambient,
    Explicit(ErrorInfoBag),
    Suppressed,
}

/// Builder covering every combination of code, object, message and location.
#[must_use = "call build() to obtain the ManagementError"]
#[derive(Default)]
pub struct ManagementErrorBuilder<'a> {
    code: Option<i32>,
    object: Option<&'a dyn PropertyBag>,
    message: Cow<'static, str>,
    location: Cow<'static, str>,
    error_info: ErrorInfoSource,
}

impl<'a> ManagementErrorBuilder<'a> {
    pub fn code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Remote object whose `__CLASS` names the failing class.
    pub fn object(mut self, object: &'a dyn PropertyBag) -> Self {
        self.object = Some(object);
        self
    }

    /// Like [`object`](Self::object); `None` leaves the class name empty.
    pub fn maybe_object(mut self, object: Option<&'a dyn PropertyBag>) -> Self {
        self.object = object;
        self
    }

    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    pub fn location(mut self, location: impl Into<Cow<'static, str>>) -> Self {
        self.location = location.into();
        self
    }

    /// Attach `info` instead of capturing the ambient slot.
    pub fn error_info(mut self, info: ErrorInfoBag) -> Self {
        self.error_info = ErrorInfoSource::Explicit(info);
        self
    }

    /// Attach no error info and leave the ambient slot untouched.
    pub fn without_error_info(mut self) -> Self {
        self.error_info = ErrorInfoSource::Suppressed;
        self
    }

    pub fn build(self) -> ManagementError {
        // The ambient slot is captured before the class-name query, which is
        // itself a remote call that may overwrite it.
        let error_info = match self.error_info {
            ErrorInfoSource::Ambient => ErrorInfoBag::capture(),
            ErrorInfoSource::Explicit(info) => info,
            ErrorInfoSource::Suppressed => ErrorInfoBag::empty(),
        };
        ManagementError {
            base: Exception::new(self.code, self.message, self.location),
            class_name: read_class_name(self.object),
            error_info,
        }
    }
}

fn read_class_name(object: Option<&dyn PropertyBag>) -> String {
    let Some(object) = object else {
        return String::new();
    };
    match object.get(CLASS_PROPERTY) {
        Ok(Some(Variant::String(name))) => name,
        Ok(_) => String::new(),
        Err(failure) => {
            log::trace!("{CLASS_PROPERTY} unavailable: {failure}");
            String::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
