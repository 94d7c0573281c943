//! Typed, leak-safe access to `__ExtendedStatus` / `CIM_Error` error info.
//!
//! [`ErrorInfoBag`] owns a reference-counted handle to a [`PropertyBag`]
//! captured from the ambient last-error slot (see [`crate::ambient`]).
//! Cloning shares the handle, [`ErrorInfoBag::take`] moves it out and
//! dropping the last owner releases the object.  None of these paths can
//! fail.
//!
//! The per-field accessors are generated in [`crate::schema`]; this module
//! holds the generic extraction primitive and the report builders.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::ambient;
use crate::bag::PropertyBag;
use crate::errors::{status, QueryFailure};
use crate::management::ManagementError;
use crate::schema::{FieldDef, CIM_ERROR_FIELDS, EXTENDED_STATUS_FIELDS};
use crate::variant::{FieldKind, FromVariant, TypeMismatch, Variant};

const EXTENDED_STATUS_HEADER: &str = "__ExtendedStatus information:";
const CIM_ERROR_HEADER: &str = "CIMError information:";

/// Error info captured from a failed management operation.
///
/// An empty bag (no handle) is the normal "no error info" state: every
/// accessor returns `Ok(None)` and [`error_text`](Self::error_text) renders
/// only the two section headers.
#[derive(Clone, Default)]
pub struct ErrorInfoBag {
    bag: Option<Rc<dyn PropertyBag>>,
}

impl ErrorInfoBag {
    /// A bag holding no error info.
    pub fn empty() -> Self {
        Self { bag: None }
    }

    /// Capture this thread's ambient last error.
    ///
    /// Must run on the thread that issued the failing call, before any other
    /// call that could overwrite the slot.  The slot is cleared.  An empty
    /// slot, or an error object without the property-bag capability, yields
    /// an empty bag.
    pub fn capture() -> Self {
        let Some(error) = ambient::take_last_error() else {
            return Self::empty();
        };
        match error.property_bag() {
            Some(bag) => Self { bag: Some(bag) },
            None => {
                log::debug!("ambient error object has no property bag; discarding it");
                Self::empty()
            }
        }
    }

    /// Wrap an already-obtained handle, bypassing the ambient slot.
    pub fn from_bag(bag: Rc<dyn PropertyBag>) -> Self {
        Self { bag: Some(bag) }
    }

    /// Drop this instance's reference, leaving it empty.  Idempotent.
    pub fn release(&mut self) {
        self.bag = None;
    }

    pub fn has_error(&self) -> bool {
        self.bag.is_some()
    }

    pub fn swap(&mut self, other: &mut ErrorInfoBag) {
        std::mem::swap(&mut self.bag, &mut other.bag);
    }

    /// Move the handle out, leaving `self` empty.
    pub fn take(&mut self) -> ErrorInfoBag {
        std::mem::take(self)
    }

    /// `true` if both instances hold the same underlying object.
    pub fn shares_bag_with(&self, other: &ErrorInfoBag) -> bool {
        match (&self.bag, &other.bag) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Read `name` as `T`.
    ///
    /// `Ok(None)` if the bag is empty, the property does not exist, or its
    /// value is empty / null.  A genuine query failure is raised as
    /// [`ManagementError`] carrying the ambient error info; a value that does
    /// not coerce to `T` is raised without touching the ambient slot.
    pub fn property<T: FromVariant>(&self, name: &str) -> Result<Option<T>, ManagementError> {
        self.lookup(name).map_err(|e| self.raise(name, e))
    }

    /// Read a schema field, normalised to the [`Variant`] for its kind.
    pub fn read_field(&self, field: &FieldDef) -> Result<Option<Variant>, ManagementError> {
        self.lookup_field(field)
            .map_err(|e| self.raise(field.name, e))
    }

    fn lookup<T: FromVariant>(&self, name: &str) -> Result<Option<T>, LookupError> {
        let Some(bag) = &self.bag else {
            return Ok(None);
        };
        let value = match bag.get(name) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(failure) if failure.code() == status::WBEM_E_NOT_FOUND => return Ok(None),
            Err(failure) => return Err(failure.into()),
        };
        if value.is_absent() {
            return Ok(None);
        }
        Ok(Some(T::from_variant(value)?))
    }

    fn lookup_field(&self, field: &FieldDef) -> Result<Option<Variant>, LookupError> {
        fn read<T: FromVariant>(
            info: &ErrorInfoBag,
            name: &str,
        ) -> Result<Option<Variant>, LookupError> {
            Ok(info.lookup::<T>(name)?.map(T::into_variant))
        }

        match field.kind {
            FieldKind::Text => read::<String>(self, field.name),
            FieldKind::UInt16 => read::<u16>(self, field.name),
            FieldKind::UInt32 => read::<u32>(self, field.name),
            FieldKind::TextList => read::<Vec<String>>(self, field.name),
        }
    }

    fn raise(&self, name: &str, error: LookupError) -> ManagementError {
        let builder = ManagementError::builder()
            .maybe_object(self.bag.as_deref())
            .location(format!("ErrorInfoBag::{name}"));
        match error {
            LookupError::Query(failure) => builder
                .code(failure.code())
                .message("PropertyBag::get")
                .build(),
            LookupError::Mismatch(mismatch) => builder
                .code(status::WBEM_E_TYPE_MISMATCH)
                .message(format!("property type mismatch: {mismatch}"))
                .without_error_info()
                .build(),
        }
    }

    /// Owned copy of every present schema field.
    ///
    /// Fields whose query fails are logged and left out, so this never
    /// fails.
    pub fn snapshot(&self) -> ErrorInfoSnapshot {
        ErrorInfoSnapshot {
            extended_status: self.collect(EXTENDED_STATUS_FIELDS),
            cim_error: self.collect(CIM_ERROR_FIELDS),
        }
    }

    /// The `__ExtendedStatus` section of the report.
    pub fn extended_status_text(&self) -> String {
        render_section(
            EXTENDED_STATUS_HEADER,
            &self.collect(EXTENDED_STATUS_FIELDS),
        )
    }

    /// The `CIM_Error` section of the report.
    pub fn cim_error_text(&self) -> String {
        render_section(CIM_ERROR_HEADER, &self.collect(CIM_ERROR_FIELDS))
    }

    /// Multi-line diagnostic report: extended status, then CIM error.
    pub fn error_text(&self) -> String {
        self.snapshot().to_string()
    }

    fn collect(&self, fields: &[FieldDef]) -> Vec<FieldValue> {
        if self.bag.is_none() {
            return Vec::new();
        }
        fields
            .iter()
            .filter_map(|field| match self.lookup_field(field) {
                Ok(value) => value.map(|value| FieldValue {
                    name: field.name,
                    value,
                }),
                Err(e) => {
                    log::warn!("skipping {} in error report: {e}", field.name);
                    None
                }
            })
            .collect()
    }
}

impl From<Rc<dyn PropertyBag>> for ErrorInfoBag {
    fn from(bag: Rc<dyn PropertyBag>) -> Self {
        Self::from_bag(bag)
    }
}

impl fmt::Debug for ErrorInfoBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorInfoBag")
            .field("has_error", &self.has_error())
            .finish()
    }
}

/// Failure of a single field lookup, before it is raised.
#[derive(Debug, Error)]
enum LookupError {
    #[error(transparent)]
    Query(#[from] QueryFailure),
    #[error(transparent)]
    Mismatch(#[from] TypeMismatch),
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One present field and its normalised value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    pub name: &'static str,
    pub value: Variant,
}

/// An owned, handle-free copy of the present error-info fields.
///
/// `Display` renders the same text as [`ErrorInfoBag::error_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorInfoSnapshot {
    pub extended_status: Vec<FieldValue>,
    pub cim_error: Vec<FieldValue>,
}

impl ErrorInfoSnapshot {
    /// `true` if no field of either schema was present.
    pub fn is_empty(&self) -> bool {
        self.extended_status.is_empty() && self.cim_error.is_empty()
    }
}

impl fmt::Display for ErrorInfoSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_section(
            EXTENDED_STATUS_HEADER,
            &self.extended_status,
        ))?;
        f.write_str(&render_section(CIM_ERROR_HEADER, &self.cim_error))
    }
}

fn render_section(header: &str, fields: &[FieldValue]) -> String {
    let mut text = String::from(header);
    for field in fields {
        text.push_str("\n\t");
        text.push_str(field.name);
        text.push(':');
        match &field.value {
            Variant::StringArray(items) => {
                for item in items {
                    text.push_str("\n\t");
                    text.push_str(item);
                }
            }
            Variant::String(s) => {
                text.push(' ');
                text.push_str(s);
            }
            Variant::U16(v) => text.push_str(&format!(" {v}")),
            Variant::U32(v) => text.push_str(&format!(" {v}")),
            Variant::I32(v) => text.push_str(&format!(" {v}")),
            Variant::Empty | Variant::Null => {}
        }
    }
    text.push('\n');
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
