//! Dynamic property values and typed extraction.
//!
//! [`Variant`] is the owned, COM-free form of a property value.  Backends
//! normalise whatever their native representation is into one of these
//! variants; [`FromVariant`] then coerces it into a static type, failing
//! closed with [`TypeMismatch`] instead of truncating.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A dynamically-typed property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Variant {
    /// No value (VT_EMPTY).
    Empty,
    /// Explicit null (VT_NULL).
    Null,
    I32(i32),
    U16(u16),
    U32(u32),
    String(String),
    StringArray(Vec<String>),
}

impl Variant {
    /// `true` for [`Variant::Empty`] and [`Variant::Null`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Variant::Empty | Variant::Null)
    }

    /// Short name of the dynamic type, used in mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Empty => "empty",
            Variant::Null => "null",
            Variant::I32(_) => "sint32",
            Variant::U16(_) => "uint16",
            Variant::U32(_) => "uint32",
            Variant::String(_) => "string",
            Variant::StringArray(_) => "string[]",
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_owned())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::I32(value)
    }
}

impl From<u16> for Variant {
    fn from(value: u16) -> Self {
        Variant::U16(value)
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Variant::U32(value)
    }
}

impl From<Vec<String>> for Variant {
    fn from(value: Vec<String>) -> Self {
        Variant::StringArray(value)
    }
}

impl From<Vec<&str>> for Variant {
    fn from(value: Vec<&str>) -> Self {
        Variant::StringArray(value.into_iter().map(str::to_owned).collect())
    }
}

/// Static type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Text,
    UInt16,
    UInt32,
    TextList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "string",
            FieldKind::UInt16 => "uint16",
            FieldKind::UInt32 => "uint32",
            FieldKind::TextList => "string[]",
        })
    }
}

/// A present value that cannot be represented as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct TypeMismatch {
    pub expected: FieldKind,
    pub found: &'static str,
}

/// Coercion from a [`Variant`] into a static type.
pub trait FromVariant: Sized {
    const KIND: FieldKind;

    fn from_variant(value: Variant) -> Result<Self, TypeMismatch>;

    /// Convert back into the normalised [`Variant`] for this kind.
    fn into_variant(self) -> Variant;
}

fn mismatch<T: FromVariant>(value: &Variant) -> TypeMismatch {
    TypeMismatch {
        expected: T::KIND,
        found: value.type_name(),
    }
}

impl FromVariant for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_variant(value: Variant) -> Result<Self, TypeMismatch> {
        match value {
            Variant::String(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_variant(self) -> Variant {
        Variant::String(self)
    }
}

impl FromVariant for u32 {
    const KIND: FieldKind = FieldKind::UInt32;

    fn from_variant(value: Variant) -> Result<Self, TypeMismatch> {
        match value {
            Variant::U32(v) => Ok(v),
            Variant::U16(v) => Ok(u32::from(v)),
            Variant::I32(v) => u32::try_from(v).map_err(|_| mismatch::<Self>(&value)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_variant(self) -> Variant {
        Variant::U32(self)
    }
}

impl FromVariant for u16 {
    const KIND: FieldKind = FieldKind::UInt16;

    fn from_variant(value: Variant) -> Result<Self, TypeMismatch> {
        match value {
            Variant::U16(v) => Ok(v),
            Variant::U32(v) => u16::try_from(v).map_err(|_| mismatch::<Self>(&value)),
            Variant::I32(v) => u16::try_from(v).map_err(|_| mismatch::<Self>(&value)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_variant(self) -> Variant {
        Variant::U16(self)
    }
}

impl FromVariant for Vec<String> {
    const KIND: FieldKind = FieldKind::TextList;

    fn from_variant(value: Variant) -> Result<Self, TypeMismatch> {
        match value {
            Variant::StringArray(items) => Ok(items),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_variant(self) -> Variant {
        Variant::StringArray(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
