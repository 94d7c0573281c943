//! WMI backend: `IWbemClassObject` as a [`PropertyBag`], `IErrorInfo` as an
//! [`ErrorObject`].
//!
//! # COM apartment model
//!
//! The caller owns COM initialisation; everything here runs on the thread
//! that issued the failing WMI call.  The COM per-thread error object is
//! read with `GetErrorInfo`, which also clears it.

use std::rc::Rc;

use windows::core::{Interface, BSTR, PCWSTR, PWSTR, VARIANT};
use windows::Win32::System::Com::{CoTaskMemFree, GetErrorInfo, IErrorInfo};
use windows::Win32::System::Variant::{VariantToStringArrayAlloc, VT_NULL};
use windows::Win32::System::Wmi::{
    IWbemClassObject, CIM_FLAG_ARRAY, CIM_SINT32, CIM_STRING, CIM_UINT16, CIM_UINT32,
};

use crate::bag::{ErrorObject, PropertyBag};
use crate::errors::{status, QueryFailure};
use crate::variant::Variant;

/// A WMI class object (`__ExtendedStatus`, `CIM_Error`, or any instance).
#[derive(Clone)]
pub struct WbemObject {
    inner: IWbemClassObject,
}

impl WbemObject {
    pub fn new(inner: IWbemClassObject) -> Self {
        Self { inner }
    }

    pub fn as_raw(&self) -> &IWbemClassObject {
        &self.inner
    }
}

impl From<IWbemClassObject> for WbemObject {
    fn from(inner: IWbemClassObject) -> Self {
        Self::new(inner)
    }
}

impl PropertyBag for WbemObject {
    fn get(&self, name: &str) -> Result<Option<Variant>, QueryFailure> {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let mut value = VARIANT::default();
        let mut cim_type = 0i32;

        let result = unsafe {
            self.inner.Get(
                PCWSTR(wide.as_ptr()),
                0,
                &mut value,
                Some(&mut cim_type as *mut i32),
                None,
            )
        };
        if let Err(e) = result {
            return match e.code().0 {
                status::WBEM_E_NOT_FOUND => Ok(None),
                code => Err(QueryFailure(code)),
            };
        }

        if value.is_empty() {
            return Ok(Some(Variant::Empty));
        }
        if is_null(&value) {
            return Ok(Some(Variant::Null));
        }
        unsafe { convert(&value, cim_type) }.map(Some)
    }
}

fn is_null(value: &VARIANT) -> bool {
    unsafe { value.as_raw().Anonymous.Anonymous.vt == VT_NULL.0 }
}

/// Normalise a `VARIANT` returned by `IWbemClassObject::Get`.
///
/// WMI hands back uint16 / uint32 as `VT_I4`; the CIM type says how to read
/// it.
unsafe fn convert(value: &VARIANT, cim_type: i32) -> Result<Variant, QueryFailure> {
    let mismatch = QueryFailure(status::WBEM_E_TYPE_MISMATCH);

    if cim_type & CIM_FLAG_ARRAY.0 != 0 {
        if cim_type & !CIM_FLAG_ARRAY.0 != CIM_STRING.0 {
            return Err(mismatch);
        }
        return string_array(value).map(Variant::StringArray);
    }

    match cim_type {
        t if t == CIM_STRING.0 => BSTR::try_from(value)
            .map(|b| Variant::String(b.to_string()))
            .map_err(|_| mismatch),
        t if t == CIM_UINT32.0 => i32::try_from(value)
            .map(|v| Variant::U32(v as u32))
            .map_err(|_| mismatch),
        t if t == CIM_UINT16.0 => i32::try_from(value)
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .map(Variant::U16)
            .ok_or(mismatch),
        t if t == CIM_SINT32.0 => i32::try_from(value)
            .map(Variant::I32)
            .map_err(|_| mismatch),
        _ => Err(mismatch),
    }
}

unsafe fn string_array(value: &VARIANT) -> Result<Vec<String>, QueryFailure> {
    let mut items: *mut PWSTR = std::ptr::null_mut();
    let mut count = 0u32;
    VariantToStringArrayAlloc(value, &mut items, &mut count)
        .map_err(|e| QueryFailure(e.code().0))?;
    if items.is_null() {
        return Ok(Vec::new());
    }

    let raw = std::slice::from_raw_parts(items, count as usize);
    let strings = raw
        .iter()
        .map(|item| {
            let text = item.to_string().unwrap_or_default();
            CoTaskMemFree(Some(item.0 as *const _));
            text
        })
        .collect();
    CoTaskMemFree(Some(items as *const _));
    Ok(strings)
}

/// The COM per-thread error object.
pub struct ComErrorObject {
    inner: IErrorInfo,
}

impl ComErrorObject {
    pub fn new(inner: IErrorInfo) -> Self {
        Self { inner }
    }
}

impl ErrorObject for ComErrorObject {
    fn property_bag(self: Rc<Self>) -> Option<Rc<dyn PropertyBag>> {
        let object = self.inner.cast::<IWbemClassObject>().ok()?;
        Some(Rc::new(WbemObject::new(object)))
    }
}

/// Read and clear the COM error object of the calling thread.
pub fn take_com_error() -> Option<Rc<dyn ErrorObject>> {
    let info = unsafe { GetErrorInfo(0) }.ok()?;
    Some(Rc::new(ComErrorObject::new(info)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
