//! `fwmon_wmi` -- WMI error detail for the firewall event monitor.
//!
//! Captures the ambient "last error" left behind by a failed WMI call,
//! exposes its `__ExtendedStatus` and `CIM_Error` properties through typed
//! accessors, and renders them as a deterministic text report attached to
//! [`ManagementError`].
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | Status codes, `QueryFailure`, base `Exception` via `thiserror` |
//! | [`variant`] | Dynamic `Variant` values and typed `FromVariant` extraction |
//! | [`bag`] | `PropertyBag` / `ErrorObject` interop traits |
//! | [`ambient`] | Thread-local last-error slot |
//! | [`schema`] | Ordered `__ExtendedStatus` / `CIM_Error` field lists and accessors |
//! | [`error_info`] | `ErrorInfoBag`, snapshots and report rendering |
//! | [`management`] | `ManagementError` and its builder |
//! | [`memory`] | In-process `MemoryBag` for tests and non-COM callers |
//! | `wbem` | `IWbemClassObject` / `GetErrorInfo` backend (Windows only) |
//!
//! # Threading
//!
//! Error info is thread-affine: handles are `Rc`, so neither
//! [`ErrorInfoBag`] nor [`ManagementError`] is `Send`.

pub mod ambient;
pub mod bag;
pub mod error_info;
pub mod errors;
pub mod management;
pub mod memory;
pub mod schema;
pub mod variant;
#[cfg(windows)]
pub mod wbem;

pub use bag::{ErrorObject, PropertyBag};
pub use error_info::{ErrorInfoBag, ErrorInfoSnapshot, FieldValue};
pub use errors::{Exception, QueryFailure};
pub use management::{ManagementError, ManagementErrorBuilder};
pub use variant::Variant;
