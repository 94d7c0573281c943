//! The `__ExtendedStatus` and `CIM_Error` schemas.
//!
//! Each schema is declared once through `error_schema!`, which emits both the
//! ordered [`FieldDef`] list driving the report builder and one typed
//! accessor per field on [`ErrorInfoBag`].
//!
//! Every accessor returns `Ok(None)` when the bag is empty or the property is
//! absent or null, `Ok(Some(_))` with the coerced value otherwise, and `Err`
//! only for a genuine query failure or a type mismatch.

use crate::error_info::ErrorInfoBag;
use crate::management::ManagementError;
use crate::variant::{FieldKind, FromVariant};

/// One named, typed schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

macro_rules! error_schema {
    (
        $(#[$list_meta:meta])*
        $list:ident {
            $( $(#[$meta:meta])* $accessor:ident => $name:literal : $ty:ty, )*
        }
    ) => {
        $(#[$list_meta])*
        pub const $list: &[FieldDef] = &[
            $( FieldDef { name: $name, kind: <$ty as FromVariant>::KIND }, )*
        ];

        impl ErrorInfoBag {
            $(
                $(#[$meta])*
                pub fn $accessor(&self) -> Result<Option<$ty>, ManagementError> {
                    self.property::<$ty>($name)
                }
            )*
        }
    };
}

error_schema! {
    /// `__ExtendedStatus` fields in report order.
    EXTENDED_STATUS_FIELDS {
        /// `__ExtendedStatus.ProviderName`
        provider_name => "ProviderName": String,
        /// `__ExtendedStatus.Operation`
        operation => "Operation": String,
        /// `__ExtendedStatus.ParameterInfo`
        parameter_info => "ParameterInfo": String,
        /// `__ExtendedStatus.Description`
        description => "Description": String,
        /// `__ExtendedStatus.StatusCode`
        status_code => "StatusCode": u32,
    }
}

error_schema! {
    /// `CIM_Error` fields in report order.
    CIM_ERROR_FIELDS {
        /// `CIM_Error.ErrorType`, read as 32-bit.
        error_type => "ErrorType": u32,
        other_error_type => "OtherErrorType": String,
        owning_entity => "OwningEntity": String,
        message_id => "MessageID": String,
        message => "Message": String,
        message_arguments => "MessageArguments": Vec<String>,
        perceived_severity => "PerceivedSeverity": u16,
        probable_cause => "ProbableCause": u16,
        probable_cause_description => "ProbableCauseDescription": String,
        recommended_actions => "RecommendedActions": Vec<String>,
        error_source => "ErrorSource": String,
        error_source_format => "ErrorSourceFormat": u16,
        other_error_source_format => "OtherErrorSourceFormat": String,
        cim_status_code => "CIMStatusCode": u32,
        cim_status_code_description => "CIMStatusCodeDescription": String,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(fields: &[FieldDef]) -> Vec<&'static str> {
        fields.iter().map(|f| f.name).collect()
    }

    #[test]
    fn test_extended_status_order() {
        assert_eq!(
            names(EXTENDED_STATUS_FIELDS),
            ["ProviderName", "Operation", "ParameterInfo", "Description", "StatusCode"]
        );
        assert_eq!(EXTENDED_STATUS_FIELDS[4].kind, FieldKind::UInt32);
    }

    #[test]
    fn test_cim_error_order_and_kinds() {
        assert_eq!(CIM_ERROR_FIELDS.len(), 15);
        assert_eq!(CIM_ERROR_FIELDS[0].name, "ErrorType");
        assert_eq!(CIM_ERROR_FIELDS[14].name, "CIMStatusCodeDescription");

        let lists: Vec<_> = CIM_ERROR_FIELDS
            .iter()
            .filter(|f| f.kind == FieldKind::TextList)
            .map(|f| f.name)
            .collect();
        assert_eq!(lists, ["MessageArguments", "RecommendedActions"]);

        let shorts: Vec<_> = CIM_ERROR_FIELDS
            .iter()
            .filter(|f| f.kind == FieldKind::UInt16)
            .map(|f| f.name)
            .collect();
        assert_eq!(shorts, ["PerceivedSeverity", "ProbableCause", "ErrorSourceFormat"]);
    }

    #[test]
    fn test_field_names_unique() {
        let mut all = names(EXTENDED_STATUS_FIELDS);
        all.extend(names(CIM_ERROR_FIELDS));
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
