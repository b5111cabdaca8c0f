//! Uploaded photo entries.
//!
//! `photos` is an array of objects. File contents are the host's concern;
//! the engine only checks the optional `type` of each entry against the
//! photo type catalog. Errors are reported at `photos.<index>.type`.

use serde_json::Value;

use crate::catalog::EnumName;
use crate::error::ValidationError;
use crate::record::{as_integer, scalar_text};
use crate::rule::{AtomFailure, CustomRule, RuleContext};

/// Checks one element of `photos`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEntry;

impl CustomRule for PhotoEntry {
    fn name(&self) -> &'static str {
        "photo_entry"
    }

    fn check(&self, field: &str, value: &Value, ctx: &RuleContext<'_>) -> Result<(), AtomFailure> {
        let Value::Object(entry) = value else {
            return Err(ValidationError::type_mismatch(field.to_owned(), "object").into());
        };

        let photo_type = match entry.get("type") {
            None | Some(Value::Null) => return Ok(()),
            Some(photo_type) => photo_type,
        };
        let type_field = format!("{field}.type");

        let Some(id) = as_integer(photo_type) else {
            return Err(ValidationError::type_mismatch(type_field, "integer").into());
        };
        if !ctx.catalog.is_member(EnumName::PhotoType, id) {
            return Err(ValidationError::invalid_enum_value(
                type_field,
                EnumName::PhotoType.as_str(),
                &scalar_text(photo_type),
            )
            .into());
        }
        Ok(())
    }
}
