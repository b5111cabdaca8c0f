//! Error types for spot validation.
//!
//! Two families live here:
//!
//! - [`ValidationError`]: a per-field failure (the error descriptor). These are
//!   collected into a [`ValidationResult`](crate::evaluator::ValidationResult)
//!   and never abort an evaluation.
//! - [`SpotValidationError`]: a contract violation (bad rule construction,
//!   unknown catalog id, missing collaborator binding, bad configuration).
//!   These are returned to the host as hard failures.
//!
//! All string fields of [`ValidationError`] use `Cow<'static, str>` so the
//! common case of static codes and messages does not allocate.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::catalog::EnumName;
use crate::collaborators::{CollaboratorError, CollaboratorKind};
use crate::config::ConfigError;

// ============================================================================
// ERROR CODES
// ============================================================================

/// Stable error codes emitted by the engine.
///
/// Hosts key their localized templates by these strings.
pub mod codes {
    pub const REQUIRED: &str = "required";
    pub const TYPE_MISMATCH: &str = "type_mismatch";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const OUT_OF_RANGE: &str = "out_of_range";
    pub const BEFORE: &str = "before";
    pub const INVALID_ENUM_VALUE: &str = "invalid_enum_value";
    pub const PATTERN_MISMATCH: &str = "pattern_mismatch";
    pub const DATE_FORMAT: &str = "date_format";
    pub const INVALID_URL: &str = "invalid_url";
    pub const GREATER_THAN_FIELD: &str = "greater_than_field";
    pub const GREATER_THAN_OR_EQUAL_FIELD: &str = "greater_than_or_equal_field";
    pub const LESS_THAN_FIELD: &str = "less_than_field";
    pub const LESS_THAN_OR_EQUAL_FIELD: &str = "less_than_or_equal_field";
    pub const BELOW_MINIMUM_PRICE: &str = "below_minimum_price";
    pub const NEGATIVE_PRICE: &str = "negative_price";
    pub const DUPLICATE_ELEMENT: &str = "duplicate_element";
    pub const PROHIBITED: &str = "prohibited";
    pub const NOT_FOUND: &str = "not_found";
    pub const IMAGE_NOT_FOUND: &str = "image_not_found";
    pub const VALIDATION_UNAVAILABLE: &str = "validation_unavailable";
    pub const UNEXPECTED_FIELD: &str = "unexpected_field";
}

// ============================================================================
// ERROR KIND
// ============================================================================

/// Taxonomy of per-field failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RequiredFieldMissing,
    TypeMismatch,
    OutOfBounds,
    InvalidEnumValue,
    PatternMismatch,
    CrossFieldViolation,
    BelowMinimumPrice,
    DuplicateElement,
    ProhibitedCombination,
    /// A referenced row or remote resource does not exist.
    ReferenceNotFound,
    CollaboratorUnavailable,
}

impl ErrorKind {
    /// Classifies an error code. Unknown codes (from host-supplied custom
    /// rules) are reported as cross-field violations.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            codes::REQUIRED => Self::RequiredFieldMissing,
            codes::TYPE_MISMATCH => Self::TypeMismatch,
            codes::MIN | codes::MAX | codes::OUT_OF_RANGE | codes::BEFORE => Self::OutOfBounds,
            codes::INVALID_ENUM_VALUE => Self::InvalidEnumValue,
            codes::PATTERN_MISMATCH | codes::DATE_FORMAT | codes::INVALID_URL => {
                Self::PatternMismatch
            }
            codes::BELOW_MINIMUM_PRICE | codes::NEGATIVE_PRICE => Self::BelowMinimumPrice,
            codes::DUPLICATE_ELEMENT => Self::DuplicateElement,
            codes::PROHIBITED | codes::UNEXPECTED_FIELD => Self::ProhibitedCombination,
            codes::NOT_FOUND | codes::IMAGE_NOT_FOUND => Self::ReferenceNotFound,
            codes::VALIDATION_UNAVAILABLE => Self::CollaboratorUnavailable,
            _ => Self::CrossFieldViolation,
        }
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A structured per-field validation failure.
///
/// Carries every value a presentation layer needs to render a localized
/// message: the code, the field path, and template parameters (bounds, the
/// other field's name, the minimum price and currency, ...). `message` is a
/// default English rendering.
///
/// ```rust,ignore
/// use spot_validator::ValidationError;
///
/// let error = ValidationError::new("max", "Value must be at most 1000")
///     .with_field("front")
///     .with_param("max", "1000");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Error code for programmatic handling and i18n.
    pub code: Cow<'static, str>,

    /// Human-readable default message in English.
    pub message: Cow<'static, str>,

    /// Field path the error belongs to: `"rent_price"`, `"amenities.2"`.
    pub field: Option<Cow<'static, str>>,

    /// Ordered template parameters (typically 0-3).
    pub params: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl ValidationError {
    /// Creates a new validation error with a code and message.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
            params: Vec::new(),
        }
    }

    /// Sets the field path for this error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the field path only if none was set yet.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_default_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        if self.field.is_none() {
            self.field = Some(field.into());
        }
        self
    }

    /// Adds a template parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_code(&self.code)
    }

    /// Field path, or the empty string for record-level errors.
    #[must_use]
    pub fn field_path(&self) -> &str {
        self.field.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "[{}] {}: {}", field, self.code, self.message)?;
        } else {
            write!(f, "{}: {}", self.code, self.message)?;
        }

        if !self.params.is_empty() {
            write!(f, " (params: [")?;
            for (i, (k, v)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "])")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// CONVENIENCE CONSTRUCTORS
// ============================================================================

impl ValidationError {
    /// Creates a "required" error.
    pub fn required(field: impl Into<Cow<'static, str>>) -> Self {
        Self::new(codes::REQUIRED, "This field is required").with_field(field)
    }

    /// Creates a "type_mismatch" error.
    pub fn type_mismatch(
        field: impl Into<Cow<'static, str>>,
        expected: impl Into<Cow<'static, str>>,
    ) -> Self {
        let expected = expected.into();
        Self::new(codes::TYPE_MISMATCH, format!("Value must be of type {expected}"))
            .with_field(field)
            .with_param("expected", expected)
    }

    /// Creates an "invalid_enum_value" error.
    pub fn invalid_enum_value(field: impl Into<Cow<'static, str>>, domain: &str, value: &str) -> Self {
        Self::new(codes::INVALID_ENUM_VALUE, "The selected value is invalid")
            .with_field(field)
            .with_param("enum", domain.to_owned())
            .with_param("value", value.to_owned())
    }

    /// Creates a "validation_unavailable" error for a failed collaborator call.
    pub fn unavailable(field: impl Into<Cow<'static, str>>, cause: &CollaboratorError) -> Self {
        Self::new(
            codes::VALIDATION_UNAVAILABLE,
            "Validation could not be completed, try again later",
        )
        .with_field(field)
        .with_param("reason", cause.to_string())
    }
}

// ============================================================================
// CONTRACT VIOLATIONS
// ============================================================================

/// Hard failures: the engine was misused or misconfigured.
///
/// Unlike [`ValidationError`], these are not user-input problems and fail
/// the whole call.
#[derive(Debug, thiserror::Error)]
pub enum SpotValidationError {
    /// A rule was constructed with arguments that violate its contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// A catalog lookup asked for an id the enum does not define.
    #[error("value {id} is not part of enum {enum_name}")]
    UnknownEnumValue { enum_name: EnumName, id: i64 },

    /// A rule set needs a collaborator that the host did not bind.
    #[error("rule set requires the {0} collaborator but none was provided")]
    MissingCollaborator(CollaboratorKind),

    /// The configuration could not be loaded or is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SpotValidationError {
    pub(crate) fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

// ============================================================================
// TESTS
// ============================================================================
