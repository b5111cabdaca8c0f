//! The escape hatch for rules the generic atoms cannot express.
//!
//! A [`CustomRule`] is a pure predicate over one field value. It may read
//! sibling fields from the record snapshot and call the collaborators it
//! declares in [`CustomRule::requires`]; it reports its outcome as a
//! `Result` instead of invoking a callback.

use std::fmt;
use std::time::Instant;

use serde_json::Value;

use crate::catalog::Catalog;
use crate::collaborators::{
    CollaboratorError, CollaboratorKind, Collaborators, ExchangeRateConverter, ExistenceChecker,
    UrlReachabilityChecker,
};
use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::record::Record;

// ============================================================================
// CUSTOM RULE TRAIT
// ============================================================================

/// A host- or engine-defined rule evaluated as a single atom.
///
/// # Examples
///
/// ```rust,ignore
/// use spot_validator::rule::{AtomFailure, CustomRule, RuleContext};
/// use spot_validator::ValidationError;
///
/// struct EvenNumber;
///
/// impl CustomRule for EvenNumber {
///     fn name(&self) -> &'static str {
///         "even_number"
///     }
///
///     fn check(&self, _field: &str, value: &Value, _ctx: &RuleContext<'_>) -> Result<(), AtomFailure> {
///         match value.as_i64() {
///             Some(n) if n % 2 == 0 => Ok(()),
///             _ => Err(ValidationError::new("even_number", "Value must be even").into()),
///         }
///     }
/// }
/// ```
pub trait CustomRule: Send + Sync {
    /// Stable identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Collaborators this rule calls. The evaluator refuses to start when
    /// one of them is not bound.
    fn requires(&self) -> &[CollaboratorKind] {
        &[]
    }

    /// Checks one present, non-null value.
    ///
    /// Errors without a field get the evaluated field path.
    fn check(&self, field: &str, value: &Value, ctx: &RuleContext<'_>) -> Result<(), AtomFailure>;
}

impl fmt::Debug for dyn CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomRule({})", self.name())
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Why an atom did not pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomFailure {
    /// The value breaks the rule.
    Invalid(ValidationError),
    /// A collaborator could not answer.
    Unavailable(CollaboratorError),
}

impl From<ValidationError> for AtomFailure {
    fn from(error: ValidationError) -> Self {
        Self::Invalid(error)
    }
}

impl From<CollaboratorError> for AtomFailure {
    fn from(error: CollaboratorError) -> Self {
        Self::Unavailable(error)
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// What a rule may look at while it runs.
///
/// `record` is the snapshot taken before evaluation started; normalization
/// done by other atoms in the same pass is not visible here.
///
/// `deadline` ends the pass's collaborator budget. Calls are not issued after
/// it; a call already started keeps its result.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub record: &'a Record,
    pub collaborators: &'a Collaborators,
    pub catalog: &'a Catalog,
    pub config: &'a ValidationConfig,
    pub deadline: Option<Instant>,
}

impl RuleContext<'_> {
    /// Reads a sibling field.
    #[must_use]
    pub fn sibling(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Fails with a timeout once the collaborator budget is spent.
    pub fn ensure_budget(&self, kind: CollaboratorKind) -> Result<(), CollaboratorError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                tracing::warn!(%kind, "collaborator budget spent, call not issued");
                Err(CollaboratorError::Timeout(kind))
            }
            _ => Ok(()),
        }
    }

    pub fn exchange_rate(&self) -> Result<&dyn ExchangeRateConverter, CollaboratorError> {
        self.collaborators
            .exchange_rate()
            .map_err(|_| missing(CollaboratorKind::ExchangeRate))
    }

    pub fn existence(&self) -> Result<&dyn ExistenceChecker, CollaboratorError> {
        self.collaborators
            .existence()
            .map_err(|_| missing(CollaboratorKind::Existence))
    }

    pub fn url_checker(&self) -> Result<&dyn UrlReachabilityChecker, CollaboratorError> {
        self.collaborators
            .url_checker()
            .map_err(|_| missing(CollaboratorKind::UrlReachability))
    }
}

fn missing(kind: CollaboratorKind) -> CollaboratorError {
    CollaboratorError::unavailable(kind, "not bound")
}
