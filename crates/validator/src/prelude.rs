//! Prelude module for convenient imports.
//!
//! `use spot_validator::prelude::*;` brings in the validator facade, the
//! rule model, collaborator seams, and error types.

// ============================================================================
// FACADE
// ============================================================================

pub use crate::validator::{BatchReport, SpotValidator, ValidationMode};

// ============================================================================
// RESOLUTION AND EVALUATION
// ============================================================================

pub use crate::evaluator::{EvaluatorOptions, RuleEvaluator, ValidationResult};
pub use crate::resolver::{ExistingSpot, ResolveRequest, RuleSetResolver};
pub use crate::rule::{
    AtomFailure, CompareOp, Condition, CustomRule, FieldRules, RuleAtom, RuleContext, RuleSet,
    RuleSetShape, TypeKind,
};

// ============================================================================
// DOMAIN
// ============================================================================

pub use crate::catalog::kinds::{AreaMode, Currency, SpotType};
pub use crate::catalog::{Catalog, EnumName};
pub use crate::collaborators::{
    CollaboratorError, CollaboratorKind, Collaborators, ExchangeRateConverter, ExistenceChecker,
    FixedRateConverter, UrlCheck, UrlReachabilityChecker,
};
pub use crate::config::ValidationConfig;
pub use crate::error::{ErrorKind, SpotValidationError, ValidationError, codes};
pub use crate::record::Record;
