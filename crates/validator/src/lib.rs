//! # spot-validator
//!
//! Rule resolution and validation for real-estate spot records.
//!
//! A record is a JSON object. Validation runs in two steps:
//!
//! 1. [`RuleSetResolver`] decides which field rules apply, from the spot type,
//!    the complex flag, the sub-forms present, and (on update) the stored spot.
//! 2. [`RuleEvaluator`] runs those rules and collects every field error into a
//!    [`ValidationResult`], along with a normalized copy of the record.
//!
//! [`SpotValidator`] wraps both behind one call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spot_validator::prelude::*;
//!
//! let validator = SpotValidator::new(ValidationConfig::default())?
//!     .with_collaborators(
//!         Collaborators::new()
//!             .with_existence(my_store)
//!             .with_url_checker(my_http_head),
//!     );
//!
//! let result = validator.validate(&record, ValidationMode::creation())?;
//! for error in result.iter_errors() {
//!     println!("{}: {}", error.field_path(), error.code);
//! }
//! ```
//!
//! ## Errors
//!
//! User input problems are never `Err`: they are [`ValidationError`]s inside
//! the result. `Err(SpotValidationError)` means the engine was misused, for
//! example a collaborator the rule set needs was not bound.

// ValidationError is returned by value from every atom.
#![allow(clippy::result_large_err)]

pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod fragments;
pub mod prelude;
pub mod record;
pub mod resolver;
pub mod rule;
pub mod rules;
pub mod validator;

pub use catalog::{Catalog, CatalogEntry, EnumName};
pub use collaborators::{
    CollaboratorError, CollaboratorKind, Collaborators, ExchangeRateConverter, ExistenceChecker,
    FixedRateConverter, UrlCheck, UrlReachabilityChecker,
};
pub use config::{ConfigError, ValidationConfig};
pub use error::{ErrorKind, SpotValidationError, ValidationError};
pub use evaluator::{EvaluatorOptions, RuleEvaluator, ValidationResult};
pub use record::{Record, prepare_for_validation};
pub use resolver::{ExistingSpot, ResolveRequest, RuleSetResolver};
pub use rule::{FieldRules, RuleAtom, RuleSet, RuleSetShape};
pub use validator::{BatchReport, SpotValidator, ValidationMode};
