//! The host-facing validator.
//!
//! [`SpotValidator`] ties the pipeline together: the record is prepared
//! (list fields coerced to arrays), a rule set is resolved for it, and the
//! rule set is evaluated against the prepared copy. The caller's record is
//! never modified.
//!
//! ```rust,ignore
//! use spot_validator::prelude::*;
//!
//! let validator = SpotValidator::new(ValidationConfig::default())?
//!     .with_collaborators(Collaborators::new().with_existence(db_lookup));
//! let result = validator.validate(&record, ValidationMode::creation())?;
//! if !result.passed {
//!     for error in result.iter_errors() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;

use crate::collaborators::{CollaboratorKind, Collaborators, FixedRateConverter};
use crate::config::ValidationConfig;
use crate::error::SpotValidationError;
use crate::evaluator::{EvaluatorOptions, RuleEvaluator, ValidationResult};
use crate::record::{Record, prepare_for_validation};
use crate::resolver::{ExistingSpot, ResolveRequest, RuleSetResolver};
use crate::rule::RuleSet;

// ============================================================================
// MODE
// ============================================================================

/// How a record is being validated: creation or update, plus request flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationMode {
    existing: Option<ExistingSpot>,
    plot_rules: bool,
    reference_time: Option<NaiveDateTime>,
}

impl ValidationMode {
    #[must_use]
    pub fn creation() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn update(existing: ExistingSpot) -> Self {
        Self {
            existing: Some(existing),
            ..Self::default()
        }
    }

    /// Always include the pricing and contact sub-forms.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_plot_rules(mut self) -> Self {
        self.plot_rules = true;
        self
    }

    /// Pins "now" for date bounds. Defaults to the current UTC time.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    #[must_use]
    pub fn is_creation(&self) -> bool {
        self.existing.is_none()
    }

    fn request<'a>(&self, record: &'a Record) -> ResolveRequest<'a> {
        let mut request = match self.existing {
            Some(existing) => ResolveRequest::update(record, existing),
            None => ResolveRequest::creation(record),
        };
        if self.plot_rules {
            request = request.with_plot_rules();
        }
        if let Some(reference_time) = self.reference_time {
            request = request.with_reference_time(reference_time);
        }
        request
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Prepares, resolves, and evaluates spot records.
///
/// Cheap to clone; collaborators are shared behind `Arc`s.
#[derive(Debug, Clone)]
pub struct SpotValidator {
    resolver: RuleSetResolver,
    evaluator: RuleEvaluator,
    collaborators: Collaborators,
}

impl SpotValidator {
    /// Builds a validator, rejecting an inconsistent configuration.
    ///
    /// An exchange rate converter with the configured default rate is bound
    /// until the host supplies its own.
    pub fn new(config: ValidationConfig) -> Result<Self, SpotValidationError> {
        let resolver = RuleSetResolver::new(config.clone())?;
        let collaborators = Collaborators::new()
            .with_exchange_rate(FixedRateConverter::new(config.pricing.default_exchange_rate));
        Ok(Self {
            resolver,
            evaluator: RuleEvaluator::new(config),
            collaborators,
        })
    }

    /// Builds a validator from defaults plus environment overrides.
    pub fn from_env() -> Result<Self, SpotValidationError> {
        Self::new(ValidationConfig::default().with_env_overrides()?)
    }

    /// Replaces the collaborators. The fixed-rate converter stays bound
    /// when `collaborators` carries no converter of its own.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = if collaborators.is_bound(CollaboratorKind::ExchangeRate) {
            collaborators
        } else {
            let rate = self.config().pricing.default_exchange_rate;
            collaborators.with_exchange_rate(FixedRateConverter::new(rate))
        };
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.evaluator = self.evaluator.with_options(options);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        self.resolver.config()
    }

    #[must_use]
    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// The rule set that [`validate`](Self::validate) would evaluate.
    pub fn resolve(
        &self,
        record: &Record,
        mode: ValidationMode,
    ) -> Result<RuleSet, SpotValidationError> {
        let prepared = prepare_for_validation(record);
        self.resolver.resolve(&mode.request(&prepared))
    }

    /// Validates a record against its full rule set.
    pub fn validate(
        &self,
        record: &Record,
        mode: ValidationMode,
    ) -> Result<ValidationResult, SpotValidationError> {
        let prepared = prepare_for_validation(record);
        let rules = self.resolver.resolve(&mode.request(&prepared))?;
        self.evaluator.evaluate(&rules, &prepared, &self.collaborators)
    }

    /// Validates a record against the lightweight rule set.
    pub fn validate_basic(
        &self,
        record: &Record,
        mode: ValidationMode,
    ) -> Result<ValidationResult, SpotValidationError> {
        let prepared = prepare_for_validation(record);
        let rules = self.resolver.resolve_basic(&mode.request(&prepared));
        self.evaluator.evaluate(&rules, &prepared, &self.collaborators)
    }

    /// Validates records in order until `cancel` fires.
    ///
    /// A record already being evaluated when the token is cancelled
    /// completes normally; the rest are counted as skipped.
    pub fn validate_batch<'r>(
        &self,
        records: impl IntoIterator<Item = (&'r Record, ValidationMode)>,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut records = records.into_iter();
        let mut results = Vec::new();

        while let Some((record, mode)) = records.next() {
            if cancel.is_cancelled() {
                let skipped = 1 + records.count();
                tracing::info!(completed = results.len(), skipped, "batch validation cancelled");
                return BatchReport { results, skipped };
            }
            results.push(self.validate(record, mode));
        }

        BatchReport {
            results,
            skipped: 0,
        }
    }
}

/// Outcome of [`SpotValidator::validate_batch`].
#[derive(Debug)]
pub struct BatchReport {
    /// One entry per evaluated record, in input order.
    pub results: Vec<Result<ValidationResult, SpotValidationError>>,
    /// Records never evaluated because the batch was cancelled.
    pub skipped: usize,
}

impl BatchReport {
    #[must_use]
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }

    /// Records that evaluated and passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.as_ref().is_ok_and(|result| result.passed))
            .count()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CollaboratorError, UrlCheck, UrlReachabilityChecker};
    use crate::error::codes;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    struct AlwaysImage;

    impl UrlReachabilityChecker for AlwaysImage {
        fn check(&self, _url: &str) -> Result<UrlCheck, CollaboratorError> {
            Ok(UrlCheck {
                reachable: true,
                content_type: Some("image/png".to_owned()),
            })
        }
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn validator() -> SpotValidator {
        let mut config = ValidationConfig::default();
        config.features.validate_external_ids = false;
        SpotValidator::new(config)
            .unwrap()
            .with_collaborators(Collaborators::new().with_url_checker(AlwaysImage))
    }

    #[test]
    fn default_converter_is_bound() {
        let validator = validator().with_collaborators(Collaborators::new());
        assert!(validator.collaborators().is_bound(CollaboratorKind::ExchangeRate));
    }

    #[test]
    fn caller_record_is_not_modified() {
        let input = record(json!({ "spot_type_id": 13, "zip_code_id": 1, "amenities": "3" }));
        let before = input.clone();
        let _ = validator().validate(&input, ValidationMode::creation()).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn missing_type_short_circuits() {
        let input = record(json!({ "name": 5, "front": "wide" }));
        let result = validator().validate(&input, ValidationMode::creation()).unwrap();
        let keys: Vec<_> = result.errors.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["spot_type_id"]);
        assert_eq!(result.errors_for("spot_type_id")[0].code, codes::REQUIRED);
    }

    #[test]
    fn cancelled_batch_skips_everything() {
        let first = record(json!({}));
        let second = record(json!({}));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = validator().validate_batch(
            [(&first, ValidationMode::creation()), (&second, ValidationMode::creation())],
            &cancel,
        );
        assert_eq!(report.completed(), 0);
        assert_eq!(report.skipped, 2);
        assert!(report.was_cancelled());
    }

    #[test]
    fn batch_runs_in_order() {
        let valid = record(json!({ "spot_type_id": 13, "zip_code_id": 1, "ext_number": "12" }));
        let invalid = record(json!({}));
        let report = validator().validate_batch(
            [(&valid, ValidationMode::creation()), (&invalid, ValidationMode::creation())],
            &CancellationToken::new(),
        );
        assert_eq!(report.completed(), 2);
        assert_eq!(report.passed(), 1);
        assert!(!report.was_cancelled());
    }
}
