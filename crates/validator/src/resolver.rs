//! Rule set resolution.
//!
//! [`RuleSetResolver::resolve`] decides which field rules apply to a record,
//! in this order:
//!
//! 1. On update, a missing or empty `is_complex` / `spot_type_id` falls back
//!    to the stored spot.
//! 2. On creation without a spot type, only `spot_type_id` is checked.
//! 3. On creation without a zip code, only `zip_code_id` is checked.
//! 4. A single spot gets `shared ∪ sub-forms ∪ category(single)`.
//! 5. A complex that hides its address gets a single prohibited rule.
//! 6. Otherwise a complex gets `shared ∪ sub-forms ∪ category(complex)`.
//!
//! Resolution is a pure function of the request: the same record, mode, and
//! reference time always produce the same rule set.

use chrono::NaiveDateTime;

use crate::catalog::kinds::{LISTABLE_SPOT_TYPES, SpotType};
use crate::config::ValidationConfig;
use crate::error::SpotValidationError;
use crate::fragments::{self, CompiledRules, FragmentContext};
use crate::record::{Record, as_member_id, is_blank, is_loosely_empty, is_truthy};
use crate::rule::{FieldRules, RuleSet, RuleSetShape};

// ============================================================================
// REQUEST
// ============================================================================

/// Classification of a stored spot, used on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingSpot {
    pub spot_type_id: i64,
    pub is_complex: bool,
}

/// Everything the resolver looks at.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    record: &'a Record,
    existing: Option<ExistingSpot>,
    include_plot_rules: bool,
    reference_time: NaiveDateTime,
}

impl<'a> ResolveRequest<'a> {
    /// A request creating a new spot.
    #[must_use]
    pub fn creation(record: &'a Record) -> Self {
        Self {
            record,
            existing: None,
            include_plot_rules: false,
            reference_time: chrono::Utc::now().naive_utc(),
        }
    }

    /// A request updating `existing`.
    #[must_use]
    pub fn update(record: &'a Record, existing: ExistingSpot) -> Self {
        Self {
            existing: Some(existing),
            ..Self::creation(record)
        }
    }

    /// Always include the pricing and contact sub-forms.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_plot_rules(mut self) -> Self {
        self.include_plot_rules = true;
        self
    }

    /// Fixes "now" for date bounds.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = reference_time;
        self
    }

    #[must_use]
    pub fn record(&self) -> &'a Record {
        self.record
    }

    #[must_use]
    pub fn is_creation(&self) -> bool {
        self.existing.is_none()
    }

    /// Spot type after the update fallback.
    #[must_use]
    pub fn spot_type_id(&self) -> Option<i64> {
        let value = self.record.get("spot_type_id");
        match self.existing {
            Some(existing) if value.is_none_or(is_loosely_empty) => Some(existing.spot_type_id),
            _ => value.and_then(as_member_id),
        }
    }

    /// Complex flag after the update fallback.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        match (self.record.get("is_complex"), self.existing) {
            (value, Some(existing)) if value.is_none_or(is_loosely_empty) => existing.is_complex,
            (value, _) => is_truthy(value),
        }
    }

    fn lacks(&self, field: &str) -> bool {
        self.record.get(field).is_none_or(is_blank)
    }

    fn has_any(&self, fields: &[&str]) -> bool {
        fields.iter().any(|field| self.record.contains_key(*field))
    }

    /// Whether the pricing sub-form applies.
    #[must_use]
    pub fn has_pricing(&self) -> bool {
        self.include_plot_rules || self.has_any(&["modality_type", "currency_type"])
    }

    /// Whether the contact sub-form applies.
    #[must_use]
    pub fn has_contact(&self) -> bool {
        self.include_plot_rules || self.has_any(&["contact_id", "contact_category"])
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Builds [`RuleSet`]s from requests.
#[derive(Debug, Clone)]
pub struct RuleSetResolver {
    config: ValidationConfig,
    compiled: CompiledRules,
}

impl RuleSetResolver {
    pub fn new(config: ValidationConfig) -> Result<Self, SpotValidationError> {
        config.validate()?;
        let compiled = CompiledRules::new(&config)?;
        Ok(Self { config, compiled })
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn context<'a>(&'a self, request: &ResolveRequest<'a>) -> FragmentContext<'a> {
        FragmentContext {
            record: request.record,
            config: &self.config,
            compiled: &self.compiled,
            reference_time: request.reference_time,
            is_creation: request.is_creation(),
        }
    }

    /// Resolves the full rule set for a record.
    ///
    /// Fails only on contract violations, such as a filled price combined
    /// with a non-positive `square_space`.
    #[tracing::instrument(
        name = "resolve_rule_set",
        skip_all,
        fields(creation = request.is_creation(), plot_rules = request.include_plot_rules)
    )]
    pub fn resolve(&self, request: &ResolveRequest<'_>) -> Result<RuleSet, SpotValidationError> {
        let spot_type_id = request.spot_type_id();
        let is_complex = request.is_complex();

        if request.is_creation() && spot_type_id.is_none() {
            tracing::debug!("spot type missing on creation");
            return Ok(RuleSet::new()
                .with_shape(RuleSetShape::MissingSpotType)
                .field(
                    "spot_type_id",
                    FieldRules::new().required().one_of(LISTABLE_SPOT_TYPES),
                ));
        }

        if request.is_creation() && request.lacks("zip_code_id") {
            tracing::debug!("zip code missing on creation");
            return Ok(RuleSet::new()
                .with_shape(RuleSetShape::MissingZipCode)
                .field(
                    "zip_code_id",
                    FieldRules::new().required().numeric().exists("zip_codes"),
                ));
        }

        if is_complex && is_truthy(request.record.get("hide_address_data")) {
            tracing::debug!("complex spot cannot hide its address");
            return Ok(RuleSet::new()
                .with_shape(RuleSetShape::ProhibitedCombination)
                .field("is_complex", FieldRules::new().prohibited_with("hide_address_data")));
        }

        let ctx = self.context(request);
        let category = spot_type_id.and_then(SpotType::from_id);

        let mut rules = fragments::shared(&ctx);
        if request.has_pricing() {
            rules.merge(fragments::pricing(&ctx)?);
        }
        if request.has_contact() {
            rules.merge(fragments::contact(&ctx));
        }
        if let Some(category) = category {
            rules.merge(category_rules(category, is_complex, &ctx));
        }

        tracing::debug!(
            spot_type_id,
            ?category,
            is_complex,
            fields = rules.len(),
            "rule set resolved"
        );
        Ok(rules.with_shape(RuleSetShape::Composed { category, complex: is_complex }))
    }

    /// Resolves the lightweight rule set.
    #[tracing::instrument(name = "resolve_rule_set", skip_all, fields(basic = true))]
    pub fn resolve_basic(&self, request: &ResolveRequest<'_>) -> RuleSet {
        fragments::basic(&self.context(request)).with_shape(RuleSetShape::Basic)
    }
}

/// Category dispatch, keyed separately for single spots and complexes.
fn category_rules(category: SpotType, is_complex: bool, ctx: &FragmentContext<'_>) -> RuleSet {
    let detail = fragments::detail(ctx);
    match (category, is_complex) {
        (SpotType::Industrial, _) => detail.merged(fragments::industrial(ctx)),
        (SpotType::Retail, false) => detail.merged(fragments::retail(ctx)),
        (SpotType::Retail, true) => detail.merged(fragments::mall(ctx)),
        (SpotType::Office, false) => detail.merged(fragments::office(ctx)),
        (SpotType::Office, true) => detail
            .merged(fragments::office(ctx))
            .merged(fragments::corporate(ctx)),
        (SpotType::Terrain, _) => detail.merged(fragments::terrain(ctx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn update_falls_back_on_empty_values() {
        let input = record(json!({ "spot_type_id": "", "is_complex": 0 }));
        let existing = ExistingSpot { spot_type_id: 11, is_complex: true };
        let request = ResolveRequest::update(&input, existing);
        assert_eq!(request.spot_type_id(), Some(11));
        assert!(request.is_complex());
    }

    #[test]
    fn update_inherits_absent_spot_type() {
        let input = record(json!({ "name": "Bodega" }));
        let existing = ExistingSpot { spot_type_id: 15, is_complex: false };
        assert_eq!(ResolveRequest::update(&input, existing).spot_type_id(), Some(15));
        assert_eq!(ResolveRequest::creation(&input).spot_type_id(), None);
    }

    #[test]
    fn update_prefers_incoming_values() {
        let input = record(json!({ "spot_type_id": "13", "is_complex": "1" }));
        let existing = ExistingSpot { spot_type_id: 9, is_complex: false };
        let request = ResolveRequest::update(&input, existing);
        assert_eq!(request.spot_type_id(), Some(13));
        assert!(request.is_complex());
    }

    #[test]
    fn sub_forms_follow_key_presence() {
        let input = record(json!({ "currency_type": null }));
        let request = ResolveRequest::creation(&input);
        assert!(request.has_pricing());
        assert!(!request.has_contact());
        assert!(request.with_plot_rules().has_contact());
    }

    #[test]
    fn office_complex_adds_corporate_rules() {
        let resolver = RuleSetResolver::new(ValidationConfig::default()).unwrap();
        let input = record(json!({ "spot_type_id": 11, "is_complex": 1, "zip_code_id": 5 }));
        let rules = resolver.resolve(&ResolveRequest::creation(&input)).unwrap();
        assert!(rules.contains("average_floor_size"));
        assert!(rules.contains("number_of_elevators"));
        assert_eq!(
            rules.shape(),
            RuleSetShape::Composed { category: Some(SpotType::Office), complex: true }
        );
    }

    #[test]
    fn legacy_type_gets_no_category_rules() {
        let resolver = RuleSetResolver::new(ValidationConfig::default()).unwrap();
        let input = record(json!({ "zip_code_id": 5 }));
        let existing = ExistingSpot { spot_type_id: 17, is_complex: false };
        let rules = resolver.resolve(&ResolveRequest::update(&input, existing)).unwrap();
        assert!(rules.contains("name"));
        assert!(!rules.contains("amenities"));
        assert_eq!(rules.shape(), RuleSetShape::Composed { category: None, complex: false });
    }
}
