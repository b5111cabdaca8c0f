//! Rule set evaluation.
//!
//! [`RuleEvaluator::evaluate`] runs every field of a [`RuleSet`] against a
//! record, in field order, and collects a [`ValidationResult`]. Within a
//! field the first failing atom wins; other fields keep going. User input
//! problems never abort the pass: collaborator failures become
//! `validation_unavailable` errors on the field that needed them.
//!
//! Atoms read the caller's record as a snapshot. Normalization (rounding)
//! is written to a separate copy returned in the result, so no atom sees
//! another atom's output.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::catalog::Catalog;
use crate::collaborators::{CollaboratorKind, Collaborators};
use crate::config::ValidationConfig;
use crate::error::{SpotValidationError, ValidationError, codes};
use crate::record::{
    LIST_FIELDS, Record, as_boolean, as_integer, as_member_id, as_number, decimal_places,
    is_blank, loose_eq, parse_date, parse_date_with_format, round_decimal, scalar_text,
};
use crate::rule::{AtomFailure, CompareOp, Condition, RuleAtom, RuleContext, RuleSet, TypeKind};

static NULL: Value = Value::Null;

// ============================================================================
// RESULT
// ============================================================================

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub passed: bool,
    /// Errors keyed by field path (`rent_price`, `amenities.2`), in
    /// evaluation order.
    pub errors: IndexMap<String, Vec<ValidationError>>,
    /// The input with normalization applied.
    pub normalized: Record,
}

impl ValidationResult {
    /// Errors reported at `path`.
    #[must_use]
    pub fn errors_for(&self, path: &str) -> &[ValidationError] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// All errors, in evaluation order.
    pub fn iter_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values().flatten()
    }

    /// The normalized record when validation passed, the errors otherwise.
    pub fn into_result(self) -> Result<Record, IndexMap<String, Vec<ValidationError>>> {
        if self.passed { Ok(self.normalized) } else { Err(self.errors) }
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Tuning knobs for an evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Wall-clock budget for one evaluation's collaborator calls, counted
    /// from the start of the pass. Once it is spent, remaining calls are not
    /// issued and their fields report `validation_unavailable`. A call that
    /// started in time keeps its result even if it finishes late; a blocking
    /// call is not interrupted.
    pub collaborator_budget: Option<Duration>,
}

impl EvaluatorOptions {
    #[must_use = "builder methods must be chained or built"]
    pub fn with_collaborator_budget(mut self, budget: Duration) -> Self {
        self.collaborator_budget = Some(budget);
        self
    }
}

/// Executes rule sets.
///
/// Holds no mutable state; one evaluator may serve concurrent evaluations.
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    config: ValidationConfig,
    options: EvaluatorOptions,
    catalog: &'static Catalog,
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// Per-value facts shared by the atoms of one field.
#[derive(Clone, Copy)]
struct Scope<'v> {
    numeric: bool,
    date_format: Option<&'static str>,
    /// Every element of the enclosing array and this element's position.
    siblings: Option<(&'v [&'v Value], usize)>,
}

impl RuleEvaluator {
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            options: EvaluatorOptions::default(),
            catalog: Catalog::global(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    #[must_use]
    pub fn options(&self) -> EvaluatorOptions {
        self.options
    }

    /// Evaluates `rules` against `record`.
    ///
    /// Fails only when the rule set needs a collaborator that is not bound.
    #[tracing::instrument(
        name = "evaluate",
        skip_all,
        fields(fields = rules.len(), shape = ?rules.shape())
    )]
    pub fn evaluate(
        &self,
        rules: &RuleSet,
        record: &Record,
        collaborators: &Collaborators,
    ) -> Result<ValidationResult, SpotValidationError> {
        self.check_bindings(rules, collaborators)?;

        let ctx = RuleContext {
            record,
            collaborators,
            catalog: self.catalog,
            config: &self.config,
            deadline: self
                .options
                .collaborator_budget
                .and_then(|budget| Instant::now().checked_add(budget)),
        };
        let mut normalized = record.clone();
        let mut errors: IndexMap<String, Vec<ValidationError>> = IndexMap::new();

        for (field, field_rules) in rules {
            let found = self.evaluate_value(
                field,
                field_rules.atoms(),
                record.get(field.as_str()),
                None,
                &ctx,
                Some(&mut normalized),
            );
            tracing::trace!(field = field.as_str(), errors = found.len(), "field evaluated");
            for error in found {
                errors.entry(error.field_path().to_owned()).or_default().push(error);
            }
        }

        if self.config.features.strict_validation && !rules.shape().is_early_exit() {
            for (key, value) in record {
                let prepared_list = LIST_FIELDS.contains(&key.as_str()) && is_blank(value);
                if rules.contains(key) || prepared_list {
                    continue;
                }
                errors.entry(key.clone()).or_default().push(
                    ValidationError::new(codes::UNEXPECTED_FIELD, "This field is not allowed")
                        .with_field(key.clone()),
                );
            }
        }

        let passed = errors.is_empty();
        tracing::debug!(passed, fields_with_errors = errors.len(), "evaluation finished");
        Ok(ValidationResult {
            passed,
            errors,
            normalized,
        })
    }

    fn check_bindings(
        &self,
        rules: &RuleSet,
        collaborators: &Collaborators,
    ) -> Result<(), SpotValidationError> {
        for kind in rules.required_collaborators() {
            let skipped =
                kind == CollaboratorKind::Existence && !self.config.features.validate_external_ids;
            if !skipped && !collaborators.is_bound(kind) {
                return Err(SpotValidationError::MissingCollaborator(kind));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    fn evaluate_value(
        &self,
        path: &str,
        atoms: &[RuleAtom],
        raw: Option<&Value>,
        siblings: Option<(&[&Value], usize)>,
        ctx: &RuleContext<'_>,
        mut normalized: Option<&mut Record>,
    ) -> Vec<ValidationError> {
        let value = match raw {
            Some(Value::String(s)) if s.trim().is_empty() => Some(&NULL),
            other => other,
        };

        if value.is_none_or(is_blank)
            && let Some(error) = missing(path, atoms, value.is_some(), ctx)
        {
            return vec![error];
        }
        let Some(value) = value else {
            return Vec::new();
        };
        if value.is_null() && atoms.iter().any(|atom| matches!(atom, RuleAtom::Nullable)) {
            return Vec::new();
        }

        let scope = Scope {
            numeric: atoms.iter().any(|atom| {
                matches!(atom, RuleAtom::Type(TypeKind::Numeric | TypeKind::Integer))
            }),
            date_format: atoms.iter().find_map(|atom| match atom {
                RuleAtom::DateFormat(format) => Some(*format),
                _ => None,
            }),
            siblings,
        };

        for atom in atoms.iter().filter(|atom| !atom.is_presence()) {
            let outcome = match atom {
                RuleAtom::ArrayOf(element_atoms) => {
                    let errors = self.evaluate_elements(path, element_atoms, value, ctx);
                    if errors.is_empty() {
                        continue;
                    }
                    return errors;
                }
                RuleAtom::Round(places) => {
                    if let Some(normalized) = normalized.as_deref_mut() {
                        round_into(normalized, path, value, *places);
                    }
                    continue;
                }
                other => self.check_atom(path, other, value, scope, ctx),
            };
            if let Err(failure) = outcome {
                return vec![into_error(path, failure)];
            }
        }
        Vec::new()
    }

    fn evaluate_elements(
        &self,
        path: &str,
        atoms: &[RuleAtom],
        value: &Value,
        ctx: &RuleContext<'_>,
    ) -> Vec<ValidationError> {
        let elements: Vec<(String, &Value)> = match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Value::Object(map) => map.iter().map(|(key, item)| (key.clone(), item)).collect(),
            _ => return Vec::new(),
        };
        let all: Vec<&Value> = elements.iter().map(|(_, item)| *item).collect();

        let mut errors = Vec::new();
        for (position, (key, element)) in elements.iter().enumerate() {
            let element_path = format!("{path}.{key}");
            errors.extend(self.evaluate_value(
                &element_path,
                atoms,
                Some(element),
                Some((all.as_slice(), position)),
                ctx,
                None,
            ));
        }
        errors
    }

    // ------------------------------------------------------------------------
    // Atoms
    // ------------------------------------------------------------------------

    fn check_atom(
        &self,
        path: &str,
        atom: &RuleAtom,
        value: &Value,
        scope: Scope<'_>,
        ctx: &RuleContext<'_>,
    ) -> Result<(), AtomFailure> {
        match atom {
            RuleAtom::Type(kind) => check_type(path, *kind, value),
            RuleAtom::Bounds { min, max } => check_bounds(*min, *max, value, scope.numeric),
            RuleAtom::EnumMembership(name) => {
                let member = as_member_id(value).is_some_and(|id| self.catalog.is_member(*name, id));
                if member {
                    return Ok(());
                }
                Err(ValidationError::invalid_enum_value(
                    path.to_owned(),
                    name.as_str(),
                    &scalar_text(value),
                )
                .into())
            }
            RuleAtom::OneOf(ids) => {
                if as_member_id(value).is_some_and(|id| ids.contains(&id)) {
                    return Ok(());
                }
                let allowed = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
                Err(ValidationError::invalid_enum_value(path.to_owned(), "in", &scalar_text(value))
                    .with_param("allowed", allowed)
                    .into())
            }
            RuleAtom::Pattern(regex) => {
                let text = match value {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                };
                if text.is_some_and(|text| regex.is_match(&text)) {
                    return Ok(());
                }
                Err(ValidationError::new(
                    codes::PATTERN_MISMATCH,
                    "Value does not match the expected format",
                )
                .with_param("pattern", regex.as_str().to_owned())
                .into())
            }
            RuleAtom::DateFormat(format) => {
                let matches = value.as_str().is_some_and(|text| {
                    parse_date_with_format(text, format)
                        .is_some_and(|parsed| parsed.format(format).to_string() == text)
                });
                if matches {
                    return Ok(());
                }
                let readable = format.replace('%', "");
                Err(ValidationError::new(
                    codes::DATE_FORMAT,
                    format!("Value must match the format {readable}"),
                )
                .with_param("format", readable)
                .into())
            }
            RuleAtom::Before(limit) => {
                let parsed = value.as_str().and_then(|text| match scope.date_format {
                    Some(format) => parse_date_with_format(text, format),
                    None => parse_date(text),
                });
                if parsed.is_some_and(|parsed| parsed < *limit) {
                    return Ok(());
                }
                let date = limit.format("%Y-%m-%d %H:%M").to_string();
                Err(ValidationError::new(codes::BEFORE, format!("Value must be a date before {date}"))
                    .with_param("date", date)
                    .into())
            }
            RuleAtom::Prohibited { with } => Err(ValidationError::new(
                codes::PROHIBITED,
                format!("This field cannot be combined with {with}"),
            )
            .with_param("other", with.clone())
            .into()),
            RuleAtom::Comparison { op, other } => check_comparison(path, *op, other, value, ctx),
            RuleAtom::Distinct => check_distinct(value, scope.siblings),
            RuleAtom::Url => {
                let valid = value
                    .as_str()
                    .and_then(|text| url::Url::parse(text).ok())
                    .is_some_and(|url| !url.cannot_be_a_base() && url.host().is_some());
                if valid {
                    return Ok(());
                }
                Err(ValidationError::new(codes::INVALID_URL, "Value must be a valid URL").into())
            }
            RuleAtom::Exists { table } => {
                if !self.config.features.validate_external_ids {
                    return Ok(());
                }
                let checker = ctx.existence()?;
                ctx.ensure_budget(CollaboratorKind::Existence)?;
                if checker.exists(table, value)? {
                    return Ok(());
                }
                Err(ValidationError::new(codes::NOT_FOUND, "The selected value does not exist")
                    .with_param("table", table.clone())
                    .into())
            }
            RuleAtom::Custom(rule) => {
                for kind in rule.requires() {
                    ctx.ensure_budget(*kind)?;
                }
                rule.check(path, value, ctx)
            }
            RuleAtom::Required
            | RuleAtom::Sometimes
            | RuleAtom::Nullable
            | RuleAtom::RequiredIf { .. }
            | RuleAtom::RequiredWith(_)
            | RuleAtom::ArrayOf(_)
            | RuleAtom::Round(_) => Ok(()),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// The `required` error for a blank value, if any requirement applies.
fn missing(
    path: &str,
    atoms: &[RuleAtom],
    present: bool,
    ctx: &RuleContext<'_>,
) -> Option<ValidationError> {
    let sometimes = atoms.iter().any(|atom| matches!(atom, RuleAtom::Sometimes));
    for atom in atoms {
        match atom {
            RuleAtom::Required if present || !sometimes => {
                return Some(ValidationError::required(path.to_owned()));
            }
            RuleAtom::RequiredIf { field, condition } if condition_holds(field, condition, ctx) => {
                return Some(
                    ValidationError::required(path.to_owned()).with_param("other", field.clone()),
                );
            }
            RuleAtom::RequiredWith(fields)
                if fields
                    .iter()
                    .any(|field| ctx.record.get(field).is_some_and(|v| !is_blank(v))) =>
            {
                return Some(
                    ValidationError::required(path.to_owned())
                        .with_param("other", fields.join(",")),
                );
            }
            _ => {}
        }
    }
    None
}

fn condition_holds(field: &str, condition: &Condition, ctx: &RuleContext<'_>) -> bool {
    let Some(other) = ctx.record.get(field) else {
        return false;
    };
    match condition {
        Condition::Equals(values) => values.iter().any(|expected| loose_eq(other, expected)),
        Condition::GreaterThan(threshold) => as_number(other).is_some_and(|n| n > *threshold),
    }
}

fn into_error(path: &str, failure: AtomFailure) -> ValidationError {
    match failure {
        AtomFailure::Invalid(error) => error.with_default_field(path.to_owned()),
        AtomFailure::Unavailable(cause) => {
            tracing::warn!(field = path, error = %cause, "collaborator unavailable");
            ValidationError::unavailable(path.to_owned(), &cause)
        }
    }
}

fn check_type(path: &str, kind: TypeKind, value: &Value) -> Result<(), AtomFailure> {
    let matches = match kind {
        TypeKind::String => value.is_string(),
        TypeKind::Numeric => as_number(value).is_some(),
        TypeKind::Integer => as_integer(value).is_some(),
        TypeKind::Boolean => as_boolean(value).is_some(),
        TypeKind::Array => value.is_array() || value.is_object(),
        TypeKind::Date => value.as_str().and_then(parse_date).is_some(),
    };
    if matches {
        return Ok(());
    }
    Err(ValidationError::type_mismatch(path.to_owned(), kind.as_str()).into())
}

fn check_bounds(
    min: Option<f64>,
    max: Option<f64>,
    value: &Value,
    numeric: bool,
) -> Result<(), AtomFailure> {
    let measured = numeric
        .then(|| as_number(value))
        .flatten()
        .map(|n| (n, ""))
        .or_else(|| match value {
            Value::Array(items) => Some((items.len() as f64, " items")),
            Value::Object(map) => Some((map.len() as f64, " items")),
            Value::String(s) => Some((s.chars().count() as f64, " characters")),
            Value::Number(n) => n.as_f64().map(|n| (n, "")),
            _ => None,
        });
    let Some((size, unit)) = measured else {
        return Ok(());
    };

    let error = match (min, max) {
        (Some(min), Some(max)) if size < min || size > max => ValidationError::new(
            codes::OUT_OF_RANGE,
            format!("Value must be between {min} and {max}{unit}"),
        )
        .with_param("min", min.to_string())
        .with_param("max", max.to_string()),
        (Some(min), None) if size < min => {
            ValidationError::new(codes::MIN, format!("Value must be at least {min}{unit}"))
                .with_param("min", min.to_string())
        }
        (None, Some(max)) if size > max => {
            ValidationError::new(codes::MAX, format!("Value must be at most {max}{unit}"))
                .with_param("max", max.to_string())
        }
        _ => return Ok(()),
    };
    Err(error.into())
}

fn check_comparison(
    path: &str,
    op: CompareOp,
    other: &str,
    value: &Value,
    ctx: &RuleContext<'_>,
) -> Result<(), AtomFailure> {
    let Some(own) = as_number(value) else {
        return Err(ValidationError::type_mismatch(path.to_owned(), "numeric").into());
    };
    // Only compared once both sides are present.
    let Some(theirs) = ctx
        .record
        .get(other)
        .filter(|v| !is_blank(v))
        .and_then(as_number)
    else {
        return Ok(());
    };
    if op.holds(own, theirs) {
        return Ok(());
    }

    let (code, relation) = match op {
        CompareOp::GreaterThan => (codes::GREATER_THAN_FIELD, "greater than"),
        CompareOp::GreaterThanOrEqual => {
            (codes::GREATER_THAN_OR_EQUAL_FIELD, "greater than or equal to")
        }
        CompareOp::LessThan => (codes::LESS_THAN_FIELD, "less than"),
        CompareOp::LessThanOrEqual => (codes::LESS_THAN_OR_EQUAL_FIELD, "less than or equal to"),
    };
    Err(ValidationError::new(code, format!("Value must be {relation} {other}"))
        .with_param("other", other.to_owned())
        .with_param("value", theirs.to_string())
        .into())
}

fn check_distinct(value: &Value, siblings: Option<(&[&Value], usize)>) -> Result<(), AtomFailure> {
    let duplicated = match siblings {
        Some((all, position)) => all
            .iter()
            .enumerate()
            .any(|(index, other)| index != position && loose_eq(value, other)),
        None => match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .any(|(i, item)| items[..i].iter().any(|earlier| loose_eq(item, earlier))),
            _ => false,
        },
    };
    if !duplicated {
        return Ok(());
    }
    Err(ValidationError::new(codes::DUPLICATE_ELEMENT, "Value has a duplicate").into())
}

/// Rounds `value` into `normalized[path]` when it has more decimals than
/// `places`.
fn round_into(normalized: &mut Record, path: &str, value: &Value, places: u32) {
    let Some(number) = as_number(value) else {
        return;
    };
    if decimal_places(value) <= places as usize {
        return;
    }
    let Some(rounded) = round_decimal(value, places) else {
        return;
    };
    if let Some(rounded) = Number::from_f64(rounded) {
        tracing::trace!(field = path, from = number, to = rounded.as_f64(), "value rounded");
        normalized.insert(path.to_owned(), Value::Number(rounded));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::FieldRules;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn evaluate(rules: &RuleSet, input: Value) -> ValidationResult {
        RuleEvaluator::default()
            .evaluate(rules, &record(input), &Collaborators::new())
            .unwrap()
    }

    #[test]
    fn first_failing_atom_wins_per_field() {
        let rules = RuleSet::new().field("front", FieldRules::new().numeric().min(0.0).max(10.0));
        let result = evaluate(&rules, json!({ "front": "abc" }));
        assert_eq!(result.errors_for("front").len(), 1);
        assert_eq!(result.errors_for("front")[0].code, codes::TYPE_MISMATCH);
    }

    #[test]
    fn sometimes_required_only_when_present() {
        let rules = RuleSet::new().field("name", FieldRules::new().sometimes().required().string());
        assert!(evaluate(&rules, json!({})).passed);
        let result = evaluate(&rules, json!({ "name": " " }));
        assert_eq!(result.errors_for("name")[0].code, codes::REQUIRED);
    }

    #[test]
    fn null_without_nullable_runs_remaining_atoms() {
        let rules = RuleSet::new()
            .field("a", FieldRules::new().sometimes().numeric())
            .field("b", FieldRules::new().sometimes().nullable().numeric());
        let result = evaluate(&rules, json!({ "a": null, "b": null }));
        assert_eq!(result.errors_for("a")[0].code, codes::TYPE_MISMATCH);
        assert!(result.errors_for("b").is_empty());
    }

    #[test]
    fn bounds_measure_by_shape() {
        let rules = RuleSet::new()
            .field("name", FieldRules::new().string().max(3.0))
            .field("count", FieldRules::new().numeric().max(3.0))
            .field("list", FieldRules::new().array().max(3.0));
        let result = evaluate(&rules, json!({ "name": "abcd", "count": "4", "list": [1, 2, 3] }));
        assert_eq!(result.errors_for("name")[0].code, codes::MAX);
        assert_eq!(result.errors_for("count")[0].param("max"), Some("3"));
        assert!(result.errors_for("list").is_empty());
    }

    #[test]
    fn between_reports_out_of_range() {
        let rules = RuleSet::new().field("latitude", FieldRules::new().numeric().between(-90.0, 90.0));
        let result = evaluate(&rules, json!({ "latitude": 91 }));
        let error = &result.errors_for("latitude")[0];
        assert_eq!(error.code, codes::OUT_OF_RANGE);
        assert_eq!(error.param("min"), Some("-90"));
    }

    #[test]
    fn required_if_uses_loose_equality() {
        let rules = RuleSet::new()
            .field("ext_number", FieldRules::new().nullable().required_if_in("spot_type_id", [9, 11]));
        let result = evaluate(&rules, json!({ "spot_type_id": "11" }));
        assert_eq!(result.errors_for("ext_number")[0].param("other"), Some("spot_type_id"));
        assert!(evaluate(&rules, json!({ "spot_type_id": 13 })).passed);
    }

    #[test]
    fn required_with_ignores_blank_siblings() {
        let rules = RuleSet::new()
            .field("street", FieldRules::new().sometimes().required_with(["latitude", "longitude"]));
        assert!(evaluate(&rules, json!({ "latitude": "" })).passed);
        assert!(!evaluate(&rules, json!({ "longitude": -99.1 })).passed);
    }

    #[test]
    fn distinct_elements_flag_every_duplicate() {
        let rules = RuleSet::new()
            .field("ids", FieldRules::new().array().each(FieldRules::new().numeric().distinct()));
        let result = evaluate(&rules, json!({ "ids": [1, "2", 2] }));
        assert!(result.errors_for("ids.0").is_empty());
        assert_eq!(result.errors_for("ids.1")[0].code, codes::DUPLICATE_ELEMENT);
        assert_eq!(result.errors_for("ids.2")[0].code, codes::DUPLICATE_ELEMENT);
    }

    #[test]
    fn date_format_requires_exact_shape() {
        let rules = RuleSet::new().field("built_to", FieldRules::new().date_format("%d/%m/%Y"));
        assert!(evaluate(&rules, json!({ "built_to": "01/02/2030" })).passed);
        let result = evaluate(&rules, json!({ "built_to": "2030-02-01" }));
        assert_eq!(result.errors_for("built_to")[0].param("format"), Some("d/m/Y"));
    }

    #[test]
    fn urls_need_a_host() {
        let rules = RuleSet::new().field("site", FieldRules::new().url());
        assert!(evaluate(&rules, json!({ "site": "https://example.com/a.jpg" })).passed);
        assert!(!evaluate(&rules, json!({ "site": "not a url" })).passed);
    }

    #[test]
    fn missing_existence_checker_is_a_hard_failure() {
        let rules = RuleSet::new().field("company", FieldRules::new().exists("companies"));
        let err = RuleEvaluator::default()
            .evaluate(&rules, &record(json!({ "company": 1 })), &Collaborators::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SpotValidationError::MissingCollaborator(CollaboratorKind::Existence)
        ));
    }

    #[test]
    fn disabled_external_ids_skip_existence_checks() {
        let mut config = ValidationConfig::default();
        config.features.validate_external_ids = false;
        let rules = RuleSet::new().field("company", FieldRules::new().exists("companies"));
        let result = RuleEvaluator::new(config)
            .evaluate(&rules, &record(json!({ "company": 1 })), &Collaborators::new())
            .unwrap();
        assert!(result.passed);
    }

    #[test]
    fn strict_mode_reports_unknown_fields() {
        let mut config = ValidationConfig::default();
        config.features.strict_validation = true;
        let rules = RuleSet::new().field("name", FieldRules::new().string());
        let result = RuleEvaluator::new(config)
            .evaluate(
                &rules,
                &record(json!({ "name": "x", "colour": "red", "amenities": [] })),
                &Collaborators::new(),
            )
            .unwrap();
        let keys: Vec<_> = result.errors.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["colour"]);
        assert_eq!(result.errors_for("colour")[0].code, codes::UNEXPECTED_FIELD);
    }

    #[test]
    fn rounding_uses_decimal_digits() {
        let rules = RuleSet::new().field("square_space", FieldRules::new().numeric().round(2));
        let result = evaluate(&rules, json!({ "square_space": 1.005 }));
        assert_eq!(result.normalized["square_space"], json!(1.01));
    }

    #[test]
    fn into_result_returns_normalized_record() {
        let rules = RuleSet::new().field("square_space", FieldRules::new().numeric().round(2));
        let normalized = evaluate(&rules, json!({ "square_space": 123.456 }))
            .into_result()
            .unwrap();
        assert_eq!(normalized["square_space"], json!(123.46));
    }
}
