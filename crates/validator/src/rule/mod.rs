//! Declarative rule model.
//!
//! A [`RuleSet`] maps field names to [`FieldRules`], each an ordered list of
//! [`RuleAtom`]s. Rule sets are plain data: the resolver builds one per
//! call, the evaluator consumes it, and nothing is shared between calls.
//!
//! ```rust,ignore
//! use spot_validator::rule::{FieldRules, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .field("front", FieldRules::new().sometimes().numeric().min(0.0).max(1000.0))
//!     .field("max_height", FieldRules::new().sometimes().nullable().numeric().gt("height"));
//! ```

mod custom;

pub use custom::{AtomFailure, CustomRule, RuleContext};

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::catalog::EnumName;
use crate::catalog::kinds::SpotType;
use crate::collaborators::CollaboratorKind;

// ============================================================================
// ATOMS
// ============================================================================

/// Value shapes a `Type` atom can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    String,
    Numeric,
    Integer,
    Boolean,
    Array,
    Date,
}

impl TypeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Date => "date",
        }
    }
}

/// Comparison against another field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareOp {
    #[must_use]
    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            Self::GreaterThan => left > right,
            Self::GreaterThanOrEqual => left >= right,
            Self::LessThan => left < right,
            Self::LessThanOrEqual => left <= right,
        }
    }
}

/// Trigger of a `RequiredIf` atom, read from another field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The other field loosely equals one of these values.
    Equals(Vec<Value>),
    /// The other field is a number greater than this.
    GreaterThan(f64),
}

/// A single declarative constraint.
#[derive(Debug, Clone)]
pub enum RuleAtom {
    /// Absence fails.
    Required,
    /// Absence passes unless a conditional requirement triggers.
    Sometimes,
    /// A `null` value passes the remaining atoms.
    Nullable,
    Type(TypeKind),
    /// Inclusive bounds on numbers, string length, or element count.
    Bounds { min: Option<f64>, max: Option<f64> },
    EnumMembership(EnumName),
    /// Membership in an explicit id list (`in:0,1`).
    OneOf(Vec<i64>),
    Pattern(Regex),
    /// `strftime` format the text must match exactly.
    DateFormat(&'static str),
    /// The date must be strictly before this instant.
    Before(NaiveDateTime),
    RequiredIf { field: String, condition: Condition },
    /// Required when any of these fields holds a non-blank value.
    RequiredWith(Vec<String>),
    /// The field conflicts with `with`; fails whenever evaluated.
    Prohibited { with: String },
    Comparison { op: CompareOp, other: String },
    Distinct,
    ArrayOf(Vec<RuleAtom>),
    Url,
    /// The value is an id of an existing row in `table`.
    Exists { table: Cow<'static, str> },
    /// Rounds numbers with more decimals in the normalized record.
    Round(u32),
    Custom(Arc<dyn CustomRule>),
}

impl RuleAtom {
    /// Atoms that decide presence rather than check a value.
    #[must_use]
    pub const fn is_presence(&self) -> bool {
        matches!(
            self,
            Self::Required
                | Self::Sometimes
                | Self::Nullable
                | Self::RequiredIf { .. }
                | Self::RequiredWith(_)
        )
    }

    fn collect_requirements(&self, into: &mut BTreeSet<CollaboratorKind>) {
        match self {
            Self::Exists { .. } => {
                into.insert(CollaboratorKind::Existence);
            }
            Self::Custom(rule) => into.extend(rule.requires().iter().copied()),
            Self::ArrayOf(atoms) => atoms.iter().for_each(|atom| atom.collect_requirements(into)),
            _ => {}
        }
    }
}

// ============================================================================
// FIELD RULES
// ============================================================================

/// The ordered constraints of one field.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    atoms: Vec<RuleAtom>,
}

impl FieldRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom.
    #[must_use = "builder methods must be chained or built"]
    pub fn atom(mut self, atom: RuleAtom) -> Self {
        self.atoms.push(atom);
        self
    }

    /// Applies `build` only when `condition` holds.
    ///
    /// The condition is decided while the rule set is built, against the
    /// record snapshot the resolver was given.
    #[must_use = "builder methods must be chained or built"]
    pub fn when(self, condition: bool, build: impl FnOnce(Self) -> Self) -> Self {
        if condition { build(self) } else { self }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn required(self) -> Self {
        self.atom(RuleAtom::Required)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn sometimes(self) -> Self {
        self.atom(RuleAtom::Sometimes)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn nullable(self) -> Self {
        self.atom(RuleAtom::Nullable)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn string(self) -> Self {
        self.atom(RuleAtom::Type(TypeKind::String))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn numeric(self) -> Self {
        self.atom(RuleAtom::Type(TypeKind::Numeric))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn integer(self) -> Self {
        self.atom(RuleAtom::Type(TypeKind::Integer))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn boolean(self) -> Self {
        self.atom(RuleAtom::Type(TypeKind::Boolean))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn array(self) -> Self {
        self.atom(RuleAtom::Type(TypeKind::Array))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn date(self) -> Self {
        self.atom(RuleAtom::Type(TypeKind::Date))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn min(self, min: f64) -> Self {
        self.atom(RuleAtom::Bounds { min: Some(min), max: None })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn max(self, max: f64) -> Self {
        self.atom(RuleAtom::Bounds { min: None, max: Some(max) })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn between(self, min: f64, max: f64) -> Self {
        self.atom(RuleAtom::Bounds { min: Some(min), max: Some(max) })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn in_enum(self, name: EnumName) -> Self {
        self.atom(RuleAtom::EnumMembership(name))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn one_of(self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.atom(RuleAtom::OneOf(ids.into_iter().collect()))
    }

    /// `in:0,1`.
    #[must_use = "builder methods must be chained or built"]
    pub fn flag(self) -> Self {
        self.one_of([0, 1])
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn pattern(self, regex: Regex) -> Self {
        self.atom(RuleAtom::Pattern(regex))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn date_format(self, format: &'static str) -> Self {
        self.atom(RuleAtom::DateFormat(format))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn before(self, instant: NaiveDateTime) -> Self {
        self.atom(RuleAtom::Before(instant))
    }

    /// Required when `field` loosely equals one of `values`.
    #[must_use = "builder methods must be chained or built"]
    pub fn required_if_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.atom(RuleAtom::RequiredIf {
            field: field.into(),
            condition: Condition::Equals(values.into_iter().map(Into::into).collect()),
        })
    }

    /// Required when `field` is a number greater than `threshold`.
    #[must_use = "builder methods must be chained or built"]
    pub fn required_if_gt(self, field: impl Into<String>, threshold: f64) -> Self {
        self.atom(RuleAtom::RequiredIf {
            field: field.into(),
            condition: Condition::GreaterThan(threshold),
        })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn required_with<S: Into<String>>(self, fields: impl IntoIterator<Item = S>) -> Self {
        self.atom(RuleAtom::RequiredWith(fields.into_iter().map(Into::into).collect()))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn prohibited_with(self, other: impl Into<String>) -> Self {
        self.atom(RuleAtom::Prohibited { with: other.into() })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn compare(self, op: CompareOp, other: impl Into<String>) -> Self {
        self.atom(RuleAtom::Comparison { op, other: other.into() })
    }

    /// Greater than another field (`gt:other`).
    #[must_use = "builder methods must be chained or built"]
    pub fn gt(self, other: impl Into<String>) -> Self {
        self.compare(CompareOp::GreaterThan, other)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn distinct(self) -> Self {
        self.atom(RuleAtom::Distinct)
    }

    /// Constraints applied to every element of an array value.
    #[must_use = "builder methods must be chained or built"]
    pub fn each(self, elements: FieldRules) -> Self {
        self.atom(RuleAtom::ArrayOf(elements.atoms))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn url(self) -> Self {
        self.atom(RuleAtom::Url)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn exists(self, table: impl Into<Cow<'static, str>>) -> Self {
        self.atom(RuleAtom::Exists { table: table.into() })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn round(self, places: u32) -> Self {
        self.atom(RuleAtom::Round(places))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn custom(self, rule: impl CustomRule + 'static) -> Self {
        self.atom(RuleAtom::Custom(Arc::new(rule)))
    }

    #[must_use]
    pub fn atoms(&self) -> &[RuleAtom] {
        &self.atoms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[must_use]
    pub fn has_sometimes(&self) -> bool {
        self.atoms.iter().any(|atom| matches!(atom, RuleAtom::Sometimes))
    }

    #[must_use]
    pub fn has_required(&self) -> bool {
        self.atoms.iter().any(|atom| matches!(atom, RuleAtom::Required))
    }

    #[must_use]
    pub fn has_nullable(&self) -> bool {
        self.atoms.iter().any(|atom| matches!(atom, RuleAtom::Nullable))
    }
}

impl From<Vec<RuleAtom>> for FieldRules {
    fn from(atoms: Vec<RuleAtom>) -> Self {
        Self { atoms }
    }
}

// ============================================================================
// RULE SET
// ============================================================================

/// What the resolver produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSetShape {
    /// Shared rules plus optional sub-forms and a category fragment.
    Composed {
        category: Option<SpotType>,
        complex: bool,
    },
    /// Early exit on creation: the spot type is missing.
    MissingSpotType,
    /// Early exit on creation: the zip code is missing.
    MissingZipCode,
    /// A complex asked to hide its address.
    ProhibitedCombination,
    /// The lightweight rule set.
    Basic,
    /// Built by hand.
    #[default]
    Custom,
}

impl RuleSetShape {
    /// Whether the resolver stopped before composing fragments.
    #[must_use]
    pub const fn is_early_exit(self) -> bool {
        matches!(
            self,
            Self::MissingSpotType | Self::MissingZipCode | Self::ProhibitedCombination
        )
    }
}

/// Field name to [`FieldRules`], in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: IndexMap<String, FieldRules>,
    shape: RuleSetShape,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_shape(mut self, shape: RuleSetShape) -> Self {
        self.shape = shape;
        self
    }

    /// Adds or replaces a field, keeping the original position on replace.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        self.insert(name, rules);
        self
    }

    /// Adds or replaces a field, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, rules: FieldRules) {
        self.fields.insert(name.into(), rules);
    }

    /// Union with `other`; its descriptors win on conflicting names.
    pub fn merge(&mut self, other: RuleSet) {
        for (name, rules) in other.fields {
            self.fields.insert(name, rules);
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn merged(mut self, other: RuleSet) -> Self {
        self.merge(other);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldRules> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn shape(&self) -> RuleSetShape {
        self.shape
    }

    /// Collaborators any atom of this set may call.
    #[must_use]
    pub fn required_collaborators(&self) -> BTreeSet<CollaboratorKind> {
        let mut kinds = BTreeSet::new();
        for rules in self.fields.values() {
            for atom in &rules.atoms {
                atom.collect_requirements(&mut kinds);
            }
        }
        kinds
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = (&'a String, &'a FieldRules);
    type IntoIter = indexmap::map::Iter<'a, String, FieldRules>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================
