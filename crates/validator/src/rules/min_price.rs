//! Currency- and area-aware floor price.
//!
//! All threshold comparisons happen in MXN. A USD price is converted with
//! the bound [`ExchangeRateConverter`] first. A per-square-meter price is
//! compared against `minimum / square_space`; total and percentage prices
//! are compared against `minimum` directly (percentage is treated as a
//! total basis).
//!
//! On failure the error carries the minimum converted back into the price's
//! own currency, so a host can render "El precio de renta por área debe ser
//! mayor o igual a $500.00 USD." from the params alone.

use std::borrow::Cow;

use serde_json::Value;

use crate::catalog::kinds::{AreaMode, Currency};
use crate::collaborators::{CollaboratorKind, ExchangeRateConverter};
use crate::error::{SpotValidationError, ValidationError, codes};
use crate::record::as_number;
use crate::rule::{AtomFailure, CustomRule, RuleContext};

/// Floor price in MXN used when the host does not configure one.
pub const DEFAULT_MINIMUM_PRICE_PER_AREA: f64 = 10_000.0;

/// Minimum price per area check.
#[derive(Debug, Clone, PartialEq)]
pub struct MinPriceByArea {
    square_space: f64,
    area_mode: AreaMode,
    currency: Currency,
    label: Cow<'static, str>,
    minimum: f64,
}

impl MinPriceByArea {
    /// Builds the rule. `square_space` must be positive.
    pub fn new(
        square_space: f64,
        area_mode: AreaMode,
        currency: Currency,
        label: impl Into<Cow<'static, str>>,
    ) -> Result<Self, SpotValidationError> {
        if square_space.is_nan() || square_space <= 0.0 || square_space.is_infinite() {
            return Err(SpotValidationError::invalid_argument(format!(
                "square space must be a positive number, got {square_space}"
            )));
        }
        Ok(Self {
            square_space,
            area_mode,
            currency,
            label: label.into(),
            minimum: DEFAULT_MINIMUM_PRICE_PER_AREA,
        })
    }

    /// Overrides the MXN floor.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = minimum;
        self
    }

    #[must_use]
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Checks an amount expressed in the rule's currency.
    pub fn check_amount(
        &self,
        amount: f64,
        converter: &dyn ExchangeRateConverter,
    ) -> Result<(), AtomFailure> {
        if amount < 0.0 {
            return Err(ValidationError::new(codes::NEGATIVE_PRICE, "The price cannot be negative")
                .with_param("label", self.label.clone())
                .into());
        }

        let amount_mxn = match self.currency {
            Currency::Usd => converter.to_mxn(amount)?,
            Currency::Mxn => amount,
        };

        let threshold = match self.area_mode {
            AreaMode::PerSquareMeter => self.minimum / self.square_space,
            AreaMode::Total | AreaMode::Percentage => self.minimum,
        };

        if amount_mxn >= threshold {
            return Ok(());
        }

        tracing::trace!(
            amount_mxn,
            threshold,
            area_mode = self.area_mode.as_str(),
            "price below minimum"
        );
        Err(self.below_minimum(converter)?.into())
    }

    fn below_minimum(
        &self,
        converter: &dyn ExchangeRateConverter,
    ) -> Result<ValidationError, AtomFailure> {
        let minimum = match self.currency {
            Currency::Usd => converter.to_usd(self.minimum)?,
            Currency::Mxn => self.minimum,
        };
        let minimum = format_amount(minimum);
        let currency = self.currency.code();

        Ok(ValidationError::new(
            codes::BELOW_MINIMUM_PRICE,
            format!("The {} price per area must be at least ${minimum} {currency}", self.label),
        )
        .with_param("label", self.label.clone())
        .with_param("minimum", minimum)
        .with_param("currency", currency)
        .with_param("symbol", self.currency.symbol())
        .with_param("area_mode", self.area_mode.as_str()))
    }
}

impl CustomRule for MinPriceByArea {
    fn name(&self) -> &'static str {
        "min_price_by_area"
    }

    fn requires(&self) -> &[CollaboratorKind] {
        &[CollaboratorKind::ExchangeRate]
    }

    fn check(&self, _field: &str, value: &Value, ctx: &RuleContext<'_>) -> Result<(), AtomFailure> {
        // Non-numeric input is reported by the field's type atom.
        let Some(amount) = as_number(value) else {
            return Ok(());
        };
        self.check_amount(amount, ctx.exchange_rate()?)
    }
}

/// Formats an amount with two decimals and thousands separators:
/// `10000.0` becomes `"10,000.00"`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction:02}")
}
