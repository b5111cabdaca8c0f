//! Rule fragments.
//!
//! Each fragment is a pure function from a [`FragmentContext`] to a
//! [`RuleSet`] covering one concern (shared fields, pricing, contact) or
//! one property category. The resolver unions them; a later fragment's
//! descriptor replaces an earlier one for the same field.
//!
//! Fragments that depend on sibling values (the price floor, percentage
//! caps) read them from the context's record snapshot while the rule set is
//! built.

use std::sync::Arc;

use chrono::{Months, NaiveDateTime, Timelike};
use regex::Regex;

use crate::catalog::EnumName;
use crate::catalog::kinds::{
    AreaMode, Currency, FLOOR_NUMBER, LISTABLE_SPOT_TYPES, MAINTENANCE_PERCENTAGE,
    OFFICE_AREA_PERCENTAGE, RENT_PRICE_TYPES, SALE_PRICE_TYPES, SpotType,
};
use crate::config::ValidationConfig;
use crate::error::SpotValidationError;
use crate::record::{Record, as_member_id, as_number, is_loosely_empty};
use crate::rule::{FieldRules, RuleSet};
use crate::rules::{MinPriceByArea, PhotoEntry, ValidCloudImage};


/// Format of `built_to`.
pub const BUILT_TO_FORMAT: &str = "%d/%m/%Y";

/// How far ahead `built_to` may lie.
const BUILT_TO_HORIZON: Months = Months::new(30 * 12);

// ============================================================================
// CONTEXT
// ============================================================================

/// Patterns and rules compiled once per configuration.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    price: Regex,
    cloud_image: ValidCloudImage,
}

impl CompiledRules {
    pub fn new(config: &ValidationConfig) -> Result<Self, SpotValidationError> {
        let price = Regex::new(&price_pattern(config.pricing.decimal_places))
            .map_err(|err| SpotValidationError::invalid_argument(err.to_string()))?;
        let patterns = config.photos.compile()?;
        let cloud_image = ValidCloudImage::new(
            Arc::new(patterns),
            config.photos.valid_image_types.iter().cloned().collect(),
        );
        Ok(Self { price, cloud_image })
    }
}

/// Unsigned amounts with at most `places` decimals.
fn price_pattern(places: u32) -> String {
    if places == 0 {
        return r"^\d+$".to_owned();
    }
    format!(r"^\d+(\.\d{{1,{places}}})?$")
}

/// Inputs every fragment may read.
#[derive(Debug, Clone, Copy)]
pub struct FragmentContext<'a> {
    pub record: &'a Record,
    pub config: &'a ValidationConfig,
    pub compiled: &'a CompiledRules,
    /// "Now" for date bounds.
    pub reference_time: NaiveDateTime,
    pub is_creation: bool,
}

impl FragmentContext<'_> {
    fn member_id(&self, field: &str) -> Option<i64> {
        self.record.get(field).and_then(as_member_id)
    }

    fn is_filled(&self, field: &str) -> bool {
        self.record.get(field).is_some_and(|value| !is_loosely_empty(value))
    }
}

// ============================================================================
// SHARED
// ============================================================================

/// Rules common to every spot.
pub fn shared(ctx: &FragmentContext<'_>) -> RuleSet {
    let limits = &ctx.config.validation;
    let coordinates = &ctx.config.coordinates;
    let built_to_limit = ctx
        .reference_time
        .date()
        .checked_add_months(BUILT_TO_HORIZON)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(ctx.reference_time);
    let photos = if ctx.is_creation && ctx.config.features.require_photos {
        FieldRules::new().required()
    } else {
        FieldRules::new().sometimes()
    };

    RuleSet::new()
        .field("name", FieldRules::new().sometimes().string().max(255.0))
        .field(
            "description",
            FieldRules::new().sometimes().string().max(limits.description_max_length as f64),
        )
        .field(
            "pdf_description",
            FieldRules::new().sometimes().string().max(limits.pdf_description_max_length as f64),
        )
        .field("is_complex", FieldRules::new().sometimes().flag())
        .field("parent_id", FieldRules::new().sometimes().integer().exists("spots"))
        .field("spot_type_id", FieldRules::new().sometimes().one_of(LISTABLE_SPOT_TYPES))
        .field("company", FieldRules::new().sometimes().integer().exists("companies"))
        .field("in_corner", FieldRules::new().sometimes().nullable().flag())
        .field("is_exclusive", FieldRules::new().sometimes().flag())
        .field("hide_address_data", FieldRules::new().sometimes().flag())
        .field(
            "front",
            FieldRules::new().sometimes().numeric().min(0.0).max(limits.max_front_meters),
        )
        .field(
            "height",
            FieldRules::new().sometimes().numeric().min(0.0).max(limits.max_height_meters),
        )
        .field(
            "floor_level",
            FieldRules::new().sometimes().numeric().in_enum(EnumName::FloorLevel),
        )
        .field(
            "floor_level_number",
            FieldRules::new()
                .sometimes()
                .required_if_in("floor_level", [FLOOR_NUMBER])
                .numeric()
                .min(1.0)
                .max(99.0),
        )
        .field(
            "vertical_height",
            FieldRules::new().sometimes().numeric().in_enum(EnumName::OfficeVerticalHeight),
        )
        .field(
            "vertical_height_number",
            FieldRules::new().sometimes().numeric().min(0.0).max(99.0),
        )
        .field(
            "latitude",
            FieldRules::new()
                .sometimes()
                .numeric()
                .between(coordinates.latitude.min, coordinates.latitude.max),
        )
        .field(
            "longitude",
            FieldRules::new()
                .sometimes()
                .numeric()
                .between(coordinates.longitude.min, coordinates.longitude.max),
        )
        .field(
            "street",
            FieldRules::new()
                .sometimes()
                .string()
                .max(240.0)
                .required_with(["latitude", "longitude"]),
        )
        .field("int_number", FieldRules::new().sometimes().nullable().string().max(6.0))
        .field(
            "ext_number",
            FieldRules::new()
                .nullable()
                .required_if_in(
                    "spot_type_id",
                    [SpotType::Industrial.id(), SpotType::Office.id(), SpotType::Retail.id()],
                )
                .string()
                .max(6.0),
        )
        .field("local", FieldRules::new().sometimes().nullable().string().max(6.0))
        .field("zip_code_id", FieldRules::new().numeric().exists("zip_codes"))
        .field("reference", FieldRules::new().sometimes().string().max(120.0))
        .field("square_space", square_space(ctx))
        .field(
            "construction_date",
            FieldRules::new().sometimes().nullable().numeric().min(1900.0),
        )
        .field(
            "building_status",
            FieldRules::new().sometimes().numeric().in_enum(EnumName::BuildingStatus),
        )
        .field(
            "built_to",
            FieldRules::new()
                .sometimes()
                .nullable()
                .date_format(BUILT_TO_FORMAT)
                .before(built_to_limit),
        )
        .field("publish", FieldRules::new().sometimes().boolean())
        .field(
            "photo_urls",
            FieldRules::new()
                .sometimes()
                .array()
                .max(ctx.config.photos.max_photos as f64)
                .each(FieldRules::new().url().custom(ctx.compiled.cloud_image.clone())),
        )
        .field(
            "photos",
            photos
                .array()
                .max(ctx.config.photos.max_photos as f64)
                .each(FieldRules::new().custom(PhotoEntry)),
        )
        .field(
            "photos_order",
            FieldRules::new()
                .sometimes()
                .array()
                .each(FieldRules::new().integer().distinct().exists("photos")),
        )
        .field(
            "external_id",
            FieldRules::new().string().required_with(["external_updated_at"]).max(20.0),
        )
        .field(
            "external_updated_at",
            FieldRules::new()
                .string()
                .date()
                .required_with(["external_id"])
                .before(truncate_to_minute(ctx.reference_time)),
        )
}

fn square_space(ctx: &FragmentContext<'_>) -> FieldRules {
    FieldRules::new()
        .sometimes()
        .numeric()
        .min(1.0)
        .max(ctx.config.validation.max_square_space)
        .round(ctx.config.pricing.decimal_places)
}

fn truncate_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|instant| instant.with_nanosecond(0))
        .unwrap_or(instant)
}

// ============================================================================
// PRICING AND CONTACT
// ============================================================================

/// Price sub-form rules.
///
/// Fails with `InvalidArgument` when a filled price would be checked
/// against a non-positive `square_space`.
pub fn pricing(ctx: &FragmentContext<'_>) -> Result<RuleSet, SpotValidationError> {
    let max_price = ctx.config.validation.max_price;

    Ok(RuleSet::new()
        .field("modality_type", FieldRules::new().sometimes().in_enum(EnumName::PriceType))
        .field(
            "currency_type",
            FieldRules::new()
                .nullable()
                .required_with(["modality_type"])
                .in_enum(EnumName::PriceCurrencyType),
        )
        .field("rent_price", price(ctx, "rent_price", "rent_price_area", "renta", RENT_PRICE_TYPES)?)
        .field("sale_price", price(ctx, "sale_price", "sale_price_area", "venta", SALE_PRICE_TYPES)?)
        .field("rent_price_area", price_area("rent_price", RENT_PRICE_TYPES))
        .field("sale_price_area", price_area("sale_price", SALE_PRICE_TYPES))
        .field(
            "max_rent_price",
            FieldRules::new().sometimes().nullable().numeric().min(0.0).max(max_price),
        )
        .field(
            "max_sale_price",
            FieldRules::new().sometimes().nullable().numeric().min(0.0).max(max_price),
        )
        .field("modality", FieldRules::new().sometimes().in_enum(EnumName::PriceModality))
        .field(
            "guarantee_deposit",
            FieldRules::new().sometimes().integer().min(0.0).max(2.0),
        )
        .field(
            "maintenance_type",
            FieldRules::new()
                .required_with(["maintenance"])
                .nullable()
                .in_enum(EnumName::PriceMaintenanceType),
        )
        .field(
            "maintenance",
            FieldRules::new()
                .sometimes()
                .nullable()
                .numeric()
                .when(ctx.member_id("maintenance_type") == Some(MAINTENANCE_PERCENTAGE), |r| {
                    r.max(100.0)
                }),
        ))
}

fn price(
    ctx: &FragmentContext<'_>,
    field: &str,
    area_field: &str,
    label: &'static str,
    required_for: [i64; 2],
) -> Result<FieldRules, SpotValidationError> {
    let mut rules = FieldRules::new().nullable().numeric();
    if ctx.is_filled(field) {
        rules = rules.custom(min_price(ctx, area_field, label)?);
    }

    Ok(rules
        .max(ctx.config.validation.max_price)
        .pattern(ctx.compiled.price.clone())
        .required_if_in("modality_type", required_for))
}

fn min_price(
    ctx: &FragmentContext<'_>,
    area_field: &str,
    label: &'static str,
) -> Result<MinPriceByArea, SpotValidationError> {
    let square_space = ctx
        .record
        .get("square_space")
        .and_then(as_number)
        .unwrap_or(1.0);
    let area_mode = ctx
        .member_id(area_field)
        .and_then(|id| AreaMode::from_id(id).ok())
        .unwrap_or(AreaMode::Total);
    let currency = ctx
        .member_id("currency_type")
        .and_then(|id| Currency::from_id(id).ok())
        .unwrap_or(Currency::Mxn);

    Ok(MinPriceByArea::new(square_space, area_mode, currency, label)?
        .with_minimum(ctx.config.pricing.minimum_price_per_area))
}

fn price_area(price_field: &str, required_for: [i64; 2]) -> FieldRules {
    FieldRules::new()
        .nullable()
        .required_with([price_field])
        .required_if_in("modality_type", required_for)
        .in_enum(EnumName::PriceAreaType)
}

/// Contact sub-form rules.
///
/// `contact_category` only switches the sub-form on; it is declared so strict
/// mode accepts it.
pub fn contact(_ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new()
        .field("contact_id", FieldRules::new().sometimes().exists("contacts"))
        .field("contact_category", FieldRules::new().sometimes().nullable())
}

// ============================================================================
// CATEGORIES
// ============================================================================

fn id_list(table: &'static str) -> FieldRules {
    FieldRules::new()
        .sometimes()
        .nullable()
        .array()
        .each(FieldRules::new().numeric().distinct().exists(table))
}

fn enum_list(name: EnumName) -> FieldRules {
    FieldRules::new()
        .sometimes()
        .nullable()
        .array()
        .each(FieldRules::new().numeric().in_enum(name))
}

fn nullable_enum(name: EnumName) -> FieldRules {
    FieldRules::new().sometimes().nullable().numeric().in_enum(name)
}

fn nullable_text(max: f64) -> FieldRules {
    FieldRules::new().sometimes().nullable().string().max(max)
}

/// Property details shared by every category.
pub fn detail(ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new()
        .field("amenities", id_list("amenities"))
        .field(
            "guarantee",
            FieldRules::new()
                .sometimes()
                .array()
                .each(FieldRules::new().numeric().distinct().in_enum(EnumName::Guarantee)),
        )
        .field(
            "parking_spaces",
            FieldRules::new()
                .sometimes()
                .numeric()
                .min(0.0)
                .max(ctx.config.validation.max_parking_spaces),
        )
        .field("parking_space_by_area", FieldRules::new().sometimes().nullable().numeric())
        .field("trademarks", id_list("trademarks"))
        .field(
            "spot_condition",
            FieldRules::new().sometimes().numeric().in_enum(EnumName::BuildingCondition),
        )
        .field("roofing_type", nullable_enum(EnumName::RoofingType))
        .field("land_use", nullable_text(250.0))
}

pub fn industrial(ctx: &FragmentContext<'_>) -> RuleSet {
    let limits = &ctx.config.validation;
    let percentage_modality =
        ctx.member_id("office_area_percent_modality") == Some(OFFICE_AREA_PERCENTAGE);

    RuleSet::new()
        .field(
            "max_height",
            FieldRules::new()
                .sometimes()
                .nullable()
                .numeric()
                .min(0.0)
                .max(limits.max_height_meters)
                .gt("height"),
        )
        .field(
            "office_area_percent_modality",
            FieldRules::new()
                .sometimes()
                .numeric()
                .in_enum(EnumName::OfficeAreaPercentageModality),
        )
        .field(
            "office_area_percent",
            FieldRules::new()
                .sometimes()
                .nullable()
                .numeric()
                .min(0.0)
                .when(percentage_modality, |r| r.max(100.0)),
        )
        .field("min_area_divisible", FieldRules::new().sometimes().numeric())
        .field("luminaries", FieldRules::new().sometimes().nullable().flag())
        .field("luminary_type", nullable_enum(EnumName::LuminaryType))
        .field(
            "natural_light",
            FieldRules::new().sometimes().nullable().numeric().min(0.0).max(100.0),
        )
        .field(
            "luminary_specs",
            FieldRules::new().sometimes().nullable().required_if_gt("luminaries", 0.0),
        )
        .field(
            "charging_ports",
            FieldRules::new()
                .sometimes()
                .numeric()
                .min(0.0)
                .max(limits.max_charging_ports),
        )
        .field(
            "vehicle_ramp",
            FieldRules::new()
                .sometimes()
                .numeric()
                .min(0.0)
                .max(limits.max_vehicle_ramps),
        )
        .field("door_height", FieldRules::new().sometimes().nullable().numeric())
        .field("energy", nullable_text(255.0))
        .field("floor_material", nullable_text(255.0))
        .field(
            "building_type",
            FieldRules::new().sometimes().numeric().in_enum(EnumName::BuildingType),
        )
        .field("fire_protection_system", enum_list(EnumName::FireProtectionSystem))
        .field("security_type", enum_list(EnumName::SecurityType))
        .field("space_between_columns", nullable_enum(EnumName::SpaceBetweenColumns))
        .field("expansion_up_to", FieldRules::new().sometimes().nullable().flag())
        .field("possible_bts", FieldRules::new().sometimes().nullable().flag())
        .field("certification", FieldRules::new().sometimes().nullable().string())
        .field("class", nullable_enum(EnumName::BuildingClass))
}

pub fn office(ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new()
        .field("fire_protection_system", enum_list(EnumName::FireProtectionSystem))
        .field(
            "height_between_floors",
            FieldRules::new().sometimes().nullable().numeric().min(1.0),
        )
        .field("min_area_divisible", FieldRules::new().sometimes().numeric().min(1.0))
        .field(
            "number_of_elevators",
            FieldRules::new()
                .sometimes()
                .nullable()
                .numeric()
                .min(1.0)
                .max(ctx.config.validation.max_elevators),
        )
        .field("office_age", FieldRules::new().sometimes().nullable().numeric().min(1.0))
        .field("security_type", enum_list(EnumName::SecurityType))
}

/// Extra rules for office complexes.
pub fn corporate(_ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new()
        .field("average_floor_size", FieldRules::new().sometimes().numeric().min(1.0))
        .field("certification", FieldRules::new().sometimes().nullable().string())
        .field("class", nullable_enum(EnumName::BuildingClass))
}

pub fn retail(_ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new().field("glove", FieldRules::new().sometimes().nullable().numeric().min(0.0))
}

/// Retail complexes.
pub fn mall(_ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new()
        .field("certification", FieldRules::new().sometimes().nullable().string())
        .field("glove", FieldRules::new().sometimes().nullable().numeric().min(0.0))
}

pub fn terrain(ctx: &FragmentContext<'_>) -> RuleSet {
    RuleSet::new()
        .field("land_use", nullable_text(250.0))
        .field(
            "front",
            FieldRules::new()
                .sometimes()
                .nullable()
                .numeric()
                .min(0.0)
                .max(ctx.config.validation.max_front_meters),
        )
        .field("energy", nullable_text(255.0))
        .field("min_area_divisible", FieldRules::new().sometimes().numeric().min(1.0))
}

// ============================================================================
// BASIC
// ============================================================================

/// Lightweight rules for quick edits: identity, address, and photo URLs.
pub fn basic(ctx: &FragmentContext<'_>) -> RuleSet {
    let limits = &ctx.config.validation;
    let coordinates = &ctx.config.coordinates;

    RuleSet::new()
        .field("name", FieldRules::new().sometimes().string().max(255.0))
        .field(
            "description",
            FieldRules::new().sometimes().string().max(limits.description_max_length as f64),
        )
        .field(
            "latitude",
            FieldRules::new()
                .sometimes()
                .numeric()
                .between(coordinates.latitude.min, coordinates.latitude.max),
        )
        .field(
            "longitude",
            FieldRules::new()
                .sometimes()
                .numeric()
                .between(coordinates.longitude.min, coordinates.longitude.max),
        )
        .field(
            "street",
            FieldRules::new()
                .sometimes()
                .string()
                .max(240.0)
                .required_with(["latitude", "longitude"]),
        )
        .field("ext_number", FieldRules::new().sometimes().nullable().string().max(6.0))
        .field("int_number", FieldRules::new().sometimes().nullable().string().max(6.0))
        .field("local", FieldRules::new().sometimes().nullable().string().max(6.0))
        .field(
            "zip_code_id",
            FieldRules::new().sometimes().numeric().exists("zip_codes"),
        )
        .field("reference", FieldRules::new().sometimes().string().max(120.0))
        .field("is_complex", FieldRules::new().sometimes().flag())
        .field("is_exclusive", FieldRules::new().sometimes().flag())
        .field("hide_address_data", FieldRules::new().sometimes().flag())
        .field(
            "front",
            FieldRules::new().sometimes().numeric().min(0.0).max(limits.max_front_meters),
        )
        .field(
            "height",
            FieldRules::new().sometimes().numeric().min(0.0).max(limits.max_height_meters),
        )
        .field("square_space", square_space(ctx))
        .field(
            "photo_urls",
            FieldRules::new()
                .sometimes()
                .array()
                .max(ctx.config.photos.max_photos as f64)
                .each(FieldRules::new().url()),
        )
        .field("publish", FieldRules::new().sometimes().boolean())
}
