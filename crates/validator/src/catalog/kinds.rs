//! Typed ids for catalog members that drive decisions.
//!
//! Rule fragments and the resolver branch on a handful of specific ids
//! (the four listable spot types, the percentage maintenance type, ...).
//! Those ids are named here so decision code never compares against bare
//! integers. Everything else stays in the data tables.

use serde::Serialize;

use super::EnumName;
use crate::error::SpotValidationError;

// ============================================================================
// SPOT TYPES
// ============================================================================

/// Spot types with their own rule fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotType {
    Industrial,
    Office,
    Retail,
    Terrain,
}

impl SpotType {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Industrial => 9,
            Self::Office => 11,
            Self::Retail => 13,
            Self::Terrain => 15,
        }
    }

    /// Maps a catalog id to a category; legacy ids have none.
    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            9 => Some(Self::Industrial),
            11 => Some(Self::Office),
            13 => Some(Self::Retail),
            15 => Some(Self::Terrain),
            _ => None,
        }
    }
}

/// Spot types accepted for new listings.
pub const LISTABLE_SPOT_TYPES: [i64; 4] = [13, 9, 11, 15];

// ============================================================================
// PRICING
// ============================================================================

/// Currency of a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Currency {
    #[serde(rename = "MXN")]
    Mxn,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Mxn => 1,
            Self::Usd => 2,
        }
    }

    /// Parses a `price_currency_type` id.
    pub fn from_id(id: i64) -> Result<Self, SpotValidationError> {
        match id {
            1 => Ok(Self::Mxn),
            2 => Ok(Self::Usd),
            _ => Err(SpotValidationError::UnknownEnumValue {
                enum_name: EnumName::PriceCurrencyType,
                id,
            }),
        }
    }

    /// ISO code used in messages.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mxn => "MXN",
            Self::Usd => "USD",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Mxn => "$",
            Self::Usd => "USD $",
        }
    }
}

/// How a price relates to the spot's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaMode {
    Total,
    PerSquareMeter,
    Percentage,
}

impl AreaMode {
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Total => 1,
            Self::PerSquareMeter => 2,
            Self::Percentage => 3,
        }
    }

    /// Parses a `price_area_type` id.
    pub fn from_id(id: i64) -> Result<Self, SpotValidationError> {
        match id {
            1 => Ok(Self::Total),
            2 => Ok(Self::PerSquareMeter),
            3 => Ok(Self::Percentage),
            _ => Err(SpotValidationError::UnknownEnumValue {
                enum_name: EnumName::PriceAreaType,
                id,
            }),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::PerSquareMeter => "per_square_meter",
            Self::Percentage => "percentage",
        }
    }
}

/// Price type ids that require a rent price.
pub const RENT_PRICE_TYPES: [i64; 2] = [1, 3];

/// Price type ids that require a sale price.
pub const SALE_PRICE_TYPES: [i64; 2] = [2, 3];

/// `price_maintenance_type` id for a percentage value.
pub const MAINTENANCE_PERCENTAGE: i64 = 2;

// ============================================================================
// FEATURES
// ============================================================================

/// `office_area_percentage_modality` id for percentages.
pub const OFFICE_AREA_PERCENTAGE: i64 = 1;

/// `floor_level` id that asks for an explicit floor number.
pub const FLOOR_NUMBER: i64 = 6;
