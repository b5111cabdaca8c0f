//! Static enumerated domains for spot records.
//!
//! The [`Catalog`] is loaded once per process and is read-only afterwards,
//! so it is shared freely between concurrent evaluations. Each enum is a
//! table of `(id, key, label)` rows; decisions that depend on a specific id
//! go through the typed ids in [`kinds`].
//!
//! ```rust,ignore
//! use spot_validator::catalog::{Catalog, EnumName};
//!
//! let catalog = Catalog::global();
//! assert!(catalog.is_member(EnumName::FireProtectionSystem, 2));
//! assert_eq!(catalog.label(EnumName::SpotType, 9)?, "Industrial");
//! ```

pub mod kinds;
mod tables;

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::SpotValidationError;

// ============================================================================
// ENUM NAMES
// ============================================================================

/// Names of the enumerated domains known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumName {
    SpotType,
    SpotState,
    BuildingClass,
    BuildingCondition,
    BuildingStatus,
    BuildingType,
    FireProtectionSystem,
    FloorLevel,
    Guarantee,
    LuminaryType,
    OfficeAreaPercentageModality,
    OfficeVerticalHeight,
    RoofingType,
    SecurityType,
    SpaceBetweenColumns,
    PriceAreaType,
    PriceCurrencyType,
    PriceMaintenanceType,
    PriceModality,
    PriceType,
    PhotoType,
}

impl EnumName {
    /// Every enum the catalog defines.
    pub const ALL: [EnumName; 21] = [
        Self::SpotType,
        Self::SpotState,
        Self::BuildingClass,
        Self::BuildingCondition,
        Self::BuildingStatus,
        Self::BuildingType,
        Self::FireProtectionSystem,
        Self::FloorLevel,
        Self::Guarantee,
        Self::LuminaryType,
        Self::OfficeAreaPercentageModality,
        Self::OfficeVerticalHeight,
        Self::RoofingType,
        Self::SecurityType,
        Self::SpaceBetweenColumns,
        Self::PriceAreaType,
        Self::PriceCurrencyType,
        Self::PriceMaintenanceType,
        Self::PriceModality,
        Self::PriceType,
        Self::PhotoType,
    ];

    /// Snake-case name used in error params.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SpotType => "spot_type",
            Self::SpotState => "spot_state",
            Self::BuildingClass => "building_class",
            Self::BuildingCondition => "building_condition",
            Self::BuildingStatus => "building_status",
            Self::BuildingType => "building_type",
            Self::FireProtectionSystem => "fire_protection_system",
            Self::FloorLevel => "floor_level",
            Self::Guarantee => "guarantee",
            Self::LuminaryType => "luminary_type",
            Self::OfficeAreaPercentageModality => "office_area_percentage_modality",
            Self::OfficeVerticalHeight => "office_vertical_height",
            Self::RoofingType => "roofing_type",
            Self::SecurityType => "security_type",
            Self::SpaceBetweenColumns => "space_between_columns",
            Self::PriceAreaType => "price_area_type",
            Self::PriceCurrencyType => "price_currency_type",
            Self::PriceMaintenanceType => "price_maintenance_type",
            Self::PriceModality => "price_modality",
            Self::PriceType => "price_type",
            Self::PhotoType => "photo_type",
        }
    }

    fn table(self) -> &'static [CatalogEntry] {
        match self {
            Self::SpotType => tables::SPOT_TYPE,
            Self::SpotState => tables::SPOT_STATE,
            Self::BuildingClass => tables::BUILDING_CLASS,
            Self::BuildingCondition => tables::BUILDING_CONDITION,
            Self::BuildingStatus => tables::BUILDING_STATUS,
            Self::BuildingType => tables::BUILDING_TYPE,
            Self::FireProtectionSystem => tables::FIRE_PROTECTION_SYSTEM,
            Self::FloorLevel => tables::FLOOR_LEVEL,
            Self::Guarantee => tables::GUARANTEE,
            Self::LuminaryType => tables::LUMINARY_TYPE,
            Self::OfficeAreaPercentageModality => tables::OFFICE_AREA_PERCENTAGE_MODALITY,
            Self::OfficeVerticalHeight => tables::OFFICE_VERTICAL_HEIGHT,
            Self::RoofingType => tables::ROOFING_TYPE,
            Self::SecurityType => tables::SECURITY_TYPE,
            Self::SpaceBetweenColumns => tables::SPACE_BETWEEN_COLUMNS,
            Self::PriceAreaType => tables::PRICE_AREA_TYPE,
            Self::PriceCurrencyType => tables::PRICE_CURRENCY_TYPE,
            Self::PriceMaintenanceType => tables::PRICE_MAINTENANCE_TYPE,
            Self::PriceModality => tables::PRICE_MODALITY,
            Self::PriceType => tables::PRICE_TYPE,
            Self::PhotoType => tables::PHOTO_TYPE,
        }
    }
}

impl fmt::Display for EnumName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// One row of an enum table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub key: &'static str,
    pub label: &'static str,
}

/// Read-only lookup over every enum table.
#[derive(Debug)]
pub struct Catalog {
    index: HashMap<(EnumName, i64), &'static CatalogEntry>,
}

static GLOBAL: LazyLock<Catalog> = LazyLock::new(Catalog::load);

impl Catalog {
    /// The process-wide catalog.
    #[must_use]
    pub fn global() -> &'static Catalog {
        &GLOBAL
    }

    fn load() -> Self {
        let mut index = HashMap::new();
        for name in EnumName::ALL {
            for entry in name.table() {
                let previous = index.insert((name, entry.id), entry);
                debug_assert!(previous.is_none(), "duplicate id {} in {name}", entry.id);
            }
        }
        tracing::debug!(entries = index.len(), "catalog loaded");
        Self { index }
    }

    /// All valid ids of an enum, in declaration order.
    #[must_use]
    pub fn values(&self, name: EnumName) -> Vec<i64> {
        name.table().iter().map(|entry| entry.id).collect()
    }

    /// Whether `id` is a member of `name`.
    #[must_use]
    pub fn is_member(&self, name: EnumName, id: i64) -> bool {
        self.index.contains_key(&(name, id))
    }

    /// Human-readable label of a member.
    pub fn label(&self, name: EnumName, id: i64) -> Result<&'static str, SpotValidationError> {
        self.entry(name, id).map(|entry| entry.label)
    }

    /// Symbolic key of a member (`"INDUSTRIAL"`).
    pub fn key(&self, name: EnumName, id: i64) -> Result<&'static str, SpotValidationError> {
        self.entry(name, id).map(|entry| entry.key)
    }

    /// Full row of a member.
    pub fn entry(
        &self,
        name: EnumName,
        id: i64,
    ) -> Result<&'static CatalogEntry, SpotValidationError> {
        self.index
            .get(&(name, id))
            .copied()
            .ok_or(SpotValidationError::UnknownEnumValue { enum_name: name, id })
    }

    /// Rows of an enum in declaration order.
    #[must_use]
    pub fn entries(&self, name: EnumName) -> &'static [CatalogEntry] {
        name.table()
    }

    /// `key -> label` map of an enum, in declaration order.
    #[must_use]
    pub fn labels(&self, name: EnumName) -> IndexMap<&'static str, &'static str> {
        name.table()
            .iter()
            .map(|entry| (entry.key, entry.label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_unique_within_each_enum() {
        for name in EnumName::ALL {
            let values = Catalog::global().values(name);
            let mut deduped = values.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(values.len(), deduped.len(), "{name}");
        }
    }

    #[test]
    fn label_and_key_lookup() {
        let catalog = Catalog::global();
        assert_eq!(catalog.label(EnumName::SpotType, 9).unwrap(), "Industrial");
        assert_eq!(catalog.key(EnumName::SpotType, 21).unwrap(), "INDUSTRIAL_PARK");
        assert_eq!(catalog.label(EnumName::BuildingClass, 1).unwrap(), "A+");
        assert_eq!(catalog.label(EnumName::Guarantee, 4).unwrap(), "Carta crédito");
    }

    #[test]
    fn unknown_id_is_an_error() {
        let err = Catalog::global().label(EnumName::RoofingType, 12).unwrap_err();
        assert!(matches!(
            err,
            SpotValidationError::UnknownEnumValue { enum_name: EnumName::RoofingType, id: 12 }
        ));
    }

    #[test]
    fn same_id_is_scoped_per_enum() {
        let catalog = Catalog::global();
        assert!(catalog.is_member(EnumName::FloorLevel, 10));
        assert!(!catalog.is_member(EnumName::BuildingClass, 10));
    }

    #[test]
    fn labels_keep_declaration_order() {
        let labels = Catalog::global().labels(EnumName::PriceType);
        let keys: Vec<_> = labels.keys().copied().collect();
        assert_eq!(keys, vec!["RENT", "SALE", "RENT_AND_SALE"]);
        assert_eq!(labels["RENT_AND_SALE"], "Renta y Venta");
    }
}
