//! Static catalog tables.
//!
//! Label text is data: adding a locale means swapping these tables, not
//! touching decision code.

use super::CatalogEntry;

const fn entry(id: i64, key: &'static str, label: &'static str) -> CatalogEntry {
    CatalogEntry { id, key, label }
}

pub(super) const SPOT_TYPE: &[CatalogEntry] = &[
    entry(9, "INDUSTRIAL", "Industrial"),
    entry(11, "OFFICE", "Oficinas"),
    entry(13, "RETAIL", "Local Comercial"),
    entry(15, "TERRAIN", "Terrenos"),
    // legacy types
    entry(1, "STREET_LEVEL", "Local a pie de calle"),
    entry(2, "LOCAL_IN_SHOPPING_CENTER", "Local en centro comercial"),
    entry(3, "ISLAND_IN_SHOPPING_CENTER", "Isla en centro comercial"),
    entry(4, "OTHER", "Otro"),
    entry(5, "LOCAL_IN_BUILDING", "Local en edificio"),
    entry(6, "BAZAR", "Bazar"),
    entry(7, "CONCEPT_STORE", "Concept Store"),
    entry(8, "DARK_KITCHEN", "Dark Kitchen"),
    entry(10, "TERRAIN_OLD", "Terreno"),
    entry(17, "WAREHOUSE", "Bodega"),
    entry(18, "INDUSTRIAL_UNIT", "Nave industrial"),
    entry(19, "SHOPPING_CENTER", "Centro comercial"),
    entry(20, "CORPORATE", "Corporativo"),
    entry(21, "INDUSTRIAL_PARK", "Parque industrial"),
];

pub(super) const SPOT_STATE: &[CatalogEntry] = &[
    entry(2, "DRAFT", "Borrador"),
    entry(1, "PUBLIC", "Público"),
    entry(3, "DEACTIVATED", "Desactivado"),
    entry(4, "ARCHIVED", "Archivado"),
];

pub(super) const BUILDING_CLASS: &[CatalogEntry] = &[
    entry(1, "A_PLUS", "A+"),
    entry(2, "A", "A"),
    entry(3, "B", "B"),
    entry(4, "C", "C"),
];

pub(super) const BUILDING_CONDITION: &[CatalogEntry] = &[
    entry(1, "SHELL", "Obra gris"),
    entry(2, "CONDITIONED", "Acondicionado"),
    entry(3, "FURNISHED", "Amueblado"),
];

pub(super) const BUILDING_STATUS: &[CatalogEntry] = &[
    entry(1, "COMPLETED", "Terminado"),
    entry(2, "UNDER_CONSTRUCTION", "En construcción"),
    entry(3, "PROJECT", "Proyecto"),
];

pub(super) const BUILDING_TYPE: &[CatalogEntry] = &[
    entry(1, "STEEL_AND_CONCRETE", "Acero y concreto"),
    entry(2, "BLOCK_AND_SHEET", "Block y Lámina"),
    entry(3, "STEEL_BLOCK_AND_SHEET", "Acero con block y lámina"),
    entry(4, "SHEET", "Lámina"),
];

pub(super) const FIRE_PROTECTION_SYSTEM: &[CatalogEntry] = &[
    entry(1, "SPRINKLERS", "Rociadores"),
    entry(2, "HYDRANTS", "Hidrantes"),
    entry(3, "FIRE_EXTINGUISHERS", "Extintores"),
];

pub(super) const FLOOR_LEVEL: &[CatalogEntry] = &[
    entry(1, "BASEMENT_3", "Sótano 3"),
    entry(2, "BASEMENT_2", "Sótano 2"),
    entry(3, "BASEMENT_1", "Sótano 1"),
    entry(4, "GROUND_FLOOR", "Planta Baja"),
    entry(5, "LOBBY", "Lobby"),
    entry(6, "FLOOR_NUMBER", "Número de Piso (del 1 al 99)"),
    entry(7, "MEZZANINE", "Mezzanine"),
    entry(8, "PENTHOUSE", "Penthouse"),
    entry(9, "TERRACE", "Terraza"),
    entry(10, "SKY_LOBBY", "Sky Lobby"),
];

pub(super) const GUARANTEE: &[CatalogEntry] = &[
    entry(1, "GUARANTOR", "Aval"),
    entry(2, "JOINT_OBLIGOR", "Obligado solidario"),
    entry(3, "BOND", "Fianza"),
    entry(4, "LETTER_OF_CREDIT", "Carta crédito"),
    entry(5, "OTHER", "Otro"),
];

pub(super) const LUMINARY_TYPE: &[CatalogEntry] = &[
    entry(1, "LED", "LED"),
    entry(2, "T5", "T-5"),
    entry(3, "FLUORESCENT", "Fluorescente"),
    entry(4, "HID", "HID"),
];

pub(super) const OFFICE_AREA_PERCENTAGE_MODALITY: &[CatalogEntry] = &[
    entry(1, "PERCENTAGE", "Porcentaje"),
    entry(2, "SQUARE_METERS", "Metros cuadrados"),
];

pub(super) const OFFICE_VERTICAL_HEIGHT: &[CatalogEntry] = &[
    entry(1, "LESS_THAN_6_FLOORS", "Menor de 6 pisos"),
    entry(2, "BETWEEN_6_AND_10_FLOORS", "Menor de 10 y mayor a 6 pisos"),
    entry(3, "MORE_THAN_10_FLOORS", "Mayor de 10 pisos"),
];

pub(super) const ROOFING_TYPE: &[CatalogEntry] = &[
    entry(1, "TBD", "TBD"),
    entry(2, "GALVALOK_II", "Galvalok II"),
    entry(3, "KR_18", "KR-18"),
    entry(4, "SHEET", "Lámina"),
    entry(5, "GALVANIZED_SHEET", "Lámina galvanizada"),
    entry(6, "PINTRO_SHEET", "Lámina pintro"),
    entry(7, "LOSACERO", "Losacero"),
    entry(8, "O_30", "O-30"),
    entry(9, "O_100", "O-100"),
    entry(10, "R_72", "R-72"),
    entry(11, "R_101", "R-101"),
    entry(13, "RD_91_5", "RD-91.5"),
    entry(14, "RN_100_35", "RN-100/35"),
    entry(15, "SSR24", "SSR24"),
];

pub(super) const SECURITY_TYPE: &[CatalogEntry] = &[
    entry(1, "CCTV", "CCTV"),
    entry(2, "GUARD_BOOTH", "Caseta de vigilancia"),
    entry(3, "SECURITY_GUARD", "Vigilante"),
];

pub(super) const SPACE_BETWEEN_COLUMNS: &[CatalogEntry] = &[
    entry(1, "LESS_THAN_8_METERS", "Menos de 8 metros"),
    entry(2, "BETWEEN_8_AND_12_METERS", "8 a 12 metros"),
    entry(3, "BETWEEN_12_AND_16_METERS", "12 a 16 metros"),
];

pub(super) const PRICE_AREA_TYPE: &[CatalogEntry] = &[
    entry(1, "TOTAL", "total"),
    entry(2, "PER_SQUARE_METER", "por metro cuadrado"),
    entry(3, "PERCENTAGE", "por porcentaje"),
];

pub(super) const PRICE_CURRENCY_TYPE: &[CatalogEntry] =
    &[entry(1, "MXN", "MXN"), entry(2, "USD", "USD")];

pub(super) const PRICE_MAINTENANCE_TYPE: &[CatalogEntry] = &[
    entry(1, "REAL_VALUE", "Valor real"),
    entry(2, "PERCENTAGE_VALUE", "Valor porcentual"),
    entry(3, "SQUARE_METER_VALUE", "Valor por metro cuadrado"),
    entry(4, "TO_BE_DEFINED", "Por definir"),
    entry(5, "INCLUDED_IN_RENT", "Incluido en la renta"),
];

pub(super) const PRICE_MODALITY: &[CatalogEntry] = &[
    entry(1, "DAILY_WEEKLY", "diario/semanal"),
    entry(2, "MONTHLY", "mensual"),
    entry(3, "ANNUAL", "anual"),
];

pub(super) const PRICE_TYPE: &[CatalogEntry] = &[
    entry(1, "RENT", "Renta"),
    entry(2, "SALE", "Venta"),
    entry(3, "RENT_AND_SALE", "Renta y Venta"),
];

pub(super) const PHOTO_TYPE: &[CatalogEntry] = &[
    entry(1, "NORMAL", "Normal"),
    entry(2, "MAP", "Mapa"),
    entry(3, "FACADE", "Fachada"),
    entry(4, "INTERIOR", "Interior"),
    entry(5, "EXTERIOR", "Exterior"),
    entry(6, "DETAILS", "Detalles"),
];
