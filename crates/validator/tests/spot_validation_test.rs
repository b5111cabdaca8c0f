//! End-to-end validation of spot records through `SpotValidator`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use spot_validator::prelude::*;

// ============================================================================
// STUB COLLABORATORS
// ============================================================================

/// Every referenced row exists.
struct Store;

impl ExistenceChecker for Store {
    fn exists(&self, _table: &str, _id: &Value) -> Result<bool, CollaboratorError> {
        Ok(true)
    }
}

/// Only zip code 404 is unknown.
struct ZipStore;

impl ExistenceChecker for ZipStore {
    fn exists(&self, table: &str, id: &Value) -> Result<bool, CollaboratorError> {
        Ok(!(table == "zip_codes" && id == &json!(404)))
    }
}

struct SlowStore(Duration);

impl ExistenceChecker for SlowStore {
    fn exists(&self, _table: &str, _id: &Value) -> Result<bool, CollaboratorError> {
        std::thread::sleep(self.0);
        Ok(true)
    }
}

/// URLs containing "missing" are unreachable; everything else is a PNG.
#[derive(Default)]
struct Images {
    calls: AtomicUsize,
}

impl UrlReachabilityChecker for Images {
    fn check(&self, url: &str) -> Result<UrlCheck, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UrlCheck {
            reachable: !url.contains("missing"),
            content_type: Some("image/png".to_owned()),
        })
    }
}

struct Offline;

impl UrlReachabilityChecker for Offline {
    fn check(&self, _url: &str) -> Result<UrlCheck, CollaboratorError> {
        Err(CollaboratorError::unavailable(CollaboratorKind::UrlReachability, "connection refused"))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 29)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap()
}

fn creation() -> ValidationMode {
    ValidationMode::creation().with_reference_time(reference_time())
}

fn validator() -> SpotValidator {
    SpotValidator::new(ValidationConfig::default())
        .unwrap()
        .with_collaborators(
            Collaborators::new()
                .with_existence(Store)
                .with_url_checker(Images::default()),
        )
}

/// A minimal valid record of `spot_type_id`, extended with `extra`.
fn spot(spot_type_id: i64, extra: Value) -> Record {
    let mut record = json!({
        "spot_type_id": spot_type_id,
        "zip_code_id": 1,
        "ext_number": "12",
    });
    if let (Value::Object(base), Value::Object(extra)) = (&mut record, extra) {
        base.extend(extra);
    }
    match record {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn codes_at(result: &ValidationResult, path: &str) -> Vec<String> {
    result
        .errors_for(path)
        .iter()
        .map(|error| error.code.to_string())
        .collect()
}

// ============================================================================
// EARLY EXITS
// ============================================================================

#[test]
fn valid_retail_spot_passes() {
    let result = validator().validate(&spot(13, json!({})), creation()).unwrap();
    assert!(result.passed, "unexpected errors: {:?}", result.errors);
}

#[test]
fn missing_zip_code_is_the_only_check() {
    let record = spot(13, json!({ "zip_code_id": "", "name": 5 }));
    let result = validator().validate(&record, creation()).unwrap();
    let keys: Vec<_> = result.errors.keys().cloned().collect();
    assert_eq!(keys, vec!["zip_code_id".to_owned()]);
    assert_eq!(result.errors_for("zip_code_id")[0].kind(), ErrorKind::RequiredFieldMissing);
}

#[test]
fn complex_hiding_its_address_is_prohibited() {
    let record = spot(13, json!({ "is_complex": 1, "hide_address_data": true, "front": "wide" }));
    let rules = validator().resolve(&record, creation()).unwrap();
    assert_eq!(rules.shape(), RuleSetShape::ProhibitedCombination);
    assert_eq!(rules.len(), 1);

    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors_for("is_complex")[0].kind(), ErrorKind::ProhibitedCombination);
}

#[test]
fn single_spot_may_hide_its_address() {
    let record = spot(13, json!({ "is_complex": 0, "hide_address_data": 1 }));
    assert!(validator().validate(&record, creation()).unwrap().passed);
}

// ============================================================================
// MINIMUM PRICE
// ============================================================================

fn priced(currency: Currency, rent_price: f64) -> Record {
    spot(
        13,
        json!({
            "modality_type": 1,
            "currency_type": currency.id(),
            "rent_price": rent_price,
            "rent_price_area": AreaMode::Total.id(),
            "square_space": 1000,
        }),
    )
}

#[rstest]
#[case(Currency::Mxn, 15_000.0, true)]
#[case(Currency::Mxn, 5_000.0, false)]
#[case(Currency::Usd, 600.0, true)]
#[case(Currency::Usd, 400.0, false)]
fn rent_price_floor(#[case] currency: Currency, #[case] rent_price: f64, #[case] passes: bool) {
    let result = validator().validate(&priced(currency, rent_price), creation()).unwrap();
    assert_eq!(result.passed, passes, "errors: {:?}", result.errors);
    if !passes {
        assert_eq!(result.errors_for("rent_price")[0].kind(), ErrorKind::BelowMinimumPrice);
    }
}

#[test]
fn usd_floor_is_reported_in_usd() {
    let result = validator().validate(&priced(Currency::Usd, 400.0), creation()).unwrap();
    let error = &result.errors_for("rent_price")[0];
    assert_eq!(error.param("minimum"), Some("500.00"));
    assert_eq!(error.param("currency"), Some("USD"));
    assert_eq!(error.param("label"), Some("renta"));
}

#[test]
fn host_converter_replaces_the_default_rate() {
    let validator = validator().with_collaborators(
        Collaborators::new()
            .with_existence(Store)
            .with_url_checker(Images::default())
            .with_exchange_rate(FixedRateConverter::new(10.0)),
    );
    let result = validator.validate(&priced(Currency::Usd, 600.0), creation()).unwrap();
    assert_eq!(codes_at(&result, "rent_price"), vec![codes::BELOW_MINIMUM_PRICE]);
}

#[test]
fn rent_price_is_required_for_rent_modality() {
    let record = spot(13, json!({ "modality_type": 1, "currency_type": 1 }));
    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(codes_at(&result, "rent_price"), vec![codes::REQUIRED]);
    assert_eq!(codes_at(&result, "rent_price_area"), vec![codes::REQUIRED]);
    assert!(result.errors_for("sale_price").is_empty());
}

#[test]
fn price_with_three_decimals_fails_the_pattern() {
    let record = spot(13, json!({ "modality_type": 2, "currency_type": 1, "sale_price": "20000.123", "sale_price_area": 1 }));
    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(codes_at(&result, "sale_price"), vec![codes::PATTERN_MISMATCH]);
}

#[test]
fn zero_square_space_with_a_price_is_a_contract_violation() {
    let record = spot(13, json!({ "modality_type": 1, "rent_price": 20000, "square_space": 0 }));
    let err = validator().validate(&record, creation()).unwrap_err();
    assert!(matches!(err, SpotValidationError::InvalidArgument(_)));
}

// ============================================================================
// NORMALIZATION
// ============================================================================

#[rstest]
#[case(json!(123.456), json!(123.46))]
#[case(json!(123.4), json!(123.4))]
#[case(json!("250"), json!("250"))]
fn square_space_is_rounded(#[case] input: Value, #[case] expected: Value) {
    let record = spot(13, json!({ "square_space": input }));
    let result = validator().validate(&record, creation()).unwrap();
    assert!(result.passed);
    assert_eq!(result.normalized["square_space"], expected);
    assert_eq!(record["square_space"], input);
}

#[test]
fn list_fields_are_prepared() {
    let record = spot(11, json!({ "amenities": "4", "security_type": null }));
    let result = validator().validate(&record, creation()).unwrap();
    assert!(result.passed, "errors: {:?}", result.errors);
    assert_eq!(result.normalized["amenities"], json!(["4"]));
    assert_eq!(result.normalized["security_type"], json!([]));
    assert_eq!(result.normalized["guarantee"], json!([]));
}

// ============================================================================
// CROSS-FIELD RULES
// ============================================================================

#[rstest]
#[case(json!({ "height": 5, "max_height": 8 }), true)]
#[case(json!({ "height": 8, "max_height": 5 }), false)]
#[case(json!({ "max_height": 5 }), true)]
#[case(json!({ "height": 8, "max_height": null }), true)]
fn max_height_must_exceed_height(#[case] extra: Value, #[case] passes: bool) {
    let result = validator().validate(&spot(9, extra), creation()).unwrap();
    assert_eq!(result.passed, passes, "errors: {:?}", result.errors);
    if !passes {
        let error = &result.errors_for("max_height")[0];
        assert_eq!(error.kind(), ErrorKind::CrossFieldViolation);
        assert_eq!(error.param("other"), Some("height"));
    }
}

#[test]
fn floor_number_required_for_numbered_floor() {
    let result = validator().validate(&spot(11, json!({ "floor_level": 6 })), creation()).unwrap();
    assert_eq!(codes_at(&result, "floor_level_number"), vec![codes::REQUIRED]);

    let result = validator()
        .validate(&spot(11, json!({ "floor_level": 6, "floor_level_number": 12 })), creation())
        .unwrap();
    assert!(result.passed);
}

#[test]
fn ext_number_required_for_listed_types_only() {
    let mut record = spot(9, json!({}));
    record.remove("ext_number");
    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(codes_at(&result, "ext_number"), vec![codes::REQUIRED]);

    let mut record = spot(15, json!({}));
    record.remove("ext_number");
    assert!(validator().validate(&record, creation()).unwrap().passed);
}

#[test]
fn luminary_specs_required_when_luminaries_present() {
    let result = validator().validate(&spot(9, json!({ "luminaries": 1 })), creation()).unwrap();
    assert_eq!(codes_at(&result, "luminary_specs"), vec![codes::REQUIRED]);
}

// ============================================================================
// ARRAYS
// ============================================================================

#[rstest]
#[case(json!([1, 2, 3]))]
#[case(json!([]))]
fn valid_fire_protection_systems(#[case] systems: Value) {
    let record = spot(9, json!({ "fire_protection_system": systems }));
    assert!(validator().validate(&record, creation()).unwrap().passed);
}

#[test]
fn invalid_fire_protection_system_is_reported_at_its_index() {
    let record = spot(9, json!({ "fire_protection_system": [1, 999] }));
    let result = validator().validate(&record, creation()).unwrap();

    assert_eq!(result.error_count(), 1);
    let error = &result.errors_for("fire_protection_system.1")[0];
    assert_eq!(error.kind(), ErrorKind::InvalidEnumValue);
    assert_eq!(error.param("value"), Some("999"));
}

#[test]
fn duplicate_amenities_are_flagged() {
    let record = spot(13, json!({ "amenities": [3, "3", 4] }));
    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(codes_at(&result, "amenities.0"), vec![codes::DUPLICATE_ELEMENT]);
    assert_eq!(codes_at(&result, "amenities.1"), vec![codes::DUPLICATE_ELEMENT]);
    assert!(result.errors_for("amenities.2").is_empty());
}

#[test]
fn photo_type_is_checked_per_entry() {
    let record = spot(13, json!({ "photos": [{ "type": 1 }, { "type": 42 }] }));
    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(codes_at(&result, "photos.1.type"), vec![codes::INVALID_ENUM_VALUE]);
}

// ============================================================================
// DATES
// ============================================================================

#[rstest]
#[case("01/01/2030", true)]
#[case("01/01/2060", false)]
#[case("2030-01-01", false)]
fn built_to_window(#[case] built_to: &str, #[case] passes: bool) {
    let record = spot(13, json!({ "built_to": built_to }));
    let result = validator().validate(&record, creation()).unwrap();
    assert_eq!(result.passed, passes, "errors: {:?}", result.errors);
}

#[test]
fn external_id_and_timestamp_travel_together() {
    let result = validator()
        .validate(&spot(13, json!({ "external_id": "EXT-1" })), creation())
        .unwrap();
    assert_eq!(codes_at(&result, "external_updated_at"), vec![codes::REQUIRED]);

    let result = validator()
        .validate(
            &spot(13, json!({ "external_id": "EXT-1", "external_updated_at": "2024-10-30 08:00:00" })),
            creation(),
        )
        .unwrap();
    assert_eq!(codes_at(&result, "external_updated_at"), vec![codes::BEFORE]);
}

// ============================================================================
// COLLABORATORS
// ============================================================================

#[test]
fn unreachable_photo_urls_are_reported() {
    let record = spot(
        13,
        json!({ "photo_urls": ["https://cdn.example.com/a.png", "https://cdn.example.com/missing.png"] }),
    );
    let result = validator().validate(&record, creation()).unwrap();
    assert!(result.errors_for("photo_urls.0").is_empty());
    let error = &result.errors_for("photo_urls.1")[0];
    assert_eq!(error.kind(), ErrorKind::ReferenceNotFound);
    assert_eq!(error.param("urls"), Some("https://cdn.example.com/missing.png"));
}

#[test]
fn offline_checker_degrades_to_unavailable() {
    let validator = validator().with_collaborators(
        Collaborators::new().with_existence(Store).with_url_checker(Offline),
    );
    let record = spot(13, json!({ "photo_urls": ["https://cdn.example.com/a.png"], "front": -1 }));
    let result = validator.validate(&record, creation()).unwrap();

    assert_eq!(
        result.errors_for("photo_urls.0")[0].kind(),
        ErrorKind::CollaboratorUnavailable
    );
    assert_eq!(codes_at(&result, "front"), vec![codes::MIN]);
}

#[test]
fn unknown_zip_code_is_not_found() {
    let validator = validator().with_collaborators(
        Collaborators::new()
            .with_existence(ZipStore)
            .with_url_checker(Images::default()),
    );
    let result = validator.validate(&spot(13, json!({ "zip_code_id": 404 })), creation()).unwrap();
    let error = &result.errors_for("zip_code_id")[0];
    assert_eq!(error.code, codes::NOT_FOUND);
    assert_eq!(error.param("table"), Some("zip_codes"));
}

#[test]
fn spent_budget_skips_collaborator_calls() {
    let validator = validator()
        .with_collaborators(
            Collaborators::new()
                .with_existence(SlowStore(Duration::from_millis(20)))
                .with_url_checker(Images::default()),
        )
        .with_options(EvaluatorOptions::default().with_collaborator_budget(Duration::ZERO));
    let result = validator.validate(&spot(13, json!({})), creation()).unwrap();
    assert_eq!(codes_at(&result, "zip_code_id"), vec![codes::VALIDATION_UNAVAILABLE]);
}

#[test]
fn late_result_is_kept_and_later_calls_are_skipped() {
    let validator = validator()
        .with_collaborators(
            Collaborators::new()
                .with_existence(SlowStore(Duration::from_millis(80)))
                .with_url_checker(Images::default()),
        )
        .with_options(EvaluatorOptions::default().with_collaborator_budget(Duration::from_millis(40)));
    let record = spot(13, json!({ "amenities": [1, 2, 3] }));

    let started = std::time::Instant::now();
    let result = validator.validate(&record, creation()).unwrap();
    let elapsed = started.elapsed();

    // Four lookups: the first overruns the budget but succeeds, the rest are never issued.
    assert_eq!(result.error_count(), 3);
    assert!(result.iter_errors().all(|error| error.code == codes::VALIDATION_UNAVAILABLE));
    assert!(elapsed < Duration::from_millis(4 * 80), "took {elapsed:?}");
}

#[test]
fn unbound_url_checker_fails_the_call() {
    let validator = SpotValidator::new(ValidationConfig::default())
        .unwrap()
        .with_collaborators(Collaborators::new().with_existence(Store));
    let err = validator.validate(&spot(13, json!({})), creation()).unwrap_err();
    assert!(matches!(
        err,
        SpotValidationError::MissingCollaborator(CollaboratorKind::UrlReachability)
    ));
}

#[test]
fn shared_url_checker_is_called_once_per_url() {
    let images = Arc::new(Images::default());
    struct Shared(Arc<Images>);
    impl UrlReachabilityChecker for Shared {
        fn check(&self, url: &str) -> Result<UrlCheck, CollaboratorError> {
            self.0.check(url)
        }
    }

    let validator = validator().with_collaborators(
        Collaborators::new()
            .with_existence(Store)
            .with_url_checker(Shared(Arc::clone(&images))),
    );
    let record = spot(
        13,
        json!({ "photo_urls": ["https://cdn.example.com/a.png", "https://cdn.example.com/b.png"] }),
    );
    assert!(validator.validate(&record, creation()).unwrap().passed);
    assert_eq!(images.calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// UPDATES AND CONFIGURATION
// ============================================================================

#[test]
fn update_inherits_the_stored_classification() {
    let existing = ExistingSpot { spot_type_id: 9, is_complex: false };
    let mode = ValidationMode::update(existing).with_reference_time(reference_time());
    let record = spot(9, json!({ "height": 8, "max_height": 5 }));
    let mut partial = record.clone();
    partial.remove("spot_type_id");
    partial.remove("zip_code_id");

    let result = validator().validate(&partial, mode).unwrap();
    assert_eq!(codes_at(&result, "max_height"), vec![codes::GREATER_THAN_FIELD]);
}

#[test]
fn update_without_zip_code_is_composed() {
    let existing = ExistingSpot { spot_type_id: 13, is_complex: false };
    let mode = ValidationMode::update(existing);
    let record: Record = serde_json::from_value(json!({ "name": "Local 4" })).unwrap();
    let rules = validator().resolve(&record, mode).unwrap();
    assert!(matches!(rules.shape(), RuleSetShape::Composed { .. }));
}

#[test]
fn strict_configuration_rejects_unknown_fields() {
    let config = ValidationConfig::from_json_str(r#"{ "features": { "strict_validation": true } }"#)
        .unwrap();
    let validator = SpotValidator::new(config).unwrap().with_collaborators(
        Collaborators::new()
            .with_existence(Store)
            .with_url_checker(Images::default()),
    );
    let result = validator.validate(&spot(13, json!({ "colour": "red" })), creation()).unwrap();
    assert_eq!(codes_at(&result, "colour"), vec![codes::UNEXPECTED_FIELD]);
    assert_eq!(result.error_count(), 1);
}

#[test]
fn strict_configuration_accepts_contact_sub_form() {
    let config = ValidationConfig::from_json_str(r#"{ "features": { "strict_validation": true } }"#)
        .unwrap();
    let validator = SpotValidator::new(config).unwrap().with_collaborators(
        Collaborators::new()
            .with_existence(Store)
            .with_url_checker(Images::default()),
    );
    let record = spot(13, json!({ "contact_id": 5, "contact_category": 2 }));
    let result = validator.validate(&record, creation()).unwrap();
    assert!(result.passed, "{:?}", result.errors);
}

#[test]
fn basic_rules_skip_category_fields() {
    let record = spot(9, json!({ "height": 8, "max_height": 5, "latitude": 120 }));
    let result = validator().validate_basic(&record, creation()).unwrap();
    assert!(result.errors_for("max_height").is_empty());
    assert_eq!(codes_at(&result, "latitude"), vec![codes::OUT_OF_RANGE]);
}
