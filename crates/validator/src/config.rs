//! Engine configuration.
//!
//! [`ValidationConfig`] groups every host-tunable limit. All sections are
//! `#[serde(default)]`, so a host only lists what it overrides:
//!
//! ```rust,ignore
//! use spot_validator::ValidationConfig;
//!
//! let config = ValidationConfig::from_json_str(r#"{
//!     "pricing": { "default_exchange_rate": 18.5 },
//!     "features": { "strict_validation": true }
//! }"#)?;
//! ```
//!
//! Two environment variables are recognised by
//! [`ValidationConfig::with_env_overrides`]: `DEFAULT_EXCHANGE_RATE` and
//! `SPOT_VALIDATION_STRICT`.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `pricing.default_exchange_rate`.
pub const ENV_EXCHANGE_RATE: &str = "DEFAULT_EXCHANGE_RATE";

/// Environment variable overriding `features.strict_validation`.
pub const ENV_STRICT: &str = "SPOT_VALIDATION_STRICT";

// ============================================================================
// ERRORS
// ============================================================================

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid pattern in {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("environment variable {var} has an unusable value {value:?}")]
    Env { var: &'static str, value: String },
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Field limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub description_max_length: usize,
    pub pdf_description_max_length: usize,
    pub max_square_space: f64,
    pub max_price: f64,
    pub max_front_meters: f64,
    pub max_height_meters: f64,
    pub max_parking_spaces: f64,
    pub max_charging_ports: f64,
    pub max_vehicle_ramps: f64,
    pub max_elevators: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            description_max_length: 450,
            pdf_description_max_length: 450,
            max_square_space: 99_999_999.0,
            max_price: 10_000_000_000.0,
            max_front_meters: 1000.0,
            max_height_meters: 1000.0,
            max_parking_spaces: 9999.0,
            max_charging_ports: 1000.0,
            max_vehicle_ramps: 99.0,
            max_elevators: 999.0,
        }
    }
}

/// Pricing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// MXN per USD.
    pub default_exchange_rate: f64,
    pub decimal_places: u32,
    /// Floor price in MXN.
    pub minimum_price_per_area: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_exchange_rate: 20.0,
            decimal_places: 2,
            minimum_price_per_area: 10_000.0,
        }
    }
}

/// Feature flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Report record fields no rule mentions.
    pub strict_validation: bool,
    /// Consult the existence checker. When off, `exists` atoms pass.
    pub validate_external_ids: bool,
    /// Require `photos` when creating a spot.
    pub require_photos: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            strict_validation: false,
            validate_external_ids: true,
            require_photos: false,
        }
    }
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

/// Coordinate bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateBounds {
    pub latitude: Interval,
    pub longitude: Interval,
}

impl Default for CoordinateBounds {
    fn default() -> Self {
        Self {
            latitude: Interval { min: -90.0, max: 90.0 },
            longitude: Interval { min: -180.0, max: 180.0 },
        }
    }
}

/// Photo and cloud-image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Content types accepted from a reachability check.
    pub valid_image_types: Vec<String>,
    /// Recognises Google Drive share links.
    pub google_drive_pattern: String,
    /// Extracts the file id (first capture group) from a share link.
    pub file_id_pattern: String,
    pub max_photos: usize,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            valid_image_types: ["image", "image/png", "image/jpeg", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            google_drive_pattern: r"drive\.google\.com/file/d/.+/view".to_owned(),
            file_id_pattern: r"(?i)([a-z\d_-]{25,})[$/&?]".to_owned(),
            max_photos: 20,
        }
    }
}

impl PhotoConfig {
    /// Compiles the Drive patterns.
    pub fn compile(&self) -> Result<DrivePatterns, ConfigError> {
        let share_link =
            Regex::new(&self.google_drive_pattern).map_err(|source| ConfigError::InvalidPattern {
                field: "photos.google_drive_pattern",
                source,
            })?;
        let file_id =
            Regex::new(&self.file_id_pattern).map_err(|source| ConfigError::InvalidPattern {
                field: "photos.file_id_pattern",
                source,
            })?;
        Ok(DrivePatterns { share_link, file_id })
    }
}

/// Compiled Google Drive patterns.
#[derive(Debug, Clone)]
pub struct DrivePatterns {
    pub share_link: Regex,
    pub file_id: Regex,
}

// ============================================================================
// ROOT
// ============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub validation: ValidationLimits,
    pub pricing: PricingConfig,
    pub features: FeatureFlags,
    pub coordinates: CoordinateBounds,
    pub photos: PhotoConfig,
}

impl ValidationConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Converts and validates an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `DEFAULT_EXCHANGE_RATE` and `SPOT_VALIDATION_STRICT` from
    /// the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|var| std::env::var(var).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_EXCHANGE_RATE) {
            self.pricing.default_exchange_rate =
                value.trim().parse().map_err(|_| ConfigError::Env {
                    var: ENV_EXCHANGE_RATE,
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup(ENV_STRICT) {
            self.features.strict_validation = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::Env {
                        var: ENV_STRICT,
                        value,
                    });
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.pricing.default_exchange_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pricing.default_exchange_rate",
                reason: format!("must be a finite, non-negative number, got {rate}"),
            });
        }
        if rate == 0.0 {
            tracing::warn!("default exchange rate is 0, USD prices will not be converted");
        }

        let minimum = self.pricing.minimum_price_per_area;
        if !minimum.is_finite() || minimum <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "pricing.minimum_price_per_area",
                reason: format!("must be positive, got {minimum}"),
            });
        }

        for (field, interval) in [
            ("coordinates.latitude", self.coordinates.latitude),
            ("coordinates.longitude", self.coordinates.longitude),
        ] {
            if interval.min > interval.max {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("min {} is greater than max {}", interval.min, interval.max),
                });
            }
        }

        self.photos.compile()?;
        Ok(())
    }
}
