//! External collaborator seams.
//!
//! The engine never performs I/O itself. Exchange rates, row existence, and
//! remote image reachability are asked of host-supplied implementations of
//! the traits below. Every call may fail; the evaluator turns a failure into
//! a `validation_unavailable` field error instead of aborting.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::SpotValidationError;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure of a collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0} timed out")]
    Timeout(CollaboratorKind),

    #[error("{kind} unavailable: {reason}")]
    Unavailable {
        kind: CollaboratorKind,
        reason: String,
    },
}

impl CollaboratorError {
    pub fn unavailable(kind: CollaboratorKind, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// Which collaborator failed.
    #[must_use]
    pub fn kind(&self) -> CollaboratorKind {
        match self {
            Self::Timeout(kind) | Self::Unavailable { kind, .. } => *kind,
        }
    }
}

/// The collaborator seams a rule set may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollaboratorKind {
    ExchangeRate,
    Existence,
    UrlReachability,
}

impl fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExchangeRate => "exchange rate converter",
            Self::Existence => "existence checker",
            Self::UrlReachability => "url reachability checker",
        })
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// USD/MXN conversion.
pub trait ExchangeRateConverter: Send + Sync {
    /// MXN per USD.
    fn rate(&self) -> Result<f64, CollaboratorError>;

    fn to_mxn(&self, usd: f64) -> Result<f64, CollaboratorError> {
        Ok(usd * self.rate()?)
    }

    /// A zero rate returns the amount unconverted.
    fn to_usd(&self, mxn: f64) -> Result<f64, CollaboratorError> {
        let rate = self.rate()?;
        if rate == 0.0 {
            tracing::warn!(amount = mxn, "exchange rate is 0, returning amount unconverted");
            return Ok(mxn);
        }
        Ok(mxn / rate)
    }
}

/// "Row exists" checks against a backing store.
pub trait ExistenceChecker: Send + Sync {
    fn exists(&self, table: &str, id: &Value) -> Result<bool, CollaboratorError>;
}

/// Outcome of a remote resource check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCheck {
    pub reachable: bool,
    pub content_type: Option<String>,
}

/// Remote URL reachability (an HTTP `HEAD` in practice).
pub trait UrlReachabilityChecker: Send + Sync {
    fn check(&self, url: &str) -> Result<UrlCheck, CollaboratorError>;
}

/// Converter with a constant rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRateConverter {
    rate: f64,
}

impl FixedRateConverter {
    #[must_use]
    pub const fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for FixedRateConverter {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl ExchangeRateConverter for FixedRateConverter {
    fn rate(&self) -> Result<f64, CollaboratorError> {
        Ok(self.rate)
    }
}

// ============================================================================
// BUNDLE
// ============================================================================

/// The collaborators bound for one evaluation.
#[derive(Clone, Default)]
pub struct Collaborators {
    exchange_rate: Option<Arc<dyn ExchangeRateConverter>>,
    existence: Option<Arc<dyn ExistenceChecker>>,
    url_checker: Option<Arc<dyn UrlReachabilityChecker>>,
}

impl Collaborators {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_exchange_rate(mut self, converter: impl ExchangeRateConverter + 'static) -> Self {
        self.exchange_rate = Some(Arc::new(converter));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_existence(mut self, checker: impl ExistenceChecker + 'static) -> Self {
        self.existence = Some(Arc::new(checker));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_url_checker(mut self, checker: impl UrlReachabilityChecker + 'static) -> Self {
        self.url_checker = Some(Arc::new(checker));
        self
    }

    /// Binds a shared converter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_exchange_rate(mut self, converter: Arc<dyn ExchangeRateConverter>) -> Self {
        self.exchange_rate = Some(converter);
        self
    }

    #[must_use]
    pub fn is_bound(&self, kind: CollaboratorKind) -> bool {
        match kind {
            CollaboratorKind::ExchangeRate => self.exchange_rate.is_some(),
            CollaboratorKind::Existence => self.existence.is_some(),
            CollaboratorKind::UrlReachability => self.url_checker.is_some(),
        }
    }

    pub fn exchange_rate(&self) -> Result<&dyn ExchangeRateConverter, SpotValidationError> {
        self.exchange_rate
            .as_deref()
            .ok_or(SpotValidationError::MissingCollaborator(CollaboratorKind::ExchangeRate))
    }

    pub fn existence(&self) -> Result<&dyn ExistenceChecker, SpotValidationError> {
        self.existence
            .as_deref()
            .ok_or(SpotValidationError::MissingCollaborator(CollaboratorKind::Existence))
    }

    pub fn url_checker(&self) -> Result<&dyn UrlReachabilityChecker, SpotValidationError> {
        self.url_checker
            .as_deref()
            .ok_or(SpotValidationError::MissingCollaborator(CollaboratorKind::UrlReachability))
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("exchange_rate", &self.exchange_rate.is_some())
            .field("existence", &self.existence.is_some())
            .field("url_checker", &self.url_checker.is_some())
            .finish()
    }
}
