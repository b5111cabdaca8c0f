//! Remote photo URL check.
//!
//! A value holds one URL or a comma-separated list. Google Drive share
//! links are rewritten to their direct-download form before the
//! [`UrlReachabilityChecker`](crate::collaborators::UrlReachabilityChecker)
//! is asked about them. The rewrite is pure string work; the request itself
//! belongs to the host.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use crate::collaborators::CollaboratorKind;
use crate::config::{ConfigError, DrivePatterns, PhotoConfig};
use crate::error::{ValidationError, codes};
use crate::rule::{AtomFailure, CustomRule, RuleContext};

const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc?id=";

/// Rewrites a Drive share link to `https://drive.google.com/uc?id=<id>`.
///
/// Other URLs are returned unchanged. A share link without an extractable
/// id is rewritten with an empty id, which the reachability check rejects.
#[must_use]
pub fn rewrite_drive_url<'a>(url: &'a str, patterns: &DrivePatterns) -> Cow<'a, str> {
    if !patterns.share_link.is_match(url) {
        return Cow::Borrowed(url);
    }
    let file_id = patterns
        .file_id
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map_or("", |id| id.as_str());
    Cow::Owned(format!("{DRIVE_DOWNLOAD_URL}{file_id}"))
}

/// Every URL in the value must resolve to an image.
#[derive(Debug, Clone)]
pub struct ValidCloudImage {
    patterns: Arc<DrivePatterns>,
    valid_types: Arc<[String]>,
}

impl ValidCloudImage {
    #[must_use]
    pub fn new(patterns: Arc<DrivePatterns>, valid_types: Arc<[String]>) -> Self {
        Self { patterns, valid_types }
    }

    pub fn from_config(config: &PhotoConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(config.compile()?),
            config.valid_image_types.iter().cloned().collect(),
        ))
    }

    fn accepts(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.valid_types.iter().any(|valid| *valid == media_type)
    }
}

impl CustomRule for ValidCloudImage {
    fn name(&self) -> &'static str {
        "valid_cloud_image"
    }

    fn requires(&self) -> &[CollaboratorKind] {
        &[CollaboratorKind::UrlReachability]
    }

    fn check(&self, _field: &str, value: &Value, ctx: &RuleContext<'_>) -> Result<(), AtomFailure> {
        let Some(text) = value.as_str() else {
            return Ok(());
        };
        let checker = ctx.url_checker()?;

        let mut missing = Vec::new();
        for url in text.split(',').map(str::trim).filter(|url| !url.is_empty()) {
            ctx.ensure_budget(CollaboratorKind::UrlReachability)?;
            let target = rewrite_drive_url(url, &self.patterns);
            let outcome = checker.check(&target)?;
            if !(outcome.reachable && self.accepts(outcome.content_type.as_deref())) {
                tracing::debug!(url, target = %target, "photo url is not a reachable image");
                missing.push(url);
            }
        }

        if missing.is_empty() {
            return Ok(());
        }
        let urls = missing.join(",");
        Err(ValidationError::new(codes::IMAGE_NOT_FOUND, format!("Photo(s) not found: {urls}"))
            .with_param("urls", urls)
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::collaborators::{CollaboratorError, Collaborators, UrlCheck, UrlReachabilityChecker};
    use crate::config::ValidationConfig;
    use crate::record::Record;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct ByPrefix;

    impl UrlReachabilityChecker for ByPrefix {
        fn check(&self, url: &str) -> Result<UrlCheck, CollaboratorError> {
            if url.starts_with("https://down.") {
                return Err(CollaboratorError::Timeout(CollaboratorKind::UrlReachability));
            }
            let content_type = if url.ends_with(".pdf") { "application/pdf" } else { "image/jpeg; q=1" };
            Ok(UrlCheck {
                reachable: !url.contains("missing"),
                content_type: Some(content_type.to_owned()),
            })
        }
    }

    fn patterns() -> DrivePatterns {
        PhotoConfig::default().compile().unwrap()
    }

    fn run(value: Value) -> Result<(), AtomFailure> {
        let config = ValidationConfig::default();
        let rule = ValidCloudImage::from_config(&config.photos).unwrap();
        let collaborators = Collaborators::new().with_url_checker(ByPrefix);
        let record = Record::new();
        let ctx = RuleContext {
            record: &record,
            collaborators: &collaborators,
            catalog: Catalog::global(),
            config: &config,
            deadline: None,
        };
        rule.check("photo_urls.0", &value, &ctx)
    }

    #[test]
    fn drive_share_link_is_rewritten() {
        let url = "https://drive.google.com/file/d/ABCDEFGHIJKLMNOPQRSTUVWXY0123/view";
        assert_eq!(
            rewrite_drive_url(url, &patterns()),
            "https://drive.google.com/uc?id=ABCDEFGHIJKLMNOPQRSTUVWXY0123"
        );
    }

    #[test]
    fn drive_link_with_query_is_rewritten() {
        let url = "https://drive.google.com/file/d/1a2B3c4D5e6F7g8H9i0J_kLmNoP-q/view?usp=sharing";
        assert_eq!(
            rewrite_drive_url(url, &patterns()),
            "https://drive.google.com/uc?id=1a2B3c4D5e6F7g8H9i0J_kLmNoP-q"
        );
    }

    #[test]
    fn other_urls_are_untouched() {
        let url = "https://cdn.example.com/photo.jpg";
        assert!(matches!(rewrite_drive_url(url, &patterns()), Cow::Borrowed(u) if u == url));
    }

    #[test]
    fn reachable_images_pass() {
        assert!(run(json!("https://cdn.example.com/a.jpg,https://cdn.example.com/b.jpg")).is_ok());
    }

    #[test]
    fn missing_and_non_image_urls_are_listed() {
        let failure = run(json!(
            "https://cdn.example.com/a.jpg,https://cdn.example.com/missing.jpg,https://cdn.example.com/c.pdf"
        ));
        let Err(AtomFailure::Invalid(error)) = failure else {
            panic!("expected image_not_found, got {failure:?}");
        };
        assert_eq!(error.code, codes::IMAGE_NOT_FOUND);
        assert_eq!(
            error.param("urls"),
            Some("https://cdn.example.com/missing.jpg,https://cdn.example.com/c.pdf")
        );
    }

    #[test]
    fn checker_failure_is_unavailable() {
        let failure = run(json!("https://down.example.com/a.jpg"));
        assert!(matches!(failure, Err(AtomFailure::Unavailable(CollaboratorError::Timeout(_)))));
    }
}
