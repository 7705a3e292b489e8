use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationFailure;

use super::PageResponse;

static CRUMB_INPUT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)<input[^>]*name=["']crumb["'][^>]*>"#).ok());
static VALUE_ATTR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)\svalue=["']([^"']*)["']"#).ok());
static CSRF_META: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+name=["']csrf-token["']\s+content=["']([^"']+)["']"#).ok()
});

/// Single-use form token. Not `Clone`: each submission consumes the one it was handed.
#[derive(Debug, PartialEq, Eq)]
pub struct Crumb(String);

impl Crumb {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Header-style token read from the review page's `csrf-token` meta tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Value of the `<input name="crumb">` field, or `None` when absent or empty.
#[must_use]
pub fn extract_crumb(body: &str) -> Option<Crumb> {
    let input = CRUMB_INPUT.as_ref()?.find(body)?;
    let value = VALUE_ATTR
        .as_ref()?
        .captures(input.as_str())?
        .get(1)?
        .as_str();
    (!value.is_empty()).then(|| Crumb::new(value))
}

#[must_use]
pub fn extract_csrf_meta(body: &str) -> Option<CsrfToken> {
    let captures = CSRF_META.as_ref()?.captures(body)?;
    captures
        .get(1)
        .map(|value| CsrfToken(value.as_str().to_owned()))
}

/// Extract the crumb or fail the step, naming `context` in the message.
///
/// # Errors
///
/// Returns a `ValidationFailure` when the page carries no crumb.
pub fn crumb_or_fail(response: &PageResponse, context: &str) -> Result<Crumb, ValidationFailure> {
    extract_crumb(&response.body).ok_or_else(|| {
        tracing::error!(
            "Crumb missing from {} (status {}, url {})",
            context,
            response.status,
            response.url
        );
        ValidationFailure::new(format!("Crumb not found in response body ({})", context))
            .with_response(Some(response.status), response.url.as_str())
    })
}

/// Like [`crumb_or_fail`], and also fails when the page handed back the crumb
/// that was just submitted.
///
/// # Errors
///
/// Returns a `ValidationFailure` when the crumb is missing or equals `previous`.
pub fn crumb_rotated_or_fail(
    response: &PageResponse,
    previous: &str,
    context: &str,
) -> Result<Crumb, ValidationFailure> {
    let crumb = crumb_or_fail(response, context)?;
    if crumb.as_str() == previous {
        tracing::error!(
            "Crumb not rotated by {} (status {}, url {})",
            context,
            response.status,
            response.url
        );
        return Err(
            ValidationFailure::new(format!("Crumb not rotated ({})", context))
                .with_response(Some(response.status), response.url.as_str()),
        );
    }
    Ok(crumb)
}
