use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::data::NotificationReference;
use crate::error::{JourneyResult, ValidationFailure};
use crate::http::{Check, Crumb, CsrfToken, PageClient, extract_csrf_meta};

use super::{AppUrls, tags};

const REVIEW_PATH: &str = "/import/review";
const DRAFT_SAVED_MESSAGE: &str = "Draft saved successfully";
const SUBMITTED_PHRASE: &str = "Import notification submitted";

/// Literal values the review page must show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewExpectations<'page> {
    pub country: &'page str,
    pub commodity: &'page str,
    pub reason: &'page str,
    pub purpose: &'page str,
    pub bcp: &'page str,
}

/// Every expectation missing from `body`, in expectation order. Empty when all are present.
#[must_use]
pub fn missing_review_fields(body: &str, expected: &ReviewExpectations<'_>) -> Vec<String> {
    let fields = [
        (
            expected.country,
            format!("Country of Origin: expected {} not found", expected.country),
        ),
        (
            expected.commodity,
            format!("Commodity: expected '{}' not found", expected.commodity),
        ),
        (
            expected.reason,
            format!(
                "Main reason for import: expected {} not found",
                expected.reason
            ),
        ),
        (
            expected.purpose,
            format!(
                "Internal market purpose: expected {} not found",
                expected.purpose
            ),
        ),
        (
            expected.bcp,
            format!("BCP: expected {} not found", expected.bcp),
        ),
    ];
    fields
        .into_iter()
        .filter(|(value, _)| !body.contains(value))
        .map(|(_, message)| message)
        .collect()
}

#[derive(Debug, Deserialize)]
struct DraftSaveResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "notificationId")]
    notification_id: Option<serde_json::Value>,
}

#[derive(Clone, Copy)]
pub struct ReviewPage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> ReviewPage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    /// Load the review page, require every expected value on it and return
    /// the meta-tag token used by the draft save endpoint.
    ///
    /// # Errors
    ///
    /// Fails on an unexpected status or URL, a missing `csrf-token` meta tag,
    /// or when any expected value is absent. All absent values are reported together.
    pub async fn validate(&self, expected: &ReviewExpectations<'_>) -> JourneyResult<CsrfToken> {
        info!("==== Validating Review page...");
        let check = Check::new("Review page loaded")
            .status(200)
            .url_ends_with(REVIEW_PATH);
        let response = self
            .client
            .get(
                self.urls.url(REVIEW_PATH)?,
                tags::GET_REVIEW_PAGE,
                &check,
                "Loading the Review page failed",
            )
            .await?;

        let token = extract_csrf_meta(&response.body).ok_or_else(|| {
            ValidationFailure::new("CSRF token meta tag not found in review page")
                .with_response(Some(response.status), response.url.as_str())
        })?;

        let missing = missing_review_fields(&response.body, expected);
        if !missing.is_empty() {
            error!("Review page validation failed:");
            for field in &missing {
                error!("  x {}", field);
            }
            let message = format!("Review page validation failed: {}", missing.join("; "));
            return Err(ValidationFailure::new(message)
                .with_response(Some(response.status), response.url)
                .with_missing(missing)
                .into());
        }

        info!("All review page validations passed");
        Ok(token)
    }

    /// Save the notification as a draft through the JSON endpoint.
    /// Returns the draft's notification id when the service reports one.
    ///
    /// # Errors
    ///
    /// Fails on a non-200 status, a malformed JSON body, `success` other than
    /// `true`, or an unexpected confirmation message.
    pub async fn save_as_draft(&self, token: &CsrfToken) -> JourneyResult<Option<String>> {
        info!("==== Saving Notification...");
        let failure_message = "Saving the Draft Notification failed";
        let check = Check::new("Notification Saved").status(200);
        let response = self
            .client
            .post_json(
                self.urls.url("/import/save-as-draft")?,
                json!({ "formData": {} }),
                vec![
                    ("Content-Type", "application/json".to_owned()),
                    ("X-CSRF-Token", token.as_str().to_owned()),
                ],
                tags::SAVE_DRAFT,
                &check,
                failure_message,
            )
            .await?;

        let parsed: DraftSaveResponse = serde_json::from_str(&response.body).map_err(|err| {
            error!("{}: response is not JSON ({})", failure_message, err);
            ValidationFailure::new(failure_message)
                .with_response(Some(response.status), response.url.as_str())
        })?;
        if !parsed.success {
            return Err(ValidationFailure::new(format!(
                "Draft save failed: {}",
                parsed.message.as_deref().unwrap_or("no message")
            ))
            .with_response(Some(response.status), response.url)
            .into());
        }

        let saved = parsed.message.as_deref() == Some(DRAFT_SAVED_MESSAGE);
        self.client.sink().record_check(DRAFT_SAVED_MESSAGE, saved);
        if !saved {
            return Err(ValidationFailure::new("Draft not saved successfully")
                .with_response(Some(response.status), response.url)
                .into());
        }

        let notification_id = parsed.notification_id.map(|id| match id {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        });
        info!(
            "Draft saved successfully. ID: {}",
            notification_id.as_deref().unwrap_or("new")
        );
        Ok(notification_id)
    }

    /// Submit the notification. Returns the notification reference when the
    /// confirmation page shows one.
    ///
    /// # Errors
    ///
    /// Fails unless the post lands on `/import/confirmation` and the page
    /// carries the submitted confirmation phrase.
    pub async fn submit(
        &self,
        crumb: Crumb,
        confirmed: bool,
    ) -> JourneyResult<Option<NotificationReference>> {
        info!("==== Submitting Notification...");
        let check = Check::new("Notification Submitted")
            .status(200)
            .url_ends_with("/import/confirmation");
        let response = self
            .client
            .post_form(
                self.urls.url(REVIEW_PATH)?,
                vec![
                    ("crumb", crumb.into_inner()),
                    ("confirmAccurate", confirmed.to_string()),
                ],
                tags::SUBMIT_NOTIFICATION,
                &check,
                "Submitting the Notification failed",
            )
            .await?;

        let confirmation = Check::new("confirmation received")
            .status(200)
            .body_contains(SUBMITTED_PHRASE);
        self.client.verify(
            &response,
            &confirmation,
            "Confirmation page content not found.",
        )?;
        Ok(NotificationReference::find_in(&response.body))
    }
}
