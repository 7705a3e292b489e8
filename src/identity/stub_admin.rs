use std::time::Duration;

use reqwest::Url;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::PoolError;
use crate::http::{OutboundRequest, RawResponse, Transport};

const REGISTER_PATH: &str = "/cdp-defra-id-stub/API/register";

/// Retries after the first attempt, each waiting twice as long as the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based): 1s, 2s, 4s by default.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Admin API of the identity stub: registers and expires pool users.
pub struct StubAdminClient {
    transport: Box<dyn Transport>,
    base: String,
    retry: RetryPolicy,
}

impl StubAdminClient {
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, stub_base: &str, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base: stub_base.trim_end_matches('/').to_owned(),
            retry,
        }
    }

    /// Register `email` and return the stub's id for it, when it reports one.
    ///
    /// # Errors
    ///
    /// Returns the last error once all retries are spent.
    pub async fn register(&self, email: &str, last_name: &str) -> Result<Option<String>, PoolError> {
        let payload = json!({
            "email": email,
            "firstName": "K6",
            "lastName": last_name,
            "loa": "1",
            "enrolmentCount": 1,
            "enrolmentRequestCount": 1,
            "relationships": [{
                "organisationName": "K6 Performance Test Organization",
                "relationshipRole": "Employee",
            }],
        });
        let body = self.post_with_retry(REGISTER_PATH, payload).await?;
        Ok(["userId", "id"]
            .iter()
            .find_map(|key| body.get(key))
            .and_then(|id| match id {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
            }))
    }

    /// Expire a registered user. A 2xx answer whose JSON says
    /// `"success": false` counts as a failure.
    ///
    /// # Errors
    ///
    /// Returns an error when the stub keeps failing or reports no success.
    pub async fn expire(&self, user_id: &str) -> Result<(), PoolError> {
        let path = format!("{}/{}/expire", REGISTER_PATH, user_id);
        let body = self.post_with_retry(&path, json!({})).await?;
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(PoolError::Status {
                url: format!("{}{}", self.base, path),
                status: 200,
                body: " - stub reported no success".to_owned(),
            });
        }
        Ok(())
    }

    async fn post_with_retry(&self, path: &str, payload: Value) -> Result<Value, PoolError> {
        let url_text = format!("{}{}", self.base, path);
        let url = Url::parse(&url_text).map_err(|source| PoolError::InvalidStubUrl {
            url: url_text.clone(),
            source,
        })?;

        let mut attempt: u32 = 0;
        loop {
            match self.post_once(&url, payload.clone()).await {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.retry.retries => {
                    let delay = self.retry.delay(attempt);
                    let left = self.retry.retries.saturating_sub(attempt);
                    warn!(
                        "Request failed ({}), retrying in {}ms... ({} attempts left)",
                        err,
                        delay.as_millis(),
                        left
                    );
                    tokio::time::sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once(&self, url: &Url, payload: Value) -> Result<Value, PoolError> {
        let request = OutboundRequest::json(url.clone(), payload)
            .header("Content-Type", "application/json");
        let RawResponse { status, body, .. } =
            self.transport
                .send(request)
                .await
                .map_err(|source| PoolError::Request {
                    url: url.to_string(),
                    source,
                })?;
        if !(200..=299).contains(&status) {
            let detail = if body.is_empty() {
                String::new()
            } else {
                format!(" - {}", body)
            };
            return Err(PoolError::Status {
                url: url.to_string(),
                status,
                body: detail,
            });
        }
        info!("POST {} -> {}", url, status);
        serde_json::from_str(&body).map_err(|source| PoolError::ParseResponse {
            url: url.to_string(),
            source,
        })
    }
}
