use std::sync::Arc;

use reqwest::Url;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::error::{TransportError, ValidationFailure};
use crate::metrics::MetricsSink;

use super::{OutboundRequest, RawResponse, Transport};

/// Response as seen by page modules: status, landing URL and body text.
pub type PageResponse = RawResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Status(u16),
    UrlEquals(String),
    UrlEndsWith(&'static str),
    BodyContains(String),
}

impl Condition {
    #[must_use]
    pub fn holds(&self, response: &PageResponse) -> bool {
        match self {
            Condition::Status(code) => response.status == *code,
            Condition::UrlEquals(url) => response.url == *url,
            Condition::UrlEndsWith(suffix) => response.url.ends_with(suffix),
            Condition::BodyContains(text) => response.body.contains(text.as_str()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Condition::Status(code) => format!("status {}", code),
            Condition::UrlEquals(url) => format!("url == {}", url),
            Condition::UrlEndsWith(suffix) => format!("url ends with {}", suffix),
            Condition::BodyContains(text) => format!("body contains '{}'", text),
        }
    }
}

/// A named group of response predicates, recorded as one check sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    name: &'static str,
    conditions: Vec<Condition>,
}

impl Check {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn status(mut self, code: u16) -> Self {
        self.conditions.push(Condition::Status(code));
        self
    }

    #[must_use]
    pub fn url_equals(mut self, url: impl Into<String>) -> Self {
        self.conditions.push(Condition::UrlEquals(url.into()));
        self
    }

    #[must_use]
    pub fn url_ends_with(mut self, suffix: &'static str) -> Self {
        self.conditions.push(Condition::UrlEndsWith(suffix));
        self
    }

    #[must_use]
    pub fn body_contains(mut self, text: impl Into<String>) -> Self {
        self.conditions.push(Condition::BodyContains(text.into()));
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Conditions the response does not satisfy.
    #[must_use]
    pub fn failures(&self, response: &PageResponse) -> Vec<&Condition> {
        self.conditions
            .iter()
            .filter(|condition| !condition.holds(response))
            .collect()
    }
}

/// HTTP client for one iteration: owns the session and reports every request.
pub struct PageClient {
    transport: Box<dyn Transport>,
    sink: Arc<dyn MetricsSink>,
}

impl PageClient {
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, sink: Arc<dyn MetricsSink>) -> Self {
        Self { transport, sink }
    }

    #[must_use]
    pub fn sink(&self) -> &dyn MetricsSink {
        self.sink.as_ref()
    }

    /// Send a request and record its `http_req_duration` sample under `tag`.
    ///
    /// A request counts as failed when it never got a response or the status
    /// is outside 200..=399.
    ///
    /// # Errors
    ///
    /// Returns the transport error when no response was received.
    pub async fn fetch(
        &self,
        request: OutboundRequest,
        tag: &'static str,
    ) -> Result<PageResponse, TransportError> {
        let method = request.method.clone();
        let url = request.url.to_string();
        let start = Instant::now();
        let result = self.transport.send(request).await;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let failed = match &result {
            Ok(response) => !(200..=399).contains(&response.status),
            Err(_) => true,
        };
        self.sink.record_request(tag, latency_ms, failed);

        match &result {
            Ok(response) => debug!(
                "{} {} [{}] -> {} {} in {}ms",
                method, url, tag, response.status, response.url, latency_ms
            ),
            Err(err) => warn!("{} {} [{}] transport error: {}", method, url, tag, err),
        }
        result
    }

    /// Send a request and hold the response to `check`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationFailure` carrying `failure_message` and the
    /// observed status and URL when any condition fails, or without a status
    /// when the request never got a response.
    pub async fn send(
        &self,
        request: OutboundRequest,
        tag: &'static str,
        check: &Check,
        failure_message: &str,
    ) -> Result<PageResponse, ValidationFailure> {
        let requested_url = request.url.to_string();
        let response = match self.fetch(request, tag).await {
            Ok(response) => response,
            Err(err) => {
                self.sink.record_check(check.name(), false);
                error!(
                    "{}: no response from {} ({})",
                    failure_message, requested_url, err
                );
                return Err(
                    ValidationFailure::new(failure_message).with_response(None, requested_url)
                );
            }
        };

        self.verify(&response, check, failure_message)?;
        Ok(response)
    }

    /// Hold an already received response to `check`, recording the check sample.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationFailure` carrying `failure_message` and the
    /// observed status and URL when any condition fails.
    pub fn verify(
        &self,
        response: &PageResponse,
        check: &Check,
        failure_message: &str,
    ) -> Result<(), ValidationFailure> {
        let failures = check.failures(response);
        self.sink.record_check(check.name(), failures.is_empty());
        if failures.is_empty() {
            return Ok(());
        }

        for condition in &failures {
            warn!(
                "Check '{}' failed: expected {}",
                check.name(),
                condition.describe()
            );
        }
        error!(
            "{}: observed status {} at {}",
            failure_message, response.status, response.url
        );
        Err(ValidationFailure::new(failure_message)
            .with_response(Some(response.status), response.url.as_str()))
    }

    /// # Errors
    ///
    /// See [`PageClient::send`].
    pub async fn get(
        &self,
        url: Url,
        tag: &'static str,
        check: &Check,
        failure_message: &str,
    ) -> Result<PageResponse, ValidationFailure> {
        self.send(OutboundRequest::get(url), tag, check, failure_message)
            .await
    }

    /// # Errors
    ///
    /// See [`PageClient::send`].
    pub async fn post_form(
        &self,
        url: Url,
        fields: Vec<(&'static str, String)>,
        tag: &'static str,
        check: &Check,
        failure_message: &str,
    ) -> Result<PageResponse, ValidationFailure> {
        self.send(OutboundRequest::form(url, fields), tag, check, failure_message)
            .await
    }

    /// POST a JSON document with extra headers.
    ///
    /// # Errors
    ///
    /// See [`PageClient::send`].
    pub async fn post_json(
        &self,
        url: Url,
        body: serde_json::Value,
        headers: Vec<(&'static str, String)>,
        tag: &'static str,
        check: &Check,
        failure_message: &str,
    ) -> Result<PageResponse, ValidationFailure> {
        let mut request = OutboundRequest::json(url, body);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        self.send(request, tag, check, failure_message).await
    }
}
