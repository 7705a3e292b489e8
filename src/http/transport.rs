use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url, redirect};

use crate::error::TransportError;

pub const DEFAULT_USER_AGENT: &str = concat!("trade-perf/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
    pub headers: Vec<(&'static str, String)>,
}

impl OutboundRequest {
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn form<K, V>(url: Url, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            method: Method::POST,
            url,
            body: RequestBody::Form(
                fields
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn json(url: Url, value: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url,
            body: RequestBody::Json(value),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Value of the first form field called `name`.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            RequestBody::Empty | RequestBody::Json(_) => None,
        }
    }
}

/// What came back after redirects were followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// Opens one isolated transport (own cookie jar) per iteration.
pub trait SessionFactory: Send + Sync {
    /// Open a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be built.
    fn open(&self) -> Result<Box<dyn Transport>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub redirect_limit: u32,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with its own cookie store.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend or client cannot be initialised.
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let policy = if settings.redirect_limit == 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(usize::try_from(settings.redirect_limit).unwrap_or(10))
        };
        let client = Client::builder()
            .cookie_store(true)
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.as_str())
            .redirect(policy)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Json(value) => builder.json(&value),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;
        Ok(RawResponse { status, url, body })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestSessionFactory {
    settings: ClientSettings,
}

impl ReqwestSessionFactory {
    #[must_use]
    pub const fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

impl SessionFactory for ReqwestSessionFactory {
    fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(ReqwestTransport::new(&self.settings)?))
    }
}
