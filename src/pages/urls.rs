use reqwest::Url;

/// Builds absolute application URLs from the configured base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUrls {
    base: String,
}

impl AppUrls {
    #[must_use]
    pub fn new(base: &Url) -> Self {
        Self {
            base: base.as_str().trim_end_matches('/').to_owned(),
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Where the home page and the identity flow land: the base plus `/`.
    #[must_use]
    pub fn root(&self) -> String {
        format!("{}/", self.base)
    }

    /// Absolute URL for an application path such as `/import/review`.
    ///
    /// # Errors
    ///
    /// Returns an error when the joined URL does not parse.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", self.base, path))
    }
}
