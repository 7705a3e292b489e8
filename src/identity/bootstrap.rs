use regex::Regex;
use reqwest::Url;
use tracing::{debug, error, info};

use crate::error::{AuthenticationFailure, JourneyError, JourneyResult};
use crate::http::{Check, OutboundRequest, PageClient};
use crate::pages::{AppUrls, tags};

/// Signs a virtual user in through the identity stub's user picker.
///
/// The flow is linear: load `/auth/login`, find the picker link for the
/// email, follow it, and expect to land back on the application root.
pub struct IdentityBootstrap<'flow> {
    client: &'flow PageClient,
    urls: &'flow AppUrls,
    stub_base: &'flow str,
}

impl<'flow> IdentityBootstrap<'flow> {
    #[must_use]
    pub const fn new(client: &'flow PageClient, urls: &'flow AppUrls, stub_base: &'flow str) -> Self {
        Self {
            client,
            urls,
            stub_base,
        }
    }

    /// # Errors
    ///
    /// Every way the sign-in can go wrong is an `AuthenticationFailure`,
    /// including transport errors. A link pattern that cannot be compiled is
    /// a harness defect.
    pub async fn authenticate(&self, email: &str) -> JourneyResult<()> {
        info!("Starting authentication for {}", email);
        let login_url = self.urls.url("/auth/login")?;
        let response = self
            .client
            .fetch(OutboundRequest::get(login_url), tags::LOGIN_INITIAL)
            .await
            .map_err(|err| {
                AuthenticationFailure::new(format!("Login page request failed: {}", err))
            })?;
        if response.status != 200 {
            error!(
                "Expected 200 from authorize endpoint, got {}",
                response.status
            );
            return Err(AuthenticationFailure::new(format!(
                "Expected 200 from authorize endpoint, got {}",
                response.status
            ))
            .with_response(Some(response.status), response.url)
            .into());
        }

        let href = find_login_link(&response.body, email)
            .map_err(|err| JourneyError::defect(format!("Login link pattern: {}", err)))?
            .ok_or_else(|| {
                AuthenticationFailure::new(format!(
                    "Could not find login link for {} in stub response",
                    email
                ))
                .with_response(Some(response.status), response.url.as_str())
            })?;

        let login_link = resolve_login_url(&href, self.stub_base);
        let login_url = Url::parse(&login_link).map_err(|err| {
            AuthenticationFailure::new(format!("Invalid login link '{}': {}", login_link, err))
        })?;
        debug!("Following login link {}", login_url);
        let response = self
            .client
            .fetch(OutboundRequest::get(login_url), tags::IDENTITY_USER_LOGIN)
            .await
            .map_err(|err| {
                AuthenticationFailure::new(format!("Authentication failed - {}", err))
            })?;

        let check = Check::new("authentication successful")
            .status(200)
            .url_equals(self.urls.root());
        self.client
            .verify(&response, &check, "Authentication failed")
            .map_err(|failure| {
                AuthenticationFailure::new(format!(
                    "Authentication failed - final status {}",
                    response.status
                ))
                .with_response(failure.status, response.url.as_str())
            })?;
        info!("Authentication successful for {}", email);
        Ok(())
    }
}

/// The picker link for `email`: an `href` whose query carries `user=<email>`.
///
/// # Errors
///
/// Returns an error when the pattern built around the escaped email does not compile.
pub fn find_login_link(body: &str, email: &str) -> Result<Option<String>, regex::Error> {
    let pattern = Regex::new(&format!(
        r#"(?i)href="([^"]*[?&]user={}[^"]*)""#,
        regex::escape(email)
    ))?;
    Ok(pattern
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|href| href.as_str().to_owned()))
}

/// Absolute URL for a picker link. Relative links hang off the stub base;
/// `&amp;` entities left in the attribute are decoded.
#[must_use]
pub fn resolve_login_url(href: &str, stub_base: &str) -> String {
    let href = href.replace("&amp;", "&");
    if href.starts_with("http") {
        return href;
    }
    let base = stub_base.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}
