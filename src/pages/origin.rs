use tracing::info;

use crate::error::JourneyResult;
use crate::http::{Check, Crumb, PageClient, crumb_or_fail, crumb_rotated_or_fail};

use super::{AppUrls, tags};

const ORIGIN_PATH: &str = "/import/consignment/origin";

#[derive(Clone, Copy)]
pub struct OriginPage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> OriginPage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    /// Open the country of origin form and return its crumb.
    ///
    /// # Errors
    ///
    /// Fails on an unexpected status or URL, or when the form has no crumb.
    pub async fn visit(&self) -> JourneyResult<Crumb> {
        info!("==== Navigating to Country of Origin page...");
        let check = Check::new("Country of Origin loaded")
            .status(200)
            .url_ends_with(ORIGIN_PATH);
        let response = self
            .client
            .get(
                self.urls.url(ORIGIN_PATH)?,
                tags::GET_ORIGIN_PAGE,
                &check,
                "Loading the Country of Origin page failed",
            )
            .await?;
        Ok(crumb_or_fail(&response, "Country of Origin page")?)
    }

    /// # Errors
    ///
    /// Fails unless the post lands on the commodity codes page with a new crumb.
    pub async fn submit(&self, crumb: Crumb, country_code: &str) -> JourneyResult<Crumb> {
        info!("==== Posting Country of Origin page...");
        let previous = crumb.into_inner();
        let check = Check::new("Country of Origin submitted")
            .status(200)
            .url_ends_with("/import/commodity/codes");
        let response = self
            .client
            .post_form(
                self.urls.url(ORIGIN_PATH)?,
                vec![
                    ("crumb", previous.clone()),
                    ("origin-country", country_code.to_owned()),
                ],
                tags::SUBMIT_ORIGIN_PAGE,
                &check,
                "Country of Origin submission failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &previous, "After origin submission")?)
    }
}
