use tracing::info;

use crate::error::JourneyResult;
use crate::http::{Check, Crumb, PageClient, crumb_rotated_or_fail};

use super::{AppUrls, tags};

#[derive(Clone, Copy)]
pub struct PurposePage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> PurposePage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    /// # Errors
    ///
    /// Fails unless the post lands on the transport page with a new crumb.
    pub async fn submit(
        &self,
        crumb: Crumb,
        main_reason: &str,
        internal_market_purpose: &str,
    ) -> JourneyResult<Crumb> {
        info!("==== Posting Purpose page...");
        let previous = crumb.into_inner();
        let check = Check::new("Purpose submitted")
            .status(200)
            .url_ends_with("/import/transport");
        let response = self
            .client
            .post_form(
                self.urls.url("/import/consignment/purpose")?,
                vec![
                    ("crumb", previous.clone()),
                    ("purpose", main_reason.to_owned()),
                    (
                        "internal-market-purpose",
                        internal_market_purpose.to_owned(),
                    ),
                ],
                tags::SUBMIT_PURPOSE,
                &check,
                "Saving the purpose failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &previous, "Purpose submission")?)
    }
}
