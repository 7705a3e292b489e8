use tracing::info;

use crate::data::TransportDetails;
use crate::error::JourneyResult;
use crate::http::{Check, Crumb, PageClient, crumb_rotated_or_fail};

use super::{AppUrls, tags};

#[derive(Clone, Copy)]
pub struct TransportPage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> TransportPage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    /// Post border control post, means of transport and vehicle id.
    ///
    /// # Errors
    ///
    /// Fails unless the post lands on the review page with a new crumb.
    pub async fn submit(&self, crumb: Crumb, transport: &TransportDetails) -> JourneyResult<Crumb> {
        info!("==== Posting Means of Transport page...");
        let previous = crumb.into_inner();
        let check = Check::new("Transport submitted")
            .status(200)
            .url_ends_with("/import/review");
        let response = self
            .client
            .post_form(
                self.urls.url("/import/transport")?,
                vec![
                    ("crumb", previous.clone()),
                    ("bcp", transport.bcp.to_owned()),
                    (
                        "transport-means-before",
                        transport.transport_type.label().to_owned(),
                    ),
                    ("vehicle-identifier", transport.vehicle_id.clone()),
                ],
                tags::SUBMIT_TRANSPORT_PAGE,
                &check,
                "Saving the Means of Transport failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &previous, "Transport submission")?)
    }
}
