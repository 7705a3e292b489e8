use tracing::info;

use crate::error::JourneyResult;
use crate::http::{Check, PageClient};

use super::{AppUrls, tags};

#[derive(Clone, Copy)]
pub struct DashboardPage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> DashboardPage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    /// # Errors
    ///
    /// Fails unless the dashboard answers 200 at `/dashboard`.
    pub async fn visit(&self) -> JourneyResult<()> {
        info!("==== Loading the Dashboard...");
        let check = Check::new("Dashboard loaded")
            .status(200)
            .url_ends_with("/dashboard");
        self.client
            .get(
                self.urls.url("/dashboard")?,
                tags::GET_DASHBOARD_PAGE,
                &check,
                "Loading the Dashboard Page failed",
            )
            .await?;
        Ok(())
    }
}
