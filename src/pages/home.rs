use tracing::info;

use crate::error::JourneyResult;
use crate::http::{Check, PageClient};

use super::{AppUrls, tags};

#[derive(Clone, Copy)]
pub struct HomePage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> HomePage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    /// # Errors
    ///
    /// Fails unless the home page answers 200 at the application root.
    pub async fn visit(&self) -> JourneyResult<()> {
        info!("==== Loading the Home page...");
        let check = Check::new("home page loaded")
            .status(200)
            .url_equals(self.urls.root());
        self.client
            .get(
                self.urls.url("/")?,
                tags::GET_HOME_PAGE,
                &check,
                "Loading the Home Page failed",
            )
            .await?;
        Ok(())
    }
}
