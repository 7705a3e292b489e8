use reqwest::Url;
use tracing::info;

use crate::error::JourneyResult;
use crate::http::{Check, Crumb, PageClient, crumb_rotated_or_fail};

use super::{AppUrls, tags};

const CODES_PATH: &str = "/import/commodity/codes";
const QUANTITIES_SUFFIX: &str = "/import/commodity/codes/quantities";

#[derive(Clone, Copy)]
pub struct CommodityPage<'page> {
    client: &'page PageClient,
    urls: &'page AppUrls,
}

impl<'page> CommodityPage<'page> {
    #[must_use]
    pub const fn new(client: &'page PageClient, urls: &'page AppUrls) -> Self {
        Self { client, urls }
    }

    fn codes_url(&self, suffix: &str, query: &[(&str, &str)]) -> JourneyResult<Url> {
        let mut url = self.urls.url(&format!("{}{}", CODES_PATH, suffix))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Search for a commodity code. The page must echo the exact search URL,
    /// which catches a silent redirect back to the search form.
    ///
    /// # Errors
    ///
    /// Fails when the landing URL differs from the search URL or no crumb is returned.
    pub async fn search_code(&self, crumb: Crumb, code: &str) -> JourneyResult<Crumb> {
        info!("==== Selecting Commodity Codes...");
        let crumb = crumb.into_inner();
        let url = self.codes_url(
            "/search",
            &[("crumb", crumb.as_str()), ("commodity-code", code)],
        )?;
        let check = Check::new("Commodity Codes Searched")
            .status(200)
            .url_equals(url.as_str());
        let response = self
            .client
            .get(
                url,
                tags::COMMODITY_CODE_SELECTION,
                &check,
                "Commodity Code search failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &crumb, "Commodity code search")?)
    }

    /// # Errors
    ///
    /// Fails unless the selection lands on the quantities page with a new crumb.
    pub async fn select_species(
        &self,
        crumb: Crumb,
        species_type: &str,
        species_id: &str,
    ) -> JourneyResult<Crumb> {
        info!("==== Selecting Commodity Species...");
        let crumb = crumb.into_inner();
        let url = self.codes_url(
            "/select",
            &[
                ("crumb", crumb.as_str()),
                ("commodityType", species_type),
                ("species", species_id),
            ],
        )?;
        let check = Check::new("Commodity Species Selected")
            .status(200)
            .url_ends_with(QUANTITIES_SUFFIX);
        let response = self
            .client
            .get(
                url,
                tags::SELECT_COMMODITY_SPECIES,
                &check,
                "Commodity Species Selection failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &crumb, "Commodity species selection")?)
    }

    /// # Errors
    ///
    /// Fails unless the save lands on the purpose page with a new crumb.
    pub async fn save_quantities(
        &self,
        crumb: Crumb,
        species_id: &str,
        animals: u32,
        packs: u32,
    ) -> JourneyResult<Crumb> {
        info!("==== Selecting Commodity Quantities...");
        let crumb = crumb.into_inner();
        let animals_field = format!("{}-noOfAnimals", species_id);
        let packs_field = format!("{}-noOfPacks", species_id);
        let animals = animals.to_string();
        let packs = packs.to_string();
        let url = self.codes_url(
            "/quantities/save",
            &[
                ("crumb", crumb.as_str()),
                (animals_field.as_str(), animals.as_str()),
                (packs_field.as_str(), packs.as_str()),
            ],
        )?;
        let check = Check::new("Commodity Quantities Saved")
            .status(200)
            .url_ends_with("/import/consignment/purpose");
        let response = self
            .client
            .get(
                url,
                tags::SAVE_COMMODITY_QUANTITIES,
                &check,
                "Saving the Commodity Quantities failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &crumb, "Commodity quantities save")?)
    }

    /// Re-enter the quantities page from the review page's change link.
    ///
    /// # Errors
    ///
    /// Fails unless the request lands on the quantities page with a new crumb.
    pub async fn change(&self, crumb: Crumb) -> JourneyResult<Crumb> {
        info!("==== Changing Commodity Quantities...");
        let crumb = crumb.into_inner();
        let url = self.codes_url("", &[("crumb", crumb.as_str())])?;
        let check = Check::new("Commodity Codes Changed")
            .status(200)
            .url_ends_with(QUANTITIES_SUFFIX);
        let response = self
            .client
            .get(
                url,
                tags::CHANGE_COMMODITY_CODE,
                &check,
                "Changing the Commodity Codes failed",
            )
            .await?;
        Ok(crumb_rotated_or_fail(&response, &crumb, "Commodity codes change")?)
    }
}
