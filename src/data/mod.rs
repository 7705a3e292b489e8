//! Test data for the import notification journey.
pub mod catalog;
mod generator;
mod reference;

#[cfg(test)]
mod tests;

pub use catalog::{
    BorderControlPost, Commodity, ImportReason, Species, TransportType, commodity_by_code,
};
pub use generator::{
    CommoditySelection, DraftGenerator, DraftOptions, ImportNotificationDraft, TransportDetails,
    random_country, random_string, vehicle_id,
};
pub use reference::{NotificationReference, ched_reference};
