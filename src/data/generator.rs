use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use super::catalog::{
    BORDER_CONTROL_POSTS, COMMODITIES, COUNTRY_CODES, Commodity, INTERNAL_MARKET_PURPOSES,
    ImportReason, QuantityRange, TRANSPORT_TYPES, TransportType, country_weight,
};

const FALLBACK_COUNTRY: &str = "FR";

#[derive(Debug, Clone, Copy, Default)]
pub struct DraftOptions {
    pub weighted_countries: bool,
    /// Always use this commodity instead of drawing one.
    pub commodity: Option<&'static Commodity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommoditySelection {
    pub commodity: &'static Commodity,
    pub animals: u32,
    pub packs: u32,
}

impl CommoditySelection {
    /// Quantities used by the change flow: both halved, rounding down.
    #[must_use]
    pub const fn halved(&self) -> (u32, u32) {
        (self.animals / 2, self.packs / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDetails {
    pub transport_type: TransportType,
    /// Border control post in `Name - Code` form.
    pub bcp: &'static str,
    pub vehicle_id: String,
}

/// The notification assembled across the journey's form steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNotificationDraft {
    pub country_code: &'static str,
    pub commodity: CommoditySelection,
    pub purpose: ImportReason,
    pub internal_market_purpose: &'static str,
    pub transport: TransportDetails,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DraftGenerator {
    options: DraftOptions,
}

impl DraftGenerator {
    #[must_use]
    pub const fn new(options: DraftOptions) -> Self {
        Self { options }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> ImportNotificationDraft {
        let commodity = self
            .options
            .commodity
            .or_else(|| COMMODITIES.choose(rng))
            .unwrap_or(&COMMODITIES[1]);
        let transport_type = TRANSPORT_TYPES
            .choose(rng)
            .copied()
            .unwrap_or(TransportType::RoadVehicle);

        ImportNotificationDraft {
            country_code: random_country(rng, self.options.weighted_countries),
            commodity: CommoditySelection {
                commodity,
                animals: quantity(rng, commodity.animals),
                packs: quantity(rng, commodity.packs),
            },
            purpose: ImportReason::InternalMarket,
            internal_market_purpose: INTERNAL_MARKET_PURPOSES
                .choose(rng)
                .copied()
                .unwrap_or("Commercial Sale"),
            transport: TransportDetails {
                transport_type,
                bcp: BORDER_CONTROL_POSTS
                    .choose(rng)
                    .map_or(BORDER_CONTROL_POSTS[0].display, |post| post.display),
                vehicle_id: vehicle_id(rng, transport_type),
            },
        }
    }
}

pub fn random_country<R: Rng + ?Sized>(rng: &mut R, weighted: bool) -> &'static str {
    if !weighted {
        return COUNTRY_CODES.choose(rng).copied().unwrap_or(FALLBACK_COUNTRY);
    }
    WeightedIndex::new(COUNTRY_CODES.iter().map(|code| country_weight(code)))
        .ok()
        .and_then(|weights| COUNTRY_CODES.get(weights.sample(rng)).copied())
        .unwrap_or(FALLBACK_COUNTRY)
}

fn quantity<R: Rng + ?Sized>(rng: &mut R, range: QuantityRange) -> u32 {
    rng.gen_range(range.min..=range.max)
}

/// Uppercase base-36 characters.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Registration, flight, vessel or train id in the style of each transport type.
pub fn vehicle_id<R: Rng + ?Sized>(rng: &mut R, transport_type: TransportType) -> String {
    let prefix = transport_type
        .vehicle_prefixes()
        .choose(rng)
        .copied()
        .unwrap_or("XX");
    match transport_type {
        TransportType::RoadVehicle => format!(
            "{}{}{}",
            prefix,
            rng.gen_range(0..100),
            random_string(rng, 3)
        ),
        TransportType::Airplane => format!("{}{}", prefix, rng.gen_range(100..10_000)),
        TransportType::Vessel => format!("{} {}", prefix, random_string(rng, 6)),
        TransportType::Railway => format!("{}-{}", prefix, rng.gen_range(10_000..100_000)),
    }
}
