//! Static reference data the generator draws from.

/// EU member states followed by third countries.
pub const COUNTRY_CODES: [&str; 40] = [
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT", "LV",
    "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE", "US", "CS", "AU", "NZ", "NO",
    "CH", "IS", "JP", "CN", "IN", "BR", "AR", "ZA",
];

/// Selection weights for high-volume origins; every other country weighs 1.
pub const COUNTRY_WEIGHTS: [(&str, u32); 10] = [
    ("FR", 15),
    ("DE", 15),
    ("NL", 12),
    ("IE", 10),
    ("ES", 8),
    ("IT", 8),
    ("BE", 7),
    ("PL", 5),
    ("US", 4),
    ("AU", 3),
];

#[must_use]
pub fn country_weight(code: &str) -> u32 {
    COUNTRY_WEIGHTS
        .iter()
        .find(|(country, _)| *country == code)
        .map_or(1, |(_, weight)| *weight)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderControlPost {
    pub name: &'static str,
    pub code: &'static str,
    /// Autocomplete format, `Name - Code`.
    pub display: &'static str,
}

pub static BORDER_CONTROL_POSTS: [BorderControlPost; 11] = [
    BorderControlPost {
        name: "Port of Dover (Eastern)",
        code: "GBDOVE2",
        display: "Port of Dover (Eastern) - GBDOVE2",
    },
    BorderControlPost {
        name: "Holyhead Port (undesignated)",
        code: "GBHLY4PP",
        display: "Holyhead Port (undesignated) - GBHLY4PP",
    },
    BorderControlPost {
        name: "Portsmouth International Port",
        code: "GBPME2PP",
        display: "Portsmouth International Port - GBPME2PP",
    },
    BorderControlPost {
        name: "Folkstone",
        code: "GBFOL4PP",
        display: "Folkestone - GBFOL4PP",
    },
    BorderControlPost {
        name: "Associated British Ports - Hull",
        code: "GBHLL4PP",
        display: "associated British Ports - Hull - GBHLL4PP",
    },
    BorderControlPost {
        name: "Grimsby and Immingham",
        code: "GBIMM4PP",
        display: "Grimsby and Immingham - GBIMM4PP",
    },
    BorderControlPost {
        name: "Port of Felixstowe",
        code: "GBFXT1PP",
        display: "Port of Felixstowe - GBFXT1PP",
    },
    BorderControlPost {
        name: "Southampton",
        code: "GBSOU1",
        display: "Southampton - GBSOU1",
    },
    BorderControlPost {
        name: "Heathrow Airport",
        code: "GBLHR4PP",
        display: "Heathrow Airport - GBLHR4PP",
    },
    BorderControlPost {
        name: "Gatwick Airport",
        code: "GBGLW4PP",
        display: "Gatwick Airport - GBLGW4PP",
    },
    BorderControlPost {
        name: "Manchester Airport",
        code: "GBMNC4PP",
        display: "Manchester Airport - GBMNC4PP",
    },
];

pub const INTERNAL_MARKET_PURPOSES: [&str; 10] = [
    "Commercial Sale",
    "Rescue",
    "Breeding",
    "Research",
    "Racing or Competition",
    "Companion Animal not for Resale or Rehoming",
    "Production",
    "Slaughter",
    "Fattening",
    "Game Restocking",
];

/// Main reason for import, as posted in the `purpose` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportReason {
    #[default]
    InternalMarket,
    Transhipment,
    Transit,
}

impl ImportReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ImportReason::InternalMarket => "internalmarket",
            ImportReason::Transhipment => "transhipment",
            ImportReason::Transit => "transit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Species {
    pub id: &'static str,
    pub species_type: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commodity {
    pub code: &'static str,
    /// Text rendered on the review page, e.g. `0102 - Live bovine animals`.
    pub description: &'static str,
    pub species: Species,
    pub animals: QuantityRange,
    pub packs: QuantityRange,
}

const DOMESTIC: &str = "Domestic";

pub static COMMODITIES: [Commodity; 6] = [
    Commodity {
        code: "0101",
        description: "0101 - Live horses, asses, mules and hinnies",
        species: Species {
            id: "1347323",
            species_type: DOMESTIC,
            name: "Equus asinus",
        },
        animals: QuantityRange { min: 1, max: 500 },
        packs: QuantityRange { min: 1, max: 50 },
    },
    Commodity {
        code: "0102",
        description: "0102 - Live bovine animals",
        species: Species {
            id: "716661",
            species_type: DOMESTIC,
            name: "Bison bison",
        },
        animals: QuantityRange { min: 1, max: 500 },
        packs: QuantityRange { min: 1, max: 50 },
    },
    Commodity {
        code: "0103",
        description: "0103 - Live swine",
        species: Species {
            id: "1048450",
            species_type: DOMESTIC,
            name: "Potamochoerus spp.",
        },
        animals: QuantityRange { min: 1, max: 1000 },
        packs: QuantityRange { min: 1, max: 100 },
    },
    Commodity {
        code: "010410",
        description: "010410 - Sheep",
        species: Species {
            id: "1148505",
            species_type: DOMESTIC,
            name: "Ovis aries",
        },
        animals: QuantityRange { min: 1, max: 800 },
        packs: QuantityRange { min: 1, max: 80 },
    },
    Commodity {
        code: "010420",
        description: "010420 - Goats",
        species: Species {
            id: "1576160",
            species_type: DOMESTIC,
            name: "Capra hircus",
        },
        animals: QuantityRange { min: 1, max: 800 },
        packs: QuantityRange { min: 1, max: 80 },
    },
    Commodity {
        code: "01059400",
        description: "01059400 - Fowls of the species Gallus domesticus",
        species: Species {
            id: "1319068",
            species_type: DOMESTIC,
            name: "Gallus domesticus",
        },
        animals: QuantityRange {
            min: 100,
            max: 10_000,
        },
        packs: QuantityRange { min: 10, max: 500 },
    },
];

#[must_use]
pub fn commodity_by_code(code: &str) -> Option<&'static Commodity> {
    COMMODITIES.iter().find(|commodity| commodity.code == code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    RoadVehicle,
    Railway,
    Airplane,
    Vessel,
}

pub const TRANSPORT_TYPES: [TransportType; 4] = [
    TransportType::RoadVehicle,
    TransportType::Railway,
    TransportType::Airplane,
    TransportType::Vessel,
];

impl TransportType {
    /// Value posted as `transport-means-before`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TransportType::RoadVehicle => "Road vehicle",
            TransportType::Railway => "Railway",
            TransportType::Airplane => "Airplane",
            TransportType::Vessel => "Vessel",
        }
    }

    #[must_use]
    pub const fn vehicle_prefixes(self) -> &'static [&'static str] {
        match self {
            TransportType::RoadVehicle => &["GB", "FR", "DE", "NL", "ES", "IT", "PL", "RO"],
            TransportType::Railway => &["RAIL"],
            TransportType::Airplane => &["BA", "EZY", "RYR", "LH", "AF"],
            TransportType::Vessel => &["MV", "HMS", "SS"],
        }
    }
}
