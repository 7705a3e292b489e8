use rand::SeedableRng;
use rand::rngs::StdRng;

use super::catalog::{BORDER_CONTROL_POSTS, COUNTRY_CODES, INTERNAL_MARKET_PURPOSES};
use super::*;
use crate::error::{ReferenceError, ValidationError};

#[test]
fn ched_reference_pads_scaled_sequence() -> Result<(), ReferenceError> {
    let cases = [
        ("CDP.2025.12.05.6", "CHEDA.2025.12050600"),
        ("CDP.2026.01.31.42", "CHEDA.2026.01314200"),
        ("CDP.2026.01.31.123", "CHEDA.2026.013112300"),
    ];
    for (input, expected) in cases {
        let ched = ched_reference(input)?;
        if ched != expected {
            return Err(ReferenceError::InvalidFormat {
                value: format!("{} -> {}", input, ched),
            });
        }
    }
    Ok(())
}

#[test]
fn ched_reference_rejects_malformed_ids() -> Result<(), ValidationError> {
    for input in ["CDP.2025.12.05", "CDP.2025.12.05.6.1", "", "CDP2025120506"] {
        match ched_reference(input) {
            Err(ReferenceError::InvalidFormat { .. }) => {}
            other => {
                return Err(ValidationError::from(format!(
                    "{:?} gave {:?}",
                    input, other
                )));
            }
        }
    }
    if !matches!(
        ched_reference("CDP.2025.12.05.x"),
        Err(ReferenceError::InvalidSequence { .. })
    ) {
        return Err(ValidationError::from("Non-numeric sequence should fail"));
    }
    Ok(())
}

#[test]
fn reference_is_found_in_confirmation_body() -> Result<(), ValidationError> {
    let body = "<p>Keep a note of your CDP reference <strong>CDP.2025.12.05.6</strong></p>";
    let reference = NotificationReference::find_in(body)
        .ok_or_else(|| ValidationError::from("Reference not found"))?;
    if reference.as_str() != "CDP.2025.12.05.6" {
        return Err(ValidationError::from(format!("Found {}", reference)));
    }
    if NotificationReference::find_in("<p>No reference here</p>").is_some() {
        return Err(ValidationError::from("Unexpected reference"));
    }
    Ok(())
}

#[test]
fn generated_drafts_stay_inside_catalogue() -> Result<(), ValidationError> {
    let mut rng = StdRng::seed_from_u64(7);
    let generator = DraftGenerator::new(DraftOptions {
        weighted_countries: true,
        commodity: None,
    });
    for _ in 0..200 {
        let draft = generator.generate(&mut rng);
        if !COUNTRY_CODES.contains(&draft.country_code) {
            return Err(ValidationError::from(format!("Country {}", draft.country_code)));
        }
        let selection = draft.commodity;
        let ranges = (selection.commodity.animals, selection.commodity.packs);
        if selection.animals < ranges.0.min
            || selection.animals > ranges.0.max
            || selection.packs < ranges.1.min
            || selection.packs > ranges.1.max
        {
            return Err(ValidationError::from(format!("Quantities {:?}", selection)));
        }
        if draft.purpose != ImportReason::InternalMarket
            || !INTERNAL_MARKET_PURPOSES.contains(&draft.internal_market_purpose)
        {
            return Err(ValidationError::from("Unexpected purpose"));
        }
        if !BORDER_CONTROL_POSTS
            .iter()
            .any(|post| post.display == draft.transport.bcp)
        {
            return Err(ValidationError::from(format!("BCP {}", draft.transport.bcp)));
        }
    }
    Ok(())
}

#[test]
fn specific_commodity_is_always_used() -> Result<(), ValidationError> {
    let mut rng = StdRng::seed_from_u64(11);
    let bison = commodity_by_code("0102").ok_or_else(|| ValidationError::from("Missing 0102"))?;
    if bison.species.name != "Bison bison" || bison.species.id != "716661" {
        return Err(ValidationError::from("Unexpected 0102 species"));
    }
    let generator = DraftGenerator::new(DraftOptions {
        weighted_countries: false,
        commodity: Some(bison),
    });
    for _ in 0..20 {
        if generator.generate(&mut rng).commodity.commodity.code != "0102" {
            return Err(ValidationError::from("Commodity override ignored"));
        }
    }
    Ok(())
}

#[test]
fn weighted_countries_favour_high_volume_origins() -> Result<(), ValidationError> {
    let mut rng = StdRng::seed_from_u64(3);
    let draws = 5_000;
    let france = (0..draws)
        .filter(|_| random_country(&mut rng, true) == "FR")
        .count();
    // FR carries 15 of 117 total weight, roughly 13%.
    if !(400..=950).contains(&france) {
        return Err(ValidationError::from(format!("FR drawn {} times", france)));
    }
    Ok(())
}

#[test]
fn vehicle_ids_follow_transport_formats() -> Result<(), ValidationError> {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let rail = vehicle_id(&mut rng, TransportType::Railway);
        let digits = rail
            .strip_prefix("RAIL-")
            .ok_or_else(|| ValidationError::from(format!("Rail id {}", rail)))?;
        if digits.len() != 5 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ValidationError::from(format!("Rail id {}", rail)));
        }

        let vessel = vehicle_id(&mut rng, TransportType::Vessel);
        let (prefix, name) = vessel
            .split_once(' ')
            .ok_or_else(|| ValidationError::from(format!("Vessel id {}", vessel)))?;
        if !["MV", "HMS", "SS"].contains(&prefix) || name.len() != 6 {
            return Err(ValidationError::from(format!("Vessel id {}", vessel)));
        }

        let road = vehicle_id(&mut rng, TransportType::RoadVehicle);
        if road.len() < 6 || road.chars().any(|ch| ch.is_ascii_lowercase()) {
            return Err(ValidationError::from(format!("Road id {}", road)));
        }
    }
    Ok(())
}

#[test]
fn halved_quantities_round_down() -> Result<(), ValidationError> {
    let commodity = commodity_by_code("0103").ok_or_else(|| ValidationError::from("Missing 0103"))?;
    let selection = CommoditySelection {
        commodity,
        animals: 7,
        packs: 1,
    };
    if selection.halved() != (3, 0) {
        return Err(ValidationError::from(format!("{:?}", selection.halved())));
    }
    Ok(())
}
