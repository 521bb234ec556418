//! Hotel selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One hotel option as reshaped from the search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelOption {
    pub name: String,
    /// User rating out of 5, when the backend reports one.
    #[serde(default)]
    pub rating: Option<f64>,
    pub price_per_night: f64,
    /// Price for the whole stay.
    pub total: f64,
    pub location: String,
    /// Comma-joined amenity list, e.g. `Pool, Spa, Free Wi-Fi`.
    pub amenities: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Returned when a recommendation is requested over an empty option set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no hotel options available")]
pub struct NoHotelsAvailable;

/// A single selected hotel with its justification.
#[derive(Debug, Clone, Serialize)]
pub struct HotelPick {
    pub selected_hotel: HotelOption,
    pub justification: &'static str,
}

/// Picks the single best hotel option.
///
/// Unlike flight ranking this is a "choose one" contract: hotels are
/// chosen, flights are browsed.
pub struct HotelRanker;

impl HotelRanker {
    /// Select the option with the highest rating, breaking ties by the
    /// lowest price per night. Missing ratings count as zero.
    pub fn recommend(&self, hotels: &[HotelOption]) -> Result<HotelPick, NoHotelsAvailable> {
        let best = hotels
            .iter()
            .max_by(|a, b| {
                let rating_a = a.rating.unwrap_or(0.0);
                let rating_b = b.rating.unwrap_or(0.0);
                rating_a
                    .total_cmp(&rating_b)
                    .then(b.price_per_night.total_cmp(&a.price_per_night))
            })
            .ok_or(NoHotelsAvailable)?;

        Ok(HotelPick {
            selected_hotel: best.clone(),
            justification: "Chosen hotel provides the best balance of high user rating \
                            and affordability within the given budget.",
        })
    }
}
