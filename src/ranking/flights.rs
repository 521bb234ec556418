//! Flight scoring and ranking.
//!
//! Each option is scored on price, total travel time, and layover count,
//! all normalized against the option set itself, then the list is ranked
//! ascending (lower score is better).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One flight option as reshaped from the search backend.
///
/// The identity fields come straight from the search result. `score`,
/// `recommendation_reason`, `tags`, `category`, and `recommendation` are
/// derived fields attached during ranking and categorization; the identity
/// fields are never touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOption {
    pub airline: String,
    pub flight_number: String,
    pub price: f64,
    pub duration_minutes: i64,
    pub layovers: u32,
    pub departure_time: String,
    pub departure_airport: String,
    pub arrival_time: String,
    pub arrival_airport: String,
    /// Human-readable duration, e.g. `2h 35m`.
    pub duration: String,
    /// Layover airports, or `Non-stop`.
    pub stops: String,
    /// Full path, e.g. `VGA → BOM → HYD`.
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_emissions: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Scores and ranks flight options by weighted criteria.
///
/// Weights: price 50%, duration 30%, layovers 20%.
pub struct FlightRanker;

impl FlightRanker {
    const WEIGHT_PRICE: f64 = 0.50;
    const WEIGHT_DURATION: f64 = 0.30;
    const WEIGHT_LAYOVERS: f64 = 0.20;

    /// Score and rank a list of flight options, best first.
    ///
    /// Empty input yields empty output. Metrics are normalized to `[0, 1]`
    /// where 0 is best; when every option shares the same price (or
    /// duration), that metric normalizes to 0 for all of them and the
    /// others decide the order. The sort is stable, so ties keep their
    /// input order. Only the top-ranked option is tagged.
    pub fn evaluate(&self, flights: Vec<FlightOption>) -> Vec<FlightOption> {
        if flights.is_empty() {
            return flights;
        }

        let min_price = fold_min(flights.iter().map(|f| f.price));
        let max_price = fold_max(flights.iter().map(|f| f.price));
        let min_duration = fold_min(flights.iter().map(|f| f.duration_minutes as f64));
        let max_duration = fold_max(flights.iter().map(|f| f.duration_minutes as f64));

        let price_range = spread_or_one(min_price, max_price);
        let duration_range = spread_or_one(min_duration, max_duration);

        let mut ranked: Vec<FlightOption> = flights
            .into_iter()
            .map(|mut flight| {
                let norm_price = (flight.price - min_price) / price_range;
                let norm_duration = (flight.duration_minutes as f64 - min_duration) / duration_range;
                // 0.0 for direct, 0.5 for one stop, capped at 1.0 from two up.
                let norm_layovers = (f64::from(flight.layovers) * 0.5).min(1.0);

                let score = norm_price * Self::WEIGHT_PRICE
                    + norm_duration * Self::WEIGHT_DURATION
                    + norm_layovers * Self::WEIGHT_LAYOVERS;

                flight.score = Some(round4(score));
                flight.recommendation_reason =
                    Some(recommendation_reason(flight.layovers, norm_price, norm_duration));
                flight
            })
            .collect();

        ranked.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

        if let Some(best) = ranked.first_mut() {
            best.tags = vec!["AI Recommended".to_string(), "Best Value".to_string()];
        }

        ranked
    }
}

/// Human-readable justification built from threshold rules.
fn recommendation_reason(layovers: u32, norm_price: f64, norm_duration: f64) -> String {
    let mut reasons = Vec::new();

    if norm_price == 0.0 {
        reasons.push("Lowest Price");
    } else if norm_price <= 0.2 {
        reasons.push("Great Value");
    }

    if norm_duration == 0.0 {
        reasons.push("Fastest Route");
    } else if norm_duration <= 0.2 {
        reasons.push("Quick Flight");
    }

    match layovers {
        0 => reasons.push("Non-stop"),
        1 => reasons.push("1 Short Stop"),
        _ => {}
    }

    if reasons.is_empty() {
        "Balanced Option".to_string()
    } else {
        reasons.join(", ")
    }
}

fn fold_min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

fn fold_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

/// Normalization denominator: 1 when there is no spread, so a flat metric
/// normalizes to 0 for every option instead of dividing by zero.
fn spread_or_one(min: f64, max: f64) -> f64 {
    if max > min {
        max - min
    } else {
        1.0
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
