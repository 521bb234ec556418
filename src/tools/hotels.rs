//! Hotel search over SerpAPI's Google Hotels engine.
//!
//! Filters to well-rated properties, reshapes the noisy backend payload
//! into compact records, buckets them into Budget/Moderate/Luxury price
//! tiers, and attaches a single recommended pick.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use super::Tool;
use crate::ranking::{HotelOption, HotelRanker};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum user rating; anything below is dropped.
const MIN_RATING: f64 = 4.0;

/// Per-tier cap, to keep the payload inside the model's context.
const MAX_PER_TIER: usize = 10;

/// Tier boundaries in INR per night.
const MODERATE_FLOOR: f64 = 5_000.0;
const LUXURY_FLOOR: f64 = 15_000.0;

pub struct SearchHotels {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl SearchHotels {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self { api_key, http }
    }
}

#[async_trait]
impl Tool for SearchHotels {
    fn name(&self) -> &str {
        "search_hotels"
    }

    fn description(&self) -> &str {
        "Search hotels in a city and return 4.0+ rated options in INR, \
         bucketed into Budget/Moderate/Luxury tiers with a recommended pick."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or area name (e.g. 'Goa', 'South Delhi')"
                },
                "check_in_date": {
                    "type": "string",
                    "description": "Check-in date YYYY-MM-DD"
                },
                "check_out_date": {
                    "type": "string",
                    "description": "Check-out date YYYY-MM-DD"
                }
            },
            "required": ["location", "check_in_date", "check_out_date"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("SERPAPI_API_KEY is not configured"))?;

        let location = args["location"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'location' argument"))?;

        let (check_in, check_out, nights) = clamp_stay(
            args["check_in_date"].as_str().unwrap_or_default(),
            args["check_out_date"].as_str().unwrap_or_default(),
        );

        tracing::info!(location = %location, nights, "hotel search");

        let query = format!("hotels in {}", location);
        let response = self
            .http
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google_hotels"),
                ("q", query.as_str()),
                ("check_in_date", check_in.as_str()),
                ("check_out_date", check_out.as_str()),
                ("adults", "2"),
                ("currency", "INR"),
                ("gl", "in"),
                ("hl", "en"),
                // Sorting by lowest price yields more volume to filter.
                ("sort_by", "8"),
                ("api_key", api_key),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("hotel search backend returned {}", status);
        }

        let results: Value = response.json().await?;
        if let Some(error) = results["error"].as_str() {
            anyhow::bail!("hotel search backend error: {}", error);
        }

        let Some(properties) = results["properties"].as_array().filter(|p| !p.is_empty()) else {
            return Ok(json!({ "error": format!("No hotels found in {}", location) }).to_string());
        };

        let processed = reshape_properties(properties, location, nights);
        if processed.is_empty() {
            return Ok(
                json!({ "error": format!("No 4-star+ hotels found in {}", location) }).to_string(),
            );
        }

        let recommended = HotelRanker.recommend(&processed).ok();
        let (budget, moderate, luxury) = bucket_by_price(processed);

        let stats = json!({
            "budget": budget.len(),
            "moderate": moderate.len(),
            "luxury": luxury.len(),
        });
        let hotels: Vec<HotelOption> = budget.into_iter().chain(moderate).chain(luxury).collect();

        Ok(json!({
            "loc": location,
            "nights": nights,
            "hotels": hotels,
            "stats": stats,
            "cur": "INR",
            "recommended": recommended,
        })
        .to_string())
    }
}

/// Normalize the stay window: past or unparsable check-in moves to
/// tomorrow, and the stay is always at least one night.
fn clamp_stay(check_in_raw: &str, check_out_raw: &str) -> (String, String, i64) {
    let today = Local::now().date_naive();

    let check_in = match NaiveDate::parse_from_str(check_in_raw, "%Y-%m-%d") {
        Ok(date) if date >= today => date,
        _ => today + chrono::Duration::days(1),
    };

    let check_out = NaiveDate::parse_from_str(check_out_raw, "%Y-%m-%d")
        .ok()
        .filter(|date| *date > check_in)
        .unwrap_or(check_in + chrono::Duration::days(1));

    let nights = (check_out - check_in).num_days().max(1);

    (
        check_in.format("%Y-%m-%d").to_string(),
        check_out.format("%Y-%m-%d").to_string(),
        nights,
    )
}

/// Filter and flatten raw properties into [`HotelOption`] records.
///
/// Drops anything under [`MIN_RATING`] or without a parsable price,
/// deduplicates on name, truncates addresses, and keeps the top three
/// amenities.
fn reshape_properties(properties: &[Value], location: &str, nights: i64) -> Vec<HotelOption> {
    let mut processed = Vec::new();
    let mut seen = HashSet::new();

    for hotel in properties.iter().take(50) {
        let name = hotel["name"].as_str().unwrap_or("Unknown").to_string();
        if seen.contains(&name) {
            continue;
        }

        let rating = hotel["overall_rating"].as_f64().unwrap_or(0.0);
        if rating < MIN_RATING {
            continue;
        }

        let Some(price) = parse_price(&hotel["rate_per_night"]["lowest"]) else {
            continue;
        };

        seen.insert(name.clone());

        let address = hotel["gps_coordinates"]["address"]
            .as_str()
            .or_else(|| hotel["vicinity"].as_str())
            .or_else(|| hotel["location"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Near {}", location));

        let amenities = hotel["amenities"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .take(3)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|joined| !joined.is_empty())
            .unwrap_or_else(|| "Standard".to_string());

        processed.push(HotelOption {
            name,
            rating: Some(rating),
            price_per_night: price,
            total: price * nights as f64,
            location: truncate(&address, 75),
            amenities,
            category: None,
        });
    }

    processed
}

/// Price strings arrive as `₹4,500` or `$55`; strip currency markers and
/// separators before parsing.
fn parse_price(raw: &Value) -> Option<f64> {
    let text = match raw {
        Value::Number(n) => return n.as_f64().filter(|p| *p > 0.0),
        Value::String(s) => s,
        _ => return None,
    };

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok().filter(|price| *price > 0.0)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars).collect();
        format!("{}...", kept)
    }
}

/// Split into Budget/Moderate/Luxury price tiers, each sorted by price
/// and capped at [`MAX_PER_TIER`].
fn bucket_by_price(
    hotels: Vec<HotelOption>,
) -> (Vec<HotelOption>, Vec<HotelOption>, Vec<HotelOption>) {
    let mut budget = Vec::new();
    let mut moderate = Vec::new();
    let mut luxury = Vec::new();

    for hotel in hotels {
        if hotel.price_per_night < MODERATE_FLOOR {
            budget.push(hotel);
        } else if hotel.price_per_night < LUXURY_FLOOR {
            moderate.push(hotel);
        } else {
            luxury.push(hotel);
        }
    }

    for (tier, label) in [
        (&mut budget, "Budget"),
        (&mut moderate, "Moderate"),
        (&mut luxury, "Luxury"),
    ] {
        tier.sort_by(|a, b| a.price_per_night.total_cmp(&b.price_per_night));
        tier.truncate(MAX_PER_TIER);
        for hotel in tier.iter_mut() {
            hotel.category = Some(label.to_string());
        }
    }

    (budget, moderate, luxury)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &str, rating: f64, price: &str) -> Value {
        json!({
            "name": name,
            "overall_rating": rating,
            "rate_per_night": { "lowest": price },
            "gps_coordinates": { "address": "Calangute Beach Road, Goa" },
            "amenities": ["Pool", "Spa", "Free Wi-Fi", "Gym", "Bar"],
        })
    }

    #[test]
    fn low_rated_and_unpriced_hotels_are_dropped() {
        let properties = vec![
            property("Decent Stay", 4.2, "₹3,200"),
            property("Shabby Inn", 3.1, "₹900"),
            property("Mystery Lodge", 4.6, ""),
        ];

        let processed = reshape_properties(&properties, "Goa", 2);
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].name, "Decent Stay");
        assert_eq!(processed[0].price_per_night, 3200.0);
        assert_eq!(processed[0].total, 6400.0);
        assert_eq!(processed[0].amenities, "Pool, Spa, Free Wi-Fi");
    }

    #[test]
    fn duplicate_names_are_kept_once() {
        let properties = vec![
            property("Taj Resort", 4.8, "₹18,000"),
            property("Taj Resort", 4.8, "₹18,500"),
        ];
        assert_eq!(reshape_properties(&properties, "Goa", 1).len(), 1);
    }

    #[test]
    fn price_parsing_strips_currency_markers() {
        assert_eq!(parse_price(&json!("₹4,500")), Some(4500.0));
        assert_eq!(parse_price(&json!("$55")), Some(55.0));
        assert_eq!(parse_price(&json!(2750)), Some(2750.0));
        assert_eq!(parse_price(&json!("free")), None);
        assert_eq!(parse_price(&json!("0")), None);
    }

    #[test]
    fn buckets_follow_tier_boundaries() {
        let hotel = |name: &str, price: f64| HotelOption {
            name: name.to_string(),
            rating: Some(4.3),
            price_per_night: price,
            total: price,
            location: "Goa".to_string(),
            amenities: "Standard".to_string(),
            category: None,
        };

        let (budget, moderate, luxury) = bucket_by_price(vec![
            hotel("cheap", 2_000.0),
            hotel("mid", 8_000.0),
            hotel("grand", 22_000.0),
            hotel("edge", 5_000.0),
        ]);

        assert_eq!(budget.len(), 1);
        assert_eq!(moderate.len(), 2);
        assert_eq!(luxury.len(), 1);
        assert_eq!(moderate[0].name, "edge");
        assert_eq!(moderate[0].category.as_deref(), Some("Moderate"));
    }

    #[test]
    fn stay_window_is_normalized() {
        let (_, _, nights) = clamp_stay("2001-01-01", "2001-01-05");
        assert_eq!(nights, 1);

        let start = Local::now().date_naive() + chrono::Duration::days(10);
        let end = start + chrono::Duration::days(3);
        let (check_in, check_out, nights) = clamp_stay(
            &start.format("%Y-%m-%d").to_string(),
            &end.format("%Y-%m-%d").to_string(),
        );
        assert_eq!(check_in, start.format("%Y-%m-%d").to_string());
        assert_eq!(check_out, end.format("%Y-%m-%d").to_string());
        assert_eq!(nights, 3);
    }
}
