//! Flight search over SerpAPI's Google Flights engine.
//!
//! The raw response is a deeply nested blob; this tool flattens each
//! option into a single record with the full route path, readable times,
//! and a layover count, then ranks the list and buckets it into
//! Budget/Moderate/Premium price tiers for the model to present.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};

use super::Tool;
use crate::ranking::{FlightOption, FlightRanker};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on unique options returned per search.
const MAX_OPTIONS: usize = 9;

pub struct SearchFlights {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl SearchFlights {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self { api_key, http }
    }

    async fn execute_search(
        &self,
        api_key: &str,
        origin: &str,
        destination: &str,
        date: &str,
        return_date: Option<&str>,
    ) -> anyhow::Result<Value> {
        // SerpAPI type 1 = round trip, 2 = one way.
        let flight_type = if return_date.is_some() { "1" } else { "2" };

        let mut query = vec![
            ("engine", "google_flights"),
            ("departure_id", origin),
            ("arrival_id", destination),
            ("outbound_date", date),
            ("currency", "INR"),
            ("gl", "in"),
            ("hl", "en"),
            ("type", flight_type),
            ("api_key", api_key),
        ];
        if let Some(ret) = return_date {
            query.push(("return_date", ret));
        }

        tracing::info!(origin = %origin, destination = %destination, date = %date, "flight search");

        let response = self
            .http
            .get(SERPAPI_URL)
            .query(&query)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("flight search backend returned {}", status);
        }

        let results: Value = response.json().await?;
        if let Some(error) = results["error"].as_str() {
            anyhow::bail!("flight search backend error: {}", error);
        }

        Ok(results)
    }
}

#[async_trait]
impl Tool for SearchFlights {
    fn name(&self) -> &str {
        "search_flights"
    }

    fn description(&self) -> &str {
        "Search flights between two airports. Pass IATA codes (e.g. 'DEL', 'GOI'); \
         for cities with several airports use the metro code (e.g. 'NYC'). Returns \
         ranked options in INR, bucketed into Budget/Moderate/Premium."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "Origin airport IATA code (e.g. 'DEL', 'BOM')"
                },
                "destination": {
                    "type": "string",
                    "description": "Destination airport IATA code (e.g. 'GOI', 'LHR')"
                },
                "travel_date": {
                    "type": "string",
                    "description": "Departure date YYYY-MM-DD"
                },
                "return_date": {
                    "type": "string",
                    "description": "Return date YYYY-MM-DD for round trips"
                }
            },
            "required": ["origin", "destination", "travel_date"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("SERPAPI_API_KEY is not configured"))?;

        let origin = require_str(&args, "origin")?;
        let destination = require_str(&args, "destination")?;
        let return_date = args["return_date"].as_str();

        let travel_date = clamp_travel_date(args["travel_date"].as_str().unwrap_or_default());

        let results = self
            .execute_search(api_key, origin, destination, &travel_date, return_date)
            .await?;
        let mut flights = reshape_results(&results);

        // Thin routes often have nothing on the requested day; retry one
        // week out before giving up.
        if flights.is_empty() {
            let fallback_date = (Local::now().date_naive() + chrono::Duration::days(7))
                .format("%Y-%m-%d")
                .to_string();
            tracing::info!(date = %fallback_date, "no flights found, trying fallback date");
            let fallback = self
                .execute_search(api_key, origin, destination, &fallback_date, None)
                .await?;
            flights = reshape_results(&fallback);

            if flights.is_empty() {
                return Ok(json!({
                    "error": format!(
                        "No flights available from {} to {} even on fallback dates.",
                        origin, destination
                    )
                })
                .to_string());
            }
        }

        let ranked = categorize(FlightRanker.evaluate(flights));
        let count = ranked.len();

        Ok(json!({
            "route": format!("{} → {}", origin, destination),
            "search_date": travel_date,
            "flights": ranked,
            "count": count,
            "currency": "INR",
            "agent_note": "Flight options evaluated on price, duration, and layovers",
        })
        .to_string())
    }
}

fn require_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args[key]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", key))
}

/// Past or unparsable departure dates become tomorrow.
fn clamp_travel_date(raw: &str) -> String {
    let today = Local::now().date_naive();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if date >= today => raw.to_string(),
        _ => (today + chrono::Duration::days(1)).format("%Y-%m-%d").to_string(),
    }
}

/// Flatten the backend response into [`FlightOption`] records.
///
/// Merges the `best_flights` and `other_flights` lists, deduplicates on
/// airline+price, and walks each option's legs to build the route path:
/// origin, every intermediate arrival, final destination.
fn reshape_results(results: &Value) -> Vec<FlightOption> {
    let raw: Vec<&Value> = ["best_flights", "other_flights"]
        .iter()
        .filter_map(|key| results[*key].as_array())
        .flatten()
        .collect();

    let mut options = Vec::new();
    let mut seen = HashSet::new();

    for flight in raw {
        if options.len() >= MAX_OPTIONS {
            break;
        }

        let Some(legs) = flight["flights"].as_array().filter(|legs| !legs.is_empty()) else {
            continue;
        };
        let first_leg = &legs[0];
        let last_leg = &legs[legs.len() - 1];

        let airline = first_leg["airline"].as_str().unwrap_or("Unknown").to_string();
        let flight_number = first_leg["flight_number"].as_str().unwrap_or("N/A").to_string();
        let price = flight["price"].as_f64().unwrap_or(0.0);

        if !seen.insert(format!("{}_{}", airline, price)) {
            continue;
        }

        let origin = airport_id(first_leg, "departure_airport", "Origin");
        let destination = airport_id(last_leg, "arrival_airport", "Dest");

        // A stop is the arrival airport of every leg before the last.
        let stops: Vec<String> = legs[..legs.len() - 1]
            .iter()
            .map(|leg| airport_id(leg, "arrival_airport", "Stop"))
            .collect();

        let mut route_cities = vec![origin.clone()];
        route_cities.extend(stops.iter().cloned());
        route_cities.push(destination.clone());

        let total_minutes = flight["total_duration"].as_i64().unwrap_or(0);

        options.push(FlightOption {
            airline,
            flight_number,
            price,
            duration_minutes: total_minutes,
            layovers: (legs.len() - 1) as u32,
            departure_time: format_time(first_leg["departure_airport"]["time"].as_str()),
            departure_airport: origin,
            arrival_time: format_time(last_leg["arrival_airport"]["time"].as_str()),
            arrival_airport: destination,
            duration: format!("{}h {}m", total_minutes / 60, total_minutes % 60),
            stops: if stops.is_empty() {
                "Non-stop".to_string()
            } else {
                stops.join(", ")
            },
            route: route_cities.join(" → "),
            carbon_emissions: flight["carbon_emissions"]["this_flight"].as_f64(),
            score: None,
            recommendation_reason: None,
            tags: Vec::new(),
            category: None,
            recommendation: None,
        });
    }

    options
}

fn airport_id(leg: &Value, field: &str, fallback: &str) -> String {
    leg[field]["id"].as_str().unwrap_or(fallback).to_string()
}

/// Convert the backend's time strings to 12-hour format. Unparsable
/// values pass through unchanged.
fn format_time(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return datetime.format("%I:%M %p").to_string();
    }
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return time.format("%I:%M %p").to_string();
    }
    raw.to_string()
}

/// Assign Budget/Moderate/Premium labels by price terciles.
///
/// The ranked order (by score) is kept for presentation; the tier of each
/// option comes from its position in a price-first ordering, so the
/// cheapest third is always the Budget tier regardless of score.
fn categorize(ranked: Vec<FlightOption>) -> Vec<FlightOption> {
    let total = ranked.len();

    let mut by_price: Vec<(usize, &FlightOption)> = ranked.iter().enumerate().collect();
    by_price.sort_by(|(_, a), (_, b)| {
        a.price
            .total_cmp(&b.price)
            .then(a.duration_minutes.cmp(&b.duration_minutes))
            .then(a.layovers.cmp(&b.layovers))
    });

    let mut tiers: HashMap<usize, (&'static str, &'static str)> = HashMap::new();
    for (position, (index, _)) in by_price.into_iter().enumerate() {
        let tier = if position < total / 3 {
            ("Budget", "Most economical option")
        } else if position < 2 * total / 3 {
            ("Moderate", "Good balance of price and convenience")
        } else {
            ("Premium", "Best service and timing")
        };
        tiers.insert(index, tier);
    }

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, mut flight)| {
            if let Some((category, recommendation)) = tiers.get(&index) {
                flight.category = Some((*category).to_string());
                flight.recommendation = Some((*recommendation).to_string());
            }
            flight
        })
        .collect()
}
