//! Place discovery tools over the Google Places text-search API.
//!
//! Three thin tools share one search path: attractions, restaurants, and
//! vibe-matched activities. Keeping them separate lets the model request
//! exactly the category it is missing instead of over-fetching.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

const PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

const MAX_PLACES: usize = 10;

async fn text_search(
    http: &reqwest::Client,
    api_key: Option<&str>,
    query: &str,
) -> anyhow::Result<Vec<Value>> {
    let api_key = api_key.ok_or_else(|| anyhow::anyhow!("GPLACES_API_KEY is not configured"))?;

    tracing::info!(query = %query, "place search");

    let response = http
        .get(PLACES_URL)
        .query(&[("query", query), ("key", api_key)])
        .timeout(SEARCH_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("place search backend returned {}", status);
    }

    let data: Value = response.json().await?;
    let backend_status = data["status"].as_str().unwrap_or_default();
    if backend_status != "OK" && backend_status != "ZERO_RESULTS" {
        anyhow::bail!("place search backend status: {}", backend_status);
    }

    let places = data["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .take(MAX_PLACES)
                .map(|place| {
                    json!({
                        "name": place["name"],
                        "address": place["formatted_address"],
                        "rating": place["rating"],
                        "reviews": place["user_ratings_total"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(places)
}

fn render(location: &str, query: &str, places: Vec<Value>) -> String {
    json!({
        "location": location,
        "query": query,
        "count": places.len(),
        "places": places,
    })
    .to_string()
}

fn location_arg(args: &Value) -> anyhow::Result<&str> {
    args["location"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing 'location' argument"))
}

/// Find real tourist attractions in a destination.
pub struct SearchAttractions {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl SearchAttractions {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self { api_key, http }
    }
}

#[async_trait]
impl Tool for SearchAttractions {
    fn name(&self) -> &str {
        "search_attractions"
    }

    fn description(&self) -> &str {
        "Find top tourist attractions and sights in a destination. Returns real \
         place names with addresses and ratings for building an itinerary."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Destination city or area"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let location = location_arg(&args)?;
        let query = format!("top tourist attractions in {}", location);
        let places = text_search(&self.http, self.api_key.as_deref(), &query).await?;
        Ok(render(location, &query, places))
    }
}

/// Find restaurants, optionally filtered by cuisine.
pub struct SearchRestaurants {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl SearchRestaurants {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self { api_key, http }
    }
}

#[async_trait]
impl Tool for SearchRestaurants {
    fn name(&self) -> &str {
        "search_restaurants"
    }

    fn description(&self) -> &str {
        "Find well-reviewed restaurants in a destination, optionally filtered by \
         cuisine or dining style."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Destination city or area"
                },
                "cuisine": {
                    "type": "string",
                    "description": "Cuisine or dining style (e.g. 'seafood', 'street food')"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let location = location_arg(&args)?;
        let query = match args["cuisine"].as_str() {
            Some(cuisine) if !cuisine.is_empty() => {
                format!("best {} restaurants in {}", cuisine, location)
            }
            _ => format!("best restaurants in {}", location),
        };
        let places = text_search(&self.http, self.api_key.as_deref(), &query).await?;
        Ok(render(location, &query, places))
    }
}

/// Find experiences matching the trip vibe (nightlife, trekking, ...).
pub struct SearchActivities {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl SearchActivities {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self { api_key, http }
    }
}

#[async_trait]
impl Tool for SearchActivities {
    fn name(&self) -> &str {
        "search_activities"
    }

    fn description(&self) -> &str {
        "Find bookable activities and experiences matching a trip vibe, such as \
         nightlife, adventure sports, or family outings."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Destination city or area"
                },
                "vibe": {
                    "type": "string",
                    "description": "Activity style (e.g. 'nightlife', 'adventure', 'relaxation')"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let location = location_arg(&args)?;
        let vibe = args["vibe"].as_str().filter(|v| !v.is_empty()).unwrap_or("popular");
        let query = format!("{} activities in {}", vibe, location);
        let places = text_search(&self.http, self.api_key.as_deref(), &query).await?;
        Ok(render(location, &query, places))
    }
}
