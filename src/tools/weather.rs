//! Weather forecasts from the OpenWeatherMap 5-day/3-hour endpoint.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use super::Tool;

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

const FORECAST_TIMEOUT: Duration = Duration::from_secs(10);

const FORECAST_DAYS: usize = 5;

pub struct WeatherForecast {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl WeatherForecast {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self { api_key, http }
    }
}

#[async_trait]
impl Tool for WeatherForecast {
    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Fetch the real 5-day weather forecast for a city, aligned with the \
         travel date when it falls inside the forecast window."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name (e.g. 'London', 'Tokyo')"
                },
                "travel_date": {
                    "type": "string",
                    "description": "Trip start date YYYY-MM-DD"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("OPENWEATHERMAP_API_KEY is not configured"))?;

        let city = args["city"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'city' argument"))?;
        let travel_date = args["travel_date"].as_str();

        tracing::info!(city = %city, travel_date = ?travel_date, "weather lookup");

        let response = self
            .http
            .get(FORECAST_URL)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .timeout(FORECAST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let data: Value = response.json().await?;

        if !status.is_success() {
            let message = data["message"].as_str().unwrap_or("Unknown error");
            anyhow::bail!("weather lookup for {} failed: {}", city, message);
        }

        let Some(entries) = data["list"].as_array().filter(|list| !list.is_empty()) else {
            anyhow::bail!("no weather data available for {}", city);
        };

        Ok(render_forecast(city, travel_date, entries))
    }
}

/// Group 3-hourly entries by date and render a daily digest of highs,
/// lows, and the dominant condition.
fn render_forecast(city: &str, travel_date: Option<&str>, entries: &[Value]) -> String {
    // temps and conditions per date; BTreeMap keeps the dates ordered.
    let mut daily: BTreeMap<String, (Vec<f64>, Vec<String>)> = BTreeMap::new();

    for entry in entries {
        let Some(date) = entry["dt_txt"].as_str().and_then(|t| t.split(' ').next()) else {
            continue;
        };
        let Some(temp) = entry["main"]["temp"].as_f64() else {
            continue;
        };
        let condition = entry["weather"][0]["description"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let slot = daily.entry(date.to_string()).or_default();
        slot.0.push(temp);
        slot.1.push(condition);
    }

    let dates: Vec<&String> = daily.keys().collect();

    // Start at the travel date when the forecast window covers it;
    // otherwise start from the first available day and say so.
    let mut start_index = 0;
    let mut note = String::new();
    if let Some(requested) = travel_date {
        match dates.iter().position(|d| d.as_str() == requested) {
            Some(index) => start_index = index,
            None => {
                note = format!(
                    "\n(Note: real forecasts only cover the next {} days. Showing the \
                     available forecast starting {} for reference.)",
                    FORECAST_DAYS,
                    dates.first().map(|d| d.as_str()).unwrap_or("today"),
                );
            }
        }
    }

    let mut out = format!("5-Day Weather Forecast for {}{}:\n\n", city, note);

    for date in dates.iter().skip(start_index).take(FORECAST_DAYS) {
        let (temps, conditions) = &daily[date.as_str()];
        if temps.is_empty() {
            continue;
        }

        let high = temps.iter().fold(f64::NEG_INFINITY, |a, b| a.max(*b));
        let low = temps.iter().fold(f64::INFINITY, |a, b| a.min(*b));
        let dominant = dominant_condition(conditions);

        let readable = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.format("%a, %d %b").to_string())
            .unwrap_or_else(|_| (*date).clone());

        out.push_str(&format!(
            "{}: High {:.1}°C / Low {:.1}°C, {}\n",
            readable, high, low, dominant
        ));
    }

    out
}

/// The most frequent condition of the day, title-cased.
fn dominant_condition(conditions: &[String]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for condition in conditions {
        *counts.entry(condition.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(condition, _)| title_case(condition))
        .unwrap_or_default()
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
