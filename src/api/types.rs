//! API request and response types.

use serde::{Deserialize, Serialize};

/// Request to plan a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    /// Origin city
    pub from_city: String,

    /// Destination city
    pub destination: String,

    /// Trip start date, `YYYY-MM-DD`. Past or unparsable dates are
    /// normalized forward before planning.
    pub start_date: String,

    /// Trip length in days
    pub days: u32,

    /// Number of travelers
    pub travelers: u32,

    /// Budget tier label (e.g. "Budget", "Moderate", "Luxury")
    pub budget: String,

    /// Trip vibe label (e.g. "Relaxation", "Adventure", "Nightlife")
    pub vibe: String,

    /// Optional free-text special requests
    pub query: Option<String>,
}

/// Successful planning response.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    /// Final itinerary markdown
    pub result: String,
}

/// Error payload with a diagnostic string.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Direct flight search (bypasses the planning loop).
#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    pub travel_date: String,
    pub return_date: Option<String>,
}

/// Direct hotel search (bypasses the planning loop).
#[derive(Debug, Clone, Deserialize)]
pub struct HotelSearchRequest {
    pub location: String,
    pub check_in_date: String,
    pub check_out_date: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,

    /// Service version
    pub version: &'static str,
}
