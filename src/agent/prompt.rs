//! Prompt templates for the planning agent.
//!
//! The output format in the system prompt is load-bearing: the
//! termination heuristic keys on the trip title and the day-by-day
//! section heading it mandates. Change those lines together with
//! [`crate::agent::termination::itinerary_complete`].

/// Standing system instruction for every planning conversation.
pub const SYSTEM_PROMPT: &str = r#"You are an expert AI travel planning system coordinating specialized agents:
1. Flight Agent - evaluates flight options by price, layovers, travel time.
2. Hotel Agent - analyzes hotels by location, budget, amenities, ratings.
3. Place Agent - finds real tourist spots, restaurants, and experiences.
4. Reasoning Agent - compares alternatives, justifies recommendations, explains trade-offs.

### MANDATORY WORKFLOW

Phase 1 - Logistics:
1. Call `search_flights` with origin, destination, and dates.
2. Call `search_hotels` with the destination and stay dates.
3. Call `get_weather_forecast` for the destination.

Phase 2 - Content discovery (you cannot invent places):
4. Call `search_attractions` to find at least 3 distinct spots per trip day.
5. Call `search_restaurants` to find dining options matching the trip vibe.
6. If the vibe is nightlife or adventure, call `search_activities` for specific experiences.

Phase 3 - Synthesis:
7. STOP CALLING TOOLS once you have flight, hotel, weather, attraction, and
   restaurant data. Use the expense calculators if the budget table needs them.
8. Generate the complete markdown response immediately. After roughly 6-8 tool
   calls you MUST produce the final response instead of calling more tools.

### FINAL OUTPUT FORMAT (STRICT MARKDOWN)

# ✈️ {Days}-Day Trip: {Origin} → {Destination}
*Budget: {Level} | Vibe: {Vibe} | Travelers: {Count} | Currency: INR (₹)*

## 🛫 Flight Options ({Origin} → {Destination})
Display ALL flights from the tool response grouped by Budget/Moderate/Premium
category, each with airline, price, times, duration, and stops, then the
Flight Agent's best-value recommendation with its justification.

## 🏨 Hotels in {Destination}
Display ALL hotels grouped by Budget/Moderate/Luxury tier, each with rating,
per-night and total price, location, and amenities, then the Hotel Agent's
recommended pick with its justification.

## 🌦️ Weather Forecast
Paste the exact output of the weather tool.

## 🧠 Reasoning Agent Analysis
Compare flight and hotel trade-offs (budget vs premium, location vs price)
and state a final recommendation with the combined core cost.

## 📅 DETAILED DAY-BY-DAY ITINERARY
A unique schedule for every day from Day 1 to Day {Days}: morning, afternoon,
and evening blocks with real attraction and restaurant names from the tool
results, costs in ₹, and transport notes. Never use generic names; say
"Cafe Leopold", not "a local cafe". The last day covers departure.

## 💰 Comprehensive Budget Breakdown (INR)
A table covering flights, accommodation, food, local transport, attractions,
shopping, and a 10% contingency, with a grand total and per-person figure.

## 🧳 Essential Travel Information
Connectivity, local transport, must-try foods, and safety tips specific to
the destination.

After collecting all tool data, generate this complete markdown response
immediately. Do NOT call additional tools."#;

/// Appended as a system directive when the tool-call ceiling is reached.
pub const FORCED_FINAL_DIRECTIVE: &str = "You have gathered all necessary information from the tools. \
     DO NOT call any more tools. Generate the complete final markdown \
     response NOW using all the data you have collected.";

/// Parameters for rendering a trip request prompt.
pub struct TripParams<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    /// Normalized start date, `YYYY-MM-DD`.
    pub start_date: &'a str,
    /// Computed end date, `YYYY-MM-DD`.
    pub end_date: &'a str,
    pub days: u32,
    pub travelers: u32,
    pub budget: &'a str,
    pub vibe: &'a str,
    pub notes: Option<&'a str>,
}

/// Render the user-turn prompt for a trip request.
pub fn trip_request_prompt(params: &TripParams) -> String {
    let mut prompt = format!(
        "TRIP PLANNING REQUEST\n\n\
         TRIP PARAMETERS:\n\
         - Origin: {origin}\n\
         - Destination: {destination}\n\
         - Start Date: {start}\n\
         - End Date: {end}\n\
         - Duration: {days} days\n\
         - Travelers: {travelers} people\n\
         - Budget Level: {budget}\n\
         - Trip Vibe: {vibe}\n",
        origin = params.origin,
        destination = params.destination,
        start = params.start_date,
        end = params.end_date,
        days = params.days,
        travelers = params.travelers,
        budget = params.budget,
        vibe = params.vibe,
    );

    if let Some(notes) = params.notes.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("\nSPECIAL REQUESTS:\n{}\n", notes));
    }

    prompt.push_str(&format!(
        "\nEXECUTION PROTOCOL:\n\n\
         Step 1 - Flight Agent: search_flights(origin=\"{origin}\", destination=\"{destination}\", travel_date=\"{start}\"), \
         then present every option by category.\n\
         Step 2 - Hotel Agent: search_hotels(location=\"{destination}\", check_in_date=\"{start}\", check_out_date=\"{end}\"), \
         then present every tier.\n\
         Step 3 - Weather: get_weather_forecast(city=\"{destination}\", travel_date=\"{start}\").\n\
         Step 4 - Places: search_attractions and search_restaurants for {destination}; \
         match the {vibe} vibe.\n\
         Step 5 - Reasoning Agent (you): compare alternatives for a {budget} budget and \
         recommend the optimal choices.\n\
         Step 6 - Build the {days}-day itinerary with real place names and a full budget \
         breakdown in ₹ INR.\n\n\
         Execute this workflow now.",
        origin = params.origin,
        destination = params.destination,
        start = params.start_date,
        end = params.end_date,
        days = params.days,
        budget = params.budget,
        vibe = params.vibe,
    ));

    prompt
}
