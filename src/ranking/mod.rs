//! Scoring engines for search results.
//!
//! Flights are browsed: every option is scored and the full ranked list is
//! returned. Hotels are chosen: a single best option is selected. Both
//! engines are pure and deterministic over their inputs.

mod flights;
mod hotels;

pub use flights::{FlightOption, FlightRanker};
pub use hotels::{HotelOption, HotelPick, HotelRanker, NoHotelsAvailable};
