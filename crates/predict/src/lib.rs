//! Football predictions for Parley.
//!
//! A closed catalog of leagues and clubs, a seedable simulation that turns
//! synthesized team statistics into match predictions, and the text layer
//! that answers chat requests with them. No real sports data is involved.

pub mod catalog;
pub mod engine;
pub mod format;
pub mod intent;
pub mod service;

pub use engine::{
    decide, derive_odds, key_factors, synthesize_stats, team_strength, Fixture, FormResult, Odds,
    Outcome, Prediction, PredictionEngine, StandingRow, TeamStats,
};
pub use intent::PredictionIntent;
pub use service::PredictionService;
