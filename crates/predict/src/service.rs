//! The prediction engine behind the orchestrator's `Predictor` seam.

use parley_core::Predictor;
use rand::rngs::StdRng;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::catalog::{self, DEFAULT_LEAGUE};
use crate::engine::PredictionEngine;
use crate::format;
use crate::intent::{self, PredictionIntent};

pub struct PredictionService {
    engine: Mutex<PredictionEngine<StdRng>>,
}

impl PredictionService {
    pub fn new() -> Self {
        Self::from_engine(PredictionEngine::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_engine(PredictionEngine::with_seed(seed))
    }

    fn from_engine(engine: PredictionEngine<StdRng>) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    fn engine(&self) -> MutexGuard<'_, PredictionEngine<StdRng>> {
        // The engine holds no invariants a panic could break.
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for PredictionService {
    fn name(&self) -> &str {
        "football"
    }

    fn matches(&self, input: &str) -> bool {
        intent::is_prediction_request(input)
    }

    fn respond(&self, input: &str) -> String {
        let intent = intent::detect_intent(input);
        info!(?intent, "Answering football request");

        let mut engine = self.engine();
        match intent {
            PredictionIntent::Matchup { home, away, league } => {
                format::matchup(&engine.predict_match(home, away, league))
            }
            PredictionIntent::Today => format::todays_predictions(&engine.todays_predictions()),
            PredictionIntent::Standings { league } => {
                let shown = if catalog::has_roster(league) {
                    league
                } else {
                    DEFAULT_LEAGUE
                };
                format::standings_or_fallback(league, shown, &engine.league_standings(shown))
            }
            PredictionIntent::Upcoming => {
                let today = chrono::Local::now().date_naive();
                format::upcoming(&engine.upcoming_fixtures(today))
            }
            PredictionIntent::Overview => format::overview(),
        }
    }
}
