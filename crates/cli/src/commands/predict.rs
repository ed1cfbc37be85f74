//! `parley predict`: Football predictions without going through chat.

use parley_predict::catalog::{self, DEFAULT_LEAGUE};
use parley_predict::{PredictionEngine, format};

pub struct PredictOptions {
    pub seed: Option<u64>,
    pub matchup: Option<(String, String)>,
    pub league: Option<String>,
    pub standings: bool,
    pub upcoming: bool,
    pub json: bool,
}

pub fn run(options: PredictOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = match options.seed {
        Some(seed) => PredictionEngine::with_seed(seed),
        None => PredictionEngine::new(),
    };
    println!("{}", render(&mut engine, &options)?);
    Ok(())
}

fn render(
    engine: &mut PredictionEngine,
    options: &PredictOptions,
) -> Result<String, serde_json::Error> {
    if let Some((home, away)) = &options.matchup {
        let league = options
            .league
            .clone()
            .or_else(|| catalog::league_of(home).map(String::from))
            .unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
        let prediction = engine.predict_match(home, away, &league);
        return if options.json {
            serde_json::to_string_pretty(&prediction)
        } else {
            Ok(format::matchup(&prediction))
        };
    }

    if options.standings {
        let requested = options.league.as_deref().unwrap_or(DEFAULT_LEAGUE);
        let shown = if catalog::has_roster(requested) {
            requested
        } else {
            DEFAULT_LEAGUE
        };
        let rows = engine.league_standings(shown);
        return if options.json {
            serde_json::to_string_pretty(&rows)
        } else {
            Ok(format::standings_or_fallback(requested, shown, &rows))
        };
    }

    if options.upcoming {
        let fixtures = engine.upcoming_fixtures(chrono::Local::now().date_naive());
        return if options.json {
            serde_json::to_string_pretty(&fixtures)
        } else {
            Ok(format::upcoming(&fixtures))
        };
    }

    let predictions = engine.todays_predictions();
    if options.json {
        serde_json::to_string_pretty(&predictions)
    } else {
        Ok(format::todays_predictions(&predictions))
    }
}
