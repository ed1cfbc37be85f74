//! Closed-world match simulation.
//!
//! Every number is drawn from the engine's own random source, so an engine
//! built with [`PredictionEngine::with_seed`] replays the same predictions
//! for the same sequence of calls. The scoring steps are free functions of
//! their inputs and can be exercised without any randomness at all.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::catalog::{self, LEAGUES};

/// Lowest odds ever quoted. A price at or below 1.0 would pay nothing back.
pub const MIN_ODDS: f64 = 1.01;

const BASE_ODDS: Odds = Odds {
    a: 2.5,
    draw: 3.2,
    b: 2.8,
};

/// Strength gap needed before one side is favoured over a draw.
const DECISIVE_GAP: f64 = 0.3;

const FORM_PATTERN: [FormResult; 10] = [
    FormResult::Win,
    FormResult::Draw,
    FormResult::Loss,
    FormResult::Win,
    FormResult::Win,
    FormResult::Draw,
    FormResult::Loss,
    FormResult::Win,
    FormResult::Draw,
    FormResult::Win,
];

const PERFORMANCES: &[&str] = &[
    "Excellent attacking form",
    "Solid defensive record",
    "Inconsistent but dangerous",
    "Strong home/away record",
    "Struggling with injuries",
    "Peaking at the right time",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    fn score(self) -> f64 {
        match self {
            Self::Win => 0.1,
            Self::Draw => 0.05,
            Self::Loss => -0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    pub team: String,
    pub form: Vec<FormResult>,
    pub goals_for: u32,
    pub goals_against: u32,
    /// In `[0.1, 0.4)` for the home side, zero for the visitors.
    pub home_bonus: f64,
    pub recent_performance: String,
}

impl TeamStats {
    fn count(&self, result: FormResult) -> usize {
        self.form.iter().filter(|r| **r == result).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    FirstWins,
    Draw,
    SecondWins,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstWins => "Home Win",
            Self::Draw => "Draw",
            Self::SecondWins => "Away Win",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decimal odds for the first side, a draw and the second side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Odds {
    pub a: f64,
    pub draw: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub subject_a: String,
    pub subject_b: String,
    pub category: String,
    pub outcome: Outcome,
    pub confidence: u8,
    pub rationale: String,
    pub odds: Option<Odds>,
    pub key_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub position: usize,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
    pub league: String,
}

// ── Scoring ──────────────────────────────────────────────────────────────

pub fn synthesize_stats<R: Rng + ?Sized>(rng: &mut R, team: &str, is_home: bool) -> TeamStats {
    let form_len = rng.random_range(5..=9);
    let goals_for = rng.random_range(20..50);
    let goals_against = rng.random_range(15..40);
    let home_bonus = if is_home {
        rng.random_range(0.1..0.4)
    } else {
        0.0
    };
    let performance = PERFORMANCES[rng.random_range(0..PERFORMANCES.len())];

    TeamStats {
        team: team.to_string(),
        form: FORM_PATTERN[..form_len].to_vec(),
        goals_for,
        goals_against,
        home_bonus,
        recent_performance: performance.to_string(),
    }
}

/// Scalar strength in `[0.1, 1.0]`.
pub fn team_strength(stats: &TeamStats) -> f64 {
    let form_score: f64 = stats.form.iter().map(|r| r.score()).sum();
    let goal_difference =
        (f64::from(stats.goals_for) - f64::from(stats.goals_against)) / 20.0;

    let strength = 0.5 + stats.home_bonus + form_score * 0.2 + goal_difference * 0.1;
    strength.clamp(0.1, 1.0)
}

/// Pick the outcome and a confidence percentage from the two strengths.
pub fn decide(home_strength: f64, away_strength: f64) -> (Outcome, u8) {
    let gap = home_strength - away_strength;
    let (outcome, confidence) = if home_strength > away_strength + DECISIVE_GAP {
        (Outcome::FirstWins, (70.0 + gap * 50.0).min(85.0))
    } else if away_strength > home_strength + DECISIVE_GAP {
        (Outcome::SecondWins, (65.0 - gap * 50.0).min(80.0))
    } else {
        (Outcome::Draw, (60.0 + gap.abs() * 30.0).min(75.0))
    };
    (outcome, confidence.round().clamp(0.0, 100.0) as u8)
}

/// Shorten the price of the predicted outcome and lengthen the others.
pub fn derive_odds(outcome: Outcome, confidence: u8) -> Odds {
    let c = f64::from(confidence) / 100.0;
    let shorter = 1.0 - c;
    let longer = 1.0 + c;
    let (a, draw, b) = match outcome {
        Outcome::FirstWins => (shorter, longer, longer),
        Outcome::Draw => (longer, shorter, longer),
        Outcome::SecondWins => (longer, longer, shorter),
    };
    Odds {
        a: (BASE_ODDS.a * a).max(MIN_ODDS),
        draw: (BASE_ODDS.draw * draw).max(MIN_ODDS),
        b: (BASE_ODDS.b * b).max(MIN_ODDS),
    }
}

/// Up to three notable facts, checked in a fixed order.
pub fn key_factors(home: &TeamStats, away: &TeamStats) -> Vec<String> {
    let mut factors = Vec::new();
    if home.count(FormResult::Win) >= 3 {
        factors.push(format!("{} in excellent form", home.team));
    }
    if away.count(FormResult::Loss) >= 2 {
        factors.push(format!("{} struggling away from home", away.team));
    }
    if home.goals_for > 25 {
        factors.push(format!("{} scoring freely", home.team));
    }
    if away.goals_against > 20 {
        factors.push(format!("{} defensive vulnerabilities", away.team));
    }
    if home.home_bonus > 0.2 {
        factors.push("Strong home advantage".to_string());
    }
    factors.truncate(3);
    factors
}

pub fn rationale(outcome: Outcome, home: &str, away: &str) -> String {
    match outcome {
        Outcome::FirstWins => {
            format!("{home} has strong home form and superior recent performance")
        }
        Outcome::SecondWins => format!(
            "{away} is in excellent form and has been performing well away from home"
        ),
        Outcome::Draw => {
            "Both teams are evenly matched with similar form and performance levels".to_string()
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────

pub struct PredictionEngine<R = StdRng> {
    rng: R,
}

impl PredictionEngine<StdRng> {
    /// An engine seeded from the operating system.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for PredictionEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PredictionEngine<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn predict_match(&mut self, home: &str, away: &str, league: &str) -> Prediction {
        let home_stats = synthesize_stats(&mut self.rng, home, true);
        let away_stats = synthesize_stats(&mut self.rng, away, false);
        let home_strength = team_strength(&home_stats);
        let away_strength = team_strength(&away_stats);
        let (outcome, confidence) = decide(home_strength, away_strength);

        debug!(
            home,
            away,
            home_strength,
            away_strength,
            outcome = outcome.label(),
            "Match predicted"
        );

        Prediction {
            subject_a: home.to_string(),
            subject_b: away.to_string(),
            category: league.to_string(),
            outcome,
            confidence,
            rationale: rationale(outcome, home, away),
            odds: Some(derive_odds(outcome, confidence)),
            key_factors: key_factors(&home_stats, &away_stats),
        }
    }

    /// Today's slate: three to five fixtures across random competitions.
    pub fn todays_predictions(&mut self) -> Vec<Prediction> {
        let count = self.rng.random_range(3..=5);
        (0..count)
            .map(|_| {
                let (league, home, away) = self.random_fixture();
                self.predict_match(home, away, league)
            })
            .collect()
    }

    /// A simulated table, best first. Points are three per win plus draws.
    pub fn league_standings(&mut self, league: &str) -> Vec<StandingRow> {
        let mut rows: Vec<StandingRow> = catalog::teams_for(league)
            .iter()
            .map(|team| {
                let won = self.rng.random_range(5..20);
                let drawn = self.rng.random_range(2..10);
                let lost = self.rng.random_range(1..11);
                StandingRow {
                    position: 0,
                    team: (*team).to_string(),
                    played: won + drawn + lost,
                    won,
                    drawn,
                    lost,
                    goals_for: self.rng.random_range(20..50),
                    goals_against: self.rng.random_range(15..40),
                    points: won * 3 + drawn,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.points.cmp(&a.points));
        for (i, row) in rows.iter_mut().enumerate() {
            row.position = i + 1;
        }
        rows
    }

    /// One fixture for each of the seven days after `from`.
    pub fn upcoming_fixtures(&mut self, from: NaiveDate) -> Vec<Fixture> {
        (1..=7)
            .map(|day| {
                let (league, home, away) = self.random_fixture();
                Fixture {
                    date: from + Duration::days(day),
                    home: home.to_string(),
                    away: away.to_string(),
                    league: league.to_string(),
                }
            })
            .collect()
    }

    fn random_fixture(&mut self) -> (&'static str, &'static str, &'static str) {
        let league = LEAGUES[self.rng.random_range(0..LEAGUES.len())];
        let teams = catalog::teams_for(league);
        let home = self.rng.random_range(0..teams.len());
        let mut away = self.rng.random_range(0..teams.len() - 1);
        if away >= home {
            away += 1;
        }
        (league, teams[home], teams[away])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(team: &str, form: &str, goals_for: u32, goals_against: u32, bonus: f64) -> TeamStats {
        TeamStats {
            team: team.into(),
            form: form
                .chars()
                .map(|c| match c {
                    'W' => FormResult::Win,
                    'D' => FormResult::Draw,
                    _ => FormResult::Loss,
                })
                .collect(),
            goals_for,
            goals_against,
            home_bonus: bonus,
            recent_performance: "Solid defensive record".into(),
        }
    }

    #[test]
    fn same_seed_same_prediction() {
        let a = PredictionEngine::with_seed(7).predict_match("Arsenal", "Chelsea", "Premier League");
        let b = PredictionEngine::with_seed(7).predict_match("Arsenal", "Chelsea", "Premier League");
        assert_eq!(a, b);

        let slate_a = PredictionEngine::with_seed(99).todays_predictions();
        let slate_b = PredictionEngine::with_seed(99).todays_predictions();
        assert_eq!(slate_a, slate_b);
    }

    #[test]
    fn strength_formula() {
        let s = stats("A", "WWWWW", 40, 20, 0.2);
        assert!((team_strength(&s) - 0.9).abs() < 1e-9);

        let weak = stats("B", "LLLLLLLLL", 20, 39, 0.0);
        let expected = 0.5 + (-0.45 * 0.2) + (-19.0 / 20.0) * 0.1;
        assert!((team_strength(&weak) - expected).abs() < 1e-9);

        let capped = stats("C", "WWWWWWWWW", 49, 15, 0.39);
        assert_eq!(team_strength(&capped), 1.0);
    }

    #[test]
    fn decision_branches() {
        assert_eq!(decide(0.9, 0.5), (Outcome::FirstWins, 85));
        assert_eq!(decide(0.5, 0.9), (Outcome::SecondWins, 80));
        assert_eq!(decide(0.6, 0.5), (Outcome::Draw, 63));
        assert_eq!(decide(0.5, 0.7), (Outcome::Draw, 66));
    }

    #[test]
    fn odds_never_pay_less_than_the_stake() {
        let odds = derive_odds(Outcome::FirstWins, 85);
        assert_eq!(odds.a, MIN_ODDS);
        assert!((odds.draw - 3.2 * 1.85).abs() < 1e-9);
        assert!((odds.b - 2.8 * 1.85).abs() < 1e-9);

        for outcome in [Outcome::FirstWins, Outcome::Draw, Outcome::SecondWins] {
            for confidence in 0..=100 {
                let o = derive_odds(outcome, confidence);
                assert!(o.a > 1.0 && o.draw > 1.0 && o.b > 1.0);
            }
        }
    }

    #[test]
    fn key_factors_follow_fixed_order_and_cap() {
        let home = stats("Home", "WWWDL", 30, 18, 0.3);
        let away = stats("Away", "LLDWL", 22, 25, 0.0);
        assert_eq!(
            key_factors(&home, &away),
            vec![
                "Home in excellent form".to_string(),
                "Away struggling away from home".to_string(),
                "Home scoring freely".to_string(),
            ]
        );

        let quiet_home = stats("Home", "DDLLD", 21, 18, 0.1);
        let quiet_away = stats("Away", "WWDWW", 30, 16, 0.0);
        assert!(key_factors(&quiet_home, &quiet_away).is_empty());
    }

    #[test]
    fn synthesized_stats_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let home = synthesize_stats(&mut rng, "H", true);
            let away = synthesize_stats(&mut rng, "A", false);
            assert!((5..=9).contains(&home.form.len()));
            assert!((20..50).contains(&home.goals_for));
            assert!((15..40).contains(&home.goals_against));
            assert!(home.home_bonus >= 0.1 && home.home_bonus < 0.4);
            assert_eq!(away.home_bonus, 0.0);
            assert_eq!(home.form[..5], FORM_PATTERN[..5]);
        }
    }

    #[test]
    fn generated_predictions_are_valid() {
        for seed in 0..300 {
            let mut engine = PredictionEngine::with_seed(seed);
            for p in engine.todays_predictions() {
                assert!(p.confidence <= 100);
                assert!(p.key_factors.len() <= 3);
                assert_ne!(p.subject_a, p.subject_b);
                let odds = p.odds.unwrap();
                assert!(odds.a > 1.0 && odds.draw > 1.0 && odds.b > 1.0);
                match p.outcome {
                    Outcome::FirstWins => assert_eq!(p.confidence, 85),
                    Outcome::SecondWins => assert_eq!(p.confidence, 80),
                    Outcome::Draw => assert!((60..=75).contains(&p.confidence)),
                }
            }
        }
    }

    #[test]
    fn todays_slate_has_three_to_five_matches() {
        for seed in 0..50 {
            let n = PredictionEngine::with_seed(seed).todays_predictions().len();
            assert!((3..=5).contains(&n));
        }
    }

    #[test]
    fn standings_are_sorted_by_points() {
        let table = PredictionEngine::with_seed(11).league_standings("La Liga");
        assert_eq!(table.len(), 10);
        for (i, row) in table.iter().enumerate() {
            assert_eq!(row.position, i + 1);
            assert_eq!(row.points, row.won * 3 + row.drawn);
            assert_eq!(row.played, row.won + row.drawn + row.lost);
        }
        assert!(table.windows(2).all(|w| w[0].points >= w[1].points));
    }

    #[test]
    fn upcoming_covers_the_next_week() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fixtures = PredictionEngine::with_seed(5).upcoming_fixtures(today);
        assert_eq!(fixtures.len(), 7);
        assert_eq!(fixtures[0].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(fixtures[6].date, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert!(fixtures.iter().all(|f| f.home != f.away));
    }
}
