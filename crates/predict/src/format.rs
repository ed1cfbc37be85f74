//! Markdown renderings of engine output.

use std::fmt::Write;

use crate::engine::{Fixture, Prediction, StandingRow};

pub const DISCLAIMER: &str = "⚠️ **Disclaimer**: These are AI-generated predictions for entertainment purposes only. Please gamble responsibly.";

fn push_prediction(out: &mut String, index: usize, p: &Prediction) {
    let _ = writeln!(out, "**{}. {} vs {}**", index, p.subject_a, p.subject_b);
    let _ = writeln!(out, "🏆 League: {}", p.category);
    let _ = writeln!(
        out,
        "🎯 Prediction: **{}** ({}% confidence)",
        p.outcome, p.confidence
    );
    let _ = writeln!(out, "💭 Reasoning: {}", p.rationale);
    if let Some(odds) = p.odds {
        let _ = writeln!(
            out,
            "💰 Odds: H: {:.2}, D: {:.2}, A: {:.2}",
            odds.a, odds.draw, odds.b
        );
    }
    if !p.key_factors.is_empty() {
        let _ = writeln!(out, "🔑 Key Factors: {}", p.key_factors.join(", "));
    }
    out.push('\n');
}

pub fn todays_predictions(predictions: &[Prediction]) -> String {
    let mut out = String::from("⚽ **Today's Football Predictions**\n\n");
    for (i, p) in predictions.iter().enumerate() {
        push_prediction(&mut out, i + 1, p);
    }
    out.push_str(DISCLAIMER);
    out
}

pub fn matchup(prediction: &Prediction) -> String {
    let mut out = String::from("⚽ **Match Prediction**\n\n");
    push_prediction(&mut out, 1, prediction);
    out.push_str(DISCLAIMER);
    out
}

pub fn standings(league: &str, rows: &[StandingRow]) -> String {
    let mut out = format!("🏆 **{league} Standings**\n\n");
    out.push_str("Pos | Team | P | W | D | L | GF | GA | Pts\n");
    out.push_str("----|------|---|---|---|---|----|----|----\n");
    for row in rows.iter().take(10) {
        let _ = writeln!(
            out,
            "{:>3} | {:<20} | {} | {} | {} | {} | {} | {} | {}",
            row.position,
            row.team,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.points
        );
    }
    out
}

/// Standings for `requested`, or the default league's table with a note
/// when `requested` has no clubs of its own.
pub fn standings_or_fallback(requested: &str, shown: &str, rows: &[StandingRow]) -> String {
    if requested.eq_ignore_ascii_case(shown) {
        return standings(shown, rows);
    }
    format!(
        "ℹ️ There is no club table for {requested}; showing the {shown} instead.\n\n{}",
        standings(shown, rows)
    )
}

pub fn upcoming(fixtures: &[Fixture]) -> String {
    let mut out = String::from("📅 **Upcoming Matches (Next 7 Days)**\n\n");
    for (i, f) in fixtures.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} vs {} ({})",
            i + 1,
            f.date.format("%Y-%m-%d"),
            f.home,
            f.away,
            f.league
        );
    }
    out
}

pub fn overview() -> String {
    [
        "⚽ **Football Information & Predictions**",
        "",
        "I can help you with:",
        "• Today's match predictions",
        "• League standings and tables",
        "• Upcoming matches",
        "• Head-to-head match predictions",
        "",
        "Just ask me about:",
        "• \"Show me today's football predictions\"",
        "• \"Premier League standings\"",
        "• \"Upcoming football fixtures\"",
        "• \"Predict Arsenal vs Chelsea\"",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Odds, Outcome};
    use chrono::NaiveDate;

    fn sample() -> Prediction {
        Prediction {
            subject_a: "Arsenal".into(),
            subject_b: "Chelsea".into(),
            category: "Premier League".into(),
            outcome: Outcome::FirstWins,
            confidence: 85,
            rationale: "Arsenal has strong home form and superior recent performance".into(),
            odds: Some(Odds {
                a: 1.01,
                draw: 5.92,
                b: 5.18,
            }),
            key_factors: vec!["Arsenal scoring freely".into()],
        }
    }

    #[test]
    fn slate_lists_each_match_and_ends_with_disclaimer() {
        let text = todays_predictions(&[sample(), sample()]);
        assert!(text.contains("**1. Arsenal vs Chelsea**"));
        assert!(text.contains("**2. Arsenal vs Chelsea**"));
        assert!(text.contains("🎯 Prediction: **Home Win** (85% confidence)"));
        assert!(text.contains("💰 Odds: H: 1.01, D: 5.92, A: 5.18"));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn standings_table_pads_columns() {
        let row = StandingRow {
            position: 1,
            team: "Girona".into(),
            played: 30,
            won: 20,
            drawn: 5,
            lost: 5,
            goals_for: 45,
            goals_against: 20,
            points: 65,
        };
        let text = standings("La Liga", &[row]);
        assert!(text.starts_with("🏆 **La Liga Standings**"));
        assert!(text.contains("  1 | Girona               | 30 | 20 | 5 | 5 | 45 | 20 | 65"));
    }

    #[test]
    fn missing_league_table_is_announced() {
        let text = standings_or_fallback("Serie A", "Premier League", &[]);
        assert!(text.starts_with("ℹ️ There is no club table for Serie A"));
        assert!(text.contains("🏆 **Premier League Standings**"));
        assert!(!text.contains("Serie A Standings"));

        let same = standings_or_fallback("La Liga", "La Liga", &[]);
        assert_eq!(same, standings("La Liga", &[]));
    }

    #[test]
    fn upcoming_uses_iso_dates() {
        let fixture = Fixture {
            date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
            home: "Freiburg".into(),
            away: "Hoffenheim".into(),
            league: "Bundesliga".into(),
        };
        assert!(upcoming(&[fixture]).contains("1. 2024-05-04: Freiburg vs Hoffenheim (Bundesliga)"));
    }
}
