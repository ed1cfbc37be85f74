//! Recognising football requests and what they ask for.
//!
//! Matching works on whole lowercase words, so "bundesliga" matches but a
//! club name buried inside a longer word does not. Generic words such as
//! "today", "game" or "result" are not triggers on their own; they only
//! steer a request that is already about football.

use crate::catalog::{self, DEFAULT_LEAGUE, LEAGUES};

const TRIGGER_WORDS: &[&str] = &[
    "football",
    "soccer",
    "league",
    "fixture",
    "fixtures",
    "standings",
    "betting",
    "bets",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionIntent {
    /// Two catalogued clubs named in one request.
    Matchup {
        home: &'static str,
        away: &'static str,
        league: &'static str,
    },
    Today,
    Standings { league: &'static str },
    Upcoming,
    Overview,
}

fn words(input: &str) -> Vec<String> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Word index at which `phrase` starts, if it appears as whole words.
fn find_phrase(words: &[String], phrase: &str) -> Option<usize> {
    let needle: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
    if needle.is_empty() || needle.len() > words.len() {
        return None;
    }
    words
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
}

fn mentioned_league(words: &[String], candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|league| find_phrase(words, league).is_some())
}

/// The first two distinct clubs in the order they appear.
fn mentioned_teams(words: &[String]) -> Option<(&'static str, &'static str)> {
    let mut found: Vec<(usize, &'static str)> = catalog::all_teams()
        .filter_map(|(team, _)| find_phrase(words, team).map(|pos| (pos, team)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    match found.as_slice() {
        [(_, home), (_, away), ..] => Some((*home, *away)),
        _ => None,
    }
}

pub fn is_prediction_request(input: &str) -> bool {
    let words = words(input);
    words.iter().any(|w| TRIGGER_WORDS.contains(&w.as_str()))
        || mentioned_league(&words, LEAGUES).is_some()
        || mentioned_teams(&words).is_some()
}

pub fn detect_intent(input: &str) -> PredictionIntent {
    let words = words(input);
    let has = |w: &str| words.iter().any(|x| x == w);

    if let Some((home, away)) = mentioned_teams(&words) {
        let league = mentioned_league(&words, LEAGUES)
            .or_else(|| catalog::league_of(home))
            .unwrap_or(DEFAULT_LEAGUE);
        return PredictionIntent::Matchup { home, away, league };
    }
    if has("today") || has("tonight") {
        return PredictionIntent::Today;
    }
    if has("standings") || has("table") {
        let league = mentioned_league(&words, LEAGUES).unwrap_or(DEFAULT_LEAGUE);
        return PredictionIntent::Standings { league };
    }
    if has("upcoming") || has("next") || has("week") {
        return PredictionIntent::Upcoming;
    }
    PredictionIntent::Overview
}
