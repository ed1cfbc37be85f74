//! Closed catalog of leagues and their clubs.
//!
//! Only the three domestic leagues carry their own rosters. Every other
//! competition draws its fixtures from the Premier League clubs.

pub const DEFAULT_LEAGUE: &str = "Premier League";

pub const LEAGUES: &[&str] = &[
    "Premier League",
    "La Liga",
    "Bundesliga",
    "Serie A",
    "Ligue 1",
    "Champions League",
    "Europa League",
    "World Cup",
    "Euro Cup",
];

const PREMIER_LEAGUE: &[&str] = &[
    "Manchester City",
    "Arsenal",
    "Manchester United",
    "Liverpool",
    "Chelsea",
    "Tottenham",
    "Newcastle",
    "Brighton",
    "Aston Villa",
    "West Ham",
];

const LA_LIGA: &[&str] = &[
    "Real Madrid",
    "Barcelona",
    "Atletico Madrid",
    "Sevilla",
    "Villarreal",
    "Real Sociedad",
    "Athletic Bilbao",
    "Valencia",
    "Real Betis",
    "Girona",
];

const BUNDESLIGA: &[&str] = &[
    "Bayern Munich",
    "Borussia Dortmund",
    "RB Leipzig",
    "Bayer Leverkusen",
    "VfB Stuttgart",
    "Eintracht Frankfurt",
    "Hoffenheim",
    "Freiburg",
];

/// Leagues that have a roster of their own (used for standings).
pub const ROSTER_LEAGUES: &[&str] = &["Premier League", "La Liga", "Bundesliga"];

pub fn teams_for(league: &str) -> &'static [&'static str] {
    match league {
        "La Liga" => LA_LIGA,
        "Bundesliga" => BUNDESLIGA,
        _ => PREMIER_LEAGUE,
    }
}

/// Whether `league` can be tabled from clubs of its own.
pub fn has_roster(league: &str) -> bool {
    ROSTER_LEAGUES.iter().any(|l| l.eq_ignore_ascii_case(league))
}

/// The roster league a club plays in, if it is in the catalog.
pub fn league_of(team: &str) -> Option<&'static str> {
    ROSTER_LEAGUES
        .iter()
        .copied()
        .find(|league| teams_for(league).iter().any(|t| t.eq_ignore_ascii_case(team)))
}

/// Every catalogued club with its league.
pub fn all_teams() -> impl Iterator<Item = (&'static str, &'static str)> {
    ROSTER_LEAGUES
        .iter()
        .flat_map(|league| teams_for(league).iter().map(move |team| (*team, *league)))
}
