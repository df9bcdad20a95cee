//! Tool routing: a deterministic rule table deciding whether a query needs
//! live sports data, and which operation to request.
//!
//! Rules are evaluated in a fixed precedence order:
//!
//! 1. A configured team name appears in the query.
//! 2. A sports keyword appears and a capitalized entity can be extracted.
//! 3. A trigger label is present in the classification, the query itself
//!    uses sports vocabulary, and an entity can be extracted.
//!
//! Within rule 1 the earliest occurrence wins, then the longer name, then
//! configuration order. Rules 1 and 2 look at the query only, so
//! [`ToolRouter::route_query`] can run before classification finishes;
//! [`ToolRouter::route`] is always `route_query(q).or_else(route_labels(q, c))`.

use std::fmt;

use tracing::debug;

use contexta_protocols::{Classification, Query, ToolRequest, LATEST_EVENTS, SPORTS_SEARCH};

/// Words signalling interest in results of past games.
const PAST_KEYWORDS: &[&str] = &[
    "last night",
    "yesterday",
    "recent",
    "recently",
    "result",
    "results",
    "score",
    "scores",
    "won",
    "lost",
    "beat",
];

/// Words signalling interest in upcoming fixtures.
const UPCOMING_KEYWORDS: &[&str] = &[
    "upcoming",
    "next",
    "schedule",
    "tonight",
    "tomorrow",
    "fixtures",
    "this weekend",
];

/// Words asking about games without a time direction.
const GAME_KEYWORDS: &[&str] = &["game", "games", "match", "matches", "play", "playing", "events"];

const LEAGUES: &[&str] = &[
    "NBA",
    "NFL",
    "MLB",
    "NHL",
    "MLS",
    "WNBA",
    "Premier League",
    "La Liga",
    "Serie A",
    "Bundesliga",
    "Champions League",
];

/// Query words that corroborate a trigger label. Retrieved snippets alone
/// never route a query that reads as non-sports.
const SPORTS_CONTEXT: &[&str] = &[
    "season",
    "standings",
    "playoff",
    "playoffs",
    "roster",
    "coach",
    "injury",
    "injuries",
    "transfer",
    "championship",
    "fixture",
    "fixtures",
    "game",
    "games",
    "match",
    "matches",
    "playing",
    "win",
    "wins",
];

/// Capitalized words never treated as entities.
const NON_ENTITIES: &[&str] = &[
    "The", "A", "An", "In", "On", "At", "From", "To", "With", "By", "About", "What", "Who",
    "When", "Where", "Why", "How", "Which", "Show", "Tell", "Give", "List", "Find", "Did", "Do",
    "Does", "Is", "Are", "Was", "Were", "Can", "Could", "Will", "Would", "Me", "My", "I",
    "Please", "Yesterday", "Today", "Tonight", "Tomorrow", "Last", "Next", "Upcoming", "Recent",
    "Summarize", "Summarise", "Explain", "Describe", "Compare", "Write", "Draft", "Help", "Get",
    "Check", "Play",
];

/// Which rule produced a routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RouteRule {
    KnownTeam,
    SportsKeyword,
    TriggerLabel,
}

impl fmt::Display for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteRule::KnownTeam => write!(f, "known_team"),
            RouteRule::SportsKeyword => write!(f, "sports_keyword"),
            RouteRule::TriggerLabel => write!(f, "trigger_label"),
        }
    }
}

/// Time direction of an events request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    Past,
    Upcoming,
    All,
}

impl EventWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventWindow::Past => "past",
            EventWindow::Upcoming => "upcoming",
            EventWindow::All => "all",
        }
    }
}

/// The rule table.
#[derive(Debug, Clone)]
pub struct RouterRules {
    pub known_teams: Vec<String>,
    pub sports_keywords: Vec<String>,
    pub trigger_labels: Vec<String>,
}

impl Default for RouterRules {
    fn default() -> Self {
        Self {
            known_teams: ["Lakers", "Celtics", "Warriors", "Arsenal", "Real Madrid"]
                .into_iter()
                .map(String::from)
                .collect(),
            sports_keywords: ["score", "game", "games", "match", "team", "player", "league"]
                .into_iter()
                .map(String::from)
                .collect(),
            trigger_labels: vec!["sports".to_string(), "sports news".to_string()],
        }
    }
}

/// Lowercase alphanumeric tokens of `text`.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Token index of the first occurrence of `phrase` in `tokens`.
fn find_phrase(tokens: &[String], phrase: &str) -> Option<usize> {
    let needle = tokenize(phrase);
    if needle.is_empty() || needle.len() > tokens.len() {
        return None;
    }
    tokens.windows(needle.len()).position(|w| w == needle.as_slice())
}

fn contains_any(tokens: &[String], phrases: &[&str]) -> bool {
    phrases.iter().any(|p| find_phrase(tokens, p).is_some())
}

/// A prepared query: original text plus its token stream.
struct Prepared<'a> {
    text: &'a str,
    tokens: Vec<String>,
}

impl<'a> Prepared<'a> {
    fn new(query: &'a Query) -> Self {
        Self {
            text: query.text(),
            tokens: tokenize(query.text()),
        }
    }
}

/// Deterministic tool router.
#[derive(Debug, Clone, Default)]
pub struct ToolRouter {
    rules: RouterRules,
}

impl ToolRouter {
    pub fn new(rules: RouterRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RouterRules {
        &self.rules
    }

    /// Full routing decision for a query and its classification.
    pub fn route(&self, query: &Query, classification: &Classification) -> Option<ToolRequest> {
        self.route_query(query)
            .or_else(|| self.route_labels(query, classification))
    }

    /// Rules that depend on the query text only.
    pub fn route_query(&self, query: &Query) -> Option<ToolRequest> {
        let prepared = Prepared::new(query);

        if let Some(team) = self.match_known_team(&prepared) {
            return Some(self.build(query, &prepared, team, RouteRule::KnownTeam));
        }

        if self.has_sports_keyword(&prepared) {
            if let Some(entity) = extract_entity(prepared.text, &self.rules.sports_keywords) {
                return Some(self.build(query, &prepared, &entity, RouteRule::SportsKeyword));
            }
            debug!(query_id = query.id(), "Sports keyword matched but no entity found");
        }

        None
    }

    /// The classification-dependent rule, applied when the query rules miss.
    pub fn route_labels(&self, query: &Query, classification: &Classification) -> Option<ToolRequest> {
        let triggered = self
            .rules
            .trigger_labels
            .iter()
            .any(|label| classification.has_label(label));
        if !triggered {
            return None;
        }

        let prepared = Prepared::new(query);
        if !self.has_sports_context(&prepared) {
            debug!(query_id = query.id(), "Trigger label present but query is not about sports");
            return None;
        }
        match extract_entity(prepared.text, &self.rules.sports_keywords) {
            Some(entity) => Some(self.build(query, &prepared, &entity, RouteRule::TriggerLabel)),
            None => {
                debug!(query_id = query.id(), "Trigger label present but no entity found");
                None
            }
        }
    }

    fn match_known_team<'r>(&'r self, prepared: &Prepared<'_>) -> Option<&'r str> {
        self.rules
            .known_teams
            .iter()
            .enumerate()
            .filter_map(|(order, team)| {
                find_phrase(&prepared.tokens, team).map(|pos| (pos, team, order))
            })
            .min_by(|(pos_a, team_a, order_a), (pos_b, team_b, order_b)| {
                pos_a
                    .cmp(pos_b)
                    .then_with(|| team_b.len().cmp(&team_a.len()))
                    .then_with(|| order_a.cmp(order_b))
            })
            .map(|(_, team, _)| team.as_str())
    }

    fn has_sports_keyword(&self, prepared: &Prepared<'_>) -> bool {
        self.rules
            .sports_keywords
            .iter()
            .any(|k| find_phrase(&prepared.tokens, k).is_some())
    }

    fn has_sports_context(&self, prepared: &Prepared<'_>) -> bool {
        self.has_sports_keyword(prepared)
            || contains_any(&prepared.tokens, SPORTS_CONTEXT)
            || contains_any(&prepared.tokens, PAST_KEYWORDS)
            || contains_any(&prepared.tokens, LEAGUES)
    }

    fn build(&self, query: &Query, prepared: &Prepared<'_>, entity: &str, rule: RouteRule) -> ToolRequest {
        let wants_events = contains_any(&prepared.tokens, PAST_KEYWORDS)
            || contains_any(&prepared.tokens, UPCOMING_KEYWORDS)
            || contains_any(&prepared.tokens, GAME_KEYWORDS);

        let mut request = if wants_events {
            ToolRequest::new(LATEST_EVENTS)
                .with_param("team_name", entity)
                .with_param("window", event_window(&prepared.tokens).as_str())
        } else {
            ToolRequest::new(SPORTS_SEARCH).with_param("query", entity)
        };

        if let Some(league) = LEAGUES
            .iter()
            .find(|l| find_phrase(&prepared.tokens, l).is_some())
        {
            request = request.with_param("league", *league);
        }

        debug!(
            query_id = query.id(),
            rule = %rule,
            tool = %request.tool,
            entity,
            "Routed query to tool"
        );
        request
    }
}

fn event_window(tokens: &[String]) -> EventWindow {
    match (
        contains_any(tokens, PAST_KEYWORDS),
        contains_any(tokens, UPCOMING_KEYWORDS),
    ) {
        (true, false) => EventWindow::Past,
        (false, true) => EventWindow::Upcoming,
        _ => EventWindow::All,
    }
}

/// Leftmost run of capitalized words that is not a stop word or keyword.
///
/// A word qualifies when it is an uppercase letter followed by lowercase
/// letters. Leading and trailing non-entity words are trimmed from a run.
pub fn extract_entity(text: &str, keywords: &[String]) -> Option<String> {
    let is_excluded = |word: &str| {
        NON_ENTITIES.contains(&word) || keywords.iter().any(|k| k.eq_ignore_ascii_case(word))
    };

    let mut runs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for raw in text.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let boundary = raw.ends_with(|c: char| matches!(c, ',' | '.' | '?' | '!' | ';' | ':'));
        if is_capitalized(word) {
            current.push(word);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        if boundary && !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs.into_iter().find_map(|run| {
        let start = run.iter().position(|w| !is_excluded(w))?;
        let end = run.iter().rposition(|w| !is_excluded(w))?;
        Some(run[start..=end].join(" "))
    })
}

fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(|c| c.is_lowercase())
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
