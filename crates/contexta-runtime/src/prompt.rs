//! Rendering of the bounded synthesis context.

use std::fmt::Write;

use contexta_protocols::{
    Classification, FusedResultSet, FusedSnippet, Query, SportsEntity, SportsEvent,
    TeamEventsPayload, ToolPayload, ToolResponse,
};

/// System-level instructions sent with every synthesis request.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a helpful assistant for a broadcast and media \
organization. Answer the user's question using the provided documents and live sports data. \
If the context does not contain the answer, say so briefly.";

/// Size limits for the rendered context.
#[derive(Debug, Clone)]
pub struct PromptLimits {
    /// Snippets considered, highest ranked first.
    pub top_n: usize,
    /// Characters kept from each snippet body.
    pub snippet_chars: usize,
    /// Upper bound for the rendered document section.
    pub context_budget_chars: usize,
    /// Entries shown per live-data list.
    pub live_items: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            top_n: 5,
            snippet_chars: 200,
            context_budget_chars: 4000,
            live_items: 3,
        }
    }
}

/// The rendered context and how many snippets made it in.
#[derive(Debug, Clone)]
pub struct RenderedContext {
    pub text: String,
    pub snippets_used: usize,
}

/// Truncate to `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

fn render_snippet(index: usize, entry: &FusedSnippet, classification: &Classification, limits: &PromptLimits) -> String {
    let metadata = &entry.snippet.metadata;
    let mut block = format!(
        "[Snippet {} (Source: {}, Category: {})]\n{}\n",
        index + 1,
        metadata.source.as_deref().unwrap_or("Unknown"),
        metadata.category.as_deref().unwrap_or(&entry.snippet.collection),
        truncate_text(entry.snippet.text.trim(), limits.snippet_chars),
    );

    let labels = classification.labels_for(entry.id());
    if !labels.is_empty() {
        let rendered: Vec<String> = labels
            .iter()
            .map(|l| format!("{} ({:.2})", l.label, l.confidence))
            .collect();
        let _ = writeln!(block, "Labels: {}", rendered.join(", "));
    }
    block
}

/// Snippet blocks for the top N entries, dropping the lowest ranked until
/// the total fits the budget.
fn snippet_blocks(fused: &FusedResultSet, classification: &Classification, limits: &PromptLimits) -> Vec<String> {
    let mut blocks: Vec<String> = fused
        .top(limits.top_n)
        .iter()
        .enumerate()
        .map(|(i, entry)| render_snippet(i, entry, classification, limits))
        .collect();

    let mut total: usize = blocks.iter().map(|b| b.chars().count()).sum();
    while total > limits.context_budget_chars {
        match blocks.pop() {
            Some(dropped) => total -= dropped.chars().count(),
            None => break,
        }
    }
    blocks
}

fn render_event(event: &SportsEvent, with_score: bool) -> String {
    let mut line = String::from("- ");
    if let Some(date) = &event.date {
        line.push_str(date);
        if let Some(time) = &event.time {
            let _ = write!(line, " {}", time);
        }
        line.push_str(": ");
    }
    line.push_str(&event.matchup());
    if with_score {
        if let (Some(home), Some(away)) = (&event.home_score, &event.away_score) {
            let _ = write!(line, " ({}-{})", home, away);
        }
    }
    if let Some(venue) = &event.venue {
        let _ = write!(line, " at {}", venue);
    }
    line
}

fn render_events(payload: &TeamEventsPayload, limits: &PromptLimits, out: &mut String) {
    if let Some(name) = &payload.team_info.name {
        let _ = write!(out, "Team: {}", name);
        if let Some(league) = &payload.team_info.league {
            let _ = write!(out, " ({})", league);
        }
        out.push('\n');
    }

    let completed: Vec<&SportsEvent> = payload.completed().take(limits.live_items).collect();
    if !completed.is_empty() {
        out.push_str("Recent results:\n");
        for event in completed {
            let _ = writeln!(out, "{}", render_event(event, true));
        }
    }

    let upcoming: Vec<&SportsEvent> = payload.upcoming().take(limits.live_items).collect();
    if !upcoming.is_empty() {
        out.push_str("Upcoming matches:\n");
        for event in upcoming {
            let _ = writeln!(out, "{}", render_event(event, false));
        }
    }

    if payload.events.is_empty() {
        out.push_str("No recent or upcoming events found.\n");
    }
}

fn render_entity(entity: &SportsEntity) -> String {
    match entity {
        SportsEntity::Team { name, sport, league, country, .. } => {
            let details: Vec<&str> = [sport, league, country]
                .into_iter()
                .filter_map(|v| v.as_deref())
                .collect();
            format!("- Team: {} ({})", name, details.join(", "))
        }
        SportsEntity::Player { name, team, position, .. } => {
            let details: Vec<&str> = [team, position]
                .into_iter()
                .filter_map(|v| v.as_deref())
                .collect();
            format!("- Player: {} ({})", name, details.join(", "))
        }
    }
}

fn render_tool(response: &ToolResponse, limits: &PromptLimits, out: &mut String) {
    out.push_str("Live Sports Data:\n");
    match (response.payload(), response.failure()) {
        (Some(ToolPayload::TeamEvents(payload)), _) => render_events(payload, limits, out),
        (Some(ToolPayload::SportsSearch(payload)), _) => {
            if payload.results.is_empty() {
                let _ = writeln!(out, "No sports entities found for '{}'.", payload.query);
            }
            for entity in payload.results.iter().take(limits.live_items) {
                let _ = writeln!(out, "{}", render_entity(entity));
            }
        }
        (None, Some(failure)) => {
            let _ = writeln!(
                out,
                "Live data is currently unavailable ({}).",
                failure.reason_code
            );
        }
        (None, None) => {}
    }
    out.push('\n');
}

/// The `Live Sports Data:` section on its own.
pub fn render_live_data(response: &ToolResponse, limits: &PromptLimits) -> String {
    let mut out = String::new();
    render_tool(response, limits, &mut out);
    out
}

/// Render the full synthesis context for a query.
pub fn render_context(
    query: &Query,
    fused: &FusedResultSet,
    classification: &Classification,
    tool_response: Option<&ToolResponse>,
    limits: &PromptLimits,
) -> RenderedContext {
    let mut text = format!("User Query: {}\n\n", query.text().trim());

    let blocks = snippet_blocks(fused, classification, limits);
    text.push_str("Context from Documents:\n");
    if blocks.is_empty() {
        text.push_str("No relevant documents found.\n");
    }
    for block in &blocks {
        text.push_str(block);
        text.push('\n');
    }
    text.push('\n');

    if let Some(response) = tool_response {
        render_tool(response, limits, &mut text);
    }

    text.push_str(
        "Based on the above information, answer the user's query. Be concise and informative.\n\nAnswer:",
    );

    RenderedContext {
        text,
        snippets_used: blocks.len(),
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
