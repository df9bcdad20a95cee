//! Plain-text rendering of a response for the `query` command.

use std::fmt::Write;

use contexta_protocols::AssistantResponse;
use contexta_runtime::{render_live_data, truncate_text, PromptLimits};

const PREVIEW_CHARS: usize = 160;

pub(crate) fn render_response(response: &AssistantResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Query: {}\n", response.query);
    let _ = writeln!(out, "Answer:\n{}\n", response.answer.trim());

    if response.snippets.is_empty() {
        out.push_str("Sources: none\n");
    } else {
        let _ = writeln!(out, "Sources ({}):", response.snippets.len());
        for (i, entry) in response.snippets.iter().enumerate() {
            let snippet = &entry.snippet;
            let _ = writeln!(
                out,
                "{}. [{}] {} (score {:.2})",
                i + 1,
                snippet.collection,
                snippet.metadata.source.as_deref().unwrap_or("unknown source"),
                entry.combined_score
            );
            let _ = writeln!(out, "   {}", truncate_text(snippet.text.trim(), PREVIEW_CHARS));

            let labels = response.classification.labels_for(entry.id());
            if !labels.is_empty() {
                let rendered: Vec<String> = labels
                    .iter()
                    .map(|l| format!("{} ({:.2})", l.label, l.confidence))
                    .collect();
                let _ = writeln!(out, "   Labels: {}", rendered.join(", "));
            }
        }
    }

    if let Some(tool) = &response.tool_response {
        out.push('\n');
        out.push_str(&render_live_data(tool, &PromptLimits::default()));
    }

    if response.is_degraded() {
        let names: Vec<String> = response
            .degradations
            .iter()
            .filter_map(|d| serde_json::to_value(d).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        let _ = writeln!(out, "\nDegraded: {}", names.join(", "));
    }

    out
}
