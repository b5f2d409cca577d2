//! Narrative blocks: emotional state, memory narrative, narrative chains.
//!
//! Pure formatting; nothing here can fail.

use eco_core::{EmotionalProfile, MemoryRecord, OpennessLevel};

/// Closing line of the memory narrative.
pub const NARRATIVE_CLOSING: &str = "Consider how this may resonate with what you feel now.";

fn join_or(items: &[&str], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// Consolidated emotional state from the long-term profile.
pub fn emotional_state_block(profile: &EmotionalProfile, level: OpennessLevel) -> String {
    let emotions = join_or(&profile.emotions_by_frequency(), "none");
    let themes = join_or(&profile.themes_by_frequency(), "none");
    let last = profile
        .last_significant_interaction
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("none");
    let summary = profile
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("no summary recorded");

    format!(
        "🗺️ Consolidated emotional state:\n\
         - Frequent emotions: {emotions}\n\
         - Recurring themes: {themes}\n\
         - Estimated openness: {}\n\
         - Last significant interaction: {last}\n\
         - Overall summary: {summary}",
        level.descriptor()
    )
}

/// Push `item` unless already present, keeping first-seen order.
fn push_unique<'a>(seen: &mut Vec<&'a str>, item: &'a str) {
    if !seen.contains(&item) {
        seen.push(item);
    }
}

/// Themes, emotions and quoted summaries of the selected memories.
/// `None` when there are no memories.
pub fn memory_narrative_block(memories: &[MemoryRecord]) -> Option<String> {
    if memories.is_empty() {
        return None;
    }

    let mut themes: Vec<&str> = Vec::new();
    let mut emotions: Vec<&str> = Vec::new();
    let mut quotes: Vec<String> = Vec::new();

    for m in memories {
        for tag in &m.tags {
            push_unique(&mut themes, tag);
        }
        if let Some(emotion) = m.emotion() {
            push_unique(&mut emotions, emotion);
        }
        let summary = m.summary.trim();
        if !summary.is_empty() {
            quotes.push(format!("\"{summary}\""));
        }
    }

    Some(format!(
        "📜 Integrated memory narrative:\n\
         In other moments you brought up themes such as {}, with emotions of {}.\n\
         You shared thoughts such as {}.\n\
         {NARRATIVE_CLOSING}",
        join_or(&themes, "no specific theme"),
        join_or(&emotions, "no highlighted emotion"),
        quotes.join(" ")
    ))
}

/// Bullet list of prior narrative chains. `None` when no chain has a
/// summary.
pub fn chain_block(chains: &[MemoryRecord]) -> Option<String> {
    let lines: Vec<String> = chains
        .iter()
        .map(|c| c.summary.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("• Previous narrative chain: \"{s}\""))
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "📝 Recovering related narrative chains to keep coherence and continuity:\n{}",
        lines.join("\n")
    ))
}
