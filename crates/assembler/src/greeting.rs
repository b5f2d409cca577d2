//! Brief-greeting shortcut.
//!
//! A message opening with a greeting skips the whole pipeline and gets the
//! greeting template plus the forbidden-patterns block.

use eco_core::text::capitalize_words;

/// Greeting prefixes, compared against normalized input.
pub const GREETINGS: [&str; 6] = ["oi", "ola", "olá", "bom dia", "boa tarde", "boa noite"];

/// Greeting template, read from the base root.
pub const GREETING_TEMPLATE: &str = "REGRA_SAUDACAO.txt";

/// Forbidden-patterns module, shared with the closing modules.
pub const FORBIDDEN_PATTERNS: &str = "eco_forbidden_patterns.txt";

/// Returned when the greeting template cannot be loaded.
pub const GREETING_FAILURE: &str = "⚠️ Failed to load REGRA_SAUDACAO.";

const NAME_PLACEHOLDER: &str = "[nome]";

/// Whether normalized, trimmed input opens with a greeting.
pub fn is_greeting(normalized: &str) -> bool {
    let input = normalized.trim();
    GREETINGS
        .iter()
        .any(|g| input.starts_with(eco_core::normalize(g).as_str()))
}

/// Replace every `[nome]` (any case) with `value`.
pub fn replace_name_placeholder(template: &str, value: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while !rest.is_empty() {
        if rest
            .get(..NAME_PLACEHOLDER.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(NAME_PLACEHOLDER))
        {
            out.push_str(value);
            rest = &rest[NAME_PLACEHOLDER.len()..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Compose the greeting reply. Without a display name the placeholder is
/// left untouched.
pub fn render_greeting(template: &str, forbidden: Option<&str>, user_name: Option<&str>) -> String {
    let body = match user_name.filter(|n| !n.trim().is_empty()) {
        Some(name) => replace_name_placeholder(template, &capitalize_words(name)),
        None => template.to_string(),
    };

    let mut out = format!(
        "📶 Input detected as a brief greeting.\n\n[Module REGRA_SAUDACAO]\n{}",
        body.trim()
    );
    if let Some(forbidden) = forbidden {
        out.push_str("\n\n[Module eco_forbidden_patterns]\n");
        out.push_str(forbidden.trim());
    }
    out
}
