//! Text normalization shared by every keyword comparison.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold text for matching: lowercase, canonical decomposition (NFD), and
/// removal of combining diacritic marks.
///
/// `"Olá, Coração"` becomes `"ola, coracao"`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Upper-case the first letter of every word in a trimmed display name.
///
/// Word boundaries are any non-alphanumeric character, so `"ana-maria"`
/// becomes `"Ana-Maria"`.
pub fn capitalize_words(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
