//! Dice-coefficient fuzzy matcher over trigger phrases.
//!
//! Each phrase is compared against every window of the input with the same
//! word count, so a phrase buried in a long message still scores on its own
//! terms. A module's score is its best phrase score.

use async_trait::async_trait;
use eco_core::{FuzzyHeuristicMatcher, HeuristicHit, RetrievalError};
use std::collections::HashMap;

use crate::heuristic_index::KIND_COGNITIVE;

struct Phrase {
    file: String,
    words: Vec<String>,
}

pub struct BigramFuzzyMatcher {
    phrases: Vec<Phrase>,
    threshold: f32,
}

impl BigramFuzzyMatcher {
    pub fn new(threshold: f32) -> Self {
        Self {
            phrases: Vec::new(),
            threshold,
        }
    }

    /// Register trigger phrases for a module.
    pub fn with_phrases<I, S>(mut self, file: &str, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in phrases {
            let words = words_of(phrase.as_ref());
            if !words.is_empty() {
                self.phrases.push(Phrase {
                    file: file.to_string(),
                    words,
                });
            }
        }
        self
    }

    fn best_window_score(input: &[String], phrase: &[String]) -> f32 {
        let target = phrase.join(" ");
        if input.len() <= phrase.len() {
            return dice_coefficient(&input.join(" "), &target);
        }
        input
            .windows(phrase.len())
            .map(|w| dice_coefficient(&w.join(" "), &target))
            .fold(0.0, f32::max)
    }
}

fn words_of(text: &str) -> Vec<String> {
    eco_core::normalize(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Sørensen–Dice similarity over character bigrams, 0–1.
pub fn dice_coefficient(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *counts.entry((pair[0], pair[1])).or_default() += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(n) = counts.get_mut(&(pair[0], pair[1])) {
            if *n > 0 {
                *n -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f32 / (a.len() - 1 + b.len() - 1) as f32
}

#[async_trait]
impl FuzzyHeuristicMatcher for BigramFuzzyMatcher {
    fn name(&self) -> &str {
        "bigram"
    }

    async fn rank(&self, text: &str) -> Result<Vec<HeuristicHit>, RetrievalError> {
        let input = words_of(text);
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut best: Vec<HeuristicHit> = Vec::new();
        for phrase in &self.phrases {
            let score = Self::best_window_score(&input, &phrase.words);
            if score < self.threshold {
                continue;
            }
            match best.iter_mut().find(|h| h.file == phrase.file) {
                Some(hit) => hit.similarity = hit.similarity.max(score),
                None => best.push(HeuristicHit {
                    file: phrase.file.clone(),
                    kind: KIND_COGNITIVE.into(),
                    similarity: score,
                }),
            }
        }

        best.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(best)
    }
}
