//! Keyword trigger tables.
//!
//! Triggers and input are both compared in normalized form. Whether a rule
//! needs any or all of its triggers is decided by the table, not the rule.

use eco_core::{FuzzyHeuristicMatcher, TriggerRule, normalize};
use serde::Serialize;

/// How the active cognitive heuristic was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicSource {
    Trigger,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveHeuristic {
    pub file: String,
    pub source: HeuristicSource,
}

fn usable(rule: &TriggerRule) -> bool {
    !rule.file.trim().is_empty()
}

/// Normalized, non-blank triggers of a rule.
fn triggers_of(rule: &TriggerRule) -> impl Iterator<Item = String> + '_ {
    rule.triggers
        .iter()
        .map(|t| normalize(t.trim()))
        .filter(|t| !t.is_empty())
}

/// Whether any trigger occurs in the normalized input.
pub fn matches_any(rule: &TriggerRule, normalized: &str) -> bool {
    usable(rule) && triggers_of(rule).any(|t| normalized.contains(&t))
}

/// Whether every trigger occurs in the normalized input. A rule without
/// triggers never matches.
pub fn matches_all(rule: &TriggerRule, normalized: &str) -> bool {
    let mut triggers = triggers_of(rule).peekable();
    usable(rule) && triggers.peek().is_some() && triggers.all(|t| normalized.contains(&t))
}

/// The first cognitive rule with any matching trigger. Table order is
/// priority.
pub fn first_cognitive<'a>(rules: &'a [TriggerRule], normalized: &str) -> Option<&'a TriggerRule> {
    rules.iter().find(|r| matches_any(r, normalized))
}

/// Every philosophical rule with any matching trigger, in table order.
pub fn philosophical<'a>(rules: &'a [TriggerRule], normalized: &str) -> Vec<&'a TriggerRule> {
    rules.iter().filter(|r| matches_any(r, normalized)).collect()
}

/// Every stoic rule whose triggers all match, in table order.
pub fn stoic<'a>(rules: &'a [TriggerRule], normalized: &str) -> Vec<&'a TriggerRule> {
    rules.iter().filter(|r| matches_all(r, normalized)).collect()
}

/// Pick the active cognitive heuristic: a direct trigger match, or else the
/// fuzzy matcher's top candidate when there is input. Fuzzy failure leaves
/// no heuristic.
pub async fn active_heuristic(
    rules: &[TriggerRule],
    fuzzy: &dyn FuzzyHeuristicMatcher,
    input: &str,
    normalized: &str,
) -> Option<ActiveHeuristic> {
    if let Some(rule) = first_cognitive(rules, normalized) {
        return Some(ActiveHeuristic {
            file: rule.file.clone(),
            source: HeuristicSource::Trigger,
        });
    }
    if input.is_empty() {
        return None;
    }

    match fuzzy.rank(input).await {
        Ok(hits) => match hits.into_iter().find(|h| !h.file.trim().is_empty()) {
            Some(top) => {
                tracing::info!(
                    file = %top.file,
                    similarity = top.similarity,
                    "Fuzzy heuristic activated"
                );
                Some(ActiveHeuristic {
                    file: top.file,
                    source: HeuristicSource::Fuzzy,
                })
            }
            None => {
                tracing::info!("No fuzzy heuristic activated");
                None
            }
        },
        Err(e) => {
            tracing::warn!(matcher = fuzzy.name(), error = %e, "Fuzzy heuristic matching failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingFuzzy, ScriptedFuzzy};

    fn rule(file: &str, triggers: &[&str]) -> TriggerRule {
        TriggerRule {
            file: file.into(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn stoic_requires_every_trigger() {
        let rules = [rule("eco_aceitacao.txt", &["death", "acceptance"])];
        assert!(stoic(&rules, &normalize("thinking about death")).is_empty());
        assert_eq!(
            stoic(&rules, &normalize("death and acceptance")).len(),
            1
        );
    }

    #[test]
    fn stoic_rule_without_triggers_never_matches() {
        let rules = [rule("vazio.txt", &[]), rule("branco.txt", &["  "])];
        assert!(stoic(&rules, "qualquer coisa").is_empty());
    }

    #[test]
    fn triggers_are_normalized() {
        let rules = [rule("eco_sentido.txt", &["Sentido da Vída"])];
        assert_eq!(
            philosophical(&rules, &normalize("Qual o SENTIDO da vida?")).len(),
            1
        );
    }

    #[test]
    fn philosophical_keeps_table_order() {
        let rules = [
            rule("b.txt", &["tempo"]),
            rule("a.txt", &["vida"]),
            rule("c.txt", &["nada"]),
        ];
        let hits: Vec<&str> = philosophical(&rules, "a vida e o tempo")
            .iter()
            .map(|r| r.file.as_str())
            .collect();
        assert_eq!(hits, ["b.txt", "a.txt"]);
    }

    #[test]
    fn blank_filenames_never_activate() {
        let rules = [rule("  ", &["vida"]), rule("ok.txt", &["vida"])];
        assert_eq!(first_cognitive(&rules, "vida").map(|r| r.file.as_str()), Some("ok.txt"));
        assert_eq!(philosophical(&rules, "vida").len(), 1);
    }

    #[test]
    fn blank_trigger_does_not_match_everything() {
        let rules = [rule("x.txt", &[""])];
        assert!(first_cognitive(&rules, "qualquer coisa").is_none());
    }

    #[test]
    fn first_cognitive_match_wins() {
        let rules = [
            rule("catastrofizacao.txt", &["tudo errado"]),
            rule("generalizacao.txt", &["sempre", "tudo"]),
        ];
        let hit = first_cognitive(&rules, "sempre da tudo errado").unwrap();
        assert_eq!(hit.file, "catastrofizacao.txt");
    }

    #[tokio::test]
    async fn direct_match_skips_fuzzy() {
        let rules = [rule("direto.txt", &["tudo errado"])];
        let fuzzy = ScriptedFuzzy::new(&["fuzzy.txt"]);
        let active = active_heuristic(&rules, &fuzzy, "tudo errado", "tudo errado")
            .await
            .unwrap();
        assert_eq!(active.file, "direto.txt");
        assert_eq!(active.source, HeuristicSource::Trigger);
        assert_eq!(fuzzy.calls(), 0);
    }

    #[tokio::test]
    async fn fuzzy_top_candidate_is_used() {
        let fuzzy = ScriptedFuzzy::new(&["", "primeiro.txt", "segundo.txt"]);
        let active = active_heuristic(&[], &fuzzy, "tuddo erado", "tuddo erado")
            .await
            .unwrap();
        assert_eq!(active.file, "primeiro.txt");
        assert_eq!(active.source, HeuristicSource::Fuzzy);
    }

    #[tokio::test]
    async fn empty_input_never_consults_fuzzy() {
        let fuzzy = ScriptedFuzzy::new(&["fuzzy.txt"]);
        assert!(active_heuristic(&[], &fuzzy, "", "").await.is_none());
        assert_eq!(fuzzy.calls(), 0);
    }

    #[tokio::test]
    async fn fuzzy_failure_is_soft() {
        assert!(active_heuristic(&[], &FailingFuzzy, "algo", "algo").await.is_none());
    }
}
