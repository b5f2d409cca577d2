//! Level-conditional module selection.

use eco_core::{MemoryRecord, OpennessLevel, PromptMatrix};
use eco_rules::Bindings;

/// Whether any memory reaches `minimum` intensity.
pub fn any_memory_reaches(memories: &[MemoryRecord], minimum: f32) -> bool {
    memories.iter().any(|m| m.intensity_or_zero() >= minimum)
}

/// Modules for `level` that pass their intensity gate and condition, in
/// matrix order.
///
/// Conditions see `intensity` = the first memory's intensity (0 without
/// memories) and `level` = the current level. A condition that fails to
/// parse excludes its module.
pub fn select_level_modules(
    matrix: &PromptMatrix,
    level: OpennessLevel,
    memories: &[MemoryRecord],
) -> Vec<String> {
    let bindings = Bindings::new(
        memories.first().map_or(0.0, |m| f64::from(m.intensity_or_zero())),
        f64::from(level.as_u8()),
    );

    matrix
        .modules_for(level)
        .iter()
        .filter(|file| {
            if file.trim().is_empty() {
                tracing::warn!("Ignoring blank filename in level module list");
                return false;
            }
            let rule = matrix.rule_for(file);

            if let Some(min) = rule.min_intensity {
                if !any_memory_reaches(memories, min) {
                    tracing::info!(
                        file = rule.file,
                        minimum = min,
                        "Skipping module: no memory reaches minimum intensity"
                    );
                    return false;
                }
            }

            if let Some(condition) = rule.condition {
                let active = match eco_rules::evaluate(&condition.expression, bindings) {
                    Ok(active) => active,
                    Err(e) => {
                        tracing::warn!(
                            file = rule.file,
                            expression = %condition.expression,
                            error = %e,
                            "Condition rejected"
                        );
                        return false;
                    }
                };
                tracing::debug!(
                    file = rule.file,
                    expression = %condition.expression,
                    intensity = bindings.intensity,
                    level = bindings.level,
                    active,
                    "Condition evaluated"
                );
                if !active {
                    tracing::info!(
                        file = rule.file,
                        description = %condition.description,
                        "Skipping module: condition not met"
                    );
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::record;
    use eco_core::ConditionalRule;
    use std::collections::BTreeMap;

    fn matrix() -> PromptMatrix {
        PromptMatrix {
            always_include: vec![],
            by_level: BTreeMap::from([
                ("2".into(), vec!["reflexao.txt".into(), " ".into()]),
                (
                    "3".into(),
                    vec![
                        "reflexao.txt".into(),
                        "intenso.txt".into(),
                        "condicional.txt".into(),
                        "quebrado.txt".into(),
                    ],
                ),
            ]),
            intensity_minimum: BTreeMap::from([("intenso.txt".into(), 7.0)]),
            conditions: BTreeMap::from([
                (
                    "condicional.txt".into(),
                    ConditionalRule {
                        expression: "intensidade >= 5 && nivel == 3".into(),
                        description: "intense first memory at deep level".into(),
                    },
                ),
                (
                    "quebrado.txt".into(),
                    ConditionalRule {
                        expression: "intensidade >>> 2".into(),
                        description: "broken".into(),
                    },
                ),
            ]),
        }
    }

    #[test]
    fn level_one_selects_nothing() {
        assert!(select_level_modules(&matrix(), OpennessLevel::Superficial, &[]).is_empty());
    }

    #[test]
    fn blank_entries_are_dropped() {
        assert_eq!(
            select_level_modules(&matrix(), OpennessLevel::Reflective, &[]),
            ["reflexao.txt"]
        );
    }

    #[test]
    fn intensity_gate_checks_any_memory() {
        let memories = [record("a", 2.0, 0.9), record("b", 7.0, 0.9)];
        let selected = select_level_modules(&matrix(), OpennessLevel::Deep, &memories);
        assert!(selected.contains(&"intenso.txt".to_string()));

        let calm = [record("a", 2.0, 0.9)];
        let selected = select_level_modules(&matrix(), OpennessLevel::Deep, &calm);
        assert!(!selected.contains(&"intenso.txt".to_string()));
    }

    #[test]
    fn condition_uses_first_memory_intensity() {
        let first_intense = [record("a", 6.0, 0.9), record("b", 1.0, 0.9)];
        let selected = select_level_modules(&matrix(), OpennessLevel::Deep, &first_intense);
        assert!(selected.contains(&"condicional.txt".to_string()));

        let first_calm = [record("a", 1.0, 0.9), record("b", 6.0, 0.9)];
        let selected = select_level_modules(&matrix(), OpennessLevel::Deep, &first_calm);
        assert!(!selected.contains(&"condicional.txt".to_string()));
    }

    #[test]
    fn unparseable_condition_excludes_module() {
        let memories = [record("a", 9.0, 0.9)];
        let selected = select_level_modules(&matrix(), OpennessLevel::Deep, &memories);
        assert!(!selected.contains(&"quebrado.txt".to_string()));
        assert_eq!(
            selected,
            ["reflexao.txt", "intenso.txt", "condicional.txt"]
        );
    }
}
