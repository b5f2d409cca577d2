//! Static module-selection rules.
//!
//! These are loaded once (see `eco-config`'s `Catalog`) and never mutated
//! by the assembler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::openness::OpennessLevel;

/// A module activated by keywords. Whether any or all keywords must match
/// is a property of the table holding the rule, not of the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    #[serde(alias = "arquivo")]
    pub file: String,

    #[serde(default, alias = "gatilhos")]
    pub triggers: Vec<String>,
}

/// An emotional module gated by memory tags, emotions and intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalModuleRule {
    #[serde(alias = "arquivo")]
    pub file: String,

    /// Matched against memory tags and dominant emotions.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, alias = "intensidadeMinima", skip_serializing_if = "Option::is_none")]
    pub min_intensity: Option<f32>,

    /// Modules loaded alongside this one when it activates.
    #[serde(default, alias = "relacionado", skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

/// A boolean expression over `intensity` and `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    #[serde(alias = "regra")]
    pub expression: String,

    #[serde(default, alias = "descricao")]
    pub description: String,
}

/// The gates that apply to one level-specific module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalModuleRule<'a> {
    pub file: &'a str,
    pub min_intensity: Option<f32>,
    pub condition: Option<&'a ConditionalRule>,
}

/// Base module plan: what is always loaded and what each level adds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptMatrix {
    #[serde(default, alias = "alwaysInclude")]
    pub always_include: Vec<String>,

    /// Level number ("2", "3") → module filenames.
    #[serde(default, alias = "byNivel")]
    pub by_level: BTreeMap<String, Vec<String>>,

    #[serde(default, alias = "intensidadeMinima")]
    pub intensity_minimum: BTreeMap<String, f32>,

    #[serde(default, alias = "condicoesEspeciais")]
    pub conditions: BTreeMap<String, ConditionalRule>,
}

impl PromptMatrix {
    /// Candidate modules for a level. Level 1 never has any.
    pub fn modules_for(&self, level: OpennessLevel) -> &[String] {
        if !level.allows_retrieval() {
            return &[];
        }
        self.by_level
            .get(&level.as_u8().to_string())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Gates configured for a module filename.
    pub fn rule_for<'a>(&'a self, file: &'a str) -> ConditionalModuleRule<'a> {
        ConditionalModuleRule {
            file,
            min_intensity: self.intensity_minimum.get(file).copied(),
            condition: self.conditions.get(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> PromptMatrix {
        PromptMatrix {
            always_include: vec!["ECO_IDENTIDADE.txt".into()],
            by_level: BTreeMap::from([
                ("1".to_string(), vec!["ignored.txt".to_string()]),
                ("2".to_string(), vec!["reflexao.txt".to_string()]),
                ("3".to_string(), vec!["profundo.txt".to_string()]),
            ]),
            intensity_minimum: BTreeMap::from([("profundo.txt".to_string(), 7.0)]),
            conditions: BTreeMap::from([(
                "profundo.txt".to_string(),
                ConditionalRule {
                    expression: "nivel >= 3".into(),
                    description: "deep only".into(),
                },
            )]),
        }
    }

    #[test]
    fn level_one_gets_no_level_modules() {
        assert!(matrix().modules_for(OpennessLevel::Superficial).is_empty());
    }

    #[test]
    fn level_lists_are_looked_up_by_number() {
        let m = matrix();
        assert_eq!(m.modules_for(OpennessLevel::Reflective), ["reflexao.txt"]);
        assert_eq!(m.modules_for(OpennessLevel::Deep), ["profundo.txt"]);
    }

    #[test]
    fn rule_for_collects_gates() {
        let m = matrix();
        let rule = m.rule_for("profundo.txt");
        assert_eq!(rule.file, "profundo.txt");
        assert_eq!(rule.min_intensity, Some(7.0));
        assert_eq!(rule.condition.map(|c| c.expression.as_str()), Some("nivel >= 3"));

        let plain = m.rule_for("reflexao.txt");
        assert!(plain.min_intensity.is_none());
        assert!(plain.condition.is_none());
    }
}
