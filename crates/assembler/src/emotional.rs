//! Emotional module activation.

use eco_core::{EmotionalModuleRule, MemoryRecord};

use crate::selector::any_memory_reaches;

/// Rules activated by the selected memories, in table order.
///
/// A rule activates when its intensity gate (if any) is met by some memory
/// and one of its tags equals a tag or dominant emotion of some memory.
pub fn activated_rules<'a>(
    rules: &'a [EmotionalModuleRule],
    memories: &[MemoryRecord],
) -> Vec<&'a EmotionalModuleRule> {
    let present: Vec<&str> = memories
        .iter()
        .flat_map(|m| m.tags.iter().map(String::as_str).chain(m.emotion()))
        .collect();

    rules
        .iter()
        .filter(|rule| {
            if rule.file.trim().is_empty() {
                return false;
            }
            let intensity_ok = rule
                .min_intensity
                .is_none_or(|min| any_memory_reaches(memories, min));
            intensity_ok && rule.tags.iter().any(|t| present.contains(&t.as_str()))
        })
        .collect()
}
