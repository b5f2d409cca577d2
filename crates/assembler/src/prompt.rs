//! Prompt composition as an ordered list of named sections.

use eco_core::OpennessLevel;

/// Fixed closing instructions appended to every non-greeting prompt.
pub const TRAILING_DIRECTIVE: &str = "⚠️ INSTRUCTIONS TO THE MODEL:
- Use the memories and the consolidated emotional state as part of your reasoning.
- Connect earlier themes and emotions to what the user brings now.
- Adjust depth and tone to the openness level (superficial, reflective, deep).
- Respect the user's pace and autonomy.
- Avoid ready-made solutions and rigid interpretations.
- Structure your answer following ECO_ESTRUTURA_DE_RESPOSTA.txt, using its numbered sections.
- If you notice patterns, invite awareness, but do not diagnose.";

/// Opening line announcing the classified openness.
pub fn openness_banner(level: OpennessLevel) -> String {
    format!(
        "📶 Suggested emotional openness (heuristic): {}",
        level.descriptor()
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptSection {
    pub name: String,
    pub body: String,
}

/// Sections in output order. Blank bodies are dropped on push.
#[derive(Debug, Clone, Default)]
pub struct PromptSections {
    sections: Vec<PromptSection>,
}

impl PromptSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, body: impl Into<String>) {
        let body = body.into();
        if body.trim().is_empty() {
            return;
        }
        self.sections.push(PromptSection {
            name: name.into(),
            body,
        });
    }

    pub fn push_opt(&mut self, name: impl Into<String>, body: Option<String>) {
        if let Some(body) = body {
            self.push(name, body);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Join all sections with blank lines.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.body.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
