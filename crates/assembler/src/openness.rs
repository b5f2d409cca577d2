//! Openness classification.

use async_trait::async_trait;
use eco_config::OpennessLexicon;
use eco_core::{OpennessHeuristic, OpennessLevel, OpennessValue, RetrievalError, normalize};

/// Ask the heuristic for a level and map its answer onto 1–3.
///
/// Unrecognized names, out-of-range or fractional numbers and heuristic
/// failures all fall back to level 1.
pub async fn classify(heuristic: &dyn OpennessHeuristic, input: &str) -> OpennessLevel {
    match heuristic.score(input).await {
        Ok(value) => value.to_level().unwrap_or_else(|| {
            tracing::warn!(
                heuristic = heuristic.name(),
                value = ?value,
                "Ambiguous or invalid openness level, falling back to level 1"
            );
            OpennessLevel::Superficial
        }),
        Err(e) => {
            tracing::warn!(heuristic = heuristic.name(), error = %e, "Openness scoring failed, falling back to level 1");
            OpennessLevel::Superficial
        }
    }
}

/// Marker-phrase scorer: any deep marker → "alto", any reflective marker →
/// "medio", otherwise "baixo".
pub struct LexicalOpennessHeuristic {
    deep: Vec<String>,
    reflective: Vec<String>,
}

impl LexicalOpennessHeuristic {
    pub fn new<I, J, S, T>(deep: I, reflective: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            deep: normalized_markers(deep),
            reflective: normalized_markers(reflective),
        }
    }

    pub fn from_lexicon(lexicon: &OpennessLexicon) -> Self {
        Self::new(&lexicon.deep_markers, &lexicon.reflective_markers)
    }
}

fn normalized_markers<I, S>(markers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    markers
        .into_iter()
        .map(|m| normalize(m.as_ref().trim()))
        .filter(|m| !m.is_empty())
        .collect()
}

#[async_trait]
impl OpennessHeuristic for LexicalOpennessHeuristic {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn score(&self, text: &str) -> Result<OpennessValue, RetrievalError> {
        let text = normalize(text);
        let matches = |markers: &[String]| markers.iter().any(|m| text.contains(m.as_str()));

        let name = if matches(self.deep.as_slice()) {
            "alto"
        } else if matches(self.reflective.as_slice()) {
            "medio"
        } else {
            "baixo"
        };
        Ok(OpennessValue::Named(name.into()))
    }
}
