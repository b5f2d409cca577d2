//! The context builder: holds collaborators and runs the pipeline.
//!
//! One `ContextBuilder` is built at startup and shared (`Arc`) across
//! requests. Each call creates its own `AssemblyContext`, so assemblies
//! never see each other's modules.

use eco_config::{AppConfig, Catalog};
use eco_core::{
    AssemblyRequest, ContentProvider, ContentRoot, FuzzyHeuristicMatcher, HeuristicHit,
    HeuristicSearch, MemoryRecord, OpennessHeuristic, OpennessLevel, RecordSearch, Tokenizer,
    normalize,
};
use eco_memory::NoopSearch;
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::emotional;
use crate::greeting::{self, FORBIDDEN_PATTERNS, GREETING_FAILURE, GREETING_TEMPLATE};
use crate::loader::{AssemblyContext, ModuleCategory, ModuleLoader};
use crate::narrative;
use crate::openness::{self, LexicalOpennessHeuristic};
use crate::prompt::{self, PromptSections, TRAILING_DIRECTIVE};
use crate::retrieval::{self, RetrievalSettings};
use crate::selector;
use crate::token::{self, HeuristicTokenizer, TokenBudget};
use crate::triggers::{self, ActiveHeuristic};

/// Base modules loaded after the emotional modules, in order.
pub const CLOSING_MODULES: [&str; 3] = [
    "eco_json_trigger_criteria.txt",
    FORBIDDEN_PATTERNS,
    "MEMORIAS_NO_CONTEXTO.txt",
];

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblySettings {
    pub retrieval: RetrievalSettings,
    pub budget: TokenBudget,
    pub closing_modules: Vec<String>,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            retrieval: RetrievalSettings::default(),
            budget: TokenBudget::default(),
            closing_modules: CLOSING_MODULES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl AssemblySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            retrieval: RetrievalSettings::from_config(&config.retrieval),
            budget: TokenBudget::from_config(&config.budget),
            ..Self::default()
        }
    }
}

/// What one assembly did, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssemblyReport {
    /// The greeting shortcut answered
    pub greeting: bool,
    /// `None` on the greeting path, which skips classification
    pub level: Option<OpennessLevel>,
    pub heuristic: Option<ActiveHeuristic>,
    /// Loaded module filenames, in prompt order
    pub modules: Vec<String>,
    pub sections: Vec<String>,
    pub memory_count: usize,
    pub chain_count: usize,
    pub token_count: Option<usize>,
    pub truncated: bool,
}

pub struct ContextBuilder {
    catalog: Arc<Catalog>,
    loader: ModuleLoader,
    openness: Arc<dyn OpennessHeuristic>,
    fuzzy: Arc<dyn FuzzyHeuristicMatcher>,
    heuristics: Arc<dyn HeuristicSearch>,
    memories: Arc<dyn RecordSearch>,
    references: Arc<dyn RecordSearch>,
    chains: Arc<dyn RecordSearch>,
    tokenizer: Arc<dyn Tokenizer>,
    settings: AssemblySettings,
}

impl ContextBuilder {
    /// A builder with no content roots, retrieval disabled, the lexical
    /// openness heuristic and the byte-chunk tokenizer.
    pub fn new(catalog: Catalog) -> Self {
        let openness = Arc::new(LexicalOpennessHeuristic::from_lexicon(&catalog.openness));
        Self {
            catalog: Arc::new(catalog),
            loader: ModuleLoader::new(),
            openness,
            fuzzy: Arc::new(NoopSearch),
            heuristics: Arc::new(NoopSearch),
            memories: Arc::new(NoopSearch),
            references: Arc::new(NoopSearch),
            chains: Arc::new(NoopSearch),
            tokenizer: Arc::new(HeuristicTokenizer),
            settings: AssemblySettings::default(),
        }
    }

    pub fn with_root(mut self, root: ContentRoot, provider: Arc<dyn ContentProvider>) -> Self {
        self.loader = self.loader.with_root(root, provider);
        self
    }

    pub fn with_openness(mut self, heuristic: Arc<dyn OpennessHeuristic>) -> Self {
        self.openness = heuristic;
        self
    }

    pub fn with_fuzzy_matcher(mut self, matcher: Arc<dyn FuzzyHeuristicMatcher>) -> Self {
        self.fuzzy = matcher;
        self
    }

    pub fn with_heuristic_search(mut self, search: Arc<dyn HeuristicSearch>) -> Self {
        self.heuristics = search;
        self
    }

    pub fn with_memory_search(mut self, search: Arc<dyn RecordSearch>) -> Self {
        self.memories = search;
        self
    }

    pub fn with_reference_search(mut self, search: Arc<dyn RecordSearch>) -> Self {
        self.references = search;
        self
    }

    pub fn with_chain_search(mut self, search: Arc<dyn RecordSearch>) -> Self {
        self.chains = search;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_settings(mut self, settings: AssemblySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn settings(&self) -> &AssemblySettings {
        &self.settings
    }

    /// Assemble the prompt for one request.
    pub async fn assemble(&self, request: &AssemblyRequest) -> String {
        self.assemble_with_report(request).await.0
    }

    /// Assemble the prompt and report what went into it.
    pub async fn assemble_with_report(&self, request: &AssemblyRequest) -> (String, AssemblyReport) {
        let span = tracing::info_span!("assemble", request_id = %Uuid::new_v4());
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &AssemblyRequest) -> (String, AssemblyReport) {
        let input = request.input();
        let normalized = normalize(input);

        if greeting::is_greeting(&normalized) {
            return self.greet(request).await;
        }

        let catalog = &self.catalog;
        let level = openness::classify(self.openness.as_ref(), input).await;

        let mut sections = PromptSections::new();
        sections.push("openness", prompt::openness_banner(level));
        if let Some(profile) = &request.profile {
            sections.push(
                "emotional_state",
                narrative::emotional_state_block(profile, level),
            );
        }

        // ── Memories ────────────────────────────────────────────────────
        let mut memories: Vec<MemoryRecord> = match request.forced_block() {
            Some(block) => {
                tracing::info!("Forced method mode with supplied technical block");
                vec![retrieval::forced_record(block, input)]
            }
            None if !level.allows_retrieval() => {
                if request.memories.as_ref().is_some_and(|m| !m.is_empty()) {
                    tracing::info!("Superficial openness, ignoring supplied memories");
                }
                Vec::new()
            }
            None => request.memories.clone().unwrap_or_default(),
        };

        // ── Triggers ────────────────────────────────────────────────────
        let heuristic =
            triggers::active_heuristic(&catalog.cognitive, self.fuzzy.as_ref(), input, &normalized)
                .await;
        let heuristic_hits = self.search_heuristics(input, request.user()).await;
        let philosophical = triggers::philosophical(&catalog.philosophical, &normalized);
        let stoic = triggers::stoic(&catalog.stoic, &normalized);
        let target_tags = heuristic
            .as_ref()
            .map(|h| catalog.tags_for_heuristic(&h.file))
            .unwrap_or_default();

        // ── Retrieval ───────────────────────────────────────────────────
        let user = request.user().filter(|_| level.allows_retrieval() && !input.is_empty());
        if let Some(user_id) = user {
            if memories.is_empty() {
                memories = retrieval::retrieve_memories(
                    self.memories.as_ref(),
                    self.references.as_ref(),
                    user_id,
                    input,
                    &normalized,
                    target_tags,
                    &self.settings.retrieval,
                )
                .await;
            }
        }

        if level.allows_retrieval() && !input.is_empty() {
            if let Some(profile) = &request.profile {
                memories.insert(0, retrieval::current_turn_record(profile, input));
            }
        }

        let chains = match user {
            Some(user_id) => {
                retrieval::retrieve_chains(
                    self.chains.as_ref(),
                    user_id,
                    input,
                    self.settings.retrieval.chain_limit,
                )
                .await
            }
            None => Vec::new(),
        };

        memories.iter_mut().for_each(MemoryRecord::normalize_openness);

        // ── Modules ─────────────────────────────────────────────────────
        let mut ctx = AssemblyContext::new();

        for file in &catalog.matrix.always_include {
            self.loader.load_module(&mut ctx, file, ModuleCategory::Base).await;
        }
        for file in selector::select_level_modules(&catalog.matrix, level, &memories) {
            self.loader.load_module(&mut ctx, &file, ModuleCategory::Base).await;
        }

        log_selection(level, &ctx, &memories);

        if let Some(active) = &heuristic {
            self.loader
                .load_module(&mut ctx, &active.file, ModuleCategory::Cognitive)
                .await;
        }
        for hit in &heuristic_hits {
            self.loader
                .load_module(&mut ctx, &hit.file, ModuleCategory::Cognitive)
                .await;
        }
        for rule in philosophical {
            self.loader
                .load_module(&mut ctx, &rule.file, ModuleCategory::Philosophical)
                .await;
        }
        for rule in stoic {
            self.loader
                .load_module(&mut ctx, &rule.file, ModuleCategory::Stoic)
                .await;
        }
        for rule in emotional::activated_rules(&catalog.emotional, &memories) {
            self.loader
                .load_module(&mut ctx, &rule.file, ModuleCategory::Emotional)
                .await;
            for related in &rule.related {
                self.loader
                    .load_module(&mut ctx, related, ModuleCategory::Related)
                    .await;
            }
        }
        for file in &self.settings.closing_modules {
            self.loader.load_module(&mut ctx, file, ModuleCategory::Base).await;
        }

        // ── Composition ─────────────────────────────────────────────────
        if level.allows_retrieval() {
            sections.push_opt(
                "memory_narrative",
                narrative::memory_narrative_block(&memories),
            );
        }
        sections.push_opt("narrative_chains", narrative::chain_block(&chains));
        for block in ctx.blocks() {
            sections.push(format!("module:{}", block.file), block.render());
        }
        sections.push("directive", TRAILING_DIRECTIVE);

        let outcome = token::enforce(
            self.tokenizer.as_ref(),
            sections.render(),
            &self.settings.budget,
        )
        .await;

        let report = AssemblyReport {
            greeting: false,
            level: Some(level),
            heuristic,
            modules: ctx.files(),
            sections: sections.names().into_iter().map(String::from).collect(),
            memory_count: memories.len(),
            chain_count: chains.len(),
            token_count: outcome.token_count,
            truncated: outcome.truncated,
        };
        (outcome.text, report)
    }

    async fn search_heuristics(&self, input: &str, user_id: Option<&str>) -> Vec<HeuristicHit> {
        if input.is_empty() {
            return Vec::new();
        }
        match self.heuristics.search(input, user_id).await {
            Ok(hits) => {
                tracing::info!(count = hits.len(), "Embedding heuristics found");
                hits
            }
            Err(e) => {
                tracing::warn!(backend = self.heuristics.name(), error = %e, "Heuristic search failed");
                Vec::new()
            }
        }
    }

    async fn greet(&self, request: &AssemblyRequest) -> (String, AssemblyReport) {
        tracing::info!("Brief greeting detected, applying greeting rule");
        let mut report = AssemblyReport {
            greeting: true,
            ..Default::default()
        };

        let template = match self.loader.read_from(ContentRoot::Base, GREETING_TEMPLATE).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                tracing::warn!(file = GREETING_TEMPLATE, "Greeting template not found");
                return (GREETING_FAILURE.to_string(), report);
            }
            Err(e) => {
                tracing::warn!(file = GREETING_TEMPLATE, error = %e, "Greeting template unreadable");
                return (GREETING_FAILURE.to_string(), report);
            }
        };

        let forbidden = match self.loader.read_from(ContentRoot::Base, FORBIDDEN_PATTERNS).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(file = FORBIDDEN_PATTERNS, error = %e, "Forbidden patterns unreadable");
                None
            }
        };
        if forbidden.is_none() {
            tracing::warn!(file = FORBIDDEN_PATTERNS, "Greeting sent without forbidden patterns");
        }

        report.modules.push(GREETING_TEMPLATE.to_string());
        if forbidden.is_some() {
            report.modules.push(FORBIDDEN_PATTERNS.to_string());
        }

        let text = greeting::render_greeting(
            &template,
            forbidden.as_deref(),
            request.user_name.as_deref(),
        );
        (text, report)
    }
}

fn log_selection(level: OpennessLevel, ctx: &AssemblyContext, memories: &[MemoryRecord]) {
    tracing::info!(level = %level, "Openness level");

    let files = ctx.files();
    tracing::info!(count = files.len(), modules = ?files, "Modules included");

    if !memories.is_empty() {
        let digest: Vec<String> = memories
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut summary: String = m
                    .summary
                    .chars()
                    .take(50)
                    .map(|c| if c == '\n' { ' ' } else { c })
                    .collect();
                if m.summary.chars().count() > 50 {
                    summary.push_str("...");
                }
                format!("[{}] {summary} (intensity {})", i + 1, m.intensity_or_zero())
            })
            .collect();
        tracing::info!(count = digest.len(), memories = ?digest, "Memories used");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        BrokenProvider, CharTokenizer, FailingFuzzy, FailingSearch, FailingTokenizer,
        FixedOpenness, ScriptedHeuristics, ScriptedSearch, record, static_root,
    };
    use eco_core::{EmotionalProfile, TechnicalBlock};
    use std::collections::BTreeMap;

    const CATALOG: &str = r#"
[[cognitive]]
file = "eco_heuristica_catastrofe.txt"
triggers = ["tudo errado"]

[[philosophical]]
file = "eco_sentido.txt"
triggers = ["sentido da vida"]

[[stoic]]
file = "eco_aceitacao.txt"
triggers = ["death", "acceptance"]

[[emotional]]
file = "eco_emo_medo.txt"
tags = ["medo"]
related = ["eco_respirar.txt", "ECO_IDENTIDADE.txt"]

[matrix]
always_include = ["ECO_IDENTIDADE.txt"]

[matrix.by_level]
"2" = ["eco_reflexao.txt"]
"3" = ["eco_reflexao.txt", "eco_profundo.txt"]

[matrix.conditions."eco_profundo.txt"]
expression = "nivel == 3"
description = "deep only"

[heuristic_tags]
"eco_heuristica_catastrofe.txt" = ["medo"]
"#;

    fn builder(level: f64) -> ContextBuilder {
        ContextBuilder::new(Catalog::from_toml_str(CATALOG).unwrap())
            .with_root(
                ContentRoot::Base,
                static_root(&[
                    ("ECO_IDENTIDADE.txt", "Você é a Eco."),
                    ("eco_reflexao.txt", "Reflita com calma."),
                    ("eco_profundo.txt", "Vá fundo com cuidado."),
                    ("REGRA_SAUDACAO.txt", "Oi [nome]! Que bom te ver."),
                    ("eco_forbidden_patterns.txt", "Nunca diagnostique."),
                    ("eco_json_trigger_criteria.txt", "Critérios JSON."),
                    ("MEMORIAS_NO_CONTEXTO.txt", "Use memórias com leveza."),
                ]),
            )
            .with_root(
                ContentRoot::Cognitive,
                static_root(&[
                    ("eco_heuristica_catastrofe.txt", "Catastrofização."),
                    ("eco_heuristica_embedding.txt", "Heurística por embedding."),
                ]),
            )
            .with_root(
                ContentRoot::Philosophical,
                static_root(&[("eco_sentido.txt", "Sobre sentido.")]),
            )
            .with_root(
                ContentRoot::Stoic,
                static_root(&[("eco_aceitacao.txt", "Aceitação estoica.")]),
            )
            .with_root(
                ContentRoot::Emotional,
                static_root(&[
                    ("eco_emo_medo.txt", "Acolha o medo."),
                    ("eco_respirar.txt", "Respire."),
                ]),
            )
            .with_openness(Arc::new(FixedOpenness::numeric(level)))
    }

    fn request(message: &str) -> AssemblyRequest {
        AssemblyRequest {
            user_id: Some("u1".into()),
            ..AssemblyRequest::message(message)
        }
    }

    #[tokio::test]
    async fn prompt_ends_with_trailing_directive() {
        let (prompt, report) = builder(2.0)
            .assemble_with_report(&request("hoje foi pesado"))
            .await;
        assert!(!prompt.is_empty());
        assert!(prompt.ends_with(TRAILING_DIRECTIVE));
        assert!(!report.greeting);
        assert_eq!(report.level, Some(OpennessLevel::Reflective));
    }

    #[tokio::test]
    async fn greeting_substitutes_name_and_skips_everything_else() {
        let profile = EmotionalProfile {
            frequent_emotions: BTreeMap::from([("medo".into(), 3)]),
            ..Default::default()
        };
        let req = AssemblyRequest {
            user_name: Some("maria".into()),
            profile: Some(profile),
            ..request("Oi")
        };
        let (prompt, report) = builder(3.0).assemble_with_report(&req).await;
        assert!(prompt.contains("Oi Maria! Que bom te ver."));
        assert!(prompt.contains("[Module eco_forbidden_patterns]\nNunca diagnostique."));
        assert!(!prompt.contains("Consolidated emotional state"));
        assert!(!prompt.contains("Integrated memory narrative"));
        assert!(!prompt.contains(TRAILING_DIRECTIVE));
        assert!(report.greeting);
        assert_eq!(report.level, None);
    }

    #[tokio::test]
    async fn missing_greeting_template_is_the_only_fatal_path() {
        let builder = ContextBuilder::new(Catalog::default());
        assert_eq!(builder.assemble(&request("bom dia")).await, GREETING_FAILURE);
    }

    #[tokio::test]
    async fn level_one_discards_memories_and_skips_retrieval() {
        let search = Arc::new(ScriptedSearch::new(vec![record("x", 9.0, 0.9)]));
        let req = AssemblyRequest {
            memories: Some(vec![record("antiga", 9.0, 0.9).with_tags(["medo"])]),
            ..request("hoje estou bem")
        };
        let (prompt, report) = builder(1.0)
            .with_memory_search(search.clone())
            .assemble_with_report(&req)
            .await;

        assert!(prompt.contains("(heuristic): superficial"));
        assert!(!prompt.to_lowercase().contains("integrated memory narrative"));
        assert_eq!(report.memory_count, 0);
        assert_eq!(search.calls(), 0);
        assert!(!report.modules.contains(&"eco_emo_medo.txt".to_string()));
        assert!(!report.modules.contains(&"eco_reflexao.txt".to_string()));
    }

    #[tokio::test]
    async fn forced_method_overrides_level_one() {
        let req = AssemblyRequest {
            force_method: true,
            technical_block: Some(TechnicalBlock {
                analysis_summary: Some("medo de falhar".into()),
                intensity: Some(9.0),
                tags: vec!["medo".into()],
                ..Default::default()
            }),
            ..request("preciso de ajuda")
        };
        let (prompt, report) = builder(1.0).assemble_with_report(&req).await;
        assert_eq!(report.memory_count, 1);
        assert!(report.modules.contains(&"eco_emo_medo.txt".to_string()));
        assert!(!prompt.contains("Integrated memory narrative"));
    }

    #[tokio::test]
    async fn below_threshold_candidates_never_reach_the_narrative() {
        let memories = Arc::new(ScriptedSearch::new(vec![
            record("perdi o emprego", 8.0, 0.9).with_tags(["medo"]),
            record("ruído antigo", 2.0, 0.2).with_tags(["medo"]),
        ]));
        let (prompt, report) = builder(3.0)
            .with_memory_search(memories)
            .assemble_with_report(&request("estou com medo de tudo"))
            .await;
        assert!(prompt.contains("\"perdi o emprego\""));
        assert!(!prompt.contains("ruído antigo"));
        assert_eq!(report.memory_count, 1);
        assert!(report.modules.contains(&"eco_emo_medo.txt".to_string()));
        assert!(report.modules.contains(&"eco_respirar.txt".to_string()));
    }

    #[tokio::test]
    async fn supplied_memories_skip_retrieval_above_level_one() {
        let search = Arc::new(ScriptedSearch::new(vec![record("buscada", 1.0, 0.9)]));
        let req = AssemblyRequest {
            memories: Some(vec![record("fornecida", 4.0, 0.1)]),
            ..request("pensando na vida")
        };
        let (prompt, report) = builder(2.0)
            .with_memory_search(search.clone())
            .assemble_with_report(&req)
            .await;
        assert_eq!(search.calls(), 0);
        assert_eq!(report.memory_count, 1);
        assert!(prompt.contains("\"fornecida\""));
    }

    #[tokio::test]
    async fn retrieval_needs_a_user_id() {
        let search = Arc::new(ScriptedSearch::new(vec![record("buscada", 1.0, 0.9)]));
        let req = AssemblyRequest::message("pensando na vida");
        let report = builder(2.0)
            .with_memory_search(search.clone())
            .with_chain_search(search.clone())
            .assemble_with_report(&req)
            .await
            .1;
        assert_eq!(search.calls(), 0);
        assert_eq!(report.memory_count, 0);
    }

    #[tokio::test]
    async fn current_turn_is_injected_with_profile() {
        let profile = EmotionalProfile {
            frequent_emotions: BTreeMap::from([("medo".into(), 2)]),
            recurring_themes: BTreeMap::from([("trabalho".into(), 3)]),
            ..Default::default()
        };
        let req = AssemblyRequest {
            profile: Some(profile),
            ..AssemblyRequest::message("meu chefe gritou comigo")
        };
        let (prompt, report) = builder(2.0).assemble_with_report(&req).await;
        assert_eq!(report.memory_count, 1);
        assert!(prompt.contains("themes such as trabalho"));
        assert!(prompt.contains("\"meu chefe gritou comigo\""));
        assert!(report.modules.contains(&"eco_emo_medo.txt".to_string()));
    }

    #[tokio::test]
    async fn chains_are_capped_at_three() {
        let chains = Arc::new(ScriptedSearch::new(
            (1..=4).map(|i| record(&format!("elo {i}"), 0.0, 0.9)).collect(),
        ));
        let (prompt, report) = builder(2.0)
            .with_chain_search(chains)
            .assemble_with_report(&request("continuando aquela conversa"))
            .await;
        assert_eq!(report.chain_count, 3);
        assert!(prompt.contains("• Previous narrative chain: \"elo 3\""));
        assert!(!prompt.contains("elo 4"));
    }

    #[tokio::test]
    async fn modules_load_in_pipeline_order_once_each() {
        let memories = Arc::new(ScriptedSearch::new(vec![
            record("crise", 8.0, 0.9).with_tags(["medo"]),
        ]));
        let (prompt, report) = builder(3.0)
            .with_memory_search(memories)
            .with_heuristic_search(Arc::new(ScriptedHeuristics::new(&[
                "eco_heuristica_embedding.txt",
                "eco_heuristica_catastrofe.txt",
            ])))
            .assemble_with_report(&request(
                "vai dar tudo errado, qual o sentido da vida? death and acceptance",
            ))
            .await;

        assert_eq!(
            report.modules,
            [
                "ECO_IDENTIDADE.txt",
                "eco_reflexao.txt",
                "eco_profundo.txt",
                "eco_heuristica_catastrofe.txt",
                "eco_heuristica_embedding.txt",
                "eco_sentido.txt",
                "eco_aceitacao.txt",
                "eco_emo_medo.txt",
                "eco_respirar.txt",
                "eco_json_trigger_criteria.txt",
                "eco_forbidden_patterns.txt",
                "MEMORIAS_NO_CONTEXTO.txt",
            ]
        );
        assert_eq!(prompt.matches("→ ECO_IDENTIDADE.txt]").count(), 1);
        assert!(prompt.contains("[Module Stoic → eco_aceitacao.txt]\nAceitação estoica."));
        assert!(prompt.contains("[Module Related → eco_respirar.txt]\nRespire."));
        assert_eq!(
            report.heuristic.map(|h| h.file),
            Some("eco_heuristica_catastrofe.txt".to_string())
        );
    }

    #[tokio::test]
    async fn stoic_module_needs_every_trigger() {
        let b = builder(2.0);
        let one = b.assemble_with_report(&request("thinking about death")).await.1;
        assert!(!one.modules.contains(&"eco_aceitacao.txt".to_string()));
        let both = b.assemble_with_report(&request("death and acceptance")).await.1;
        assert!(both.modules.contains(&"eco_aceitacao.txt".to_string()));
    }

    #[tokio::test]
    async fn sections_follow_fixed_order() {
        let profile = EmotionalProfile {
            recurring_themes: BTreeMap::from([("luto".into(), 1)]),
            ..Default::default()
        };
        let req = AssemblyRequest {
            profile: Some(profile),
            ..request("sinto falta dela")
        };
        let (prompt, report) = builder(2.0)
            .with_chain_search(Arc::new(ScriptedSearch::new(vec![record("falamos da avó", 0.0, 0.9)])))
            .assemble_with_report(&req)
            .await;

        let positions: Vec<usize> = [
            "📶 Suggested emotional openness",
            "🗺️ Consolidated emotional state",
            "📜 Integrated memory narrative",
            "📝 Recovering related narrative chains",
            "[Module Base → ECO_IDENTIDADE.txt]",
            "⚠️ INSTRUCTIONS TO THE MODEL",
        ]
        .iter()
        .map(|marker| prompt.find(marker).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert_eq!(
            &report.sections[..4],
            ["openness", "emotional_state", "memory_narrative", "narrative_chains"]
        );
    }

    #[tokio::test]
    async fn empty_request_still_assembles() {
        let b = ContextBuilder::new(Catalog::default());
        let (prompt, report) = b.assemble_with_report(&AssemblyRequest::default()).await;
        assert!(prompt.starts_with("📶 Suggested emotional openness (heuristic): superficial"));
        assert!(prompt.ends_with(TRAILING_DIRECTIVE));
        assert!(report.modules.is_empty());
    }

    #[tokio::test]
    async fn over_budget_prompt_is_truncated() {
        let settings = AssemblySettings {
            budget: TokenBudget {
                max_tokens: 50,
                margin: 10,
            },
            ..AssemblySettings::default()
        };
        let (prompt, report) = builder(2.0)
            .with_tokenizer(Arc::new(CharTokenizer::new()))
            .with_settings(settings)
            .assemble_with_report(&request("algo longo"))
            .await;
        assert!(report.truncated);
        assert_eq!(prompt.chars().count(), 40);
    }

    #[tokio::test]
    async fn tokenizer_failure_keeps_full_prompt() {
        let (prompt, report) = builder(2.0)
            .with_tokenizer(Arc::new(FailingTokenizer))
            .assemble_with_report(&request("algo"))
            .await;
        assert!(prompt.ends_with(TRAILING_DIRECTIVE));
        assert_eq!(report.token_count, None);
    }

    #[tokio::test]
    async fn failing_collaborators_are_soft() {
        let (prompt, report) = builder(3.0)
            .with_memory_search(Arc::new(FailingSearch))
            .with_reference_search(Arc::new(FailingSearch))
            .with_chain_search(Arc::new(FailingSearch))
            .with_heuristic_search(Arc::new(FailingSearch))
            .with_fuzzy_matcher(Arc::new(FailingFuzzy))
            .with_root(ContentRoot::Stoic, Arc::new(BrokenProvider))
            .assemble_with_report(&request("death and acceptance"))
            .await;
        assert!(prompt.ends_with(TRAILING_DIRECTIVE));
        assert_eq!(report.memory_count, 0);
        assert_eq!(report.chain_count, 0);
        assert!(!report.modules.contains(&"eco_aceitacao.txt".to_string()));
    }

    #[tokio::test]
    async fn settings_follow_config() {
        let mut config = AppConfig::default();
        config.retrieval.chain_limit = 1;
        config.budget.max_prompt_tokens = 500;
        let settings = AssemblySettings::from_config(&config);
        assert_eq!(settings.retrieval.chain_limit, 1);
        assert_eq!(settings.budget.max_tokens, 500);
        assert_eq!(settings.closing_modules.len(), 3);
    }
}
