pub mod lexicon;
pub mod ollama;

use crate::config::{JesterConfig, ScorerKind};
use crate::domain::ports::scorer::Scorer;
use std::sync::Arc;

use self::lexicon::LexiconScorer;
use self::ollama::OllamaScorer;

pub fn build_scorer(config: &JesterConfig) -> Arc<dyn Scorer> {
    match config.scorer {
        ScorerKind::Lexicon => Arc::new(LexiconScorer),
        ScorerKind::Ollama => Arc::new(OllamaScorer::new(config.ollama_url.clone(), config.ollama_model.clone())),
    }
}
