//! Word-weight sentiment scorer for short social posts.

use crate::domain::entities::item::Item;
use crate::domain::error::DomainError;
use crate::domain::ports::scorer::Scorer;

/// Lowercase single words. Positive weights in `(0.0, 1.0]`, negative in `[-1.0, 0.0)`.
const LEXICON: &[(&str, f64)] = &[
    ("good", 0.3),
    ("great", 0.4),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("nice", 0.3),
    ("happy", 0.4),
    ("excited", 0.4),
    ("bullish", 0.5),
    ("moon", 0.4),
    ("win", 0.4),
    ("winning", 0.4),
    ("agree", 0.2),
    ("thanks", 0.2),
    ("helpful", 0.3),
    ("recommend", 0.4),
    ("fun", 0.3),
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("hated", -0.6),
    ("angry", -0.5),
    ("sad", -0.4),
    ("bearish", -0.5),
    ("crash", -0.6),
    ("scam", -0.7),
    ("dump", -0.4),
    ("fail", -0.4),
    ("failed", -0.4),
    ("broken", -0.4),
    ("problem", -0.3),
    ("disappointed", -0.5),
    ("useless", -0.5),
    ("lose", -0.4),
    ("losing", -0.4),
];

const NEGATORS: &[&str] = &["not", "no", "never", "dont", "don't", "isnt", "isn't", "wasnt", "wasn't", "aint"];

/// Sum of word weights clamped to `[-1.0, 1.0]`. A negator flips the weight of the
/// word right after it.
pub fn lexicon_score(text: &str) -> f64 {
    let mut score = 0.0_f64;
    let mut negate = false;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic() && c != '\'')
            .to_lowercase();
        if NEGATORS.contains(&w.as_str()) {
            negate = true;
            continue;
        }
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex, _)| *lex == w) {
            score += if negate { -weight } else { weight };
        }
        negate = false;
    }
    score.clamp(-1.0, 1.0)
}

/// Deterministic default scorer. Maps the lexicon score onto `0..=100`, 50 being neutral.
/// Thread context is not used.
pub struct LexiconScorer;

#[async_trait::async_trait]
impl Scorer for LexiconScorer {
    async fn score(&self, item: &Item, _context: &[&Item]) -> Result<f64, DomainError> {
        Ok((lexicon_score(&item.text) + 1.0) * 50.0)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
