//! Lexicon sentiment scoring
//!
//! First stage of the classifier: a static, language-general valence lexicon
//! producing a compound score in [-1, 1]. Coarse by nature; the online word
//! model only takes over where this stage is ambiguous.

use std::collections::HashMap;

/// Normalization constant for the compound score (`s / sqrt(s² + α)`)
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Valence multiplier applied when a negator precedes a sentiment word
const NEGATION_SCALAR: f64 = -0.74;

/// How many preceding tokens are checked for a negator
const NEGATION_WINDOW: usize = 3;

/// Valence shift contributed by a booster/dampener
const BOOSTER_INCREMENT: f64 = 0.293;

/// Scores text sentiment
///
/// Implementations must be pure: the same text always yields the same score.
pub trait SentimentScorer: Send + Sync {
    /// Compound sentiment in [-1, 1]
    fn compound(&self, text: &str) -> f64;

    /// Scorer name for logging
    fn name(&self) -> &str;
}

/// Built-in English/Portuguese valence lexicon
const VALENCES: &[(&str, f64)] = &[
    // English positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("love", 3.2),
    ("loved", 2.9),
    ("like", 1.5),
    ("nice", 1.8),
    ("happy", 2.7),
    ("best", 3.2),
    ("better", 1.9),
    ("beautiful", 2.9),
    ("wonderful", 2.7),
    ("fantastic", 2.6),
    ("fun", 2.3),
    ("win", 2.8),
    ("thanks", 1.9),
    ("thank", 1.5),
    ("cool", 1.3),
    ("perfect", 2.7),
    ("glad", 2.0),
    ("enjoy", 2.2),
    ("support", 1.7),
    ("yes", 1.7),
    // English negative
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("hate", -2.7),
    ("hated", -3.2),
    ("worst", -3.1),
    ("worse", -2.1),
    ("sad", -2.1),
    ("angry", -2.3),
    ("ugly", -2.3),
    ("stupid", -2.4),
    ("boring", -1.3),
    ("fail", -2.5),
    ("failed", -2.3),
    ("lose", -1.3),
    ("spam", -1.5),
    ("scam", -2.5),
    ("fake", -2.1),
    ("disgusting", -2.4),
    ("broken", -2.0),
    ("no", -1.2),
    // Portuguese positive
    ("bom", 1.9),
    ("boa", 1.9),
    ("ótimo", 3.0),
    ("otimo", 3.0),
    ("ótima", 3.0),
    ("excelente", 2.7),
    ("incrível", 2.8),
    ("incrivel", 2.8),
    ("lindo", 2.9),
    ("linda", 2.9),
    ("amo", 3.2),
    ("adoro", 3.0),
    ("feliz", 2.7),
    ("melhor", 3.0),
    ("legal", 1.8),
    ("obrigado", 1.9),
    ("obrigada", 1.9),
    ("parabéns", 2.4),
    ("parabens", 2.4),
    ("sucesso", 2.7),
    // Portuguese negative
    ("ruim", -2.5),
    ("péssimo", -3.0),
    ("pessimo", -3.0),
    ("horrível", -2.5),
    ("horrivel", -2.5),
    ("odeio", -3.0),
    ("pior", -3.1),
    ("triste", -2.1),
    ("raiva", -2.3),
    ("feio", -2.3),
    ("lixo", -2.6),
    ("chato", -1.5),
    ("golpe", -2.5),
    ("mentira", -2.2),
    ("nojo", -2.4),
];

/// Words that flip the polarity of a following sentiment word
const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "dont",
    "don't", "isnt", "isn't", "wasnt", "wasn't", "aint", "ain't", "não", "nao", "nunca",
    "nem", "jamais", "nada",
];

/// Intensity modifiers (positive = booster, negative = dampener)
const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOSTER_INCREMENT),
    ("really", BOOSTER_INCREMENT),
    ("extremely", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT),
    ("super", BOOSTER_INCREMENT),
    ("muito", BOOSTER_INCREMENT),
    ("muita", BOOSTER_INCREMENT),
    ("bem", BOOSTER_INCREMENT),
    ("slightly", -BOOSTER_INCREMENT),
    ("somewhat", -BOOSTER_INCREMENT),
    ("pouco", -BOOSTER_INCREMENT),
];

/// Valence-lexicon scorer with negation and booster handling
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::with_entries(VALENCES.iter().map(|(w, v)| (w.to_string(), *v)))
    }

    /// Build a scorer over a custom lexicon (words are matched lowercased)
    pub fn with_entries(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            valences: entries
                .into_iter()
                .map(|(w, v)| (w.to_lowercase(), v))
                .collect(),
        }
    }

    fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    /// Sum of adjusted valences before normalization
    fn raw_sum(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| !w.is_empty())
            .collect();

        let mut sum = 0.0;
        for (i, word) in words.iter().enumerate() {
            let Some(mut valence) = self.valence(word) else {
                continue;
            };

            if i > 0 {
                if let Some(boost) = booster(words[i - 1]) {
                    valence += if valence > 0.0 { boost } else { -boost };
                }
            }

            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if words[window_start..i].iter().any(|w| is_negator(w)) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }
        sum
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> f64 {
        normalize_compound(self.raw_sum(text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word)
}

fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, increment)| *increment)
}

/// Map an unbounded valence sum into [-1, 1]
pub fn normalize_compound(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_and_empty_text_score_zero() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.compound(""), 0.0);
        assert_eq!(scorer.compound("the table is wooden"), 0.0);
    }

    #[test]
    fn test_polarity_of_simple_sentences() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("what a great day") >= 0.05);
        assert!(scorer.compound("this is terrible") <= -0.05);
        assert!(scorer.compound("que dia ótimo") >= 0.05);
        assert!(scorer.compound("que serviço ruim") <= -0.05);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("good") > 0.0);
        assert!(scorer.compound("not good") < 0.0);
        assert!(scorer.compound("não é bom") < 0.0);
    }

    #[test]
    fn test_booster_strengthens() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("very good") > scorer.compound("good"));
        assert!(scorer.compound("very bad") < scorer.compound("bad"));
    }

    #[test]
    fn test_compound_is_bounded() {
        let scorer = LexiconScorer::new();
        let gushing = "love ".repeat(200);
        let c = scorer.compound(&gushing);
        assert!(c <= 1.0 && c > 0.99);
    }

    #[test]
    fn test_custom_lexicon() {
        let scorer = LexiconScorer::with_entries(vec![("Rustacean".to_string(), 4.0)]);
        assert!(scorer.compound("hello rustacean") > 0.7);
        assert_eq!(scorer.compound("great"), 0.0);
    }

    #[test]
    fn test_normalize_compound() {
        assert_eq!(normalize_compound(0.0), 0.0);
        let c = normalize_compound(1.0);
        assert!((c - 1.0 / 16f64.sqrt()).abs() < 1e-12);
        assert!(normalize_compound(-3.0) < 0.0);
    }
}
