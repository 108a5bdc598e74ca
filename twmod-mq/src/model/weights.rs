//! Online word-weight model
//!
//! Maps normalized tokens to real-valued weights learned from human
//! approve/reject overrides. Absent tokens weigh 0.
//!
//! Weights are not decayed, normalized or bounded: reinforcing the same token
//! repeatedly grows its weight without limit.

use std::collections::HashMap;

use super::tokenizer::tokenize;

/// Mean weight above which text scores `Pos` (strict)
pub const POSITIVE_THRESHOLD: f64 = 0.5;

/// Mean weight below which text scores `Neg` (strict)
pub const NEGATIVE_THRESHOLD: f64 = -0.5;

/// Default per-token update size
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Model verdict for one text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Pos,
    Neg,
    Neu,
}

/// Direction of a reinforcement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn as_f64(&self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Token → weight map with a fixed learning rate
#[derive(Debug, Clone, PartialEq)]
pub struct WordWeightModel {
    weights: HashMap<String, f64>,
    learning_rate: f64,
}

impl WordWeightModel {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            weights: HashMap::new(),
            learning_rate,
        }
    }

    /// Rebuild a model from a persisted snapshot
    pub fn from_snapshot(weights: HashMap<String, f64>, learning_rate: f64) -> Self {
        Self {
            weights,
            learning_rate,
        }
    }

    /// Classify `text` by the mean weight of its tokens
    pub fn score(&self, text: &str) -> Polarity {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Polarity::Neu;
        }

        let sum: f64 = tokens.iter().map(|t| self.weight(t)).sum();
        let mean = sum / tokens.len() as f64;

        if mean > POSITIVE_THRESHOLD {
            Polarity::Pos
        } else if mean < NEGATIVE_THRESHOLD {
            Polarity::Neg
        } else {
            Polarity::Neu
        }
    }

    /// Move every token of `text` one learning step in the direction of `sign`
    pub fn reinforce(&mut self, text: &str, sign: Sign) {
        let delta = self.learning_rate * sign.as_f64();
        for token in tokenize(text) {
            *self.weights.entry(token).or_insert(0.0) += delta;
        }
    }

    /// Weight of a single token (0 when never reinforced)
    pub fn weight(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    /// Replace all weights, keeping the learning rate
    pub fn replace(&mut self, weights: HashMap<String, f64>) {
        self.weights = weights;
    }

    /// Copy of every learned weight
    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.weights.clone()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for WordWeightModel {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_reinforce_twice_accumulates() {
        let mut model = WordWeightModel::new(0.1);
        model.reinforce("great day", Sign::Positive);
        model.reinforce("great day", Sign::Positive);

        assert!(approx(model.weight("great"), 0.2));
        assert!(approx(model.weight("day"), 0.2));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_absent_token_weighs_zero() {
        let model = WordWeightModel::default();
        assert_eq!(model.weight("never-seen"), 0.0);
        assert!(model.is_empty());
    }

    #[test]
    fn test_negative_reinforcement() {
        let mut model = WordWeightModel::new(0.25);
        model.reinforce("awful", Sign::Negative);
        model.reinforce("awful", Sign::Negative);
        model.reinforce("awful", Sign::Negative);
        assert!(approx(model.weight("awful"), -0.75));
        assert_eq!(model.score("awful"), Polarity::Neg);
    }

    #[test]
    fn test_score_uses_mean_over_all_tokens() {
        let mut weights = HashMap::new();
        weights.insert("love".to_string(), 2.0);
        let model = WordWeightModel::from_snapshot(weights, 0.1);

        // 2.0 / 1 token
        assert_eq!(model.score("love"), Polarity::Pos);
        // 2.0 / 4 tokens = 0.5, not strictly above the threshold
        assert_eq!(model.score("love it or not"), Polarity::Neu);
        // 2.0 / 3 tokens > 0.5
        assert_eq!(model.score("love this thing"), Polarity::Pos);
    }

    #[test]
    fn test_exact_thresholds_are_neutral() {
        let mut weights = HashMap::new();
        weights.insert("up".to_string(), 0.5);
        weights.insert("down".to_string(), -0.5);
        let model = WordWeightModel::from_snapshot(weights, 0.1);

        assert_eq!(model.score("up"), Polarity::Neu);
        assert_eq!(model.score("down"), Polarity::Neu);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        let model = WordWeightModel::default();
        assert_eq!(model.score(""), Polarity::Neu);
        assert_eq!(model.score("@someone http://link"), Polarity::Neu);
    }

    #[test]
    fn test_weights_are_unbounded() {
        let mut model = WordWeightModel::new(1.0);
        for _ in 0..100 {
            model.reinforce("spam", Sign::Negative);
        }
        assert!(approx(model.weight("spam"), -100.0));
    }

    #[test]
    fn test_snapshot_round_trips_through_from_snapshot() {
        let mut model = WordWeightModel::new(0.1);
        model.reinforce("hello world", Sign::Positive);

        let restored = WordWeightModel::from_snapshot(model.snapshot(), model.learning_rate());
        assert_eq!(restored, model);
    }
}
