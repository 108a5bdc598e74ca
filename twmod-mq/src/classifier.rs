//! Two-stage tweet classifier
//!
//! Stage 1: lexicon compound score over the normalized text.
//! Stage 2: the online word-weight model, consulted only when stage 1 is
//! inside the ambiguous band (-0.05, 0.05).

use std::sync::Arc;

use serde::Serialize;

use crate::lexicon::SentimentScorer;
use crate::model::{normalize, Polarity, WordWeightModel};

/// Compound score at or above which a tweet is auto-approved
pub const APPROVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below which a tweet is auto-rejected
pub const REJECT_THRESHOLD: f64 = -0.05;

/// Destination queue for a tweet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Pending => write!(f, "pending"),
            Route::Approved => write!(f, "approved"),
            Route::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<Polarity> for Route {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Pos => Route::Approved,
            Polarity::Neg => Route::Rejected,
            Polarity::Neu => Route::Pending,
        }
    }
}

/// Routes tweets given the session's adaptive flag and word model
#[derive(Clone)]
pub struct Classifier {
    scorer: Arc<dyn SentimentScorer>,
}

impl Classifier {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    /// Decide where `text` goes
    ///
    /// Pure in `(text, adaptive_enabled, scorer output, model state)`.
    pub fn classify(&self, text: &str, adaptive_enabled: bool, model: &WordWeightModel) -> Route {
        if !adaptive_enabled {
            return Route::Pending;
        }

        let compound = self.scorer.compound(&normalize(text));
        if compound >= APPROVE_THRESHOLD {
            Route::Approved
        } else if compound <= REJECT_THRESHOLD {
            Route::Rejected
        } else {
            model.score(text).into()
        }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("scorer", &self.scorer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconScorer;
    use crate::model::Sign;

    /// Scorer returning a fixed compound for every text
    struct FixedScorer(f64);

    impl SentimentScorer for FixedScorer {
        fn compound(&self, _text: &str) -> f64 {
            self.0
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn classifier(compound: f64) -> Classifier {
        Classifier::new(Arc::new(FixedScorer(compound)))
    }

    #[test]
    fn test_adaptive_off_always_pending() {
        let model = WordWeightModel::default();
        assert_eq!(classifier(0.9).classify("great", false, &model), Route::Pending);
        assert_eq!(classifier(-0.9).classify("awful", false, &model), Route::Pending);
    }

    #[test]
    fn test_lexicon_wins_regardless_of_model() {
        let mut model = WordWeightModel::new(1.0);
        model.reinforce("text", Sign::Negative);
        assert_eq!(classifier(0.5).classify("text", true, &model), Route::Approved);

        let mut model = WordWeightModel::new(1.0);
        model.reinforce("text", Sign::Positive);
        assert_eq!(classifier(-0.5).classify("text", true, &model), Route::Rejected);
    }

    #[test]
    fn test_lexicon_thresholds_are_inclusive() {
        let model = WordWeightModel::default();
        assert_eq!(classifier(0.05).classify("x", true, &model), Route::Approved);
        assert_eq!(classifier(-0.05).classify("x", true, &model), Route::Rejected);
        assert_eq!(classifier(0.049).classify("x", true, &model), Route::Pending);
    }

    #[test]
    fn test_ambiguous_lexicon_falls_back_to_model() {
        let mut model = WordWeightModel::new(0.6);
        model.reinforce("promo", Sign::Positive);
        assert_eq!(classifier(0.0).classify("promo", true, &model), Route::Approved);

        model.reinforce("scam", Sign::Negative);
        assert_eq!(classifier(0.0).classify("scam", true, &model), Route::Rejected);
        assert_eq!(classifier(0.0).classify("unknown", true, &model), Route::Pending);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::new(Arc::new(LexiconScorer::new()));
        let mut model = WordWeightModel::new(0.3);
        model.reinforce("rustconf tickets", Sign::Positive);

        let text = "rustconf tickets on sale #rust";
        let first = classifier.classify(text, true, &model);
        for _ in 0..10 {
            assert_eq!(classifier.classify(text, true, &model), first);
        }
    }
}
