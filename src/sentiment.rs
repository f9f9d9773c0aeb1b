//! Lexicon-based sentiment scoring.
//!
//! Scores come from VADER's compound polarity (a value in `[-1, 1]`) and are
//! bucketed into [`Sentiment`] labels:
//!
//! | Compound score | Label |
//! |----------------|-------|
//! | `>= 0.05` | Positive |
//! | `<= -0.05` | Negative |
//! | otherwise | Neutral |
//!
//! Scoring failures never propagate: [`analyze_sentiment`] falls back to
//! `Neutral`.

use crate::error::{PipelineError, Result};
use crate::models::Sentiment;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};
use vader_sentiment::SentimentIntensityAnalyzer;

pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Produces a compound polarity score for a piece of text.
pub trait SentimentScorer {
    fn compound(&self, text: &str) -> Result<f64>;
}

/// VADER scorer backed by the `vader_sentiment` lexicon.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VaderScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaderScorer").finish_non_exhaustive()
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> Result<f64> {
        let scores = catch_unwind(AssertUnwindSafe(|| self.analyzer.polarity_scores(text)))
            .map_err(|_| PipelineError::Sentiment("lexicon scorer panicked".to_string()))?;

        match scores.get("compound").copied() {
            Some(score) if score.is_finite() => Ok(score),
            Some(score) => Err(PipelineError::Sentiment(format!(
                "non-finite compound score {score}"
            ))),
            None => Err(PipelineError::Sentiment("no compound score".to_string())),
        }
    }
}

/// Map a compound score to its label. Both thresholds are inclusive.
pub fn classify_score(score: f64) -> Sentiment {
    if score >= POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if score <= NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Score `text` and classify it, defaulting to `Neutral` on any failure.
pub fn analyze_sentiment<S: SentimentScorer + ?Sized>(scorer: &S, text: &str) -> Sentiment {
    match scorer.compound(text) {
        Ok(score) => {
            let label = classify_score(score);
            debug!(score, %label, "Scored sentiment");
            label
        }
        Err(e) => {
            warn!(error = %e, "Error analyzing sentiment; defaulting to Neutral");
            Sentiment::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingScorer;

    impl SentimentScorer for FailingScorer {
        fn compound(&self, _text: &str) -> Result<f64> {
            Err(PipelineError::Sentiment("boom".to_string()))
        }
    }

    #[test]
    fn test_classify_boundaries_inclusive() {
        assert_eq!(classify_score(0.05), Sentiment::Positive);
        assert_eq!(classify_score(-0.05), Sentiment::Negative);
        assert_eq!(classify_score(0.0), Sentiment::Neutral);
        assert_eq!(classify_score(0.0499), Sentiment::Neutral);
        assert_eq!(classify_score(-0.0499), Sentiment::Neutral);
        assert_eq!(classify_score(1.0), Sentiment::Positive);
        assert_eq!(classify_score(-1.0), Sentiment::Negative);
    }

    #[test]
    fn test_failure_defaults_to_neutral() {
        assert_eq!(analyze_sentiment(&FailingScorer, "anything"), Sentiment::Neutral);
    }

    #[test]
    fn test_vader_positive_text() {
        let scorer = VaderScorer::new();
        let label = analyze_sentiment(
            &scorer,
            "The company reported great profits and excellent growth. Investors are happy.",
        );
        assert_eq!(label, Sentiment::Positive);
    }

    #[test]
    fn test_vader_negative_text() {
        let scorer = VaderScorer::new();
        let label = analyze_sentiment(
            &scorer,
            "The factory fire was a terrible disaster and workers are angry about the awful losses.",
        );
        assert_eq!(label, Sentiment::Negative);
    }

    #[test]
    fn test_vader_score_in_range() {
        let scorer = VaderScorer::new();
        let score = scorer.compound("The board meets on Tuesday.").unwrap();
        assert!((-1.0..=1.0).contains(&score));
    }
}
