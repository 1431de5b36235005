//! Headline sentiment classification
//!
//! A `PolarityScorer` turns text into a compound score in [-1, 1]; the
//! `SentimentClassifier` buckets that score into three labels. The classifier
//! is built once per process and shared by reference with the ingestors.

mod lexicon;

pub use lexicon::LexiconScorer;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Compound score at or above which text is Positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which text is Negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Three-way sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    /// Bucket a compound score
    pub fn from_compound(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SentimentLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown sentiment label '{}'", s))
    }
}

/// Scores text polarity
pub trait PolarityScorer: Send + Sync {
    /// Compound polarity in [-1, 1]
    fn compound(&self, text: &str) -> f64;
}

/// Maps free text to a `SentimentLabel`
#[derive(Clone)]
pub struct SentimentClassifier {
    scorer: Arc<dyn PolarityScorer>,
}

impl SentimentClassifier {
    pub fn new(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    /// Classifier backed by the built-in lexicon
    pub fn with_lexicon() -> Self {
        Self::new(Arc::new(LexiconScorer::new()))
    }

    /// Classify text; empty or absent text is Neutral and never scored
    pub fn classify(&self, text: Option<&str>) -> SentimentLabel {
        match text {
            Some(t) if !t.is_empty() => SentimentLabel::from_compound(self.scorer.compound(t)),
            _ => SentimentLabel::Neutral,
        }
    }
}

impl fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentClassifier").finish_non_exhaustive()
    }
}
