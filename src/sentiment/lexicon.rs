//! Lexicon-based polarity scorer
//!
//! Valence-aware scoring in the style of VADER: each known token carries a
//! valence on a [-4, 4] scale, adjusted for preceding boosters and negations,
//! contrastive "but" clauses and exclamation emphasis. The summed valence is
//! normalised into a compound score in [-1, 1].

use super::PolarityScorer;
use std::collections::{HashMap, HashSet};

/// Normalisation constant approximating the max expected valence sum
const ALPHA: f64 = 15.0;
/// Valence multiplier applied when a negation precedes a token
const NEGATION_SCALAR: f64 = -0.74;
/// Magnitude added per exclamation mark (max 4)
const EXCLAMATION_BOOST: f64 = 0.292;
const BOOSTER_INCR: f64 = 0.293;
const BOOSTER_DECR: f64 = -0.293;
/// How many preceding tokens can modify a sentiment word
const WINDOW: usize = 3;
const WINDOW_DECAY: [f64; WINDOW] = [1.0, 0.95, 0.9];

const VALENCES: &[(&str, f64)] = &[
    // positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 3.2),
    ("best", 3.2),
    ("better", 1.9),
    ("strong", 2.3),
    ("stronger", 2.2),
    ("gain", 2.0),
    ("gains", 2.0),
    ("gained", 2.0),
    ("win", 2.8),
    ("wins", 2.7),
    ("won", 2.7),
    ("soar", 2.3),
    ("soars", 2.2),
    ("soared", 2.2),
    ("soaring", 2.2),
    ("surge", 1.9),
    ("surges", 1.9),
    ("surged", 1.9),
    ("surging", 1.9),
    ("rally", 1.6),
    ("rallies", 1.6),
    ("rallied", 1.6),
    ("jump", 1.2),
    ("jumps", 1.2),
    ("jumped", 1.2),
    ("rise", 1.2),
    ("rises", 1.2),
    ("rising", 1.2),
    ("boost", 1.7),
    ("boosts", 1.7),
    ("boosted", 1.6),
    ("growth", 1.6),
    ("grow", 1.3),
    ("grows", 1.3),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 1.9),
    ("beat", 1.4),
    ("beats", 1.4),
    ("bullish", 2.2),
    ("upgrade", 1.7),
    ("upgraded", 1.7),
    ("outperform", 1.8),
    ("outperforms", 1.8),
    ("success", 2.7),
    ("successful", 2.8),
    ("optimistic", 2.2),
    ("optimism", 2.0),
    ("confident", 2.2),
    ("confidence", 2.3),
    ("innovative", 2.0),
    ("breakthrough", 2.2),
    ("recover", 1.4),
    ("recovers", 1.4),
    ("recovery", 1.4),
    ("rebound", 1.4),
    ("rebounds", 1.4),
    ("positive", 2.6),
    ("love", 3.2),
    ("like", 1.5),
    ("happy", 2.7),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("impressive", 2.3),
    ("benefit", 2.0),
    ("benefits", 1.6),
    ("opportunity", 1.8),
    ("approve", 1.6),
    ("approved", 1.8),
    ("approval", 2.2),
    ("top", 0.8),
    ("record-breaking", 2.0),
    ("upbeat", 1.7),
    ("thrive", 2.4),
    ("thrives", 2.3),
    ("wow", 2.8),
    // negative
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("weak", -1.9),
    ("weaker", -1.9),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lose", -1.7),
    ("loses", -1.3),
    ("lost", -1.3),
    ("fall", -1.1),
    ("falls", -1.1),
    ("fell", -1.1),
    ("falling", -1.1),
    ("drop", -1.1),
    ("drops", -1.1),
    ("dropped", -1.1),
    ("plunge", -2.2),
    ("plunges", -2.2),
    ("plunged", -2.2),
    ("plummet", -2.5),
    ("plummets", -2.5),
    ("crash", -2.6),
    ("crashes", -2.6),
    ("crashed", -2.6),
    ("slump", -1.8),
    ("slumps", -1.8),
    ("tumble", -1.7),
    ("tumbles", -1.7),
    ("decline", -1.4),
    ("declines", -1.4),
    ("declined", -1.4),
    ("bearish", -2.2),
    ("downgrade", -1.7),
    ("downgraded", -1.7),
    ("miss", -1.1),
    ("misses", -1.1),
    ("missed", -1.2),
    ("fail", -2.5),
    ("fails", -2.3),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fear", -2.2),
    ("fears", -2.1),
    ("worry", -1.9),
    ("worries", -1.9),
    ("concern", -1.3),
    ("concerns", -1.3),
    ("risk", -1.1),
    ("risks", -1.1),
    ("risky", -1.4),
    ("lawsuit", -1.5),
    ("sue", -1.7),
    ("sued", -1.7),
    ("fraud", -2.8),
    ("scandal", -2.6),
    ("probe", -1.0),
    ("recall", -1.2),
    ("recalls", -1.2),
    ("crisis", -3.1),
    ("trouble", -1.9),
    ("problem", -1.7),
    ("problems", -1.7),
    ("warning", -1.4),
    ("warns", -1.4),
    ("layoffs", -1.9),
    ("cut", -1.1),
    ("cuts", -1.1),
    ("disappoint", -2.3),
    ("disappointing", -2.2),
    ("disappointed", -1.9),
    ("negative", -2.7),
    ("volatile", -0.9),
    ("uncertainty", -1.4),
    ("sell-off", -1.6),
    ("selloff", -1.6),
    ("bankrupt", -2.6),
    ("bankruptcy", -2.6),
    ("hate", -2.7),
    ("angry", -2.3),
    ("sad", -2.1),
    ("terrible", -2.5),
    ("awful", -2.0),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "nowhere", "cannot",
    "cant", "dont", "doesnt", "didnt", "wont", "wouldnt", "shouldnt", "couldnt", "isnt",
    "arent", "wasnt", "werent", "hardly", "barely", "without",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOSTER_INCR),
    ("extremely", BOOSTER_INCR),
    ("really", BOOSTER_INCR),
    ("highly", BOOSTER_INCR),
    ("hugely", BOOSTER_INCR),
    ("massively", BOOSTER_INCR),
    ("significantly", BOOSTER_INCR),
    ("sharply", BOOSTER_INCR),
    ("incredibly", BOOSTER_INCR),
    ("most", BOOSTER_INCR),
    ("more", BOOSTER_INCR),
    ("slightly", BOOSTER_DECR),
    ("somewhat", BOOSTER_DECR),
    ("marginally", BOOSTER_DECR),
    ("partly", BOOSTER_DECR),
    ("kinda", BOOSTER_DECR),
    ("less", BOOSTER_DECR),
];

/// VADER-style lexicon scorer
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    negations: HashSet<String>,
    boosters: HashMap<String, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().map(|(w, v)| (w.to_string(), *v)).collect(),
            negations: NEGATIONS.iter().map(|w| w.to_string()).collect(),
            boosters: BOOSTERS.iter().map(|(w, v)| (w.to_string(), *v)).collect(),
        }
    }

    /// Add or replace a word valence
    #[cfg(test)]
    pub fn add_word(&mut self, word: &str, valence: f64) {
        self.valences.insert(word.to_lowercase(), valence);
    }

    fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token) || token.ends_with("n't")
    }

    fn token_valence(&self, tokens: &[String], i: usize) -> f64 {
        let Some(&base) = self.valences.get(&tokens[i]) else {
            return 0.0;
        };

        let mut valence = base;
        let preceding = tokens[..i].iter().rev().take(WINDOW);
        for (distance, prev) in preceding.clone().enumerate() {
            if let Some(&boost) = self.boosters.get(prev) {
                let scaled = boost * WINDOW_DECAY[distance];
                valence += if valence > 0.0 { scaled } else { -scaled };
            }
        }

        if preceding.into_iter().any(|prev| self.is_negation(prev)) {
            valence *= NEGATION_SCALAR;
        }

        valence
    }
}

impl PolarityScorer for LexiconScorer {
    fn compound(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i))
            .collect();

        // contrast: "X but Y" weights Y over X
        if let Some(pivot) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= 0.5;
                } else if i > pivot {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }

        let emphasis = text.matches('!').count().min(4) as f64 * EXCLAMATION_BOOST;
        sum += if sum > 0.0 { emphasis } else { -emphasis };

        normalize(sum)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            // headlines often carry typographic apostrophes
            raw.replace(['\u{2019}', '\u{2018}'], "'")
                .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_words_score_zero() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.compound("Palantir to report earnings on Monday"), 0.0);
        assert_eq!(scorer.compound(""), 0.0);
    }

    #[test]
    fn test_single_word_normalisation() {
        let scorer = LexiconScorer::new();
        let expected = 2.2 / (2.2f64 * 2.2 + 15.0).sqrt();
        let score = scorer.compound("Tesla stock soars on record deliveries");
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("results were good") > 0.05);
        assert!(scorer.compound("results were not good") < -0.05);
        assert!(scorer.compound("results weren't good") < -0.05);
    }

    #[test]
    fn test_boosters_scale_magnitude() {
        let scorer = LexiconScorer::new();
        let plain = scorer.compound("good quarter");
        assert!(scorer.compound("very good quarter") > plain);
        assert!(scorer.compound("slightly good quarter") < plain);
    }

    #[test]
    fn test_but_weights_second_clause() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("revenue was good but margins were terrible") < 0.0);
    }

    #[test]
    fn test_exclamation_emphasis() {
        let scorer = LexiconScorer::new();
        assert!(scorer.compound("great quarter!!!") > scorer.compound("great quarter"));
        assert_eq!(scorer.compound("earnings tomorrow!!!"), 0.0);
    }

    #[test]
    fn test_compound_is_bounded() {
        let scorer = LexiconScorer::new();
        let text = "great excellent best love wow great excellent best love wow!!!!";
        let score = scorer.compound(text);
        assert!(score > 0.9 && score <= 1.0);
        let score = scorer.compound("worst crisis fraud crash terrible awful");
        assert!(score < -0.9 && score >= -1.0);
    }

    #[test]
    fn test_curly_apostrophe_negates() {
        let scorer = LexiconScorer::new();
        let straight = scorer.compound("Tesla isn't a great buy");
        let curly = scorer.compound("Tesla isn\u{2019}t a great buy");
        assert!(straight < -0.05);
        assert_eq!(curly, straight);
        assert_eq!(tokenize("isn\u{2019}t"), vec!["isn't"]);
    }

    #[test]
    fn test_add_word() {
        let mut scorer = LexiconScorer::new();
        assert_eq!(scorer.compound("robotaxi"), 0.0);
        scorer.add_word("Robotaxi", 1.0);
        assert!(scorer.compound("robotaxi") > 0.05);
    }
}
