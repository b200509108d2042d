//! Negativity probe.
//!
//! Lexicon/rule-based polarity in the VADER family: word valences summed
//! with negation flipping and intensifier boosting, normalized to a
//! compound value in [-1, 1]. Only the negative side feeds the drama score;
//! positive or neutral text contributes 0.

use std::collections::HashMap;

/// Normalization constant for the compound score (same role as VADER's
/// alpha: keeps short bursts of strong words from saturating instantly).
const NORMALIZATION_ALPHA: f64 = 15.0;

/// How many tokens back a negator can flip a valence word.
const NEGATION_WINDOW: usize = 3;

/// Dampening applied when a valence is flipped by negation ("not great"
/// is milder than "terrible").
const NEGATION_DAMP: f64 = 0.74;

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "won't", "can't",
    "cannot", "wasn't", "weren't", "shouldn't", "couldn't", "wouldn't", "nor", "without",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("absolutely", 1.5),
    ("completely", 1.4),
    ("totally", 1.4),
    ("utterly", 1.5),
    ("incredibly", 1.5),
    ("deeply", 1.3),
    ("fundamentally", 1.3),
    ("quite", 1.1),
    ("so", 1.2),
];

/// Result of a polarity pass over one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Polarity {
    /// Compound polarity in [-1, 1]; negative means negative tone
    pub compound: f64,
    /// Lexicon words that contributed negatively, in text order
    pub negative_terms: Vec<String>,
    /// Lexicon words that contributed positively, in text order
    pub positive_terms: Vec<String>,
}

impl Polarity {
    fn neutral() -> Self {
        Self {
            compound: 0.0,
            negative_terms: Vec::new(),
            positive_terms: Vec::new(),
        }
    }
}

/// Word-valence sentiment probe.
pub struct SentimentProbe {
    valences: HashMap<&'static str, f64>,
}

impl SentimentProbe {
    /// Builds the probe with the built-in valence lexicon.
    pub fn new() -> Self {
        let mut valences = HashMap::new();
        for (word, valence) in LEXICON {
            valences.insert(*word, *valence);
        }
        Self { valences }
    }

    /// Full polarity analysis of a text.
    pub fn analyze(&self, text: &str) -> Polarity {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Polarity::neutral();
        }

        let mut sum = 0.0;
        let mut negative_terms = Vec::new();
        let mut positive_terms = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.valences.get(token.as_str()) else {
                continue;
            };

            let mut v = valence;
            let window_start = i.saturating_sub(NEGATION_WINDOW);
            for prior in &tokens[window_start..i] {
                if NEGATORS.contains(&prior.as_str()) {
                    v = -v * NEGATION_DAMP;
                    break;
                }
            }
            if i > 0 {
                if let Some(&(_, boost)) = INTENSIFIERS
                    .iter()
                    .find(|(word, _)| *word == tokens[i - 1].as_str())
                {
                    v *= boost;
                }
            }

            if v < 0.0 {
                negative_terms.push(token.clone());
            } else if v > 0.0 {
                positive_terms.push(token.clone());
            }
            sum += v;
        }

        let compound = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        Polarity {
            compound: compound.clamp(-1.0, 1.0),
            negative_terms,
            positive_terms,
        }
    }

    /// Maps negative polarity monotonically onto [0, 10].
    ///
    /// Positive and neutral text map to 0; empty or whitespace-only text
    /// yields 0 rather than an error.
    pub fn score_negativity(&self, text: &str) -> f64 {
        let polarity = self.analyze(text);
        ((-polarity.compound).max(0.0) * 10.0).min(10.0)
    }
}

impl Default for SentimentProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase word tokens; apostrophes stay inside tokens so contractions
/// survive ("don't", "you're").
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().replace('’', "'"))
        .collect()
}

/// Built-in valence lexicon, tuned for developer-forum registers.
const LEXICON: &[(&str, f64)] = &[
    // negative
    ("garbage", -0.8),
    ("trash", -0.8),
    ("terrible", -0.8),
    ("awful", -0.8),
    ("horrible", -0.8),
    ("idiot", -0.9),
    ("idiotic", -0.9),
    ("moron", -0.9),
    ("stupid", -0.8),
    ("dumb", -0.7),
    ("clueless", -0.7),
    ("incompetent", -0.8),
    ("ridiculous", -0.7),
    ("absurd", -0.7),
    ("nonsense", -0.7),
    ("insane", -0.6),
    ("crazy", -0.5),
    ("broken", -0.5),
    ("wrong", -0.5),
    ("bad", -0.5),
    ("worst", -0.8),
    ("worse", -0.5),
    ("useless", -0.7),
    ("pointless", -0.7),
    ("waste", -0.6),
    ("mess", -0.5),
    ("joke", -0.5),
    ("disaster", -0.8),
    ("dangerous", -0.5),
    ("harmful", -0.6),
    ("misleading", -0.6),
    ("dishonest", -0.7),
    ("lazy", -0.5),
    ("sloppy", -0.5),
    ("toxic", -0.7),
    ("hate", -0.8),
    ("angry", -0.6),
    ("furious", -0.8),
    ("annoying", -0.5),
    ("annoyed", -0.5),
    ("frustrating", -0.6),
    ("frustrated", -0.6),
    ("disappointing", -0.6),
    ("disappointed", -0.6),
    ("unacceptable", -0.7),
    ("disagree", -0.4),
    ("reject", -0.4),
    ("oppose", -0.4),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.6),
    ("ignorant", -0.7),
    ("arrogant", -0.7),
    ("insulting", -0.7),
    ("offensive", -0.6),
    ("hostile", -0.7),
    // positive
    ("good", 0.5),
    ("great", 0.7),
    ("excellent", 0.8),
    ("awesome", 0.8),
    ("fantastic", 0.8),
    ("wonderful", 0.8),
    ("amazing", 0.8),
    ("helpful", 0.6),
    ("useful", 0.5),
    ("clean", 0.4),
    ("elegant", 0.6),
    ("solid", 0.5),
    ("nice", 0.5),
    ("thanks", 0.6),
    ("thank", 0.6),
    ("appreciate", 0.6),
    ("appreciated", 0.6),
    ("agree", 0.4),
    ("agreed", 0.4),
    ("correct", 0.4),
    ("clear", 0.3),
    ("robust", 0.5),
    ("love", 0.7),
    ("glad", 0.5),
    ("happy", 0.6),
    ("perfect", 0.7),
    ("reasonable", 0.4),
    ("sensible", 0.4),
    ("fair", 0.4),
    ("constructive", 0.5),
    ("improvement", 0.4),
    ("improved", 0.4),
    ("works", 0.3),
    ("win", 0.5),
];
