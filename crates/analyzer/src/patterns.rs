//! Lexical pattern catalog.
//!
//! Every linguistic cue the dimension scorers look for lives here as data:
//! a category, a subcategory, a matcher, and a contribution weight. Adding a
//! new cue is a table edit, not a code change. Matching is case-insensitive
//! and token-boundary aware, so "NACK" never fires inside "backpack".

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Version of the built-in catalog. Persisted alongside scores so reruns
/// can be keyed by (message set, catalog version).
pub const CATALOG_VERSION: &str = "1.0.0";

/// Matcher categories consumed by the dimension scorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    FaceThreatening,
    Hedging,
    PositivePoliteness,
    NegativePoliteness,
    IndirectAggression,
    Directive,
    Expressive,
    Accusation,
    Challenge,
    EvidenceCitation,
    Acknowledgment,
    ConstructiveProposal,
    Dismissive,
    AdHominem,
    Strawman,
    AppealToAuthority,
    MovingGoalposts,
    Whataboutism,
    PileOnMarker,
    StonewallingMarker,
    ThreatMarker,
}

impl PatternCategory {
    /// Returns all category variants.
    pub fn all() -> &'static [PatternCategory] {
        use PatternCategory::*;
        &[
            FaceThreatening,
            Hedging,
            PositivePoliteness,
            NegativePoliteness,
            IndirectAggression,
            Directive,
            Expressive,
            Accusation,
            Challenge,
            EvidenceCitation,
            Acknowledgment,
            ConstructiveProposal,
            Dismissive,
            AdHominem,
            Strawman,
            AppealToAuthority,
            MovingGoalposts,
            Whataboutism,
            PileOnMarker,
            StonewallingMarker,
            ThreatMarker,
        ]
    }

    /// Returns the lowercase identifier used in evidence labels.
    pub fn as_str(&self) -> &'static str {
        use PatternCategory::*;
        match self {
            FaceThreatening => "face_threatening",
            Hedging => "hedging",
            PositivePoliteness => "positive_politeness",
            NegativePoliteness => "negative_politeness",
            IndirectAggression => "indirect_aggression",
            Directive => "directive",
            Expressive => "expressive",
            Accusation => "accusation",
            Challenge => "challenge",
            EvidenceCitation => "evidence_citation",
            Acknowledgment => "acknowledgment",
            ConstructiveProposal => "constructive_proposal",
            Dismissive => "dismissive",
            AdHominem => "ad_hominem",
            Strawman => "strawman",
            AppealToAuthority => "appeal_to_authority",
            MovingGoalposts => "moving_goalposts",
            Whataboutism => "whataboutism",
            PileOnMarker => "pile_on_marker",
            StonewallingMarker => "stonewalling_marker",
            ThreatMarker => "threat_marker",
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a catalog row matches text.
enum MatcherSpec {
    /// Literal phrases, matched whole-word and case-insensitively.
    Phrases(&'static [&'static str]),
    /// A raw regex body; responsible for its own boundaries.
    Raw(&'static str),
}

/// One row of the catalog source table.
struct PatternSpec {
    subcategory: &'static str,
    matcher: MatcherSpec,
    weight: f64,
}

const fn phrases(subcategory: &'static str, list: &'static [&'static str], weight: f64) -> PatternSpec {
    PatternSpec {
        subcategory,
        matcher: MatcherSpec::Phrases(list),
        weight,
    }
}

const fn raw(subcategory: &'static str, pattern: &'static str, weight: f64) -> PatternSpec {
    PatternSpec {
        subcategory,
        matcher: MatcherSpec::Raw(pattern),
        weight,
    }
}

/// A compiled catalog entry.
pub struct PatternEntry {
    pub category: PatternCategory,
    pub subcategory: &'static str,
    pub weight: f64,
    regex: Regex,
}

/// A single occurrence of a pattern in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub category: PatternCategory,
    pub subcategory: &'static str,
    pub weight: f64,
    /// Byte range of the match in the input text
    pub span: (usize, usize),
    /// The matched text itself
    pub excerpt: String,
}

/// The read-only pattern catalog.
pub struct PatternLibrary {
    entries: HashMap<PatternCategory, Vec<PatternEntry>>,
    version: &'static str,
}

impl PatternLibrary {
    /// Builds the built-in catalog.
    pub fn new() -> Self {
        let mut entries: HashMap<PatternCategory, Vec<PatternEntry>> = HashMap::new();
        for (category, specs) in catalog() {
            let compiled = specs
                .iter()
                .flat_map(|spec| compile_spec(category, spec))
                .collect();
            entries.insert(category, compiled);
        }
        Self {
            entries,
            version: CATALOG_VERSION,
        }
    }

    /// Returns the catalog version string.
    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Checks that every category has at least one entry.
    ///
    /// An empty category silently zeroes a dimension for every message, so
    /// this is checked once at analyzer startup and treated as fatal.
    pub fn missing_categories(&self) -> Vec<PatternCategory> {
        PatternCategory::all()
            .iter()
            .copied()
            .filter(|c| self.entries.get(c).map_or(true, |v| v.is_empty()))
            .collect()
    }

    /// Finds all matches for a category, ordered by position in the text.
    pub fn find(&self, text: &str, category: PatternCategory) -> Vec<PatternMatch> {
        let mut matches: Vec<PatternMatch> = self
            .entries
            .get(&category)
            .map(|entries| {
                entries
                    .iter()
                    .flat_map(|entry| {
                        entry.regex.find_iter(text).map(|m| PatternMatch {
                            category: entry.category,
                            subcategory: entry.subcategory,
                            weight: entry.weight,
                            span: (m.start(), m.end()),
                            excerpt: m.as_str().to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by_key(|m| m.span);
        matches
    }

    /// Number of matches for a category.
    pub fn count(&self, text: &str, category: PatternCategory) -> usize {
        self.find(text, category).len()
    }

    /// Sum of entry weights over all matches for a category.
    pub fn weighted_count(&self, text: &str, category: PatternCategory) -> f64 {
        self.find(text, category).iter().map(|m| m.weight).sum()
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles one source row into entries, one per phrase or regex.
fn compile_spec(category: PatternCategory, spec: &PatternSpec) -> Vec<PatternEntry> {
    match spec.matcher {
        MatcherSpec::Phrases(list) => list
            .iter()
            .map(|phrase| PatternEntry {
                category,
                subcategory: spec.subcategory,
                weight: spec.weight,
                regex: compile_phrase(phrase),
            })
            .collect(),
        MatcherSpec::Raw(pattern) => vec![PatternEntry {
            category,
            subcategory: spec.subcategory,
            weight: spec.weight,
            regex: Regex::new(&format!("(?i){}", pattern))
                .unwrap_or_else(|e| panic!("bad catalog regex `{}`: {}", pattern, e)),
        }],
    }
}

/// Compiles a literal phrase with token boundaries.
///
/// `\b` only anchors against word characters, so it is applied on a side
/// only when that side of the phrase starts or ends with one ("no." keeps
/// its leading boundary but not a trailing one).
fn compile_phrase(phrase: &str) -> Regex {
    let escaped = regex::escape(phrase);
    let lead = if phrase.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        r"\b"
    } else {
        ""
    };
    let trail = if phrase.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
        r"\b"
    } else {
        ""
    };
    Regex::new(&format!("(?i){}{}{}", lead, escaped, trail))
        .unwrap_or_else(|e| panic!("bad catalog phrase `{}`: {}", phrase, e))
}

/// The built-in catalog source table.
fn catalog() -> Vec<(PatternCategory, Vec<PatternSpec>)> {
    use PatternCategory::*;
    vec![
        (
            FaceThreatening,
            vec![
                raw(
                    "direct_attack",
                    r"\byou (clearly |obviously |really |just )?(don't|do not) (understand|get it)\b",
                    2.0,
                ),
                phrases(
                    "direct_attack",
                    &[
                        "you're wrong",
                        "you are wrong",
                        "that's wrong",
                        "that is wrong",
                        "you're missing",
                        "you are missing",
                        "you failed to",
                        "you forgot to",
                        "you should have",
                        "you should know",
                        "you always",
                        "you never",
                        "clearly you",
                        "apparently you",
                        "anyone can see",
                        "everyone knows",
                        "that's not how",
                        "that is not how",
                        "how can you",
                        "why would you",
                        "why didn't you",
                    ],
                    2.0,
                ),
                phrases("name_calling", &["idiot", "moron", "clueless", "incompetent"], 2.0),
            ],
        ),
        (
            Hedging,
            vec![phrases(
                "softener",
                &[
                    "I think",
                    "I believe",
                    "I feel",
                    "maybe",
                    "perhaps",
                    "possibly",
                    "might",
                    "could be",
                    "may be",
                    "I wonder",
                    "I'm wondering",
                    "not sure",
                    "I'm not certain",
                    "it seems",
                    "it appears",
                    "it looks like",
                    "in my opinion",
                    "from my perspective",
                    "I could be wrong",
                ],
                1.0,
            )],
        ),
        (
            PositivePoliteness,
            vec![phrases(
                "rapport",
                &[
                    "great point",
                    "good point",
                    "good idea",
                    "nice work",
                    "I agree",
                    "you're right",
                    "that's right",
                    "exactly",
                    "thanks for",
                    "thank you for",
                    "appreciate",
                    "makes sense",
                    "fair point",
                    "fair enough",
                    "well said",
                    "good catch",
                    "nice catch",
                    "love this",
                    "this is great",
                ],
                2.0,
            )],
        ),
        (
            NegativePoliteness,
            vec![phrases(
                "deference",
                &[
                    "correct me if I'm wrong",
                    "if I understand correctly",
                    "would you mind",
                    "sorry to bother",
                    "if possible",
                    "when you get a chance",
                    "just a thought",
                    "feel free to ignore",
                ],
                1.0,
            )],
        ),
        (
            IndirectAggression,
            vec![phrases(
                "passive_aggressive",
                &[
                    "with all due respect",
                    "no offense but",
                    "no offense,",
                    "I'm just saying",
                    "just saying",
                    "interesting that you",
                    "funny how you",
                    "if you had read",
                    "if you actually read",
                    "as I already said",
                    "as I mentioned before",
                    "I don't know how else to explain",
                ],
                1.5,
            )],
        ),
        (
            Directive,
            vec![
                raw("instruction", r"\byou (should|need to|must|have to)\b", 1.0),
                raw("imperative", r"\bplease\s+(do|stop|consider|read|look)\b", 1.0),
                raw("imperative", r"\bstop\s+\w+ing\b", 1.0),
                raw("imperative", r"\bgo\s+(read|look|check)\b", 1.0),
            ],
        ),
        (
            Expressive,
            vec![
                raw(
                    "frustration",
                    r"\bI('m| am) (frustrated|annoyed|confused|disappointed|tired)\b",
                    1.0,
                ),
                raw(
                    "outburst",
                    r"\bthis is (ridiculous|absurd|insane|crazy|nonsense|garbage)\b",
                    1.0,
                ),
                raw(
                    "outburst",
                    r"\bthis (proposal|patch|idea|change|approach) is (ridiculous|absurd|insane|crazy|nonsense|garbage)\b",
                    1.0,
                ),
                raw("outburst", r"\bwhat a (waste|joke|mess)\b", 1.0),
                raw("outburst", r"\b(unbelievable|frustrating|disappointing)\b", 1.0),
            ],
        ),
        (
            Accusation,
            vec![
                raw(
                    "blame",
                    r"\byou (broke|ruined|caused|created|introduced)\b",
                    1.0,
                ),
                raw("blame", r"\bthis is your (fault|mistake|problem)\b", 1.0),
                raw("blame", r"\byou('re| are) (the one|responsible|to blame)\b", 1.0),
                raw("blame", r"\bbecause of you\b", 1.0),
            ],
        ),
        (
            Challenge,
            vec![
                raw(
                    "competence",
                    r"\bdo you (even|actually|really) (understand|know|read)\b",
                    1.0,
                ),
                raw(
                    "competence",
                    r"\bhave you (even|actually|ever) (read|looked|tried|used)\b",
                    1.0,
                ),
                raw("competence", r"\bdo you understand\b", 1.0),
                raw("competence", r"\bcan you (even|actually)\b", 1.0),
                raw("competence", r"\bare you (sure|serious|kidding)\b", 1.0),
            ],
        ),
        (
            EvidenceCitation,
            vec![
                raw("url", r"https?://\S+", 2.0),
                raw("reference", r"\b(BIP|PR|issue)[\s#-]?\d+\b", 2.0),
                raw("reference", r"\bcommit\s+[a-f0-9]{6,}\b", 2.0),
                raw(
                    "data",
                    r"\b(data|benchmark|test|spec|measurement)s?\s+(show|shows|showing|indicate|indicates|suggest|suggests|support|supports|supporting)\b",
                    2.0,
                ),
                raw("data", r"\bI('ve| have) attached\b", 2.0),
                raw("data", r"\baccording to\b", 2.0),
                raw("data", r"\bin my (testing|experience|analysis)\b", 2.0),
                raw("data", r"\b(measured|measurements)\b", 2.0),
                raw(
                    "metric",
                    r"\b\d+(\.\d+)?\s*(ms|MB|KB|GB|%|x faster|x slower)",
                    2.0,
                ),
            ],
        ),
        (
            Acknowledgment,
            vec![phrases(
                "concession",
                &[
                    "you're right",
                    "you are right",
                    "that's true",
                    "that is true",
                    "fair point",
                    "good point",
                    "valid point",
                    "I see your point",
                    "I understand your point",
                    "I agree with",
                    "I concede",
                    "you have a point",
                    "that's valid",
                    "I hadn't considered",
                    "I didn't think of",
                    "you make a good point",
                    "that's a fair criticism",
                    "thanks for the",
                ],
                2.0,
            )],
        ),
        (
            ConstructiveProposal,
            vec![phrases(
                "proposal",
                &[
                    "what if we",
                    "an alternative",
                    "another option",
                    "alternatively",
                    "we could",
                    "we might",
                    "we should consider",
                    "I suggest",
                    "I propose",
                    "I recommend",
                    "how about",
                    "perhaps we could",
                    "one solution",
                    "one approach",
                    "one way",
                    "I'd be happy to",
                    "happy to run",
                    "let me",
                    "I'll submit",
                    "I'll create",
                    "I'll open",
                    "I can open",
                ],
                1.5,
            )],
        ),
        (
            Dismissive,
            vec![phrases(
                "shutdown",
                &[
                    "doesn't matter",
                    "irrelevant",
                    "off-topic",
                    "not worth",
                    "waste of time",
                    "pointless",
                    "already addressed",
                    "already discussed",
                    "already answered",
                    "you're missing the point",
                    "that's not the issue",
                    "I'm done",
                    "I give up",
                    "whatever",
                ],
                2.0,
            )],
        ),
        (
            AdHominem,
            vec![
                raw("person_attack", r"\byou('re| are) (just|always|never|only)\b", 3.0),
                raw("person_attack", r"\bcoming from you\b", 3.0),
                raw("person_attack", r"\bof course you('d| would)\b", 3.0),
                raw("person_attack", r"\btypical of you\b", 3.0),
                raw("person_attack", r"\bpeople like you\b", 3.0),
                raw(
                    "person_attack",
                    r"\byou('re| are) (an? )?(idiot|moron|fool|amateur|clown)\b",
                    3.0,
                ),
                raw("name_calling", r"\b(idiot|idiots|moron|morons|imbecile|clown)\b", 3.0),
                raw(
                    "person_attack",
                    r"\byou('re| are) the (kind|type|sort) of\b",
                    3.0,
                ),
            ],
        ),
        (
            Strawman,
            vec![
                raw("misrepresent", r"\bso you('re| are) saying\b", 2.5),
                raw(
                    "misrepresent",
                    r"\bwhat you('re| are) really (saying|meaning|suggesting)\b",
                    2.5,
                ),
                raw("misrepresent", r"\bin other words,?\s*you\b", 2.5),
                raw("misrepresent", r"\blet me get this straight\b", 2.5),
                raw("misrepresent", r"\bso basically you\b", 2.5),
            ],
        ),
        (
            AppealToAuthority,
            vec![
                raw(
                    "seniority",
                    r"\b\d+\s*(years?|yrs?)\s*(of experience|experience|in)\b",
                    1.5,
                ),
                raw(
                    "seniority",
                    r"\bI('ve| have) been (doing|working|contributing)\b",
                    1.5,
                ),
                raw("seniority", r"\bas a (senior|core|experienced|long-time)\b", 1.5),
                raw("seniority", r"\bin my \d+ years\b", 1.5),
                raw("seniority", r"\bI('ve| have) been here (since|longer)\b", 1.5),
            ],
        ),
        (
            MovingGoalposts,
            vec![
                raw("deflect", r"\bthat('s| is) not what I meant\b", 2.0),
                raw("deflect", r"\bI never said\b", 2.0),
                raw("deflect", r"\byou('re| are) missing the point\b", 2.0),
                raw("deflect", r"\bthat('s| is) not the issue\b", 2.0),
            ],
        ),
        (
            Whataboutism,
            vec![
                raw("counter_charge", r"\bwhat about (when|the time)\b", 1.0),
                raw("counter_charge", r"\bbut (you|they|he|she) also\b", 1.0),
                raw("counter_charge", r"\byeah but what about\b", 1.0),
                raw("counter_charge", r"\bwhat about your\b", 1.0),
            ],
        ),
        (
            PileOnMarker,
            vec![
                raw("rejection", r"\b(strong |concept )?NACK\b", 1.0),
                raw("rejection", r"(^|\s)-1\b", 1.0),
                phrases(
                    "rejection_phrase",
                    &["agreed, this is bad", "same objection", "NACK from me"],
                    1.0,
                ),
            ],
        ),
        (
            StonewallingMarker,
            vec![
                phrases(
                    "refusal",
                    &[
                        "no.",
                        "nope.",
                        "wrong.",
                        "incorrect.",
                        "already addressed",
                        "already discussed",
                        "already answered",
                        "I'm done",
                        "done discussing",
                        "not going to",
                        "this conversation is over",
                        "I won't",
                        "refuse to",
                        "not worth my time",
                        "waste of time",
                        "I have nothing more to say",
                        "said all I'm going to say",
                    ],
                    1.0,
                ),
                raw("bare_dismissal", r"(?m)^(no|wrong|incorrect|false|nope)\.?$", 1.0),
                raw("bare_dismissal", r"(?m)^(nonsense|garbage|rubbish|bs)\.?$", 1.0),
            ],
        ),
        (
            ThreatMarker,
            vec![phrases(
                "ultimatum",
                &[
                    "I'll fork",
                    "I will fork",
                    "going to fork",
                    "I'll leave",
                    "I'm leaving",
                    "I quit",
                    "if this merges",
                    "if you do this",
                    "consider this my resignation",
                    "count me out",
                ],
                1.0,
            )],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_entries() {
        let library = PatternLibrary::new();
        assert!(
            library.missing_categories().is_empty(),
            "missing: {:?}",
            library.missing_categories()
        );
    }

    #[test]
    fn nack_matches_whole_word_only() {
        let library = PatternLibrary::new();
        assert_eq!(library.count("NACK, this breaks relay", PatternCategory::PileOnMarker), 1);
        assert_eq!(library.count("nack", PatternCategory::PileOnMarker), 1);
        for category in PatternCategory::all() {
            assert_eq!(
                library.count("I put it in my backpack", *category),
                0,
                "category {} matched inside backpack",
                category
            );
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let library = PatternLibrary::new();
        assert_eq!(library.count("YOU'RE WRONG about this", PatternCategory::FaceThreatening), 1);
        assert_eq!(library.count("you're wrong about this", PatternCategory::FaceThreatening), 1);
    }

    #[test]
    fn matches_are_ordered_by_position() {
        let library = PatternLibrary::new();
        let text = "you never listen, and you broke the build, so why would you push?";
        let matches = library.find(text, PatternCategory::FaceThreatening);
        assert!(matches.len() >= 2);
        for pair in matches.windows(2) {
            assert!(pair[0].span.0 <= pair[1].span.0);
        }
    }

    #[test]
    fn matches_carry_excerpts_and_weights() {
        let library = PatternLibrary::new();
        let matches = library.find("you're an idiot", PatternCategory::AdHominem);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].weight, 3.0);
        assert_eq!(matches[0].excerpt.to_lowercase(), "you're an idiot");
    }

    #[test]
    fn fallacy_weights_are_ordered_by_severity() {
        let library = PatternLibrary::new();
        let ad_hom = library.weighted_count("coming from you", PatternCategory::AdHominem);
        let whatabout =
            library.weighted_count("what about your patch", PatternCategory::Whataboutism);
        assert!(ad_hom > whatabout);
    }

    #[test]
    fn evidence_catches_references_and_metrics() {
        let library = PatternLibrary::new();
        let text = "See PR 28421: the benchmarks show a 15% regression, measured on commit abc123f.";
        assert!(library.count(text, PatternCategory::EvidenceCitation) >= 3);
    }

    #[test]
    fn stonewalling_matches_bare_dismissals() {
        let library = PatternLibrary::new();
        assert!(library.count("No.", PatternCategory::StonewallingMarker) >= 1);
        // "no" mid-sentence is not a bare dismissal
        assert_eq!(
            library.count("there is no reason to panic", PatternCategory::StonewallingMarker),
            0
        );
    }

    #[test]
    fn find_is_deterministic() {
        let library = PatternLibrary::new();
        let text = "you never test, you broke CI, typical of you";
        for category in PatternCategory::all() {
            let a = library.find(text, *category);
            let b = library.find(text, *category);
            assert_eq!(a, b);
        }
    }
}
