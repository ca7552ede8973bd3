// src/services/classifier.rs
// DOCUMENTATION: Advisory accessibility and sensory keyword classifier
// PURPOSE: Flag places from provider attributes and keyword hits in text/reviews

use crate::config::{AccessibilityStrategy, ClassifierSettings};
use crate::models::{AccessibilitySource, AccessibilityVerdict, PlaceSummary, Review};

/// Pure classifier; no I/O
/// DOCUMENTATION: Results are hints for the UI. A keyword hit such as
/// "accessible" in a review is not verified accessibility information.
pub struct AccessibilityClassifier {
    accessibility_keywords: Vec<Keyword>,
    sensory_keywords: Vec<Keyword>,
    strategy: AccessibilityStrategy,
}

/// A configured keyword and its word sequence
struct Keyword {
    label: String,
    words: Vec<String>,
}

impl Keyword {
    fn new(raw: &str) -> Self {
        let label = raw.trim().to_lowercase();
        let parts = words(&label);
        Self {
            label,
            words: parts,
        }
    }

    /// Whole-word match: "ADA" hits "ADA compliant" but not "Canada"
    fn found_in(&self, text: &[String]) -> bool {
        !self.words.is_empty()
            && text.windows(self.words.len()).any(|window| {
                window
                    .iter()
                    .zip(&self.words)
                    .all(|(word, keyword)| same_word(word, keyword))
            })
    }
}

impl AccessibilityClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        let keywords = |raw: Vec<String>| -> Vec<Keyword> {
            raw.iter()
                .map(|k| Keyword::new(k))
                .filter(|k| !k.words.is_empty())
                .collect()
        };

        Self {
            accessibility_keywords: keywords(settings.accessibility_keywords),
            sensory_keywords: keywords(settings.sensory_keywords),
            strategy: settings.strategy,
        }
    }

    /// Advisory accessibility flag only
    pub fn is_accessible(&self, place: &PlaceSummary, reviews: &[Review]) -> bool {
        self.classify(place, reviews).accessible
    }

    /// Accessibility decision plus matched sensory keywords
    pub fn classify(&self, place: &PlaceSummary, reviews: &[Review]) -> AccessibilityVerdict {
        let texts = searchable_texts(place, reviews);

        let by_keywords = || {
            if matches_any(&texts, &self.accessibility_keywords) {
                (true, AccessibilitySource::Keywords)
            } else {
                (false, AccessibilitySource::NoSignal)
            }
        };

        let (accessible, source) = match (self.strategy, place.wheelchair_accessible) {
            (AccessibilityStrategy::Keywords, _) => by_keywords(),
            (_, Some(flag)) => (flag, AccessibilitySource::ProviderAttribute),
            (AccessibilityStrategy::ProviderFlag, None) => (false, AccessibilitySource::NoSignal),
            (AccessibilityStrategy::PreferProviderFlag, None) => by_keywords(),
        };

        let sensory_matches = self
            .sensory_keywords
            .iter()
            .filter(|keyword| texts.iter().any(|text| keyword.found_in(text)))
            .map(|keyword| keyword.label.clone())
            .collect();

        AccessibilityVerdict {
            accessible,
            source,
            sensory_matches,
        }
    }
}

/// Lowercased words split on anything that is not a letter or digit
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Exact word or its plain plural ("ramps" for "ramp")
fn same_word(word: &str, keyword: &str) -> bool {
    word == keyword || word.strip_suffix('s') == Some(keyword)
}

/// Words of the name, description, address and review texts, one entry per text
fn searchable_texts(place: &PlaceSummary, reviews: &[Review]) -> Vec<Vec<String>> {
    let mut texts = vec![words(&place.name), words(&place.address)];
    if let Some(description) = &place.description {
        texts.push(words(description));
    }
    texts.extend(reviews.iter().map(|r| words(&r.text)));
    texts
}

fn matches_any(texts: &[Vec<String>], keywords: &[Keyword]) -> bool {
    keywords
        .iter()
        .any(|keyword| texts.iter().any(|text| keyword.found_in(text)))
}
