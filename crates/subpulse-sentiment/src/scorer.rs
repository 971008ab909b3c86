//! Rule-based scorer over the word tables in [`crate::lexicon`].

use subpulse_core::{SentimentProvider, SentimentScores};

use crate::lexicon::{booster, is_negation, valence};

/// Multiplier applied to a valence preceded (within three words) by a negation.
const NEGATION_SCALAR: f64 = -0.74;
/// Extra magnitude for an ALL-CAPS sentiment word inside otherwise mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;
/// Per-`!` emphasis, capped at four marks.
const EXCLAMATION_INCREMENT: f64 = 0.292;
const QUESTION_INCREMENT: f64 = 0.18;
/// Controls how quickly the compound score saturates towards ±1.
const NORMALIZATION_ALPHA: f64 = 15.0;
/// Booster influence decays with distance from the word it modifies.
const BOOSTER_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

/// [`SentimentProvider`] backed by the built-in lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SentimentProvider for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScores {
        score_text(text)
    }
}

/// Score a text string.
///
/// Returns [`SentimentScores::NEUTRAL`] for empty, blank, or punctuation-only
/// text. `compound` is always within `[-1.0, 1.0]` and `neg + neu + pos` is
/// 1.0 up to floating-point error.
#[must_use]
pub fn score_text(text: &str) -> SentimentScores {
    let normalized = text.replace('\u{2019}', "'");
    let tokens: Vec<&str> = normalized
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return SentimentScores::NEUTRAL;
    }

    let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let mixed_case =
        tokens.iter().any(|t| is_all_caps(t)) && !tokens.iter().all(|t| is_all_caps(t));

    let mut sentiments: Vec<f64> = Vec::with_capacity(tokens.len());
    for (i, word) in lower.iter().enumerate() {
        if booster(word).is_some() {
            sentiments.push(0.0);
            continue;
        }
        let Some(mut v) = valence(word) else {
            sentiments.push(0.0);
            continue;
        };

        if mixed_case && is_all_caps(tokens[i]) {
            v += CAPS_INCREMENT * v.signum();
        }

        for (distance, decay) in BOOSTER_DECAY.iter().enumerate() {
            let Some(prev) = i.checked_sub(distance + 1) else {
                break;
            };
            if let Some(boost) = booster(&lower[prev]) {
                v += boost * decay * v.signum();
            }
        }

        let negated = (1..=3)
            .filter_map(|distance| i.checked_sub(distance))
            .any(|prev| is_negation(&lower[prev]));
        if negated {
            v *= NEGATION_SCALAR;
        }

        sentiments.push(v);
    }

    // Contrast: what follows "but" outweighs what precedes it.
    if let Some(but_idx) = lower.iter().position(|w| w == "but") {
        for (i, s) in sentiments.iter_mut().enumerate() {
            if i < but_idx {
                *s *= 0.5;
            } else if i > but_idx {
                *s *= 1.5;
            }
        }
    }

    let emphasis = punctuation_emphasis(text);
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += emphasis;
    } else if sum < 0.0 {
        sum -= emphasis;
    }
    let compound = normalize(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in &sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += emphasis;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= emphasis;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    if total <= 0.0 {
        return SentimentScores::NEUTRAL;
    }

    SentimentScores {
        neg: (neg_sum / total).abs(),
        neu: neu_count / total,
        pos: pos_sum / total,
        compound,
    }
}

fn is_all_caps(token: &str) -> bool {
    let mut letters = token.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.chars().filter(|&c| c == '!').count().min(4);
    let questions = text.chars().filter(|&c| c == '?').count();
    #[allow(clippy::cast_precision_loss)]
    let mut emphasis = exclamations as f64 * EXCLAMATION_INCREMENT;
    if questions > 1 {
        #[allow(clippy::cast_precision_loss)]
        let q = questions.min(3) as f64;
        emphasis += q * QUESTION_INCREMENT;
    }
    emphasis
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
