//! Word tables used by the scorer.

/// Word valences on a `[-4.0, 4.0]` scale.
///
/// Keys are lowercase single words. Positive values are favourable.
pub(crate) const VALENCE: &[(&str, f64)] = &[
    // Positive
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("clean", 1.7),
    ("cool", 1.3),
    ("easy", 1.9),
    ("elegant", 2.1),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 3.2),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("fantastic", 2.6),
    ("fast", 1.0),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressive", 2.3),
    ("interesting", 1.7),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("pleased", 1.9),
    ("powerful", 1.8),
    ("recommend", 1.5),
    ("reliable", 1.9),
    ("safe", 1.9),
    ("solid", 1.6),
    ("stable", 1.2),
    ("success", 2.7),
    ("successful", 2.8),
    ("superb", 3.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("wow", 2.8),
    ("yay", 2.4),
    // Negative
    ("angry", -2.3),
    ("annoying", -2.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broke", -1.8),
    ("broken", -2.1),
    ("bug", -1.4),
    ("buggy", -1.9),
    ("crash", -1.7),
    ("crashes", -1.7),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("issue", -0.9),
    ("lost", -1.3),
    ("mess", -1.5),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("sad", -2.1),
    ("scam", -2.8),
    ("slow", -1.0),
    ("stupid", -2.4),
    ("terrible", -2.1),
    ("ugly", -2.3),
    ("unfortunately", -1.6),
    ("useless", -1.8),
    ("wasted", -2.2),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

/// Intensity modifiers applied to the word that follows them.
pub(crate) const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293),
    ("completely", 0.293),
    ("extremely", 0.293),
    ("highly", 0.293),
    ("incredibly", 0.293),
    ("really", 0.293),
    ("so", 0.293),
    ("super", 0.293),
    ("totally", 0.293),
    ("very", 0.293),
    ("barely", -0.293),
    ("hardly", -0.293),
    ("kinda", -0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
];

pub(crate) const NEGATIONS: &[&str] = &[
    "aren't", "cannot", "can't", "didn't", "doesn't", "don't", "hasn't", "isn't", "neither",
    "never", "no", "nobody", "none", "nor", "not", "nothing", "wasn't", "without", "won't",
    "wouldn't",
];

pub(crate) fn valence(word: &str) -> Option<f64> {
    VALENCE
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, v)| v)
}

pub(crate) fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, v)| v)
}

pub(crate) fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}
