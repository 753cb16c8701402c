/// Stylistic variation — the probabilities behind synonym substitution,
/// table conjugation and passive voice.

use rand::Rng;

/// Probabilities of the three stylistic choices made per frame.
///
/// Each choice consumes one uniform draw in `[0, 1)` and fires when the draw
/// exceeds `1 - p`, so the draw sequence is the same whatever the settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    /// Replace a subject/object noun by one of its hypernyms.
    pub synonym: f64,
    /// Use the conjugation table instead of "is/are <verb>".
    pub conjugation: f64,
    /// Restructure a clause with an object into the passive voice.
    pub passive: f64,
}

impl Default for Variation {
    fn default() -> Self {
        Self {
            synonym: 0.25,
            conjugation: 0.7,
            passive: 0.25,
        }
    }
}

impl Variation {
    /// Never vary: plain nouns, "is/are" verbs, active voice.
    pub fn none() -> Self {
        Self {
            synonym: 0.0,
            conjugation: 0.0,
            passive: 0.0,
        }
    }
}

/// Draw once and report whether an event of probability `p` happened.
pub(crate) fn chance<R: Rng>(rng: &mut R, p: f64) -> bool {
    let draw: f64 = rng.gen();
    fires(draw, p)
}

/// `1 - p` rounded to 12 decimals, so 0.7 gives exactly 0.3 rather than
/// 0.30000000000000004.
fn threshold(p: f64) -> f64 {
    ((1.0 - p) * 1e12).round() / 1e12
}

fn fires(draw: f64, p: f64) -> bool {
    draw > threshold(p)
}
