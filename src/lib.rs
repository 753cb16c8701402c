//! SWiG captions — sentence generation from semantic-role frame annotations.
//!
//! Turns an image's verb and its role → filler frames into short English
//! captions, one per frame, using corpus-derived determiners and
//! prepositions, heuristic role classification and seeded stylistic
//! variation.

pub mod core;
pub mod dataset;
pub mod schema;
