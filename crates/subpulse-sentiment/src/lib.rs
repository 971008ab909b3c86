//! Lexicon-based sentiment scoring for collected posts and comments.
//!
//! Produces a negative/neutral/positive breakdown plus a normalized compound
//! polarity, and implements [`subpulse_core::SentimentProvider`] so the ingest
//! pipeline can use it without knowing how scores are computed.

mod lexicon;
pub mod scorer;

pub use scorer::{score_text, LexiconScorer};
