//! tartil-core — Recitation scoring engine, traits, and reports.
//!
//! The pure pipeline lives in [`normalize`], [`scoring`] and [`reward`]:
//! raw text pair → normalized pair → (WER, accuracy, feedback) → XP.
//! Everything else in this crate wraps that pipeline for callers that start
//! from audio or from fixture files.

pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod reward;
pub mod scoring;
pub mod statistics;
pub mod traits;

pub use model::{RewardInput, ScoreResult, VerdictStatus, WordVerdict};
pub use normalize::normalize;
pub use reward::calculate_xp_reward;
pub use scoring::score;
