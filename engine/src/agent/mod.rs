//! Reasoning loop and working-memory cache
//!
//! The [`ReasoningEngine`] drives one task through its bounded think-act
//! loop; the [`HistoryCache`] holds each task's conversation transcript
//! between iterations under a sliding TTL.

pub mod engine;
pub mod state_cache;

pub use engine::{EngineOutcome, ReasoningEngine, TaskContext};
pub use state_cache::HistoryCache;
