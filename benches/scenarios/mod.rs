//! Real-world scenario benchmarks.
//!
//! These benchmarks model actual usage: single voices with typical patches
//! and the whole engine with a full pool.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
