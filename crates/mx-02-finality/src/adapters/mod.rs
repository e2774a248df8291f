//! # Adapters Layer
//!
//! Implements outbound port traits.

mod clock;

pub use clock::SystemClock;
