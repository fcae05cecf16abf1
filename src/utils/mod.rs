//! Utility functions and helpers.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
