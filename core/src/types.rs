//! Shared primitive types used across the entire simulation.

/// A simulation day. Day 0 is the seeded initial state.
pub type Day = u64;

/// Position of an individual in the population array.
pub type IndividualId = usize;

/// The canonical run identifier.
pub type RunId = String;
