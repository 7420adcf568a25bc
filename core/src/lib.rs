//! Discrete-time stochastic epidemic simulation.
//!
//! A fixed-size population moves through susceptible, infected
//! (symptomatic or asymptomatic) and recovered states one day at a time.
//! The engine publishes a per-day S/I/R time series plus per-individual
//! state change events for an external renderer.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod outcome;
pub mod population;
pub mod rng;
pub mod snapshot;
pub mod transmission;
pub mod types;
pub mod worker;
