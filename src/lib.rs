//! Readers, joint-range reconstruction, simulators and plots for affine,
//! interval and floating-point neuron traces.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod experiments;
pub mod plot;
pub mod sim;
