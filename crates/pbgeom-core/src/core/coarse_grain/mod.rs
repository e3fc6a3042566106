//! # Coarse-Graining Module
//!
//! Reduction of a molecule's point charges to a small set of enclosing CG spheres.
//!
//! - [`config`] - Search parameters and their builder
//! - [`finder`] - The randomized greedy sphere search
//! - [`sampling`] - Random directions, normal steps and the Metropolis rule
//!
//! The search never reads ambient randomness: every entry point takes a
//! `rand::Rng`, so seeding a `StdRng` makes results reproducible.

pub mod config;
pub mod finder;
pub mod sampling;
