//! # Core Module
//!
//! Stateless building blocks: the molecular models, the randomized CG sphere search,
//! periodic geometry helpers and record serialization.
//!
//! - **Molecular Representation** ([`models`]) - Charges, CG spheres, molecules and the periodic system
//! - **Coarse Graining** ([`coarse_grain`]) - Metropolis search that partitions charges into spheres
//! - **File I/O** ([`io`]) - CSV records of placed charges and spheres
//! - **Geometry** ([`utils`]) - Minimum-image arithmetic and nearest-point queries

pub mod coarse_grain;
pub mod io;
pub mod models;
pub mod utils;
