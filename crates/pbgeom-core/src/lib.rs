//! # pbgeom
//!
//! Geometry layer for Brownian dynamics of rigid charged molecules in a periodic box.
//!
//! Each molecule's point charges are grouped into coarse-grained (CG) bounding spheres,
//! either supplied by the caller or found by a randomized Metropolis search constrained
//! by a sampled molecular surface. A [`System`](core::models::system::System) collects
//! molecules in a cubic box and validates that no two of them overlap under the
//! minimum-image convention.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `System`), the
//!   sphere search and periodic geometry helpers.
//!
//! - **[`engine`]: Setup and Reporting.** Per-type setup descriptions, progress callbacks
//!   and the engine error type.
//!
//! - **[`workflows`]: The Public API.** The assembly workflow that builds and validates a
//!   complete system from a setup.
//!
//! ## Features
//!
//! - `parallel`: runs the overlap check and the per-type sphere searches on `rayon`.

pub mod core;
pub mod engine;
pub mod workflows;
