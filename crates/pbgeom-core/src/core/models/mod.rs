//! # Core Models Module
//!
//! Data structures describing rigid charged molecules in a periodic box.
//!
//! ## Key Components
//!
//! - [`charge`] - Point charge with a van der Waals radius
//! - [`sphere`] - Coarse-grained bounding sphere over a subset of charges
//! - [`surface`] - Sampled molecular surface with outward normals
//! - [`molecule`] - Rigid molecule whose charges are stored relative to their CG spheres
//! - [`system`] - Periodic collection of molecules with overlap validation
//! - [`error`] - Construction and validation errors
//!
//! ## Usage
//!
//! ```ignore
//! use pbgeom::core::models::{charge::Charge, molecule::{Molecule, MoleculeKind}, system::System};
//!
//! let charges = vec![Charge::new(Point3::origin(), 1.0, 1.5)];
//! let molecule = Molecule::from_spheres(MoleculeKind::new(0, 0), charges, &[Point3::origin()], &[2.0])?;
//! let system = System::new(vec![molecule], 40.0, 100.0)?;
//! ```

pub mod charge;
pub mod error;
pub mod molecule;
pub mod sphere;
pub mod surface;
pub mod system;
