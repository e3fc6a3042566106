use super::error::{ConfigError, SystemError};
use super::molecule::{Molecule, MoleculeKind};
use crate::core::io::records::{AtomRecord, SphereRecord};
use crate::core::utils::geometry::PeriodicBox;
#[cfg(not(feature = "parallel"))]
use itertools::Itertools;
use nalgebra::{Point3, Rotation3, Vector3};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A collection of rigid molecules in a cubic periodic box.
///
/// Construction guarantees that no two molecules' CG spheres interpenetrate
/// under the minimum-image convention. Later calls to
/// [`translate_molecule`](Self::translate_molecule) and
/// [`rotate_molecule`](Self::rotate_molecule) do not re-validate this; callers
/// that move molecules are responsible for calling
/// [`check_for_overlap`](Self::check_for_overlap) or
/// [`check_molecule_overlap`](Self::check_molecule_overlap) afterwards.
#[derive(Debug, Clone)]
pub struct System {
    molecules: Vec<Molecule>,
    pbc: PeriodicBox,
    cutoff: f64,
    time: f64,
    lambda: f64,
    /// Number of molecules per type, indexed by type id.
    type_counts: Vec<usize>,
    /// Lookup from (type, type index) to the global molecule index.
    index_map: HashMap<MoleculeKind, usize>,
}

impl System {
    /// Builds a system and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Config`] for an invalid box length, a negative
    /// cutoff or two molecules sharing the same (type, type index) key, and
    /// [`SystemError::Overlap`] if any two molecules overlap.
    #[instrument(level = "debug", skip_all, fields(molecules = molecules.len(), box_length = box_length))]
    pub fn new(molecules: Vec<Molecule>, cutoff: f64, box_length: f64) -> Result<Self, SystemError> {
        let pbc = PeriodicBox::new(box_length)?;
        if cutoff.is_nan() || cutoff < 0.0 {
            return Err(ConfigError::InvalidCutoff(cutoff).into());
        }

        let mut index_map = HashMap::with_capacity(molecules.len());
        let mut type_counts: Vec<usize> = Vec::new();
        for (idx, molecule) in molecules.iter().enumerate() {
            let kind = molecule.kind();
            if index_map.insert(kind, idx).is_some() {
                return Err(ConfigError::DuplicateMolecule {
                    type_id: kind.type_id,
                    type_index: kind.type_index,
                }
                .into());
            }
            if kind.type_id >= type_counts.len() {
                type_counts.resize(kind.type_id + 1, 0);
            }
            type_counts[kind.type_id] = type_counts[kind.type_id].max(kind.type_index + 1);
        }

        let mut system = Self {
            molecules,
            pbc,
            cutoff,
            time: 0.0,
            lambda: 0.0,
            type_counts,
            index_map,
        };

        system.check_for_overlap()?;
        system.lambda = system.calc_average_radius();
        system.compute_cutoff();

        info!(
            molecules = system.molecules.len(),
            spheres = system.num_spheres(),
            lambda = system.lambda,
            cutoff = system.cutoff,
            "System constructed."
        );
        Ok(system)
    }

    fn calc_average_radius(&self) -> f64 {
        let (sum, count) = self
            .molecules
            .iter()
            .flat_map(|m| m.spheres())
            .fold((0.0, 0usize), |(sum, n), s| (sum + s.radius(), n + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    /// Clamps the interaction cutoff to half the box length if it exceeds it.
    pub fn compute_cutoff(&mut self) {
        if self.cutoff <= self.pbc.half_length() {
            return;
        }
        self.cutoff = self.pbc.half_length();
        warn!(
            cutoff = self.cutoff,
            "The desired cutoff is larger than half the box length; resetting cutoff to half the box length."
        );
    }

    /// Verifies that no pair of molecules has overlapping CG spheres.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Overlap`] for the first overlapping pair in
    /// `(i, j)` order with `i < j`.
    #[instrument(level = "debug", skip_all)]
    pub fn check_for_overlap(&self) -> Result<(), SystemError> {
        let n = self.molecules.len();

        #[cfg(not(feature = "parallel"))]
        let overlap = (0..n)
            .tuple_combinations::<(usize, usize)>()
            .find(|&(i, j)| self.molecules_overlap(i, j));

        #[cfg(feature = "parallel")]
        let overlap = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (i + 1..n).map(move |j| (i, j)))
            .find_first(|&(i, j)| self.molecules_overlap(i, j));

        match overlap {
            Some((first, second)) => {
                debug!(first, second, "Overlapping molecules detected.");
                Err(SystemError::Overlap { first, second })
            }
            None => Ok(()),
        }
    }

    /// Verifies that molecule `i` overlaps no other molecule.
    ///
    /// Reports the pair with the lower index first.
    pub fn check_molecule_overlap(&self, i: usize) -> Result<(), SystemError> {
        if i >= self.molecules.len() {
            return Err(SystemError::MoleculeNotFound(i));
        }
        match (0..self.molecules.len()).find(|&j| j != i && self.molecules_overlap(i, j)) {
            Some(j) => Err(SystemError::Overlap {
                first: i.min(j),
                second: i.max(j),
            }),
            None => Ok(()),
        }
    }

    fn molecules_overlap(&self, i: usize, j: usize) -> bool {
        let (a, b) = (&self.molecules[i], &self.molecules[j]);
        a.spheres().iter().any(|sa| {
            b.spheres().iter().any(|sb| {
                self.pbc.distance(sa.center(), sb.center()) < sa.radius() + sb.radius()
            })
        })
    }

    /// Minimum-image vector `p1 - p2`.
    pub fn minimum_image(&self, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
        self.pbc.minimum_image(p1, p2)
    }

    /// Minimum-image vector between the centers of geometry of molecules `i` and `j`.
    pub fn molecule_separation(&self, i: usize, j: usize) -> Option<Vector3<f64>> {
        let a = self.molecules.get(i)?;
        let b = self.molecules.get(j)?;
        Some(self.minimum_image(&a.center_of_geometry(), &b.center_of_geometry()))
    }

    pub fn less_than_cutoff(&self, v: &Vector3<f64>) -> bool {
        v.norm() < self.cutoff
    }

    /// Translates molecule `i`, wrapping its sphere centers into the box.
    ///
    /// Overlap is not re-checked.
    pub fn translate_molecule(&mut self, i: usize, dr: &Vector3<f64>) -> Result<(), SystemError> {
        let pbc = self.pbc;
        self.molecules
            .get_mut(i)
            .ok_or(SystemError::MoleculeNotFound(i))?
            .translate(dr, &pbc);
        Ok(())
    }

    /// Rotates molecule `i` about the origin. Overlap is not re-checked.
    pub fn rotate_molecule(&mut self, i: usize, rotation: &Rotation3<f64>) -> Result<(), SystemError> {
        self.molecules
            .get_mut(i)
            .ok_or(SystemError::MoleculeNotFound(i))?
            .rotate(rotation);
        Ok(())
    }

    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn molecule(&self, i: usize) -> Option<&Molecule> {
        self.molecules.get(i)
    }

    pub fn num_molecules(&self) -> usize {
        self.molecules.len()
    }

    pub fn num_spheres(&self) -> usize {
        self.molecules.iter().map(Molecule::num_spheres).sum()
    }

    pub fn box_length(&self) -> f64 {
        self.pbc.length()
    }

    pub fn periodic_box(&self) -> &PeriodicBox {
        &self.pbc
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Mean CG sphere radius over all molecules.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    /// Global index of the molecule with the given type and type index.
    pub fn global_index(&self, type_id: usize, type_index: usize) -> Option<usize> {
        self.index_map
            .get(&MoleculeKind::new(type_id, type_index))
            .copied()
    }

    pub fn num_types(&self) -> usize {
        self.type_counts.len()
    }

    pub fn type_count(&self, type_id: usize) -> usize {
        self.type_counts.get(type_id).copied().unwrap_or(0)
    }

    /// One record per charge, with absolute positions.
    pub fn atom_records(&self) -> Vec<AtomRecord> {
        self.molecules
            .iter()
            .enumerate()
            .flat_map(|(i, molecule)| {
                molecule
                    .charges()
                    .iter()
                    .zip(molecule.charge_positions())
                    .map(move |(charge, position)| {
                        AtomRecord::new(i, &position, charge.magnitude, charge.vdw_radius)
                    })
            })
            .collect()
    }

    /// One record per CG sphere.
    pub fn sphere_records(&self) -> Vec<SphereRecord> {
        self.molecules
            .iter()
            .enumerate()
            .flat_map(|(i, molecule)| {
                molecule
                    .spheres()
                    .iter()
                    .map(move |sphere| SphereRecord::new(i, sphere.center(), sphere.radius()))
            })
            .collect()
    }
}
