use super::charge::Charge;
use super::error::ConfigError;
use super::sphere::CGSphere;
use super::surface::SurfaceSamples;
use crate::core::coarse_grain::config::SphereSearchConfig;
use crate::core::coarse_grain::finder::{SearchOutcome, SphereFinder};
use crate::core::utils::geometry::{PeriodicBox, center_of_geometry, nearest_point};
use nalgebra::{Point3, Rotation3, UnitQuaternion, Vector3};
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Slack used when checking that charges lie inside their sphere.
pub const COVERAGE_EPSILON: f64 = 1e-6;

/// How a molecule is allowed to move during a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveType {
    /// Free translation and rotation.
    #[default]
    Move,
    /// Rotation only.
    Rotate,
    /// Fixed in place.
    Static,
}

impl FromStr for MoveType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "move" => Ok(MoveType::Move),
            "rot" | "rotate" => Ok(MoveType::Rotate),
            "stat" | "static" => Ok(MoveType::Static),
            _ => Err(ConfigError::UnknownMoveType(s.to_string())),
        }
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveType::Move => "move",
            MoveType::Rotate => "rot",
            MoveType::Static => "stat",
        };
        f.write_str(name)
    }
}

/// Identifies a molecule by its type and its index among molecules of that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MoleculeKind {
    pub type_id: usize,
    pub type_index: usize,
}

impl MoleculeKind {
    pub fn new(type_id: usize, type_index: usize) -> Self {
        Self {
            type_id,
            type_index,
        }
    }
}

/// Assigns every position to its nearest center. Ties go to the lowest index.
///
/// # Errors
///
/// Returns [`ConfigError::NoSpheres`] if `centers` is empty.
pub fn assign_to_nearest(
    positions: &[Point3<f64>],
    centers: &[Point3<f64>],
) -> Result<Vec<usize>, ConfigError> {
    if centers.is_empty() {
        return Err(ConfigError::NoSpheres);
    }
    positions
        .iter()
        .map(|p| {
            nearest_point(p, centers)
                .map(|(idx, _)| idx)
                .ok_or(ConfigError::NoSpheres)
        })
        .collect()
}

/// A rigid molecule: point charges grouped into coarse-grained spheres.
///
/// Charge positions are stored as offsets from the center of the sphere each
/// charge belongs to, so translating only moves sphere centers while rotating
/// moves both centers and offsets. The charge-to-sphere partition is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    kind: MoleculeKind,
    move_type: MoveType,
    drot: f64,
    dtrans: f64,
    charges: Vec<Charge>,
    spheres: Vec<CGSphere>,
    charge_to_sphere: Vec<usize>,
}

impl Molecule {
    /// Builds a molecule from caller-supplied sphere centers and radii.
    ///
    /// Each charge (given in absolute coordinates) joins the sphere with the
    /// nearest center and is re-expressed relative to that center. Charges
    /// outside their assigned sphere are reported with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if no spheres are given, the center and radius
    /// lists differ in length, or any radius is negative or non-finite.
    pub fn from_spheres(
        kind: MoleculeKind,
        charges: Vec<Charge>,
        centers: &[Point3<f64>],
        radii: &[f64],
    ) -> Result<Self, ConfigError> {
        if centers.len() != radii.len() {
            return Err(ConfigError::LengthMismatch {
                what: "sphere radii",
                expected: centers.len(),
                found: radii.len(),
            });
        }
        validate_radii("sphere radius", radii.iter().copied())?;
        validate_radii("van der Waals radius", charges.iter().map(|c| c.vdw_radius))?;

        let positions: Vec<_> = charges.iter().map(|c| c.position).collect();
        let assignment = assign_to_nearest(&positions, centers)?;

        let mut spheres: Vec<CGSphere> = centers
            .iter()
            .zip(radii)
            .map(|(c, &r)| CGSphere::new(*c, r, Vec::new()))
            .collect();
        for (j, &k) in assignment.iter().enumerate() {
            spheres[k].push_member(j);
        }

        let molecule = Self::from_partition(kind, charges, spheres, assignment);
        let uncovered = molecule.uncovered_charges();
        if !uncovered.is_empty() {
            warn!(
                type_id = kind.type_id,
                count = uncovered.len(),
                "Charges extend beyond their assigned CG sphere."
            );
        }
        Ok(molecule)
    }

    /// Builds a molecule whose spheres are found by the randomized search.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty surface, invalid search parameters
    /// or invalid van der Waals radii.
    pub fn from_surface(
        kind: MoleculeKind,
        charges: Vec<Charge>,
        surface: &SurfaceSamples,
        config: SphereSearchConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        let outcome = SphereFinder::new(&charges, surface, config)?.run(rng);
        Self::from_search_outcome(kind, charges, outcome)
    }

    /// Builds a molecule from the result of a [`SphereFinder`] run over `charges`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for invalid van der Waals radii or when the
    /// outcome's spheres do not partition `charges`.
    pub fn from_search_outcome(
        kind: MoleculeKind,
        charges: Vec<Charge>,
        outcome: SearchOutcome,
    ) -> Result<Self, ConfigError> {
        validate_radii("van der Waals radius", charges.iter().map(|c| c.vdw_radius))?;
        let n = charges.len();
        let mut assignment: Vec<Option<usize>> = vec![None; n];
        for (k, sphere) in outcome.spheres.iter().enumerate() {
            for &j in sphere.members() {
                let slot = assignment.get_mut(j).ok_or(ConfigError::LengthMismatch {
                    what: "sphere members",
                    expected: n,
                    found: j + 1,
                })?;
                if slot.replace(k).is_some() {
                    return Err(ConfigError::DuplicateMember(j));
                }
            }
        }
        let assignment = assignment
            .into_iter()
            .enumerate()
            .map(|(j, k)| k.ok_or(ConfigError::UnassignedCharge(j)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_partition(
            kind,
            charges,
            outcome.spheres,
            assignment,
        ))
    }

    fn from_partition(
        kind: MoleculeKind,
        mut charges: Vec<Charge>,
        spheres: Vec<CGSphere>,
        charge_to_sphere: Vec<usize>,
    ) -> Self {
        for (charge, &k) in charges.iter_mut().zip(&charge_to_sphere) {
            charge.position = Point3::from(charge.position - spheres[k].center());
        }
        Self {
            kind,
            move_type: MoveType::default(),
            drot: 0.0,
            dtrans: 0.0,
            charges,
            spheres,
            charge_to_sphere,
        }
    }

    pub fn with_move_type(mut self, move_type: MoveType) -> Self {
        self.move_type = move_type;
        self
    }

    /// Sets the rotational and translational diffusion coefficients.
    pub fn with_diffusion(mut self, drot: f64, dtrans: f64) -> Self {
        self.drot = drot;
        self.dtrans = dtrans;
        self
    }

    pub fn kind(&self) -> MoleculeKind {
        self.kind
    }

    pub fn set_type_index(&mut self, type_index: usize) {
        self.kind.type_index = type_index;
    }

    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    pub fn drot(&self) -> f64 {
        self.drot
    }

    pub fn dtrans(&self) -> f64 {
        self.dtrans
    }

    pub fn num_charges(&self) -> usize {
        self.charges.len()
    }

    pub fn num_spheres(&self) -> usize {
        self.spheres.len()
    }

    /// Charges with positions relative to their sphere centers.
    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn spheres(&self) -> &[CGSphere] {
        &self.spheres
    }

    pub fn sphere(&self, k: usize) -> Option<&CGSphere> {
        self.spheres.get(k)
    }

    /// Index of the sphere that charge `j` belongs to.
    pub fn sphere_of_charge(&self, j: usize) -> Option<usize> {
        self.charge_to_sphere.get(j).copied()
    }

    pub fn charge_to_sphere(&self) -> &[usize] {
        &self.charge_to_sphere
    }

    /// Absolute position of charge `j`: its sphere center plus its local offset.
    pub fn charge_position(&self, j: usize) -> Option<Point3<f64>> {
        let charge = self.charges.get(j)?;
        let sphere = &self.spheres[self.charge_to_sphere[j]];
        Some(sphere.center() + charge.position.coords)
    }

    pub fn charge_positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.charges
            .iter()
            .zip(&self.charge_to_sphere)
            .map(|(c, &k)| self.spheres[k].center() + c.position.coords)
    }

    /// Mean absolute charge position.
    pub fn center_of_geometry(&self) -> Point3<f64> {
        let positions: Vec<_> = self.charge_positions().collect();
        center_of_geometry(&positions)
    }

    /// Indices of charges whose footprint extends beyond their sphere.
    pub fn uncovered_charges(&self) -> Vec<usize> {
        self.charges
            .iter()
            .zip(&self.charge_to_sphere)
            .enumerate()
            .filter(|(_, (charge, k))| {
                charge.position.coords.norm() + charge.vdw_radius
                    > self.spheres[**k].radius() + COVERAGE_EPSILON
            })
            .map(|(j, _)| j)
            .collect()
    }

    /// Moves every sphere center by `dr` and wraps it back into the box.
    ///
    /// Local charge offsets are not touched. The molecule is not checked for
    /// overlap with anything; see [`System::check_for_overlap`](super::system::System::check_for_overlap).
    pub fn translate(&mut self, dr: &Vector3<f64>, pbc: &PeriodicBox) {
        for sphere in &mut self.spheres {
            let moved = pbc.wrap_point(&(sphere.center() + dr));
            sphere.set_center(moved);
        }
    }

    /// Rotates sphere centers and charge offsets about the origin.
    pub fn rotate(&mut self, rotation: &Rotation3<f64>) {
        for sphere in &mut self.spheres {
            let rotated = rotation * sphere.center();
            sphere.set_center(rotated);
        }
        for charge in &mut self.charges {
            charge.position = rotation * charge.position;
        }
    }

    pub fn rotate_quaternion(&mut self, rotation: &UnitQuaternion<f64>) {
        self.rotate(&rotation.to_rotation_matrix());
    }
}

fn validate_radii(
    what: &'static str,
    radii: impl Iterator<Item = f64>,
) -> Result<(), ConfigError> {
    for (index, value) in radii.enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidRadius { what, index, value });
        }
    }
    Ok(())
}
