use super::charge::Charge;
use nalgebra::Point3;

/// A coarse-grained sphere enclosing a subset of a molecule's charges.
///
/// Members are indices into the owning molecule's charge list, kept in
/// ascending order. The radius is expected to enclose every member's footprint;
/// [`CGSphere::encloses`] checks this for a given charge.
#[derive(Debug, Clone, PartialEq)]
pub struct CGSphere {
    center: Point3<f64>,
    radius: f64,
    members: Vec<usize>,
}

impl CGSphere {
    pub fn new(center: Point3<f64>, radius: f64, mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self {
            center,
            radius,
            members,
        }
    }

    /// A sphere that exactly covers one charge: centered on it, sized to its
    /// van der Waals radius.
    pub fn singleton(index: usize, charge: &Charge) -> Self {
        Self {
            center: charge.position,
            radius: charge.vdw_radius,
            members: vec![index],
        }
    }

    #[inline]
    pub fn center(&self) -> &Point3<f64> {
        &self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of charges this sphere covers.
    #[inline]
    pub fn coverage(&self) -> usize {
        self.members.len()
    }

    /// Whether `charge` (given in the same frame as the center) lies within the
    /// sphere, allowing a slack of `eps`.
    pub fn encloses(&self, charge: &Charge, eps: f64) -> bool {
        charge.reach_from(&self.center) <= self.radius + eps
    }

    pub(crate) fn set_center(&mut self, center: Point3<f64>) {
        self.center = center;
    }

    pub(crate) fn push_member(&mut self, index: usize) {
        self.members.push(index);
    }
}
