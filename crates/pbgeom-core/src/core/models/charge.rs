use nalgebra::Point3;

/// A point charge with its van der Waals footprint.
///
/// Before a molecule freezes its sphere partition, `position` is an absolute
/// coordinate. Inside a [`Molecule`](super::molecule::Molecule) it is the offset
/// from the center of the CG sphere the charge belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charge {
    /// Position in Angstroms (absolute or sphere-local, see above).
    pub position: Point3<f64>,
    /// Charge magnitude in elementary charge units.
    pub magnitude: f64,
    /// Van der Waals radius in Angstroms.
    pub vdw_radius: f64,
}

impl Charge {
    pub fn new(position: Point3<f64>, magnitude: f64, vdw_radius: f64) -> Self {
        Self {
            position,
            magnitude,
            vdw_radius,
        }
    }

    /// Distance from `center` to the far edge of this charge's footprint.
    #[inline]
    pub fn reach_from(&self, center: &Point3<f64>) -> f64 {
        (self.position - center).norm() + self.vdw_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reach_adds_vdw_radius_to_center_distance() {
        let charge = Charge::new(Point3::new(3.0, 4.0, 0.0), -1.0, 0.5);
        assert!((charge.reach_from(&Point3::origin()) - 5.5).abs() < 1e-12);
        assert!((charge.reach_from(&charge.position) - 0.5).abs() < 1e-12);
    }
}
