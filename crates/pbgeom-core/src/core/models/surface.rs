use super::error::ConfigError;
use crate::core::utils::geometry::nearest_point;
use nalgebra::{Point3, Vector3};

/// Samples of a molecular surface: points paired with outward unit normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceSamples {
    points: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
}

impl SurfaceSamples {
    /// Pairs surface points with their outward normals, normalizing the normals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LengthMismatch`] if the two lists differ in length
    /// and [`ConfigError::DegenerateNormal`] if a normal has zero length.
    pub fn new(points: Vec<Point3<f64>>, normals: Vec<Vector3<f64>>) -> Result<Self, ConfigError> {
        if points.len() != normals.len() {
            return Err(ConfigError::LengthMismatch {
                what: "surface normals",
                expected: points.len(),
                found: normals.len(),
            });
        }
        let normals = normals
            .into_iter()
            .enumerate()
            .map(|(i, n)| n.try_normalize(f64::EPSILON).ok_or(ConfigError::DegenerateNormal(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points, normals })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// The sample nearest to `target` as `(index, distance)`.
    pub fn nearest(&self, target: &Point3<f64>) -> Option<(usize, f64)> {
        nearest_point(target, &self.points)
    }

    /// Whether `target` lies on the inner side of sample `index`, i.e. the
    /// vector from `target` to the sample does not oppose the outward normal.
    pub fn is_inside_of(&self, index: usize, target: &Point3<f64>) -> bool {
        (self.points[index] - target).dot(&self.normals[index]) >= 0.0
    }
}
