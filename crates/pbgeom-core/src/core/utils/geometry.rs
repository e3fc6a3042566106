use crate::core::models::error::ConfigError;
use nalgebra::{Point3, Vector3};

/// A cubic simulation box with periodic boundaries on all three axes.
///
/// All distances computed through the box follow the minimum-image convention:
/// each component of a separation vector is folded into `[-L/2, L/2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    length: f64,
}

impl PeriodicBox {
    /// Creates a box with edge length `length`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoxLength`] if the length is not a finite,
    /// strictly positive number.
    pub fn new(length: f64) -> Result<Self, ConfigError> {
        if !length.is_finite() || length <= 0.0 {
            return Err(ConfigError::InvalidBoxLength(length));
        }
        Ok(Self { length })
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Largest separation representable under the minimum-image convention.
    #[inline]
    pub fn half_length(&self) -> f64 {
        self.length / 2.0
    }

    /// Folds every component of `v` into the minimum-image range.
    #[inline]
    pub fn wrap_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let l = self.length;
        v.map(|d| d - (d / l).round() * l)
    }

    /// Folds the coordinates of `p` into the minimum-image range around the origin.
    #[inline]
    pub fn wrap_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.wrap_vector(&p.coords))
    }

    /// Minimum-image separation vector `p1 - p2`.
    #[inline]
    pub fn minimum_image(&self, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
        self.wrap_vector(&(p1 - p2))
    }

    #[inline]
    pub fn distance(&self, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
        self.minimum_image(p1, p2).norm()
    }
}

/// Arithmetic mean of a set of points, or the origin for an empty set.
pub fn center_of_geometry<'a, I>(points: I) -> Point3<f64>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let (sum, count) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, n), p| (sum + p.coords, n + 1));
    if count == 0 {
        Point3::origin()
    } else {
        Point3::from(sum / count as f64)
    }
}

/// Index of the point in `candidates` closest to `target`, with its distance.
///
/// Ties resolve to the lowest index. Returns `None` for an empty slice.
pub fn nearest_point(target: &Point3<f64>, candidates: &[Point3<f64>]) -> Option<(usize, f64)> {
    let mut nearest: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let dist_sq = (candidate - target).norm_squared();
        match nearest {
            Some((_, best)) if dist_sq >= best => {}
            _ => nearest = Some((idx, dist_sq)),
        }
    }
    nearest.map(|(idx, dist_sq)| (idx, dist_sq.sqrt()))
}
