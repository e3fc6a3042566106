use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{StandardNormal, UnitSphere};

const ANNEALING_INTERVAL: usize = 100;
const ANNEALING_FACTOR: f64 = 1.1;

/// Inverse temperature after `completed` trials of a walk starting at `beta0`.
///
/// Grows by a factor of 1.1 after every 100 completed trials.
pub fn annealed_beta(beta0: f64, completed: usize) -> f64 {
    let steps = (completed / ANNEALING_INTERVAL) as i32;
    beta0 * ANNEALING_FACTOR.powi(steps)
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vector3<f64> {
    let [x, y, z]: [f64; 3] = rng.sample(UnitSphere);
    Vector3::new(x, y, z)
}

/// A draw from the standard normal distribution.
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    rng.sample(StandardNormal)
}

/// Metropolis acceptance for a maximization move with gain `delta`.
///
/// Accepts when a uniform draw in `[0, 1)` falls below `exp(beta * delta)`, so any
/// non-negative gain is always accepted and losses are accepted with
/// exponentially decreasing probability.
pub fn metropolis_accept(beta: f64, delta: f64, rng: &mut impl Rng) -> bool {
    let draw: f64 = rng.r#gen();
    draw < (beta * delta).exp()
}
