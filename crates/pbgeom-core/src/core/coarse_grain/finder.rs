use super::config::SphereSearchConfig;
use super::sampling::{annealed_beta, metropolis_accept, random_unit_vector, standard_normal};
use crate::core::models::charge::Charge;
use crate::core::models::error::ConfigError;
use crate::core::models::sphere::CGSphere;
use crate::core::models::surface::SurfaceSamples;
use nalgebra::Point3;
use rand::Rng;
use tracing::{debug, instrument, trace};

/// Result of a sphere search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Spheres in discovery order. Together they partition the input charges.
    pub spheres: Vec<CGSphere>,
    /// How many spheres were created by the singleton fallback because no trial
    /// proposal covered any charge.
    pub degenerate_fallbacks: usize,
}

/// Tracks which charges are still waiting for a sphere.
///
/// Removal only clears a flag; the list of live indices is compacted once per
/// discovery round so that trial evaluation never visits bound charges.
#[derive(Debug)]
struct UnboundSet {
    is_unbound: Vec<bool>,
    live: Vec<usize>,
}

impl UnboundSet {
    fn new(n: usize) -> Self {
        Self {
            is_unbound: vec![true; n],
            live: (0..n).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn indices(&self) -> &[usize] {
        &self.live
    }

    fn choose(&self, rng: &mut impl Rng) -> usize {
        self.live[rng.gen_range(0..self.live.len())]
    }

    fn bind(&mut self, members: &[usize]) {
        for &idx in members {
            self.is_unbound[idx] = false;
        }
        let flags = &self.is_unbound;
        self.live.retain(|&idx| flags[idx]);
    }
}

#[derive(Debug, Clone, Copy)]
struct Trial {
    center: Point3<f64>,
    radius: f64,
    coverage: usize,
}

/// Randomized greedy partition of a molecule's charges into CG spheres.
///
/// Each round seeds a Metropolis walk at a random unbound charge. Proposals move
/// the center along a random direction by a normally distributed step scaled to
/// the distance to the surface, are rejected when they leave the surface, and
/// are sized to touch the nearest surface sample plus a tolerance. The best
/// sphere seen during the walk is frozen and its charges leave the pool.
pub struct SphereFinder<'a> {
    charges: &'a [Charge],
    surface: &'a SurfaceSamples,
    config: SphereSearchConfig,
}

impl<'a> SphereFinder<'a> {
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySurface`] when `surface` holds no samples and
    /// propagates invalid search parameters.
    pub fn new(
        charges: &'a [Charge],
        surface: &'a SurfaceSamples,
        config: SphereSearchConfig,
    ) -> Result<Self, ConfigError> {
        if surface.is_empty() {
            return Err(ConfigError::EmptySurface);
        }
        config.validate()?;
        Ok(Self {
            charges,
            surface,
            config,
        })
    }

    #[instrument(level = "debug", skip_all, name = "sphere_search", fields(charges = self.charges.len()))]
    pub fn run(&self, rng: &mut impl Rng) -> SearchOutcome {
        let n = self.charges.len();
        let mut unbound = UnboundSet::new(n);
        let mut spheres = Vec::new();
        let mut degenerate_fallbacks = 0;

        while !unbound.is_empty() && spheres.len() < n {
            let sphere = match self.search_round(&unbound, rng) {
                Some(sphere) => sphere,
                None => {
                    let idx = unbound.choose(rng);
                    degenerate_fallbacks += 1;
                    debug!(
                        charge = idx,
                        "No trial covered any charge; using a singleton sphere."
                    );
                    CGSphere::singleton(idx, &self.charges[idx])
                }
            };
            unbound.bind(sphere.members());
            spheres.push(sphere);
        }

        debug!(
            spheres = spheres.len(),
            degenerate_fallbacks, "Sphere search complete."
        );
        SearchOutcome {
            spheres,
            degenerate_fallbacks,
        }
    }

    fn search_round(&self, unbound: &UnboundSet, rng: &mut impl Rng) -> Option<CGSphere> {
        let seed = unbound.choose(rng);
        let mut current = Trial {
            center: self.charges[seed].position,
            radius: 0.0,
            coverage: 0,
        };
        let mut best: Option<Trial> = None;

        let mut m = 0;
        while m < self.config.n_trials || (best.is_none() && m < self.config.max_trials) {
            let beta = annealed_beta(self.config.beta, m);
            m += 1;
            if let Some(trial) = self.propose(&current.center, unbound.indices(), rng) {
                let gain = trial.coverage as f64 - current.coverage as f64;
                if metropolis_accept(beta, gain, rng) {
                    current = trial;
                    if current.coverage > best.map_or(0, |b| b.coverage) {
                        best = Some(current);
                    }
                }
            }
        }
        trace!(trials = m, coverage = best.map_or(0, |b| b.coverage), "Round finished.");

        let best = best?;
        let members: Vec<usize> = unbound
            .indices()
            .iter()
            .copied()
            .filter(|&j| self.covers(&best.center, best.radius, j))
            .collect();

        match members.as_slice() {
            [] => None,
            [only] => Some(CGSphere::singleton(*only, &self.charges[*only])),
            _ => Some(CGSphere::new(best.center, best.radius, members)),
        }
    }

    fn propose(&self, from: &Point3<f64>, unbound: &[usize], rng: &mut impl Rng) -> Option<Trial> {
        let (_, scale) = self.surface.nearest(from)?;
        let step = random_unit_vector(rng) * (scale * standard_normal(rng));
        let center = from + step;

        let (nearest, dist) = self.surface.nearest(&center)?;
        if !self.surface.is_inside_of(nearest, &center) {
            return None;
        }
        let radius = dist + self.config.surface_tolerance;
        let coverage = unbound
            .iter()
            .filter(|&&j| self.covers(&center, radius, j))
            .count();
        Some(Trial {
            center,
            radius,
            coverage,
        })
    }

    #[inline]
    fn covers(&self, center: &Point3<f64>, radius: f64, index: usize) -> bool {
        self.charges[index].reach_from(center) < radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use nalgebra::Vector3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    fn sphere_surface(radius: f64, n: usize) -> SurfaceSamples {
        let golden = PI * (3.0 - 5f64.sqrt());
        let (points, normals): (Vec<_>, Vec<_>) = (0..n)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
                let r = (1.0 - y * y).sqrt();
                let theta = golden * i as f64;
                let normal = Vector3::new(r * theta.cos(), y, r * theta.sin());
                (Point3::from(normal * radius), normal)
            })
            .unzip();
        SurfaceSamples::new(points, normals).unwrap()
    }

    fn cluster_charges() -> Vec<Charge> {
        let mut rng = StdRng::seed_from_u64(1234);
        (0..30)
            .map(|_| {
                let p = random_unit_vector(&mut rng) * rng.gen_range(0.0..4.0);
                Charge::new(Point3::from(p), 0.1, 0.5)
            })
            .collect()
    }

    fn config() -> SphereSearchConfig {
        SphereSearchConfig {
            surface_tolerance: 1.0,
            n_trials: 40,
            max_trials: 2000,
            beta: 2.0,
        }
    }

    fn assert_partition(outcome: &SearchOutcome, n: usize) {
        let all: Vec<usize> = outcome
            .spheres
            .iter()
            .flat_map(|s| s.members().iter().copied())
            .sorted()
            .collect();
        assert_eq!(all, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn new_rejects_empty_surface() {
        let charges = cluster_charges();
        let surface = SurfaceSamples::default();
        assert_eq!(
            SphereFinder::new(&charges, &surface, config()).err(),
            Some(ConfigError::EmptySurface)
        );
    }

    #[test]
    fn no_charges_yield_no_spheres() {
        let surface = sphere_surface(5.0, 50);
        let finder = SphereFinder::new(&[], &surface, config()).unwrap();
        let outcome = finder.run(&mut StdRng::seed_from_u64(0));
        assert!(outcome.spheres.is_empty());
        assert_eq!(outcome.degenerate_fallbacks, 0);
    }

    #[test]
    fn spheres_partition_and_cover_all_charges() {
        let charges = cluster_charges();
        let surface = sphere_surface(6.0, 200);
        let finder = SphereFinder::new(&charges, &surface, config()).unwrap();
        let outcome = finder.run(&mut StdRng::seed_from_u64(42));

        assert!(!outcome.spheres.is_empty());
        assert!(outcome.spheres.len() <= charges.len());
        assert_partition(&outcome, charges.len());
        for sphere in &outcome.spheres {
            for &j in sphere.members() {
                assert!(sphere.encloses(&charges[j], 1e-9));
            }
        }
    }

    #[test]
    fn seeded_searches_are_reproducible() {
        let charges = cluster_charges();
        let surface = sphere_surface(6.0, 200);
        let finder = SphereFinder::new(&charges, &surface, config()).unwrap();
        let a = finder.run(&mut StdRng::seed_from_u64(99));
        let b = finder.run(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn unreachable_charges_fall_back_to_singletons() {
        // The only surface sample faces +x, so accepted centers have x <= 0 and are
        // always closer to the origin than to any charge.
        let charges = vec![
            Charge::new(Point3::new(50.0, 0.0, 0.0), 1.0, 0.3),
            Charge::new(Point3::new(60.0, 0.0, 0.0), -1.0, 0.4),
        ];
        let surface = SurfaceSamples::new(
            vec![Point3::origin()],
            vec![Vector3::new(1.0, 0.0, 0.0)],
        )
        .unwrap();
        let finder = SphereFinder::new(
            &charges,
            &surface,
            SphereSearchConfig {
                surface_tolerance: 0.0,
                n_trials: 5,
                max_trials: 50,
                beta: 1.0,
            },
        )
        .unwrap();
        let outcome = finder.run(&mut StdRng::seed_from_u64(3));

        assert_eq!(outcome.spheres.len(), 2);
        assert_eq!(outcome.degenerate_fallbacks, 2);
        assert_partition(&outcome, 2);
        for sphere in &outcome.spheres {
            let j = sphere.members()[0];
            assert_eq!(sphere.center(), &charges[j].position);
            assert_eq!(sphere.radius(), charges[j].vdw_radius);
        }
    }

    #[test]
    fn single_coverage_snaps_to_the_charge() {
        let charges = vec![Charge::new(Point3::origin(), 1.0, 0.7)];
        let surface = sphere_surface(3.0, 100);
        let finder = SphereFinder::new(&charges, &surface, config()).unwrap();
        let outcome = finder.run(&mut StdRng::seed_from_u64(17));

        assert_eq!(outcome.spheres.len(), 1);
        let sphere = &outcome.spheres[0];
        assert_eq!(sphere.center(), &Point3::origin());
        assert_eq!(sphere.radius(), 0.7);
    }

    #[test]
    fn unbound_set_compacts_after_binding() {
        let mut set = UnboundSet::new(5);
        set.bind(&[1, 3]);
        assert_eq!(set.indices(), &[0, 2, 4]);
        set.bind(&[0, 2, 4]);
        assert!(set.is_empty());
    }
}
