use crate::core::models::error::ConfigError;

const DEFAULT_SURFACE_TOLERANCE: f64 = 2.5;
const DEFAULT_N_TRIALS: usize = 40;
const DEFAULT_MAX_TRIALS: usize = 40_000;
const DEFAULT_BETA: f64 = 2.0;

/// Parameters of the randomized CG sphere search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSearchConfig {
    /// Padding added to the distance from a candidate center to the nearest
    /// surface sample when sizing the candidate sphere.
    pub surface_tolerance: f64,
    /// Minimum number of trial proposals per sphere.
    pub n_trials: usize,
    /// Trial budget per sphere while no proposal has covered any charge.
    pub max_trials: usize,
    /// Initial inverse temperature of the Metropolis acceptance rule.
    pub beta: f64,
}

impl Default for SphereSearchConfig {
    fn default() -> Self {
        Self {
            surface_tolerance: DEFAULT_SURFACE_TOLERANCE,
            n_trials: DEFAULT_N_TRIALS,
            max_trials: DEFAULT_MAX_TRIALS,
            beta: DEFAULT_BETA,
        }
    }
}

impl SphereSearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.surface_tolerance.is_finite() || self.surface_tolerance < 0.0 {
            return Err(ConfigError::InvalidSearchParameter {
                name: "surface_tolerance",
                value: self.surface_tolerance,
            });
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(ConfigError::InvalidSearchParameter {
                name: "beta",
                value: self.beta,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SphereSearchConfigBuilder {
    surface_tolerance: Option<f64>,
    n_trials: Option<usize>,
    max_trials: Option<usize>,
    beta: Option<f64>,
}

impl SphereSearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface_tolerance(mut self, tolerance: f64) -> Self {
        self.surface_tolerance = Some(tolerance);
        self
    }
    pub fn n_trials(mut self, n: usize) -> Self {
        self.n_trials = Some(n);
        self
    }
    pub fn max_trials(mut self, n: usize) -> Self {
        self.max_trials = Some(n);
        self
    }
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn build(self) -> Result<SphereSearchConfig, ConfigError> {
        let config = SphereSearchConfig {
            surface_tolerance: self
                .surface_tolerance
                .ok_or(ConfigError::MissingParameter("surface_tolerance"))?,
            n_trials: self
                .n_trials
                .ok_or(ConfigError::MissingParameter("n_trials"))?,
            max_trials: self
                .max_trials
                .ok_or(ConfigError::MissingParameter("max_trials"))?,
            beta: self.beta.ok_or(ConfigError::MissingParameter("beta"))?,
        };
        config.validate()?;
        Ok(config)
    }
}
