use pbgeom::core::coarse_grain::config::SphereSearchConfig;

/// Values used when neither the config file nor the command line sets them.
pub struct DefaultsConfig {
    pub search: SphereSearchConfig,
    pub move_type: &'static str,
    pub drot: f64,
    pub dtrans: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search: SphereSearchConfig::default(),
            move_type: "move",
            drot: 0.0,
            dtrans: 0.0,
        }
    }
}
