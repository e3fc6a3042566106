pub mod defaults;

use crate::cli::{SetupArgs, SetupOverrides};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use pbgeom::core::coarse_grain::config::SphereSearchConfig;
use pbgeom::core::models::charge::Charge;
use pbgeom::core::models::error::ConfigError;
use pbgeom::core::models::molecule::MoveType;
use pbgeom::core::models::surface::SurfaceSamples;
use pbgeom::engine::config::{
    MoleculeTypeSetup, Placement, SystemSetup, SystemSetupBuilder, TypeGeometry,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const ROTATION_TOLERANCE: f64 = 1e-6;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialBoxConfig {
    length: Option<f64>,
    cutoff: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSearchConfig {
    surface_tolerance: Option<f64>,
    n_trials: Option<usize>,
    max_trials: Option<usize>,
    beta: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct ChargeEntry {
    position: [f64; 3],
    charge: f64,
    radius: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct SphereEntry {
    center: [f64; 3],
    radius: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct SurfaceEntry {
    point: [f64; 3],
    normal: [f64; 3],
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct TransformEntry {
    #[serde(default)]
    translation: [f64; 3],
    rotation: Option<[[f64; 3]; 3]>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialMoleculeConfig {
    move_type: Option<String>,
    drot: Option<f64>,
    dtrans: Option<f64>,
    charges: Vec<ChargeEntry>,
    spheres: Option<Vec<SphereEntry>>,
    surface: Option<Vec<SurfaceEntry>>,
    #[serde(default)]
    positions: Vec<[f64; 3]>,
    #[serde(default)]
    transforms: Vec<TransformEntry>,
}

/// The system description as read from a TOML file, before defaults and
/// command-line overrides are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSystemConfig {
    #[serde(rename = "box")]
    pbc: Option<PartialBoxConfig>,
    search: Option<PartialSearchConfig>,
    #[serde(default, rename = "molecule")]
    molecules: Vec<PartialMoleculeConfig>,
}

impl PartialSystemConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading system description from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_with_cli(
        self,
        overrides: &SetupOverrides,
        defaults: &DefaultsConfig,
    ) -> Result<SystemSetup> {
        let pbc = self.pbc.unwrap_or_default();
        let box_length = overrides.box_length.or(pbc.length).ok_or_else(|| {
            CliError::Config(
                "`box.length` is required either in the config file or via --box-length."
                    .to_string(),
            )
        })?;
        let cutoff = overrides.cutoff.or(pbc.cutoff).ok_or_else(|| {
            CliError::Config(
                "`box.cutoff` is required either in the config file or via --cutoff.".to_string(),
            )
        })?;

        let search = Self::merge_search(self.search.unwrap_or_default(), overrides, defaults);

        let mut builder = SystemSetupBuilder::new()
            .box_length(box_length)
            .cutoff(cutoff)
            .search(search);
        for (type_id, molecule) in self.molecules.into_iter().enumerate() {
            let setup = Self::merge_molecule(molecule, defaults)
                .map_err(|msg| CliError::Config(format!("molecule {type_id}: {msg}")))?;
            builder = builder.molecule_type(setup);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_search(
        partial: PartialSearchConfig,
        overrides: &SetupOverrides,
        defaults: &DefaultsConfig,
    ) -> SphereSearchConfig {
        SphereSearchConfig {
            surface_tolerance: overrides
                .tolerance
                .or(partial.surface_tolerance)
                .unwrap_or(defaults.search.surface_tolerance),
            n_trials: overrides
                .n_trials
                .or(partial.n_trials)
                .unwrap_or(defaults.search.n_trials),
            max_trials: overrides
                .max_trials
                .or(partial.max_trials)
                .unwrap_or(defaults.search.max_trials),
            beta: overrides
                .beta
                .or(partial.beta)
                .unwrap_or(defaults.search.beta),
        }
    }

    fn merge_molecule(
        partial: PartialMoleculeConfig,
        defaults: &DefaultsConfig,
    ) -> std::result::Result<MoleculeTypeSetup, String> {
        let move_type: MoveType = partial
            .move_type
            .as_deref()
            .unwrap_or(defaults.move_type)
            .parse()
            .map_err(|e: ConfigError| e.to_string())?;

        let charges = partial
            .charges
            .iter()
            .map(|c| Charge::new(Point3::from(c.position), c.charge, c.radius))
            .collect();

        let geometry = match (partial.spheres, partial.surface) {
            (Some(spheres), None) => TypeGeometry::Explicit(
                spheres
                    .iter()
                    .map(|s| (Point3::from(s.center), s.radius))
                    .collect(),
            ),
            (None, Some(surface)) => {
                let (points, normals) = surface
                    .iter()
                    .map(|s| (Point3::from(s.point), Vector3::from(s.normal)))
                    .unzip();
                TypeGeometry::Derived(
                    SurfaceSamples::new(points, normals).map_err(|e| e.to_string())?,
                )
            }
            (Some(_), Some(_)) => {
                return Err("`spheres` and `surface` are mutually exclusive".to_string());
            }
            (None, None) => {
                return Err("either `spheres` or `surface` must be given".to_string());
            }
        };

        let mut setup = MoleculeTypeSetup::new(charges, geometry)
            .with_move_type(move_type)
            .with_diffusion(
                partial.drot.unwrap_or(defaults.drot),
                partial.dtrans.unwrap_or(defaults.dtrans),
            );
        for position in partial.positions {
            setup = setup.with_placement(Placement::Position(Point3::from(position)));
        }
        for transform in partial.transforms {
            let rotation = match transform.rotation {
                Some(rows) => parse_rotation(&rows)?,
                None => Rotation3::identity(),
            };
            setup = setup.with_placement(Placement::Transform {
                rotation,
                translation: Vector3::from(transform.translation),
            });
        }
        Ok(setup)
    }
}

/// Reads a row-major 3x3 matrix and checks that it is a proper rotation.
fn parse_rotation(rows: &[[f64; 3]; 3]) -> std::result::Result<Rotation3<f64>, String> {
    let m = Matrix3::from_fn(|r, c| rows[r][c]);
    let orthogonal = (m * m.transpose() - Matrix3::identity()).norm() < ROTATION_TOLERANCE;
    if !orthogonal || (m.determinant() - 1.0).abs() > ROTATION_TOLERANCE {
        return Err(format!("rotation {rows:?} is not a proper rotation matrix"));
    }
    Ok(Rotation3::from_matrix_unchecked(m))
}

/// Loads the system description named by `args` and applies overrides and defaults.
pub fn load_setup(args: &SetupArgs) -> Result<SystemSetup> {
    PartialSystemConfig::from_file(&args.config)?
        .merge_with_cli(&args.overrides, &DefaultsConfig::default())
}
