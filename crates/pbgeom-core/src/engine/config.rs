use crate::core::coarse_grain::config::SphereSearchConfig;
use crate::core::models::charge::Charge;
use crate::core::models::error::ConfigError;
use crate::core::models::molecule::MoveType;
use crate::core::models::surface::SurfaceSamples;
use nalgebra::{Point3, Rotation3, Vector3};

/// How a molecule type obtains its CG spheres.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeGeometry {
    /// Caller-supplied sphere centers and radii.
    Explicit(Vec<(Point3<f64>, f64)>),
    /// Spheres found by the randomized search against a sampled surface.
    Derived(SurfaceSamples),
}

/// Where one copy of a molecule type is put in the box.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Translate so that the center of geometry lands on the point.
    Position(Point3<f64>),
    /// Rotate about the origin, then translate.
    Transform {
        rotation: Rotation3<f64>,
        translation: Vector3<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeTypeSetup {
    pub move_type: MoveType,
    pub drot: f64,
    pub dtrans: f64,
    pub charges: Vec<Charge>,
    pub geometry: TypeGeometry,
    pub placements: Vec<Placement>,
}

impl MoleculeTypeSetup {
    pub fn new(charges: Vec<Charge>, geometry: TypeGeometry) -> Self {
        Self {
            move_type: MoveType::default(),
            drot: 0.0,
            dtrans: 0.0,
            charges,
            geometry,
            placements: Vec::new(),
        }
    }

    pub fn with_move_type(mut self, move_type: MoveType) -> Self {
        self.move_type = move_type;
        self
    }

    pub fn with_diffusion(mut self, drot: f64, dtrans: f64) -> Self {
        self.drot = drot;
        self.dtrans = dtrans;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placements.push(placement);
        self
    }
}

/// Everything needed to assemble a [`System`](crate::core::models::system::System).
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSetup {
    pub box_length: f64,
    pub cutoff: f64,
    pub search: SphereSearchConfig,
    pub types: Vec<MoleculeTypeSetup>,
}

impl SystemSetup {
    pub fn num_placements(&self) -> usize {
        self.types.iter().map(|t| t.placements.len()).sum()
    }
}

#[derive(Default)]
pub struct SystemSetupBuilder {
    box_length: Option<f64>,
    cutoff: Option<f64>,
    search: Option<SphereSearchConfig>,
    types: Vec<MoleculeTypeSetup>,
}

impl SystemSetupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn box_length(mut self, length: f64) -> Self {
        self.box_length = Some(length);
        self
    }
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn search(mut self, search: SphereSearchConfig) -> Self {
        self.search = Some(search);
        self
    }
    pub fn molecule_type(mut self, setup: MoleculeTypeSetup) -> Self {
        self.types.push(setup);
        self
    }

    /// The search configuration falls back to [`SphereSearchConfig::default`].
    pub fn build(self) -> Result<SystemSetup, ConfigError> {
        let search = self.search.unwrap_or_default();
        search.validate()?;
        Ok(SystemSetup {
            box_length: self
                .box_length
                .ok_or(ConfigError::MissingParameter("box_length"))?,
            cutoff: self.cutoff.ok_or(ConfigError::MissingParameter("cutoff"))?,
            search,
            types: self.types,
        })
    }
}
