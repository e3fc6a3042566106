use thiserror::Error;

/// Errors caused by malformed or insufficient input geometry.
///
/// Construction of any model type fails with one of these instead of returning
/// a partially valid object.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Derived sphere geometry requires at least one surface sample")]
    EmptySurface,

    #[error("Nearest-center assignment requires at least one CG sphere")]
    NoSpheres,

    #[error("Mismatched record counts for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Charge {0} belongs to more than one CG sphere")]
    DuplicateMember(usize),

    #[error("Charge {0} does not belong to any CG sphere")]
    UnassignedCharge(usize),

    #[error("Invalid {what} at index {index}: {value} (must be finite and non-negative)")]
    InvalidRadius {
        what: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Surface normal at index {0} has zero length")]
    DegenerateNormal(usize),

    #[error("Invalid box length: {0} (must be finite and positive)")]
    InvalidBoxLength(f64),

    #[error("Invalid interaction cutoff: {0} (must be non-negative)")]
    InvalidCutoff(f64),

    #[error("Invalid search parameter '{name}': {value}")]
    InvalidSearchParameter { name: &'static str, value: f64 },

    #[error("Unknown move type: '{0}'")]
    UnknownMoveType(String),

    #[error("Duplicate molecule key: type {type_id}, index {type_index}")]
    DuplicateMolecule { type_id: usize, type_index: usize },
}

/// Errors raised by a [`System`](super::system::System).
#[derive(Debug, Error, PartialEq, Clone)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Molecule {first} & {second} overlap")]
    Overlap { first: usize, second: usize },

    #[error("Molecule index {0} is out of range")]
    MoleculeNotFound(usize),
}
