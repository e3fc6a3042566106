//! Serialization of placed charges and CG spheres.
//!
//! Records are flat `serde` structs so that any tabular writer can consume them;
//! [`records::write_records`] emits CSV.

pub mod records;
