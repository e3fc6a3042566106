use nalgebra::Point3;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// One point charge placed in the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtomRecord {
    pub molecule: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub charge: f64,
    pub radius: f64,
}

impl AtomRecord {
    pub fn new(molecule: usize, position: &Point3<f64>, charge: f64, radius: f64) -> Self {
        Self {
            molecule,
            x: position.x,
            y: position.y,
            z: position.z,
            charge,
            radius,
        }
    }
}

/// One CG sphere placed in the box. Spheres carry no charge of their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SphereRecord {
    pub molecule: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub charge: f64,
    pub radius: f64,
}

impl SphereRecord {
    pub fn new(molecule: usize, center: &Point3<f64>, radius: f64) -> Self {
        Self {
            molecule,
            x: center.x,
            y: center.y,
            z: center.z,
            charge: 0.0,
            radius,
        }
    }
}

/// Writes records as CSV with a header row.
pub fn write_records<R: Serialize>(
    records: &[R],
    writer: &mut impl Write,
) -> Result<(), RecordError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_records_to_path<R: Serialize, P: AsRef<Path>>(
    records: &[R],
    path: P,
) -> Result<(), RecordError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records(records, &mut writer)?;
    writer.flush()?;
    Ok(())
}
