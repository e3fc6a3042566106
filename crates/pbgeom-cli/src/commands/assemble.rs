use super::build_system;
use crate::cli::AssembleArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use pbgeom::core::io::records::write_records_to_path;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub fn run(args: AssembleArgs) -> Result<()> {
    println!("Assembling system from {}...", args.setup.config.display());
    let assembly = build_system(&args.setup, &CliProgressHandler::new())?;
    let system = &assembly.system;

    println!(
        "System: {} molecule(s), {} CG sphere(s), lambda = {:.4}, cutoff = {:.4}, box = {:.4}",
        system.num_molecules(),
        system.num_spheres(),
        system.lambda(),
        system.cutoff(),
        system.box_length()
    );
    for summary in &assembly.types {
        println!(
            "  Type {}: {} molecule(s), {} CG sphere(s) each",
            summary.type_id, summary.molecules, summary.spheres
        );
    }

    if let Some(path) = &args.atoms {
        write_csv(&system.atom_records(), path)?;
        println!("✓ Charges written to: {}", path.display());
    }
    if let Some(path) = &args.spheres {
        write_csv(&system.sphere_records(), path)?;
        println!("✓ CG spheres written to: {}", path.display());
    }
    Ok(())
}

fn write_csv<R: Serialize>(records: &[R], path: &Path) -> Result<()> {
    info!(rows = records.len(), "Writing records to {:?}", path);
    write_records_to_path(records, path).map_err(|e| CliError::Output {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{SetupArgs, SetupOverrides};
    use std::fs;
    use tempfile::tempdir;

    const SYSTEM: &str = r#"
        [box]
        length = 50.0
        cutoff = 40.0

        [[molecule]]
        charges = [
            { position = [0.0, 0.0, 0.0], charge = 1.0, radius = 1.0 },
            { position = [1.0, 0.0, 0.0], charge = -1.0, radius = 0.5 },
        ]
        spheres = [ { center = [0.5, 0.0, 0.0], radius = 2.0 } ]
        positions = [ [0.0, 0.0, 0.0], [10.0, 0.0, 0.0] ]
    "#;

    fn args(dir: &Path, content: &str) -> AssembleArgs {
        let config = dir.join("system.toml");
        fs::write(&config, content).unwrap();
        AssembleArgs {
            setup: SetupArgs {
                config,
                seed: Some(1),
                overrides: SetupOverrides::default(),
            },
            atoms: Some(dir.join("atoms.csv")),
            spheres: Some(dir.join("spheres.csv")),
        }
    }

    #[test]
    fn writes_one_row_per_charge_and_sphere() {
        let dir = tempdir().unwrap();
        run(args(dir.path(), SYSTEM)).unwrap();

        let atoms = fs::read_to_string(dir.path().join("atoms.csv")).unwrap();
        let spheres = fs::read_to_string(dir.path().join("spheres.csv")).unwrap();
        assert_eq!(atoms.lines().count(), 1 + 4);
        assert_eq!(spheres.lines().count(), 1 + 2);
        assert!(atoms.starts_with("molecule,x,y,z,charge,radius"));
        assert_eq!(spheres.lines().nth(2), Some("1,10.0,0.0,0.0,0.0,2.0"));
    }

    #[test]
    fn overlapping_system_fails_without_writing() {
        let dir = tempdir().unwrap();
        let content = SYSTEM.replace("[10.0, 0.0, 0.0]", "[3.0, 0.0, 0.0]");
        let err = run(args(dir.path(), &content)).unwrap_err();
        assert!(matches!(err, CliError::Engine(_)));
        assert!(err.to_string().contains("Molecule 0 & 1 overlap"));
        assert!(!dir.path().join("atoms.csv").exists());
    }
}
