use super::build_system;
use crate::cli::CheckArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;

pub fn run(args: CheckArgs) -> Result<()> {
    let assembly = build_system(&args.setup, &CliProgressHandler::new())?;
    println!(
        "✓ System is valid: {} molecule(s), {} CG sphere(s), no overlaps.",
        assembly.system.num_molecules(),
        assembly.system.num_spheres()
    );
    Ok(())
}
