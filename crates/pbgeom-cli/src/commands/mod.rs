pub mod assemble;
pub mod check;

use crate::cli::SetupArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pbgeom::engine::progress::ProgressReporter;
use pbgeom::workflows;
use pbgeom::workflows::assemble::Assembly;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Loads the setup, seeds the search and runs the assembly workflow.
fn build_system(args: &SetupArgs, progress: &CliProgressHandler) -> Result<Assembly> {
    let setup = config::load_setup(args)?;
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    info!(seed, "Seeding CG sphere search. Pass --seed to reproduce this run.");

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(workflows::assemble::run(&setup, &reporter, &mut rng)?)
}
