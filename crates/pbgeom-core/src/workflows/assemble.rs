use crate::core::coarse_grain::config::SphereSearchConfig;
use crate::core::coarse_grain::finder::SphereFinder;
use crate::core::models::error::ConfigError;
use crate::core::models::molecule::{Molecule, MoleculeKind};
use crate::core::models::system::System;
use crate::core::utils::geometry::PeriodicBox;
use crate::engine::config::{MoleculeTypeSetup, Placement, SystemSetup, TypeGeometry};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-type statistics of an assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSummary {
    pub type_id: usize,
    pub molecules: usize,
    pub spheres: usize,
    pub degenerate_fallbacks: usize,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub system: System,
    pub types: Vec<TypeSummary>,
}

/// Builds one representative molecule per type, places its copies and validates
/// the resulting [`System`].
///
/// Every derived type searches with its own `StdRng` seeded from `rng` in type
/// order, so a seeded `rng` gives the same system with or without the `parallel`
/// feature.
#[instrument(skip_all, name = "assembly_workflow", fields(types = setup.types.len()))]
pub fn run(
    setup: &SystemSetup,
    reporter: &ProgressReporter,
    rng: &mut impl Rng,
) -> Result<Assembly, EngineError> {
    let pbc = PeriodicBox::new(setup.box_length)?;

    // === Phase 1: Representative molecules ===
    let representatives = reporter.phase("Building Molecule Types", || {
        build_representatives(setup, reporter, rng)
    })?;
    report_fallbacks(&representatives, reporter);

    // === Phase 2: Placement ===
    let molecules = reporter.phase("Placing Molecules", || {
        reporter.report(Progress::TaskStart {
            total_steps: setup.num_placements() as u64,
        });
        let mut molecules = Vec::with_capacity(setup.num_placements());
        for ((representative, _), type_setup) in representatives.iter().zip(&setup.types) {
            for (type_index, placement) in type_setup.placements.iter().enumerate() {
                molecules.push(place_copy(representative, type_index, placement, &pbc));
                reporter.report(Progress::TaskIncrement);
            }
        }
        reporter.report(Progress::TaskFinish);
        molecules
    });

    // === Phase 3: Validation ===
    let system = reporter.phase("Validating System", || {
        System::new(molecules, setup.cutoff, setup.box_length)
    })?;

    let types = representatives
        .iter()
        .zip(&setup.types)
        .enumerate()
        .map(|(type_id, ((molecule, fallbacks), type_setup))| TypeSummary {
            type_id,
            molecules: type_setup.placements.len(),
            spheres: molecule.num_spheres(),
            degenerate_fallbacks: *fallbacks,
        })
        .collect();

    info!(
        molecules = system.num_molecules(),
        spheres = system.num_spheres(),
        "Assembly complete."
    );
    Ok(Assembly { system, types })
}

fn build_representatives(
    setup: &SystemSetup,
    reporter: &ProgressReporter,
    rng: &mut impl Rng,
) -> Result<Vec<(Molecule, usize)>, EngineError> {
    let seeds: Vec<u64> = setup.types.iter().map(|_| rng.r#gen()).collect();
    let work: Vec<(usize, (&MoleculeTypeSetup, u64))> =
        setup.types.iter().zip(seeds).enumerate().collect();

    reporter.report(Progress::TaskStart {
        total_steps: work.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = work.iter();

    #[cfg(feature = "parallel")]
    let iterator = work.par_iter();

    let results: Vec<Result<(Molecule, usize), EngineError>> = iterator
        .map(|&(type_id, (type_setup, seed))| {
            let built = build_representative(type_id, type_setup, setup.search, seed);
            if let Ok((molecule, fallbacks)) = &built {
                reporter.report(Progress::TypeBuilt {
                    type_id,
                    spheres: molecule.num_spheres(),
                    degenerate_fallbacks: *fallbacks,
                });
            }
            reporter.report(Progress::TaskIncrement);
            built
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    results.into_iter().collect()
}

fn report_fallbacks(representatives: &[(Molecule, usize)], reporter: &ProgressReporter) {
    let affected = representatives.iter().filter(|(_, f)| *f > 0).count();
    if affected == 0 {
        return;
    }
    let total: usize = representatives.iter().map(|(_, f)| f).sum();
    reporter.report(Progress::Message(format!(
        "{total} charge(s) in {affected} type(s) fell back to singleton spheres"
    )));
}

fn build_representative(
    type_id: usize,
    setup: &MoleculeTypeSetup,
    search: SphereSearchConfig,
    seed: u64,
) -> Result<(Molecule, usize), EngineError> {
    let kind = MoleculeKind::new(type_id, 0);
    let wrap = move |source: ConfigError| EngineError::TypeConstruction { type_id, source };

    let (molecule, fallbacks) = match &setup.geometry {
        TypeGeometry::Explicit(spheres) => {
            let (centers, radii): (Vec<_>, Vec<_>) = spheres.iter().copied().unzip();
            let molecule = Molecule::from_spheres(kind, setup.charges.clone(), &centers, &radii)
                .map_err(wrap)?;
            (molecule, 0)
        }
        TypeGeometry::Derived(surface) => {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = SphereFinder::new(&setup.charges, surface, search)
                .map_err(wrap)?
                .run(&mut rng);
            let fallbacks = outcome.degenerate_fallbacks;
            let molecule = Molecule::from_search_outcome(kind, setup.charges.clone(), outcome)
                .map_err(wrap)?;
            (molecule, fallbacks)
        }
    };

    debug!(
        type_id,
        charges = molecule.num_charges(),
        spheres = molecule.num_spheres(),
        fallbacks,
        "Representative molecule built."
    );
    Ok((
        molecule
            .with_move_type(setup.move_type)
            .with_diffusion(setup.drot, setup.dtrans),
        fallbacks,
    ))
}

fn place_copy(
    representative: &Molecule,
    type_index: usize,
    placement: &Placement,
    pbc: &PeriodicBox,
) -> Molecule {
    let mut molecule = representative.clone();
    molecule.set_type_index(type_index);
    match placement {
        Placement::Position(target) => {
            let shift = target - molecule.center_of_geometry();
            molecule.translate(&shift, pbc);
        }
        Placement::Transform {
            rotation,
            translation,
        } => {
            molecule.rotate(rotation);
            molecule.translate(translation, pbc);
        }
    }
    molecule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::charge::Charge;
    use crate::core::models::error::SystemError;
    use crate::core::models::molecule::MoveType;
    use crate::core::models::surface::SurfaceSamples;
    use crate::engine::config::SystemSetupBuilder;
    use nalgebra::{Point3, Rotation3, Vector3};
    use std::f64::consts::FRAC_PI_2;
    use std::sync::Mutex;

    fn dumbbell() -> MoleculeTypeSetup {
        MoleculeTypeSetup::new(
            vec![
                Charge::new(Point3::new(1.0, 0.0, 0.0), 1.0, 0.5),
                Charge::new(Point3::new(-1.0, 2.0, 0.0), -1.0, 0.5),
            ],
            TypeGeometry::Explicit(vec![
                (Point3::new(1.0, 0.0, 0.0), 1.0),
                (Point3::new(-1.0, 2.0, 0.0), 1.0),
            ]),
        )
    }

    fn ion() -> MoleculeTypeSetup {
        MoleculeTypeSetup::new(
            vec![Charge::new(Point3::origin(), 1.0, 1.0)],
            TypeGeometry::Explicit(vec![(Point3::origin(), 1.5)]),
        )
    }

    fn derived_blob() -> MoleculeTypeSetup {
        let mut rng = StdRng::seed_from_u64(8);
        let charges = (0..12)
            .map(|_| {
                let p = Vector3::new(
                    rng.gen_range(-1.5..1.5),
                    rng.gen_range(-1.5..1.5),
                    rng.gen_range(-1.5..1.5),
                );
                Charge::new(Point3::from(p), 0.2, 0.3)
            })
            .collect();
        let (points, normals): (Vec<_>, Vec<_>) = (0..150)
            .map(|_| {
                let n = crate::core::coarse_grain::sampling::random_unit_vector(&mut rng);
                (Point3::from(n * 4.0), n)
            })
            .unzip();
        MoleculeTypeSetup::new(
            charges,
            TypeGeometry::Derived(SurfaceSamples::new(points, normals).unwrap()),
        )
    }

    fn search() -> SphereSearchConfig {
        SphereSearchConfig {
            surface_tolerance: 1.0,
            n_trials: 20,
            max_trials: 500,
            beta: 2.0,
        }
    }

    #[test]
    fn assembles_placed_copies_in_type_order() {
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .molecule_type(
                dumbbell()
                    .with_move_type(MoveType::Rotate)
                    .with_diffusion(0.1, 0.2)
                    .with_placement(Placement::Position(Point3::new(10.0, 10.0, 10.0)))
                    .with_placement(Placement::Position(Point3::new(-10.0, 10.0, 10.0))),
            )
            .molecule_type(ion().with_placement(Placement::Transform {
                rotation: Rotation3::identity(),
                translation: Vector3::new(0.0, -20.0, 0.0),
            }))
            .build()
            .unwrap();

        let assembly = run(&setup, &ProgressReporter::new(), &mut StdRng::seed_from_u64(1)).unwrap();
        let system = &assembly.system;

        assert_eq!(system.num_molecules(), 3);
        assert_eq!(system.num_spheres(), 5);
        assert_eq!(system.global_index(0, 1), Some(1));
        assert_eq!(system.global_index(1, 0), Some(2));
        assert_eq!(system.type_count(0), 2);

        let first = system.molecule(0).unwrap();
        assert_eq!(first.move_type(), MoveType::Rotate);
        assert_eq!(first.drot(), 0.1);
        assert_eq!(first.dtrans(), 0.2);
        assert!((first.center_of_geometry() - Point3::new(10.0, 10.0, 10.0)).norm() < 1e-9);

        assert_eq!(
            assembly.types,
            vec![
                TypeSummary {
                    type_id: 0,
                    molecules: 2,
                    spheres: 2,
                    degenerate_fallbacks: 0
                },
                TypeSummary {
                    type_id: 1,
                    molecules: 1,
                    spheres: 1,
                    degenerate_fallbacks: 0
                },
            ]
        );
    }

    #[test]
    fn transform_rotates_before_translating() {
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .molecule_type(dumbbell().with_placement(Placement::Transform {
                rotation: Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
                translation: Vector3::new(5.0, 0.0, 0.0),
            }))
            .build()
            .unwrap();
        let assembly = run(&setup, &ProgressReporter::new(), &mut StdRng::seed_from_u64(1)).unwrap();
        let molecule = assembly.system.molecule(0).unwrap();
        let p = molecule.charge_position(0).unwrap();
        assert!((p - Point3::new(5.0, 1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn overlapping_placements_fail_validation() {
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .molecule_type(
                ion()
                    .with_placement(Placement::Position(Point3::origin()))
                    .with_placement(Placement::Position(Point3::new(2.0, 0.0, 0.0))),
            )
            .build()
            .unwrap();
        let err = run(&setup, &ProgressReporter::new(), &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::System {
                source: SystemError::Overlap {
                    first: 0,
                    second: 1
                }
            }
        ));
    }

    #[test]
    fn failing_type_is_identified() {
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .molecule_type(ion().with_placement(Placement::Position(Point3::origin())))
            .molecule_type(MoleculeTypeSetup::new(
                vec![Charge::new(Point3::origin(), 1.0, 1.0)],
                TypeGeometry::Derived(SurfaceSamples::default()),
            ))
            .build()
            .unwrap();
        let err = run(&setup, &ProgressReporter::new(), &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::TypeConstruction {
                type_id: 1,
                source: ConfigError::EmptySurface
            }
        ));
    }

    #[test]
    fn seeded_assembly_is_reproducible() {
        let setup = SystemSetupBuilder::new()
            .box_length(60.0)
            .cutoff(20.0)
            .search(search())
            .molecule_type(
                derived_blob()
                    .with_placement(Placement::Position(Point3::origin()))
                    .with_placement(Placement::Position(Point3::new(15.0, 0.0, 0.0))),
            )
            .build()
            .unwrap();

        let a = run(&setup, &ProgressReporter::new(), &mut StdRng::seed_from_u64(77)).unwrap();
        let b = run(&setup, &ProgressReporter::new(), &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a.system.sphere_records(), b.system.sphere_records());
        assert_eq!(a.system.atom_records(), b.system.atom_records());
        assert_eq!(a.types, b.types);
        assert_eq!(a.system.atom_records().len(), 24);
    }

    #[test]
    fn progress_reports_every_type_and_placement() {
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .molecule_type(
                ion()
                    .with_placement(Placement::Position(Point3::origin()))
                    .with_placement(Placement::Position(Point3::new(10.0, 0.0, 0.0))),
            )
            .molecule_type(dumbbell().with_placement(Placement::Position(Point3::new(0.0, 20.0, 0.0))))
            .build()
            .unwrap();

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));
        run(&setup, &reporter, &mut StdRng::seed_from_u64(2)).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let count = |pred: fn(&Progress) -> bool| events.iter().filter(|e| pred(*e)).count();
        assert_eq!(count(|e| matches!(e, Progress::PhaseStart { .. })), 3);
        assert_eq!(count(|e| matches!(e, Progress::PhaseFinish)), 3);
        assert_eq!(count(|e| matches!(e, Progress::TypeBuilt { .. })), 2);
        assert_eq!(count(|e| matches!(e, Progress::TaskIncrement)), 5);
    }

    #[test]
    fn singleton_fallbacks_are_summarized() {
        // A single +x facing sample keeps every accepted center away from the charges.
        let unreachable = MoleculeTypeSetup::new(
            vec![
                Charge::new(Point3::new(50.0, 0.0, 0.0), 1.0, 0.3),
                Charge::new(Point3::new(60.0, 0.0, 0.0), -1.0, 0.4),
            ],
            TypeGeometry::Derived(
                SurfaceSamples::new(vec![Point3::origin()], vec![Vector3::new(1.0, 0.0, 0.0)])
                    .unwrap(),
            ),
        );
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .search(SphereSearchConfig {
                surface_tolerance: 0.0,
                n_trials: 5,
                max_trials: 50,
                beta: 1.0,
            })
            .molecule_type(unreachable.with_placement(Placement::Position(Point3::origin())))
            .molecule_type(ion().with_placement(Placement::Position(Point3::new(0.0, 20.0, 0.0))))
            .build()
            .unwrap();

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));
        let assembly = run(&setup, &reporter, &mut StdRng::seed_from_u64(4)).unwrap();
        drop(reporter);

        assert_eq!(assembly.types[0].degenerate_fallbacks, 2);
        let messages: Vec<_> = events
            .into_inner()
            .unwrap()
            .into_iter()
            .filter_map(|e| match e {
                Progress::Message(msg) => Some(msg),
                _ => None,
            })
            .collect();
        assert_eq!(
            messages,
            vec!["2 charge(s) in 1 type(s) fell back to singleton spheres".to_string()]
        );
    }

    #[test]
    fn no_summary_without_fallbacks() {
        let setup = SystemSetupBuilder::new()
            .box_length(100.0)
            .cutoff(30.0)
            .molecule_type(ion().with_placement(Placement::Position(Point3::origin())))
            .build()
            .unwrap();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            events.lock().unwrap().push(e);
        }));
        run(&setup, &reporter, &mut StdRng::seed_from_u64(4)).unwrap();
        drop(reporter);
        let events = events.into_inner().unwrap();
        assert!(!events.iter().any(|e| matches!(e, Progress::Message(_))));
    }
}
