mod boxspec;
mod cli;
mod error;
mod logging;
mod output;

use clap::Parser;
use cli::Cli;
use error::{CliError, Result};
use ffgen::forcefield::params::ForceFieldCache;
use ffgen::pipeline;
use ffgen::system::System;
use std::path::{Path, PathBuf};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file) {
        eprintln!("Error: failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let counted = parse_species_args(&cli.species)?;
    let total: usize = counted.iter().map(|(n, _)| n).sum();

    let cell = boxspec::build_cell(cli.box_spec.as_deref(), cli.rho, total, cli.pbc)?;
    let build_topology = cli.lammps || cli.dlpoly;

    println!("molecule descriptions");
    let mut cache = ForceFieldCache::new();
    let mut species = Vec::with_capacity(counted.len());
    for (count, path) in &counted {
        println!("  {}", path.display());
        let (mol, _report) =
            pipeline::assemble_species(path, *count, build_topology, Some(&cell), &mut cache)?;
        species.push(mol);
    }

    println!("species                 nmol  bonds   charge");
    for sp in &species {
        println!(
            "  {:<20} {:5}  {:<5} {:+8.3}",
            sp.name,
            sp.count,
            sp.origin,
            sp.charge()?
        );
    }

    let system = System::build(species, cell, cli.mix)?;

    if cli.lammps {
        let coords = output::coords::read(Path::new("simbox.xyz"))?;
        output::lammps::write(&system, &coords, cli.all_pairs, cli.units, Path::new("."))?;
        println!("lammps files units {}", cli.units);
    } else if cli.dlpoly {
        let coords = output::coords::read(Path::new("simbox.xyz"))?;
        output::dlpoly::write(&system, &coords, cli.cos4, Path::new("."))?;
        println!("dlpoly files units kJ/mol");
    } else {
        output::packmol::write(
            &system,
            Path::new("pack.inp"),
            Path::new("simbox.xyz"),
            cli.tol,
        )?;
        println!("packmol file\n  pack.inp");
    }
    Ok(())
}

/// Expands the positional arguments into (count, file) pairs. A single bare
/// file name means one molecule of that species.
fn parse_species_args(args: &[String]) -> Result<Vec<(usize, PathBuf)>> {
    if args.len() == 1 {
        return Ok(vec![(1, PathBuf::from(&args[0]))]);
    }
    if args.len() % 2 != 0 {
        return Err(CliError::Argument(
            "give pairs of (number of molecules, molecule file)".to_string(),
        ));
    }
    args.chunks_exact(2)
        .map(|pair| {
            let count: usize = pair[0].parse().map_err(|_| {
                CliError::Argument(format!("invalid number of molecules '{}'", pair[0]))
            })?;
            Ok((count, PathBuf::from(&pair[1])))
        })
        .collect()
}
