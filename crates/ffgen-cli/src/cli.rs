use clap::Parser;
use ffgen::models::cell::Pbc;
use ffgen::system::vdw::MixingRule;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Materials and Process Simulation Center, Caltech",
    version,
    about = "Force-field parameters and atomic coordinates for molecules \
described in z-matrix, MDL mol or xyz formats. Produces a pack.inp file for \
use with packmol to build the simulation box, then input files for LAMMPS or \
DL_POLY.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Density in mol/L, used to size a cubic box
    #[arg(short, long, value_name = "RHO")]
    pub rho: Option<f64>,

    /// Box length in A (cubic, or else specify a,b,c)
    #[arg(short, long = "box", value_name = "L[,L,L]")]
    pub box_spec: Option<String>,

    /// Tolerance for packmol
    #[arg(short, long, value_name = "DIST", default_value_t = 2.5)]
    pub tol: f64,

    /// [a]rithmetic or [g]eometric sigma_ij
    #[arg(short = 'x', long, value_name = "RULE", default_value = "g", value_parser = MixingRule::from_str)]
    pub mix: MixingRule,

    /// Save in lammps format (needs simbox.xyz built using packmol)
    #[arg(short, long)]
    pub lammps: bool,

    /// Write all I J pairs to lammps input files
    #[arg(short, long)]
    pub all_pairs: bool,

    /// Lammps units: [r]eal or [m]etal
    #[arg(short, long, value_name = "UNITS", default_value = "r", value_parser = Units::from_str)]
    pub units: Units,

    /// Connect bonds across periodic boundaries in x, xy, xyz, etc.
    #[arg(short, long, value_name = "AXES", default_value = "", value_parser = Pbc::from_str)]
    pub pbc: Pbc,

    /// Save in dlpoly format (needs simbox.xyz built using packmol)
    #[arg(short, long)]
    pub dlpoly: bool,

    /// Use cos4 dihedrals in dlpoly FIELD
    #[arg(short, long)]
    pub cos4: bool,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// n1 infile1 [n2 infile2 ...], where n_i are the numbers of molecules
    /// defined in infile_i. Use extension .zmat, .mol or .xyz
    #[arg(required = true, value_name = "N FILE")]
    pub species: Vec<String>,
}

/// Unit system of the generated LAMMPS files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Real,
    Metal,
}

impl Units {
    /// Conversion factor from kJ/mol to this unit system's energies.
    pub fn energy_factor(&self) -> f64 {
        match self {
            Units::Real => 4.184,
            Units::Metal => 96.485,
        }
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "r" | "real" => Ok(Units::Real),
            "m" | "metal" => Ok(Units::Metal),
            other => Err(format!("invalid units '{other}', choose [r]eal or [m]etal")),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Units::Real => "real",
            Units::Metal => "metal",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_density_run() {
        let cli = Cli::parse_from(["ffgen", "-r", "24.2", "40", "spc.zmat"]);
        assert_eq!(cli.rho, Some(24.2));
        assert_eq!(cli.species, vec!["40", "spc.zmat"]);
        assert_eq!(cli.mix, MixingRule::Geometric);
        assert_eq!(cli.units, Units::Real);
        assert!(!cli.lammps);
    }

    #[test]
    fn parses_lammps_run_with_options() {
        let cli = Cli::parse_from([
            "ffgen", "-b", "30,30,60", "-p", "xyz", "-x", "a", "-l", "-u", "m", "10", "a.zmat",
            "20", "b.xyz",
        ]);
        assert_eq!(cli.box_spec.as_deref(), Some("30,30,60"));
        assert!(cli.pbc.x && cli.pbc.y && cli.pbc.z);
        assert_eq!(cli.mix, MixingRule::Arithmetic);
        assert_eq!(cli.units, Units::Metal);
        assert!(cli.lammps);
        assert_eq!(cli.species.len(), 4);
    }

    #[test]
    fn rejects_bad_units_and_mix() {
        assert!(Cli::try_parse_from(["ffgen", "-u", "x", "1", "a.zmat"]).is_err());
        assert!(Cli::try_parse_from(["ffgen", "-x", "q", "1", "a.zmat"]).is_err());
    }

    #[test]
    fn units_convert_energy() {
        assert_eq!(Units::Real.energy_factor(), 4.184);
        assert_eq!(Units::Metal.energy_factor(), 96.485);
    }
}
