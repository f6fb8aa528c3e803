use super::HEADER_COMMENT;
use crate::cli::Units;
use crate::error::{CliError, Result};
use ffgen::elements;
use ffgen::system::System;
use ffgen::system::vdw::MixingRule;
use nalgebra::Point3;
use std::io::Write;
use std::path::Path;

fn par(params: &[f64], k: usize) -> f64 {
    params.get(k).copied().unwrap_or(0.0)
}

fn index(type_index: Option<usize>) -> Result<usize> {
    type_index.ok_or_else(|| CliError::Argument("system types are not indexed".to_string()))
}

/// Writes `in.lmp` and `data.lmp` into `dir`, with coordinates taken from
/// the packed box in file order.
///
/// Energies are converted from kJ/mol to the target unit system, and
/// harmonic force constants are halved for the LAMMPS convention. Bond and
/// angle types with the constrained kind are driven by a SHAKE fix in the
/// command file. Impropers share the dihedral style, numbered after the
/// proper dihedral types.
pub fn write(
    system: &System,
    coords: &[Point3<f64>],
    all_pairs: bool,
    units: Units,
    dir: &Path,
) -> Result<()> {
    let natom = system.atom_count();
    if coords.len() != natom {
        return Err(CliError::Argument(format!(
            "packed box has {} atoms, system expects {natom}",
            coords.len()
        )));
    }

    let mut nbond = 0;
    let mut nangle = 0;
    let mut ndihed = 0;
    for sp in &system.species {
        nbond += sp.count * sp.bonds.len();
        nangle += sp.count * sp.angles.len();
        ndihed += sp.count * (sp.dihedrals.len() + sp.impropers.len());
    }

    let ecnv = units.energy_factor();
    write_command_file(system, units, nbond, nangle, ndihed, all_pairs, ecnv, dir)?;
    write_data_file(system, coords, nbond, nangle, ndihed, ecnv, dir)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_command_file(
    system: &System,
    units: Units,
    nbond: usize,
    nangle: usize,
    ndihed: usize,
    all_pairs: bool,
    ecnv: f64,
    dir: &Path,
) -> Result<()> {
    let mut f = std::fs::File::create(dir.join("in.lmp"))?;

    writeln!(f, "# {HEADER_COMMENT}\n")?;
    writeln!(f, "units {units}")?;
    writeln!(f, "boundary p p p\n")?;

    writeln!(f, "atom_style full")?;
    if nbond > 0 {
        writeln!(f, "bond_style harmonic")?;
    }
    if nangle > 0 {
        writeln!(f, "angle_style harmonic")?;
    }
    if ndihed > 0 {
        writeln!(f, "dihedral_style opls")?;
    }
    writeln!(f, "special_bonds lj/coul 0.0 0.0 0.5\n")?;

    writeln!(f, "read_data data.lmp")?;
    writeln!(f, "# read_restart restart.*.lmp")?;
    writeln!(f, "# reset_timestep 0\n")?;

    writeln!(f, "pair_style hybrid lj/cut/coul/long 12.0 12.0")?;
    if !all_pairs {
        match system.mix {
            MixingRule::Geometric => writeln!(f, "pair_modify mix geometric tail yes")?,
            MixingRule::Arithmetic => writeln!(f, "pair_modify mix arithmetic tail yes")?,
        }
        writeln!(f, "kspace_style pppm 1.0e-4\n")?;
        for (i, att) in system.atom_types.iter().enumerate() {
            writeln!(
                f,
                "pair_coeff {:4} {:4} lj/cut/coul/long {:12.6} {:12.6}  # {} {}",
                i + 1,
                i + 1,
                par(&att.params.params, 1) / ecnv,
                par(&att.params.params, 0),
                att.name,
                att.name
            )?;
        }
    } else {
        writeln!(f, "pair_modify tail yes")?;
        writeln!(f, "kspace_style pppm 1.0e-4\n")?;
        for nb in &system.vdw {
            writeln!(
                f,
                "pair_coeff {:4} {:4} lj/cut/coul/long {:12.6} {:12.6}  # {} {}",
                nb.i + 1,
                nb.j + 1,
                par(&nb.params, 1) / ecnv,
                par(&nb.params, 0),
                nb.i_name,
                nb.j_name
            )?;
        }
    }
    writeln!(f)?;

    writeln!(f, "variable nsteps equal 10000")?;
    writeln!(f, "variable nprint equal ${{nsteps}}/100")?;
    writeln!(f, "variable ndump equal ${{nsteps}}/100")?;
    writeln!(f, "# variable nrestart equal ${{nsteps}}/10\n")?;

    writeln!(f, "variable temp equal 300.0")?;
    writeln!(f, "variable press equal 1.0\n")?;

    writeln!(f, "neighbor 2.0 bin\n")?;

    match units {
        Units::Real => writeln!(f, "timestep 1.0\n")?,
        Units::Metal => writeln!(f, "timestep 0.001\n")?,
    }

    writeln!(f, "velocity all create ${{temp}} 12345\n")?;

    let shake_bonds: Vec<usize> = system
        .bond_types
        .iter()
        .enumerate()
        .filter(|(_, t)| t.params.kind == "cons")
        .map(|(i, _)| i + 1)
        .collect();
    let shake_angles: Vec<usize> = system
        .angle_types
        .iter()
        .enumerate()
        .filter(|(_, t)| t.params.kind == "cons")
        .map(|(i, _)| i + 1)
        .collect();
    if !shake_bonds.is_empty() || !shake_angles.is_empty() {
        write!(f, "fix fSHAKE all shake 0.0001 20 ${{nprint}}")?;
        if !shake_bonds.is_empty() {
            write!(f, " b")?;
            for i in &shake_bonds {
                write!(f, " {i}")?;
            }
        }
        if !shake_angles.is_empty() {
            write!(f, " a")?;
            for i in &shake_angles {
                write!(f, " {i}")?;
            }
        }
        writeln!(f, "\n")?;
    }

    writeln!(
        f,
        "fix fNPT all npt temp ${{temp}} ${{temp}} 100 iso ${{press}} ${{press}} 500\n"
    )?;

    writeln!(f, "# compute cRDF all rdf 100 1 1")?;
    writeln!(
        f,
        "# fix fRDF all ave/time 20 100 ${{nsteps}} c_cRDF file rdf.lammps mode vector\n"
    )?;

    writeln!(f, "# compute cMSD all msd")?;
    writeln!(
        f,
        "# fix fMSD all ave/time 1 1 ${{ndump}} c_cMSD[1] c_cMSD[2] c_cMSD[3] c_cMSD[4] file msd.lammps\n"
    )?;

    writeln!(
        f,
        "dump dCONF all custom ${{ndump}} dump.lammpstrj id mol type element x y z ix iy iz"
    )?;
    write!(f, "dump_modify dCONF element")?;
    for att in &system.atom_types {
        write!(f, " {}", elements::atomic_symbol(&att.name))?;
    }
    writeln!(f, "\n")?;

    writeln!(f, "thermo_style multi")?;
    writeln!(f, "thermo ${{nprint}}\n")?;

    writeln!(f, "# restart ${{nrestart}} restart.*.lmp\n")?;

    writeln!(f, "run ${{nsteps}}\n")?;

    writeln!(f, "write_restart restart.*.lmp")?;
    writeln!(f, "write_data data.*.lmp")?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_data_file(
    system: &System,
    coords: &[Point3<f64>],
    nbond: usize,
    nangle: usize,
    ndihed: usize,
    ecnv: f64,
    dir: &Path,
) -> Result<()> {
    let mut f = std::fs::File::create(dir.join("data.lmp"))?;
    let cell = &system.cell;

    writeln!(f, "{HEADER_COMMENT}\n")?;
    writeln!(f, "{} atoms", system.atom_count())?;
    if nbond > 0 {
        writeln!(f, "{nbond} bonds")?;
    }
    if nangle > 0 {
        writeln!(f, "{nangle} angles")?;
    }
    if ndihed > 0 {
        writeln!(f, "{ndihed} dihedrals")?;
    }
    writeln!(f)?;

    writeln!(f, "{} atom types", system.atom_types.len())?;
    if nbond > 0 {
        writeln!(f, "{} bond types", system.bond_types.len())?;
    }
    if nangle > 0 {
        writeln!(f, "{} angle types", system.angle_types.len())?;
    }
    let ndht = system.dihedral_types.len();
    if ndihed > 0 {
        writeln!(f, "{} dihedral types", ndht + system.improper_types.len())?;
    }
    writeln!(f)?;

    if cell.center {
        let (bx, by, bz) = (
            (cell.a + cell.gap) / 2.0,
            (cell.b + cell.gap) / 2.0,
            (cell.c + cell.gap) / 2.0,
        );
        writeln!(f, "{:12.6} {:12.6} xlo xhi", -bx, bx)?;
        writeln!(f, "{:12.6} {:12.6} ylo yhi", -by, by)?;
        writeln!(f, "{:12.6} {:12.6} zlo zhi", -bz, bz)?;
    } else {
        writeln!(f, "{:12.6} {:12.6} xlo xhi", 0.0, cell.a + cell.gap)?;
        writeln!(f, "{:12.6} {:12.6} ylo yhi", 0.0, cell.b + cell.gap)?;
        writeln!(f, "{:12.6} {:12.6} zlo zhi", 0.0, cell.c + cell.gap)?;
    }

    writeln!(f, "\nMasses\n")?;
    for (i, att) in system.atom_types.iter().enumerate() {
        writeln!(f, "{:4} {:8.3}  # {}", i + 1, att.mass, att.name)?;
    }

    if nbond > 0 {
        writeln!(f, "\nBond Coeffs\n")?;
        for (i, t) in system.bond_types.iter().enumerate() {
            writeln!(
                f,
                "{:4} {:12.6} {:12.6}  # {}",
                i + 1,
                par(&t.params.params, 1) / (2.0 * ecnv),
                par(&t.params.params, 0),
                t.params.name
            )?;
        }
    }

    if nangle > 0 {
        writeln!(f, "\nAngle Coeffs\n")?;
        for (i, t) in system.angle_types.iter().enumerate() {
            writeln!(
                f,
                "{:4} {:12.6} {:12.6}  # {}",
                i + 1,
                par(&t.params.params, 1) / (2.0 * ecnv),
                par(&t.params.params, 0),
                t.params.name
            )?;
        }
    }

    if ndihed > 0 {
        writeln!(f, "\nDihedral Coeffs\n")?;
        for (i, t) in system.dihedral_types.iter().enumerate() {
            write_torsion_coeff(&mut f, i + 1, &t.params.params, &t.params.name, ecnv)?;
        }
        for (i, t) in system.improper_types.iter().enumerate() {
            write_torsion_coeff(&mut f, ndht + i + 1, &t.params.params, &t.params.name, ecnv)?;
        }
    }

    writeln!(f, "\nAtoms\n")?;
    let mut i = 0;
    let mut molecule = 0;
    for sp in &system.species {
        for _ in 0..sp.count {
            for at in &sp.atoms {
                writeln!(
                    f,
                    "{:7} {:7} {:4} {:6.3} {:13.6e} {:13.6e} {:13.6e}  # {:<6} {}",
                    i + 1,
                    molecule + 1,
                    index(at.type_index)? + 1,
                    at.charge()?,
                    coords[i].x,
                    coords[i].y,
                    coords[i].z,
                    at.name,
                    sp.name
                )?;
                i += 1;
            }
            molecule += 1;
        }
    }

    if nbond > 0 {
        writeln!(f, "\nBonds\n")?;
        let mut i = 1;
        let mut shift = 1;
        for sp in &system.species {
            for _ in 0..sp.count {
                for bd in &sp.bonds {
                    writeln!(
                        f,
                        "{:7} {:4} {:7} {:7}  # {}",
                        i,
                        index(bd.type_index)? + 1,
                        bd.i + shift,
                        bd.j + shift,
                        bd.name()?
                    )?;
                    i += 1;
                }
                shift += sp.atoms.len();
            }
        }
    }

    if nangle > 0 {
        writeln!(f, "\nAngles\n")?;
        let mut i = 1;
        let mut shift = 1;
        for sp in &system.species {
            for _ in 0..sp.count {
                for an in &sp.angles {
                    writeln!(
                        f,
                        "{:7} {:4} {:7} {:7} {:7}  # {}",
                        i,
                        index(an.type_index)? + 1,
                        an.i + shift,
                        an.j + shift,
                        an.k + shift,
                        an.name()?
                    )?;
                    i += 1;
                }
                shift += sp.atoms.len();
            }
        }
    }

    if ndihed > 0 {
        writeln!(f, "\nDihedrals\n")?;
        let mut i = 1;
        let mut shift = 1;
        for sp in &system.species {
            for _ in 0..sp.count {
                for dh in &sp.dihedrals {
                    writeln!(
                        f,
                        "{:7} {:4} {:7} {:7} {:7} {:7}  # {}",
                        i,
                        index(dh.type_index)? + 1,
                        dh.i + shift,
                        dh.j + shift,
                        dh.k + shift,
                        dh.l + shift,
                        dh.name()?
                    )?;
                    i += 1;
                }
                for di in &sp.impropers {
                    writeln!(
                        f,
                        "{:7} {:4} {:7} {:7} {:7} {:7}  # {}",
                        i,
                        ndht + index(di.type_index)? + 1,
                        di.i + shift,
                        di.j + shift,
                        di.k + shift,
                        di.l + shift,
                        di.name()?
                    )?;
                    i += 1;
                }
                shift += sp.atoms.len();
            }
        }
    }

    writeln!(f)?;
    Ok(())
}

fn write_torsion_coeff(
    f: &mut std::fs::File,
    index: usize,
    params: &[f64],
    name: &str,
    ecnv: f64,
) -> Result<()> {
    writeln!(
        f,
        "{:4} {:12.6} {:12.6} {:12.6} {:12.6}  # {}",
        index,
        par(params, 0) / ecnv,
        par(params, 1) / ecnv,
        par(params, 2) / ecnv,
        par(params, 3) / ecnv,
        name
    )?;
    Ok(())
}
