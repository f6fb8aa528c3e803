use super::HEADER_COMMENT;
use crate::error::{CliError, Result};
use ffgen::system::System;
use nalgebra::Point3;
use std::io::Write;
use std::path::Path;

fn par(params: &[f64], k: usize) -> f64 {
    params.get(k).copied().unwrap_or(0.0)
}

/// Writes the DL_POLY `FIELD` and `CONFIG` files into `dir`.
///
/// Energies stay in kJ/mol. Constrained bonds become constraint records
/// instead of bonded potentials, and dihedrals and impropers are written as
/// cos3 series (or cos4 when requested) with the 1-4 scaling factors fixed
/// at 0.5.
pub fn write(system: &System, coords: &[Point3<f64>], cos4: bool, dir: &Path) -> Result<()> {
    let natom = system.atom_count();
    if coords.len() != natom {
        return Err(CliError::Argument(format!(
            "packed box has {} atoms, system expects {natom}",
            coords.len()
        )));
    }

    write_field(system, cos4, dir)?;
    write_config(system, coords, dir)?;
    Ok(())
}

fn write_field(system: &System, cos4: bool, dir: &Path) -> Result<()> {
    let mut f = std::fs::File::create(dir.join("FIELD"))?;

    writeln!(f, "{HEADER_COMMENT}")?;
    writeln!(f, "units kJ\n")?;

    writeln!(f, "molecular types {}", system.species.len())?;
    for sp in &system.species {
        writeln!(f, "{}", sp.name)?;
        writeln!(f, "nummols {}", sp.count)?;

        writeln!(f, "atoms {}", sp.atoms.len())?;
        for at in &sp.atoms {
            writeln!(
                f,
                "{:<5} {:8.4} {:6.3} 1  # {}",
                at.name,
                at.mass,
                at.charge()?,
                at.params()?.type_label
            )?;
        }

        let constrained: Vec<_> = sp
            .bonds
            .iter()
            .filter(|bd| bd.params().map(|p| p.kind == "cons").unwrap_or(false))
            .collect();
        writeln!(f, "constraints {}", constrained.len())?;
        for bd in &constrained {
            writeln!(
                f,
                "{:4} {:4} {:6.3}  # {}",
                bd.i + 1,
                bd.j + 1,
                par(&bd.params()?.params, 0),
                bd.name()?
            )?;
        }
        writeln!(f, "bonds {}", sp.bonds.len() - constrained.len())?;
        for bd in &sp.bonds {
            let params = bd.params()?;
            if params.kind != "cons" {
                writeln!(
                    f,
                    "{:>4} {:4} {:4} {:7.1} {:6.3}  # {}",
                    params.kind,
                    bd.i + 1,
                    bd.j + 1,
                    par(&params.params, 1),
                    par(&params.params, 0),
                    params.name
                )?;
            }
        }

        writeln!(f, "angles {}", sp.angles.len())?;
        for an in &sp.angles {
            let params = an.params()?;
            writeln!(
                f,
                "{:>4} {:4} {:4} {:4} {:7.2} {:7.2}  # {}",
                params.kind,
                an.i + 1,
                an.j + 1,
                an.k + 1,
                par(&params.params, 1),
                par(&params.params, 0),
                params.name
            )?;
        }

        writeln!(f, "dihedrals {}", sp.dihedrals.len() + sp.impropers.len())?;
        let torsions = sp
            .dihedrals
            .iter()
            .map(|dh| (dh.atoms(), dh.params()))
            .chain(sp.impropers.iter().map(|di| (di.atoms(), di.params())));
        for (atoms, params) in torsions {
            let params = params?;
            if cos4 {
                writeln!(
                    f,
                    "cos4 {:4} {:4} {:4} {:4} {:9.4} {:9.4} {:9.4} {:9.4} {:6.3} {:6.3}  # {}",
                    atoms[0] + 1,
                    atoms[1] + 1,
                    atoms[2] + 1,
                    atoms[3] + 1,
                    par(&params.params, 0),
                    par(&params.params, 1),
                    par(&params.params, 2),
                    par(&params.params, 3),
                    0.5,
                    0.5,
                    params.name
                )?;
            } else {
                writeln!(
                    f,
                    "cos3 {:4} {:4} {:4} {:4} {:9.4} {:9.4} {:9.4} {:6.3} {:6.3}  # {}",
                    atoms[0] + 1,
                    atoms[1] + 1,
                    atoms[2] + 1,
                    atoms[3] + 1,
                    par(&params.params, 0),
                    par(&params.params, 1),
                    par(&params.params, 2),
                    0.5,
                    0.5,
                    params.name
                )?;
            }
        }
        writeln!(f, "finish")?;
    }

    writeln!(f, "vdw {}", system.vdw.len())?;
    for nb in &system.vdw {
        if nb.kind == "lj" {
            writeln!(
                f,
                "{:<5} {:<5} {:>4} {:10.6} {:8.4}",
                nb.i_name,
                nb.j_name,
                nb.kind,
                par(&nb.params, 1),
                par(&nb.params, 0)
            )?;
        }
    }

    writeln!(f, "close")?;
    Ok(())
}

fn write_config(system: &System, coords: &[Point3<f64>], dir: &Path) -> Result<()> {
    let mut f = std::fs::File::create(dir.join("CONFIG"))?;
    let cell = &system.cell;

    writeln!(f, "{HEADER_COMMENT}")?;
    let imcon = if cell.a == cell.b && cell.b == cell.c {
        1
    } else if cell.a == cell.b || cell.b == cell.c || cell.c == cell.a {
        2
    } else {
        3
    };
    writeln!(f, " {:9} {:9} {:9}", 0, imcon, coords.len())?;
    writeln!(f, " {:19.9} {:19.9} {:19.9}", cell.a + cell.gap, 0.0, 0.0)?;
    writeln!(f, " {:19.9} {:19.9} {:19.9}", 0.0, cell.b + cell.gap, 0.0)?;
    writeln!(f, " {:19.9} {:19.9} {:19.9}", 0.0, 0.0, cell.c + cell.gap)?;

    let mut i = 0;
    for sp in &system.species {
        for _ in 0..sp.count {
            for at in &sp.atoms {
                writeln!(f, "{:<8} {:9}", at.name, i + 1)?;
                writeln!(
                    f,
                    " {:19.9} {:19.9} {:19.9}",
                    coords[i].x, coords[i].y, coords[i].z
                )?;
                i += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffgen::models::atom::{Atom, AtomParams};
    use ffgen::models::cell::Cell;
    use ffgen::models::molecule::Molecule;
    use ffgen::models::terms::{Bond, TermParams};
    use ffgen::system::vdw::MixingRule;
    use tempfile::TempDir;

    fn water_like() -> Molecule {
        let mut mol = Molecule::new("water");
        mol.count = 3;
        for (name, charge) in [("OW", -0.8476), ("HW", 0.4238), ("HW", 0.4238)] {
            let mut atom = Atom::new(name);
            atom.set_params(AtomParams {
                type_label: name.to_string(),
                charge,
                kind: "lj".to_string(),
                params: vec![3.166, 0.650],
            });
            mol.atoms.push(atom);
        }
        for (i, j) in [(0, 1), (0, 2)] {
            let mut bond = Bond::new(i, j).unwrap();
            bond.set_params(TermParams::new(
                vec!["OW".to_string(), "HW".to_string()],
                "cons",
                vec![1.0, 4000.0],
            ));
            mol.bonds.push(bond);
        }
        mol
    }

    fn packed_system() -> System {
        let cell = Cell::new(20.0, 20.0, 40.0, Default::default(), 0.0, false).unwrap();
        System::build(vec![water_like()], cell, MixingRule::Geometric).unwrap()
    }

    fn coords(n: usize) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn field_writes_constraints_instead_of_cons_bonds() {
        let dir = TempDir::new().unwrap();
        write(&packed_system(), &coords(9), false, dir.path()).unwrap();

        let field = std::fs::read_to_string(dir.path().join("FIELD")).unwrap();
        assert!(field.contains("molecular types 1"));
        assert!(field.contains("nummols 3"));
        assert!(field.contains("atoms 3"));
        assert!(field.contains("constraints 2"));
        assert!(field.contains("bonds 0"));
        assert!(field.contains("vdw 3"));
        assert!(field.ends_with("close\n"));
    }

    #[test]
    fn config_numbers_every_copy() {
        let dir = TempDir::new().unwrap();
        write(&packed_system(), &coords(9), false, dir.path()).unwrap();

        let config = std::fs::read_to_string(dir.path().join("CONFIG")).unwrap();
        // Two equal edges: slab-like periodic cell.
        assert!(config.contains("         0         2         9"));
        let atom_lines = config
            .lines()
            .filter(|l| l.starts_with("OW") || l.starts_with("HW"))
            .count();
        assert_eq!(atom_lines, 9);
    }

    #[test]
    fn coordinate_count_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            write(&packed_system(), &coords(4), false, dir.path()),
            Err(CliError::Argument(_))
        ));
    }
}
