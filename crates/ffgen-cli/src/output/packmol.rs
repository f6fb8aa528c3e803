use super::HEADER_COMMENT;
use crate::error::Result;
use crate::output::xyz;
use ffgen::system::System;
use std::io::Write;
use std::path::Path;

/// Writes the packmol input script, one `structure` block per species, and
/// the per-species `<stem>_pack.xyz` coordinate files it references.
///
/// Centered cells pack molecules into a box symmetric about the origin;
/// anchored cells pack into the first octant.
pub fn write(system: &System, packfile: &Path, outfile: &Path, tol: f64) -> Result<()> {
    let mut f = std::fs::File::create(packfile)?;
    writeln!(f, "# {HEADER_COMMENT}")?;
    writeln!(f, "tolerance {tol:3.1}")?;
    writeln!(f, "filetype xyz")?;
    writeln!(f, "output {}", outfile.display())?;

    let cell = &system.cell;
    for sp in &system.species {
        let xyzfile = xyz::write_species(sp)?;
        writeln!(f, "\nstructure {}", xyzfile.display())?;
        writeln!(f, "  number {}", sp.count)?;
        if cell.center {
            writeln!(
                f,
                "  inside box {:.1} {:.1} {:.1} {:.1} {:.1} {:.1}",
                -cell.a / 2.0,
                -cell.b / 2.0,
                -cell.c / 2.0,
                cell.a / 2.0,
                cell.b / 2.0,
                cell.c / 2.0
            )?;
        } else {
            writeln!(
                f,
                "  inside box {:.1} {:.1} {:.1} {:.1} {:.1} {:.1}",
                0.0, 0.0, 0.0, cell.a, cell.b, cell.c
            )?;
        }
        writeln!(f, "end structure")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffgen::models::atom::{Atom, AtomParams};
    use ffgen::models::cell::Cell;
    use ffgen::models::molecule::Molecule;
    use ffgen::system::vdw::MixingRule;
    use tempfile::TempDir;

    fn species(dir: &TempDir, name: &str, count: usize) -> Molecule {
        let mut mol = Molecule::new(name);
        mol.source = Some(dir.path().join(format!("{name}.zmat")));
        mol.count = count;
        let mut atom = Atom::new("Ar");
        atom.set_params(AtomParams::untyped_default("Ar"));
        mol.atoms = vec![atom];
        mol
    }

    #[test]
    fn script_lists_each_species_with_counts() {
        let dir = TempDir::new().unwrap();
        let cell = Cell::cubic(20.0, Default::default(), 2.0, true).unwrap();
        let system = System::build(
            vec![species(&dir, "argon", 5), species(&dir, "neon", 7)],
            cell,
            MixingRule::Geometric,
        )
        .unwrap();

        let packfile = dir.path().join("pack.inp");
        write(&system, &packfile, Path::new("simbox.xyz"), 2.5).unwrap();

        let contents = std::fs::read_to_string(&packfile).unwrap();
        assert!(contents.contains("tolerance 2.5"));
        assert!(contents.contains("output simbox.xyz"));
        assert!(contents.contains("number 5"));
        assert!(contents.contains("number 7"));
        assert!(contents.contains("inside box -10.0 -10.0 -10.0 10.0 10.0 10.0"));
        assert!(dir.path().join("argon_pack.xyz").exists());
        assert!(dir.path().join("neon_pack.xyz").exists());
    }

    #[test]
    fn anchored_cell_packs_into_first_octant() {
        let dir = TempDir::new().unwrap();
        let cell = Cell::new(10.0, 20.0, 30.0, Default::default(), 0.0, false).unwrap();
        let system = System::build(
            vec![species(&dir, "argon", 1)],
            cell,
            MixingRule::Geometric,
        )
        .unwrap();

        let packfile = dir.path().join("pack.inp");
        write(&system, &packfile, Path::new("simbox.xyz"), 2.5).unwrap();
        let contents = std::fs::read_to_string(&packfile).unwrap();
        assert!(contents.contains("inside box 0.0 0.0 0.0 10.0 20.0 30.0"));
    }
}
