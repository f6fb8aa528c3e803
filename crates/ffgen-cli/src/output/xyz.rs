use crate::error::{CliError, Result};
use ffgen::elements;
use ffgen::models::molecule::Molecule;
use std::io::Write;
use std::path::PathBuf;

/// Writes one copy of the species to `<stem>_pack.xyz` next to its source
/// file, with atom names reduced to element symbols for packmol. Returns the
/// path written.
pub fn write_species(mol: &Molecule) -> Result<PathBuf> {
    let source = mol.source.as_deref().ok_or_else(|| {
        CliError::Argument(format!("species '{}' has no source file", mol.name))
    })?;
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("species");
    let path = source.with_file_name(format!("{stem}_pack.xyz"));

    let mut f = std::fs::File::create(&path)?;
    writeln!(f, "{}", mol.atoms.len())?;
    match &mol.forcefield {
        Some(ff) => writeln!(f, "{} {}", mol.name, ff)?,
        None => writeln!(f, "{}", mol.name)?,
    }
    for atom in &mol.atoms {
        writeln!(
            f,
            "{:<5} {:15.6} {:15.6} {:15.6}",
            elements::atomic_symbol(&atom.name),
            atom.position.x,
            atom.position.y,
            atom.position.z
        )?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffgen::models::atom::Atom;
    use nalgebra::Point3;
    use tempfile::TempDir;

    #[test]
    fn writes_symbols_and_forcefield_header() {
        let dir = TempDir::new().unwrap();
        let mut mol = Molecule::new("water");
        mol.source = Some(dir.path().join("water.zmat"));
        mol.forcefield = Some("spce.ff".to_string());
        mol.atoms = vec![
            Atom::at("OW", Point3::new(0.0, 0.0, 0.0)),
            Atom::at("HW1", Point3::new(0.957, 0.0, 0.0)),
        ];

        let path = write_species(&mol).unwrap();
        assert_eq!(path, dir.path().join("water_pack.xyz"));
        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[1], "water spce.ff");
        assert!(lines[2].starts_with("O "));
        assert!(lines[3].starts_with("H "));
    }

    #[test]
    fn species_without_source_is_rejected() {
        let mol = Molecule::new("ghost");
        assert!(matches!(
            write_species(&mol),
            Err(CliError::Argument(_))
        ));
    }
}
