use super::ModelError;
use super::atom::Atom;
use super::terms::{Angle, Bond, Dihedral, Improper};
use std::fmt;
use std::path::PathBuf;

/// How a molecule's bond list was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyOrigin {
    /// Bonds declared explicitly in the input description.
    File,
    /// Bonds inferred from interatomic distances.
    Inferred,
    /// Bonds inferred with minimum-image corrections across the cell.
    InferredPbc,
    /// No topology was built (coordinates-only run, or no force field).
    #[default]
    None,
}

impl fmt::Display for TopologyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopologyOrigin::File => "file",
            TopologyOrigin::Inferred => "guess",
            TopologyOrigin::InferredPbc => "pbc",
            TopologyOrigin::None => "none",
        })
    }
}

/// One molecule species: an ordered atom list, its bonded terms, and the
/// force field it is parameterized against.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub name: String,
    /// Path of the description file this species was read from, if any.
    pub source: Option<PathBuf>,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub angles: Vec<Angle>,
    pub dihedrals: Vec<Dihedral>,
    pub impropers: Vec<Improper>,
    /// Force-field file name referenced by the description, if any.
    pub forcefield: Option<String>,
    pub origin: TopologyOrigin,
    /// How many copies of this species exist in the simulated system.
    pub count: usize,
}

impl Molecule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 1,
            ..Self::default()
        }
    }

    /// Total mass of one molecule.
    pub fn mass(&self) -> f64 {
        self.atoms.iter().map(|a| a.mass).sum()
    }

    /// Net charge of one molecule. Fails if any atom is still untyped.
    pub fn charge(&self) -> Result<f64, ModelError> {
        self.atoms.iter().try_fold(0.0, |q, a| Ok(q + a.charge()?))
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "molecule {}  {} atoms  m = {:8.4}",
            self.name,
            self.atoms.len(),
            self.mass()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::atom::AtomParams;

    #[test]
    fn mass_sums_over_atoms() {
        let mut mol = Molecule::new("methane-ish");
        mol.atoms.push(Atom::new("CT"));
        mol.atoms.push(Atom::new("HC"));
        mol.atoms.push(Atom::new("HC"));
        assert!((mol.mass() - (12.011 + 2.0 * 1.008)).abs() < 1e-12);
    }

    #[test]
    fn charge_requires_typed_atoms() {
        let mut mol = Molecule::new("m");
        mol.atoms.push(Atom::new("CT"));
        assert!(mol.charge().is_err());

        mol.atoms[0].set_params(AtomParams {
            type_label: "CT".to_string(),
            charge: -0.18,
            kind: "lj".to_string(),
            params: vec![],
        });
        assert_eq!(mol.charge().unwrap(), -0.18);
    }

    #[test]
    fn topology_origin_displays_short_tags() {
        assert_eq!(TopologyOrigin::File.to_string(), "file");
        assert_eq!(TopologyOrigin::Inferred.to_string(), "guess");
        assert_eq!(TopologyOrigin::InferredPbc.to_string(), "pbc");
        assert_eq!(TopologyOrigin::None.to_string(), "none");
    }

    #[test]
    fn new_molecule_defaults_to_one_copy_and_no_topology() {
        let mol = Molecule::new("water");
        assert_eq!(mol.count, 1);
        assert_eq!(mol.origin, TopologyOrigin::None);
        assert!(mol.forcefield.is_none());
    }
}
