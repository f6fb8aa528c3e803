use crate::forcefield::params::ForceField;
use crate::geometry::measure::distance;
use crate::models::ModelError;
use crate::models::atom::Atom;
use crate::models::cell::Cell;
use crate::models::terms::{Angle, Bond, Dihedral, Improper};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("{kind} references atom {atom} but the molecule has {atom_count} atoms")]
    AtomOutOfRange {
        kind: &'static str,
        atom: usize,
        atom_count: usize,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn check_range(
    kind: &'static str,
    atom: usize,
    atom_count: usize,
) -> Result<usize, TopologyError> {
    if atom < atom_count {
        Ok(atom)
    } else {
        Err(TopologyError::AtomOutOfRange {
            kind,
            atom,
            atom_count,
        })
    }
}

/// Builds bonds from explicitly declared atom pairs, validating indices and
/// normalizing endpoint order.
pub fn declared_bonds(
    pairs: &[(usize, usize)],
    atom_count: usize,
) -> Result<Vec<Bond>, TopologyError> {
    let mut bonds = Vec::with_capacity(pairs.len());
    for &(i, j) in pairs {
        check_range("bond", i, atom_count)?;
        check_range("bond", j, atom_count)?;
        bonds.push(Bond::new(i, j)?);
    }
    Ok(bonds)
}

/// Builds impropers from explicitly declared atom quadruples, validating
/// indices. Order is kept as declared.
pub fn declared_impropers(
    quads: &[[usize; 4]],
    atom_count: usize,
) -> Result<Vec<Improper>, TopologyError> {
    let mut impropers = Vec::with_capacity(quads.len());
    for quad in quads {
        for &atom in quad {
            check_range("improper", atom, atom_count)?;
        }
        impropers.push(Improper::new(quad[0], quad[1], quad[2], quad[3]));
    }
    Ok(impropers)
}

/// Infers connectivity from interatomic distances and force-field equilibrium
/// bond lengths.
///
/// Every atom pair whose type labels match a bond record, and whose distance
/// is within tolerance of that record's equilibrium length, becomes a bond.
/// Distances are minimum-image corrected when a cell is supplied. Atoms must
/// already carry their force-field type labels.
pub fn infer_bonds(
    atoms: &[Atom],
    ff: &ForceField,
    cell: Option<&Cell>,
) -> Result<Vec<Bond>, TopologyError> {
    let mut bonds = Vec::new();
    for i in 0..atoms.len() {
        let li = atoms[i].type_label()?;
        for j in (i + 1)..atoms.len() {
            let lj = atoms[j].type_label()?;
            let r = distance(&atoms[i].position, &atoms[j].position, cell);
            if ff
                .bonds
                .iter()
                .any(|rec| rec.matches(li, lj) && rec.check(r))
            {
                bonds.push(Bond::new(i, j)?);
            }
        }
    }
    Ok(bonds)
}

/// Enumerates every valence angle in the bond graph: one angle per unordered
/// pair of neighbours around each central atom.
pub fn enumerate_angles(bonds: &[Bond], atom_count: usize) -> Vec<Angle> {
    let mut angles = Vec::new();
    for center in 0..atom_count {
        let neighbours: Vec<usize> = bonds
            .iter()
            .filter_map(|bond| bond.partner(center))
            .collect();
        for a in 0..neighbours.len() {
            for b in (a + 1)..neighbours.len() {
                angles.push(Angle::new(neighbours[a], center, neighbours[b]));
            }
        }
    }
    angles
}

/// Enumerates proper dihedrals by walking bond triples around each
/// non-terminal bond: for a central bond k and flanking bonds l and j, the
/// path l-k-j spans four distinct atoms.
///
/// The walk emits torsions in the order the bond list dictates and keeps any
/// repeats it produces; downstream matching and type deduplication see the
/// same sequence a structure file with explicit torsions would declare.
pub fn enumerate_dihedrals(bonds: &[Bond]) -> Vec<Dihedral> {
    let mut dihedrals = Vec::new();
    for k in 0..bonds.len() {
        for l in 0..bonds.len() {
            if k == l {
                continue;
            }
            let first = if bonds[k].i == bonds[l].i {
                Some(bonds[l].j)
            } else if bonds[k].i == bonds[l].j {
                Some(bonds[l].i)
            } else {
                None
            };
            let Some(first) = first else {
                continue;
            };
            for j in 0..bonds.len() {
                if j == k || j == l {
                    continue;
                }
                let last = if bonds[k].j == bonds[j].i {
                    Some(bonds[j].j)
                } else if bonds[k].j == bonds[j].j {
                    Some(bonds[j].i)
                } else {
                    None
                };
                if let Some(last) = last {
                    dihedrals.push(Dihedral::new(first, bonds[k].i, bonds[k].j, last));
                }
            }
        }
    }
    dihedrals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcefield::params::ForceField;
    use crate::models::atom::AtomParams;
    use crate::models::cell::Pbc;
    use nalgebra::Point3;
    use std::io::Cursor;

    fn chain_bonds(n: usize) -> Vec<Bond> {
        (0..n - 1).map(|i| Bond::new(i, i + 1).unwrap()).collect()
    }

    fn typed_atom(name: &str, label: &str, position: Point3<f64>) -> Atom {
        let mut atom = Atom::at(name, position);
        atom.set_params(AtomParams {
            type_label: label.to_string(),
            charge: 0.0,
            kind: "lj".to_string(),
            params: vec![0.0, 0.0],
        });
        atom
    }

    #[test]
    fn declared_bonds_validate_and_normalize() {
        let bonds = declared_bonds(&[(2, 0), (1, 2)], 3).unwrap();
        assert_eq!(bonds[0].atoms(), [0, 2]);
        assert_eq!(bonds[1].atoms(), [1, 2]);

        let err = declared_bonds(&[(0, 3)], 3).unwrap_err();
        assert_eq!(
            err,
            TopologyError::AtomOutOfRange {
                kind: "bond",
                atom: 3,
                atom_count: 3
            }
        );
        assert!(matches!(
            declared_bonds(&[(1, 1)], 3).unwrap_err(),
            TopologyError::Model(ModelError::DegenerateBond(1))
        ));
    }

    #[test]
    fn declared_impropers_keep_order() {
        let impropers = declared_impropers(&[[3, 0, 1, 2]], 4).unwrap();
        assert_eq!(impropers[0].atoms(), [3, 0, 1, 2]);
        assert!(declared_impropers(&[[0, 1, 2, 4]], 4).is_err());
    }

    #[test]
    fn linear_chain_angle_and_dihedral_counts() {
        // n atoms in a chain: n-2 angles, n-3 torsions.
        for n in 4..8 {
            let bonds = chain_bonds(n);
            assert_eq!(enumerate_angles(&bonds, n).len(), n - 2);
            assert_eq!(enumerate_dihedrals(&bonds).len(), n - 3);
        }
    }

    #[test]
    fn butane_chain_terms_are_ordered_paths() {
        let bonds = chain_bonds(4);
        let angles = enumerate_angles(&bonds, 4);
        assert_eq!(angles[0].atoms(), [0, 1, 2]);
        assert_eq!(angles[1].atoms(), [1, 2, 3]);

        let dihedrals = enumerate_dihedrals(&bonds);
        assert_eq!(dihedrals.len(), 1);
        let atoms = dihedrals[0].atoms();
        assert!(atoms == [0, 1, 2, 3] || atoms == [3, 2, 1, 0]);
    }

    #[test]
    fn star_graph_has_angles_but_no_dihedrals() {
        // Methane-like: four terminal atoms around a hub, no 4-atom path.
        let bonds: Vec<Bond> = (1..5).map(|i| Bond::new(0, i).unwrap()).collect();
        assert_eq!(enumerate_angles(&bonds, 5).len(), 6);
        assert!(enumerate_dihedrals(&bonds).is_empty());
    }

    #[test]
    fn inference_bonds_pairs_within_tolerance() {
        let text = "\
ATOMS
CT  CT  12.011  0.0  lj  3.50  0.276
BONDS
CT CT  harm  1.529  2242.62
";
        let ff = ForceField::read_from(&mut Cursor::new(text)).unwrap();
        let atoms = vec![
            typed_atom("CT", "CT", Point3::new(0.0, 0.0, 0.0)),
            typed_atom("CT", "CT", Point3::new(1.54, 0.0, 0.0)),
            // 1.90 from its neighbour: deviation 0.37 > 0.25, not bonded.
            typed_atom("CT", "CT", Point3::new(3.44, 0.0, 0.0)),
        ];
        let bonds = infer_bonds(&atoms, &ff, None).unwrap();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].atoms(), [0, 1]);
    }

    #[test]
    fn inference_wraps_across_periodic_images() {
        let text = "\
ATOMS
CT  CT  12.011  0.0  lj  3.50  0.276
BONDS
CT CT  harm  1.529  2242.62
";
        let ff = ForceField::read_from(&mut Cursor::new(text)).unwrap();
        let atoms = vec![
            typed_atom("CT", "CT", Point3::new(0.2, 0.0, 0.0)),
            typed_atom("CT", "CT", Point3::new(8.7, 0.0, 0.0)),
        ];
        let cell = Cell::cubic(10.0, "xyz".parse::<Pbc>().unwrap(), 0.0, false).unwrap();

        assert!(infer_bonds(&atoms, &ff, None).unwrap().is_empty());
        let bonds = infer_bonds(&atoms, &ff, Some(&cell)).unwrap();
        assert_eq!(bonds.len(), 1);
    }

    #[test]
    fn inference_requires_typed_atoms() {
        let ff = ForceField::read_from(&mut Cursor::new("ATOMS\n")).unwrap();
        let atoms = vec![Atom::new("CT"), Atom::new("CT")];
        assert!(matches!(
            infer_bonds(&atoms, &ff, None).unwrap_err(),
            TopologyError::Model(ModelError::UntypedAtom(_))
        ));
    }
}
