//! End-to-end assembly of one species: read a description file, build
//! coordinates and bonded topology, and parameterize everything against the
//! referenced force field.

use crate::forcefield::matcher::{self, MatchError, MatchReport, Matcher};
use crate::forcefield::params::{ForceFieldCache, ForceFieldError};
use crate::geometry::zmatrix::{self, GeometryError};
use crate::io::{self, CartesianDescription, Description, IoError};
use crate::models::ModelError;
use crate::models::atom::Atom;
use crate::models::cell::Cell;
use crate::models::molecule::{Molecule, TopologyOrigin};
use crate::topology::connectivity::{self, TopologyError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    ForceField(#[from] ForceFieldError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Reads a species description and produces a fully parameterized molecule.
///
/// With `build_topology` set and a force field referenced by the file, bonds
/// come either from the description itself or from distance-based inference
/// (z-matrix `reconnect`, mol `rec`, and all xyz files), and angles and
/// dihedrals are enumerated from the resulting bond graph. Without a force
/// field the molecule gets zeroed default parameters and no bonded terms.
///
/// The match report is returned for species that went through force-field
/// matching.
pub fn assemble_species(
    path: &Path,
    count: usize,
    build_topology: bool,
    cell: Option<&Cell>,
    cache: &mut ForceFieldCache,
) -> Result<(Molecule, Option<MatchReport>), PipelineError> {
    let description = io::read_description(path)?;

    let mut mol = Molecule::new(description.name());
    mol.source = Some(path.to_path_buf());
    mol.forcefield = description.forcefield().map(str::to_string);
    mol.count = count;

    let declared = match &description {
        Description::Zmat(z) => {
            let positions = zmatrix::build_coordinates(&z.entries)?;
            mol.atoms = z
                .entries
                .iter()
                .zip(positions)
                .map(|(entry, position)| Atom::at(&entry.name, position))
                .collect();
            if z.reconnect {
                None
            } else {
                // Each record's bond reference is a bond; connects close
                // the rings a tree-shaped z-matrix cannot express.
                let mut pairs: Vec<(usize, usize)> = z
                    .entries
                    .iter()
                    .enumerate()
                    .skip(1)
                    .filter_map(|(i, entry)| entry.bond.map(|(r, _)| (i, r)))
                    .collect();
                pairs.extend(&z.connect);
                Some(pairs)
            }
        }
        Description::Cartesian(CartesianDescription { atoms, bonds, .. }) => {
            mol.atoms = atoms
                .iter()
                .map(|(name, position)| Atom::at(name, *position))
                .collect();
            bonds.clone()
        }
    };

    if let Some(ff_name) = mol.forcefield.clone() {
        let ff = cache.load(Path::new(&ff_name))?;
        let matcher = Matcher::new(&ff, cell);

        if build_topology {
            match declared {
                Some(pairs) => {
                    mol.bonds = connectivity::declared_bonds(&pairs, mol.atoms.len())?;
                    mol.origin = TopologyOrigin::File;
                }
                None => {
                    matcher.assign_atoms(&mut mol)?;
                    mol.bonds = connectivity::infer_bonds(&mol.atoms, &ff, cell)?;
                    mol.origin = if cell.is_some_and(|c| c.pbc.any()) {
                        TopologyOrigin::InferredPbc
                    } else {
                        TopologyOrigin::Inferred
                    };
                }
            }
            mol.angles = connectivity::enumerate_angles(&mol.bonds, mol.atoms.len());
            mol.dihedrals = connectivity::enumerate_dihedrals(&mol.bonds);
            if let Description::Zmat(z) = &description {
                mol.impropers = connectivity::declared_impropers(&z.impropers, mol.atoms.len())?;
            }
        }

        let report = matcher.assign(&mut mol)?;
        Ok((mol, Some(report)))
    } else {
        matcher::assign_untyped_defaults(&mut mol);
        Ok((mol, None))
    }
}
