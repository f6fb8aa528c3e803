//! System-wide aggregation: global type tables, per-term type indices, and
//! mixed non-bonded pair interactions.

pub mod vdw;

use crate::models::ModelError;
use crate::models::atom::AtomParams;
use crate::models::cell::Cell;
use crate::models::molecule::Molecule;
use crate::models::terms::{Angle, Bond, Dihedral, Improper, TermParams};
use std::collections::HashMap;
use thiserror::Error;
use vdw::{MixingRule, VdwPair, mix_pair};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("incompatible potential kinds between atom types '{i}' and '{j}'")]
    IncompatiblePotentials { i: String, j: String },
    #[error("different parameter list lengths between atom types '{i}' and '{j}'")]
    MismatchedParameters { i: String, j: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One entry in the system-wide atom type table.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    pub name: String,
    pub mass: f64,
    pub params: AtomParams,
}

/// One entry in a bonded term type table, keyed by the canonical
/// direction-independent type name.
#[derive(Debug, Clone, PartialEq)]
pub struct TermType {
    pub key: String,
    pub params: TermParams,
}

/// Bonded terms that participate in system-wide type indexing.
trait Typed {
    fn type_key(&self) -> Result<String, ModelError>;
    fn term_params(&self) -> Result<&TermParams, ModelError>;
    fn set_type_index(&mut self, index: usize);
}

macro_rules! impl_typed {
    ($term:ty) => {
        impl Typed for $term {
            fn type_key(&self) -> Result<String, ModelError> {
                Ok(self.params()?.canonical_key())
            }

            fn term_params(&self) -> Result<&TermParams, ModelError> {
                self.params()
            }

            fn set_type_index(&mut self, index: usize) {
                self.type_index = Some(index);
            }
        }
    };
}

impl_typed!(Bond);
impl_typed!(Angle);
impl_typed!(Dihedral);
impl_typed!(Improper);

/// The complete simulated system: all species, the simulation cell, the
/// deduplicated type tables, and the mixed non-bonded pair list.
///
/// Types are numbered in order of first occurrence across the species, and
/// every atom and bonded term carries its index into the matching table.
#[derive(Debug, Clone)]
pub struct System {
    pub species: Vec<Molecule>,
    pub cell: Cell,
    pub mix: MixingRule,
    pub atom_types: Vec<AtomType>,
    pub bond_types: Vec<TermType>,
    pub angle_types: Vec<TermType>,
    pub dihedral_types: Vec<TermType>,
    pub improper_types: Vec<TermType>,
    pub vdw: Vec<VdwPair>,
}

impl System {
    pub fn build(
        mut species: Vec<Molecule>,
        cell: Cell,
        mix: MixingRule,
    ) -> Result<Self, SystemError> {
        let atom_types = index_atoms(&mut species)?;
        let bond_types = index_terms(&mut species, |m| &mut m.bonds)?;
        let angle_types = index_terms(&mut species, |m| &mut m.angles)?;
        let dihedral_types = index_terms(&mut species, |m| &mut m.dihedrals)?;
        let improper_types = index_terms(&mut species, |m| &mut m.impropers)?;

        let mut pairs = Vec::new();
        for i in 0..atom_types.len() {
            for j in i..atom_types.len() {
                pairs.push(mix_pair(i, j, &atom_types[i], &atom_types[j], mix)?);
            }
        }

        Ok(Self {
            species,
            cell,
            mix,
            atom_types,
            bond_types,
            angle_types,
            dihedral_types,
            improper_types,
            vdw: pairs,
        })
    }

    /// Total number of atoms over all species, counting molecule copies.
    pub fn atom_count(&self) -> usize {
        self.species.iter().map(|s| s.count * s.atoms.len()).sum()
    }

    /// Total charge over all species, counting molecule copies.
    pub fn charge(&self) -> Result<f64, ModelError> {
        self.species
            .iter()
            .try_fold(0.0, |q, s| Ok(q + s.count as f64 * s.charge()?))
    }
}

fn index_atoms(species: &mut [Molecule]) -> Result<Vec<AtomType>, SystemError> {
    let mut types: Vec<AtomType> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for mol in species.iter_mut() {
        for atom in &mut mol.atoms {
            let index = match lookup.get(&atom.name) {
                Some(&i) => i,
                None => {
                    let i = types.len();
                    types.push(AtomType {
                        name: atom.name.clone(),
                        mass: atom.mass,
                        params: atom.params()?.clone(),
                    });
                    lookup.insert(atom.name.clone(), i);
                    i
                }
            };
            atom.type_index = Some(index);
        }
    }
    Ok(types)
}

fn index_terms<T, F>(species: &mut [Molecule], select: F) -> Result<Vec<TermType>, SystemError>
where
    T: Typed,
    F: Fn(&mut Molecule) -> &mut Vec<T>,
{
    let mut types: Vec<TermType> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for mol in species.iter_mut() {
        for term in select(mol).iter_mut() {
            let key = term.type_key()?;
            let index = match lookup.get(&key) {
                Some(&i) => i,
                None => {
                    let i = types.len();
                    types.push(TermType {
                        key: key.clone(),
                        params: term.term_params()?.clone(),
                    });
                    lookup.insert(key, i);
                    i
                }
            };
            term.set_type_index(index);
        }
    }
    Ok(types)
}
