use super::params::ForceField;
use crate::geometry::measure::{angle_deg, distance};
use crate::models::ModelError;
use crate::models::atom::AtomParams;
use crate::models::cell::Cell;
use crate::models::molecule::Molecule;
use crate::models::terms::TermParams;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no parameters in '{forcefield}' for atoms {names:?} of molecule '{molecule}'")]
    MissingAtomParams {
        molecule: String,
        forcefield: String,
        names: Vec<String>,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Per-molecule summary of the recoverable conditions hit while matching.
///
/// Fatal conditions become [`MatchError`]; everything here was logged and
/// survived (or was removed, for terms with no parameters).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MatchReport {
    /// Bonds kept despite an out-of-tolerance observed length.
    pub flagged_bonds: Vec<String>,
    /// Angles removed for an out-of-tolerance observed value.
    pub removed_angles: Vec<String>,
    /// Distinct type names with no bond record, removed from the molecule.
    pub missing_bonds: Vec<String>,
    /// Distinct type names with no angle record, removed from the molecule.
    pub missing_angles: Vec<String>,
    /// Distinct type names with no dihedral record, removed.
    pub missing_dihedrals: Vec<String>,
    /// Distinct type names with no improper record, removed.
    pub missing_impropers: Vec<String>,
}

impl MatchReport {
    pub fn has_missing(&self) -> bool {
        !(self.missing_bonds.is_empty()
            && self.missing_angles.is_empty()
            && self.missing_dihedrals.is_empty()
            && self.missing_impropers.is_empty())
    }
}

fn note_missing(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

/// Gives every atom of a force-field-less molecule the degenerate default
/// parameters: Lennard-Jones kind, zero charge, zero parameters. No bonded
/// terms are inferred for such molecules.
pub fn assign_untyped_defaults(mol: &mut Molecule) {
    for atom in &mut mol.atoms {
        atom.set_params(AtomParams::untyped_default(&atom.name));
    }
}

/// Matches one molecule against one force-field database.
///
/// Duplicate database records warn and the first match wins. Matching an
/// already-matched molecule a second time is a no-op with identical results.
pub struct Matcher<'a> {
    ff: &'a ForceField,
    cell: Option<&'a Cell>,
}

impl<'a> Matcher<'a> {
    pub fn new(ff: &'a ForceField, cell: Option<&'a Cell>) -> Self {
        Self { ff, cell }
    }

    fn ff_name(&self) -> String {
        self.ff.source.display().to_string()
    }

    /// Matches every atom by exact name, assigning type label, charge,
    /// potential kind, parameters, and the reference mass.
    ///
    /// Any atom with no record is fatal; all unresolved names across the
    /// molecule are collected into the one error.
    pub fn assign_atoms(&self, mol: &mut Molecule) -> Result<(), MatchError> {
        let mut missing: Vec<String> = Vec::new();

        for atom in &mut mol.atoms {
            let mut matched = false;
            let name = atom.name.clone();
            for record in self.ff.atoms.iter().filter(|r| r.name == name) {
                if matched {
                    warn!(
                        "duplicate atom '{}' in '{}', first match kept",
                        record.name,
                        self.ff.source.display()
                    );
                    continue;
                }
                atom.set_params(AtomParams {
                    type_label: record.type_label.clone(),
                    charge: record.charge,
                    kind: record.kind.clone(),
                    params: record.params.clone(),
                });
                atom.mass = record.mass;
                matched = true;
            }
            if !matched {
                note_missing(&mut missing, &atom.name);
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MatchError::MissingAtomParams {
                molecule: mol.name.clone(),
                forcefield: self.ff_name(),
                names: missing,
            })
        }
    }

    /// Full matching pass: atoms, then every bonded term.
    ///
    /// Bonds and angles are validated against their equilibrium values: a
    /// bond beyond tolerance is kept and flagged, an angle beyond tolerance
    /// is removed (that one observation judged unreliable, not the whole
    /// molecule). Terms with no matching record are removed, and the
    /// distinct missing type names are reported together once at the end.
    pub fn assign(&self, mol: &mut Molecule) -> Result<MatchReport, MatchError> {
        self.assign_atoms(mol)?;

        let mut report = MatchReport::default();
        self.match_bonds(mol, &mut report)?;
        self.match_angles(mol, &mut report)?;
        self.match_dihedrals(mol, &mut report)?;
        self.match_impropers(mol, &mut report)?;

        if report.has_missing() {
            warn!(
                "missing force field parameters in {}: bonds {:?} angles {:?} dihedrals {:?} impropers {:?}",
                mol.name,
                report.missing_bonds,
                report.missing_angles,
                report.missing_dihedrals,
                report.missing_impropers
            );
        }
        Ok(report)
    }

    fn match_bonds(&self, mol: &mut Molecule, report: &mut MatchReport) -> Result<(), MatchError> {
        let bonds = std::mem::take(&mut mol.bonds);
        let mut kept = Vec::with_capacity(bonds.len());

        for mut bond in bonds {
            let la = mol.atoms[bond.i].type_label()?.to_string();
            let lb = mol.atoms[bond.j].type_label()?.to_string();
            let r = distance(
                &mol.atoms[bond.i].position,
                &mol.atoms[bond.j].position,
                self.cell,
            );

            let mut matched = false;
            for record in self.ff.bonds.iter().filter(|rec| rec.matches(&la, &lb)) {
                if matched {
                    warn!(
                        "duplicate bond {}-{} in '{}', first match kept",
                        la,
                        lb,
                        self.ff.source.display()
                    );
                    continue;
                }
                bond.set_params(TermParams::new(
                    vec![la.clone(), lb.clone()],
                    &record.kind,
                    record.params.clone(),
                ));
                if !record.check(r) {
                    let description = format!(
                        "{} bond {}-{} {}-{} {:7.3}",
                        mol.name,
                        la,
                        lb,
                        bond.i + 1,
                        bond.j + 1,
                        r
                    );
                    warn!("bond length outside tolerance: {}", description);
                    report.flagged_bonds.push(description);
                }
                matched = true;
            }

            if matched {
                kept.push(bond);
            } else {
                note_missing(&mut report.missing_bonds, &format!("{la}-{lb}"));
            }
        }

        mol.bonds = kept;
        Ok(())
    }

    fn match_angles(&self, mol: &mut Molecule, report: &mut MatchReport) -> Result<(), MatchError> {
        let angles = std::mem::take(&mut mol.angles);
        let mut kept = Vec::with_capacity(angles.len());

        for mut angle in angles {
            let la = mol.atoms[angle.i].type_label()?.to_string();
            let lb = mol.atoms[angle.j].type_label()?.to_string();
            let lc = mol.atoms[angle.k].type_label()?.to_string();
            let theta = angle_deg(
                &mol.atoms[angle.i].position,
                &mol.atoms[angle.j].position,
                &mol.atoms[angle.k].position,
                self.cell,
            );

            let mut matched = false;
            let mut consistent = true;
            for record in self
                .ff
                .angles
                .iter()
                .filter(|rec| rec.matches(&la, &lb, &lc))
            {
                if matched {
                    warn!(
                        "duplicate angle {}-{}-{} in '{}', first match kept",
                        la,
                        lb,
                        lc,
                        self.ff.source.display()
                    );
                    continue;
                }
                angle.set_params(TermParams::new(
                    vec![la.clone(), lb.clone(), lc.clone()],
                    &record.kind,
                    record.params.clone(),
                ));
                consistent = record.check(theta);
                matched = true;
            }

            if !matched {
                note_missing(&mut report.missing_angles, &format!("{la}-{lb}-{lc}"));
            } else if !consistent {
                let description = format!(
                    "{} angle {}-{}-{} {}-{}-{} {:.2}",
                    mol.name,
                    la,
                    lb,
                    lc,
                    angle.i + 1,
                    angle.j + 1,
                    angle.k + 1,
                    theta
                );
                warn!("angle outside tolerance, removed: {}", description);
                report.removed_angles.push(description);
            } else {
                kept.push(angle);
            }
        }

        mol.angles = kept;
        Ok(())
    }

    fn match_dihedrals(
        &self,
        mol: &mut Molecule,
        report: &mut MatchReport,
    ) -> Result<(), MatchError> {
        let dihedrals = std::mem::take(&mut mol.dihedrals);
        let mut kept = Vec::with_capacity(dihedrals.len());

        for mut dihedral in dihedrals {
            let labels = self.quad_labels(mol, dihedral.atoms())?;
            let mut matched = false;
            for record in self
                .ff
                .dihedrals
                .iter()
                .filter(|rec| rec.matches(&labels))
            {
                if matched {
                    warn!(
                        "duplicate dihedral {} in '{}', first match kept",
                        labels.join("-"),
                        self.ff.source.display()
                    );
                    continue;
                }
                dihedral.set_params(TermParams::new(
                    labels.to_vec(),
                    &record.kind,
                    record.params.clone(),
                ));
                matched = true;
            }
            if matched {
                kept.push(dihedral);
            } else {
                note_missing(&mut report.missing_dihedrals, &labels.join("-"));
            }
        }

        mol.dihedrals = kept;
        Ok(())
    }

    fn match_impropers(
        &self,
        mol: &mut Molecule,
        report: &mut MatchReport,
    ) -> Result<(), MatchError> {
        let impropers = std::mem::take(&mut mol.impropers);
        let mut kept = Vec::with_capacity(impropers.len());

        for mut improper in impropers {
            let labels = self.quad_labels(mol, improper.atoms())?;
            let mut matched = false;
            for record in self
                .ff
                .impropers
                .iter()
                .filter(|rec| rec.matches(&labels))
            {
                if matched {
                    warn!(
                        "duplicate improper {} in '{}', first match kept",
                        labels.join("-"),
                        self.ff.source.display()
                    );
                    continue;
                }
                improper.set_params(TermParams::new(
                    labels.to_vec(),
                    &record.kind,
                    record.params.clone(),
                ));
                matched = true;
            }
            if matched {
                kept.push(improper);
            } else {
                note_missing(&mut report.missing_impropers, &labels.join("-"));
            }
        }

        mol.impropers = kept;
        Ok(())
    }

    fn quad_labels(&self, mol: &Molecule, atoms: [usize; 4]) -> Result<[String; 4], MatchError> {
        Ok([
            mol.atoms[atoms[0]].type_label()?.to_string(),
            mol.atoms[atoms[1]].type_label()?.to_string(),
            mol.atoms[atoms[2]].type_label()?.to_string(),
            mol.atoms[atoms[3]].type_label()?.to_string(),
        ])
    }
}
