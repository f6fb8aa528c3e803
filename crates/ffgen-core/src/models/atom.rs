use super::ModelError;
use crate::elements;
use nalgebra::Point3;

/// Resolved force-field parameters for one atom.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomParams {
    /// The force-field atom type label (e.g. "CT", "HC").
    pub type_label: String,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Non-bonded potential kind tag (e.g. "lj").
    pub kind: String,
    /// Non-bonded parameter list, in the force field's own order and units.
    pub params: Vec<f64>,
}

impl AtomParams {
    /// The degenerate default used for molecules with no force-field
    /// reference: a Lennard-Jones kind with zero charge and zero parameters.
    pub fn untyped_default(name: &str) -> Self {
        Self {
            type_label: name.to_string(),
            charge: 0.0,
            kind: "lj".to_string(),
            params: vec![0.0, 0.0],
        }
    }
}

/// An atom in a molecule.
///
/// Freshly constructed atoms are untyped: they carry a name, a mass defaulted
/// from the element-weight table, and a position. Parameters are attached by
/// the term matcher; the system aggregator later assigns the type index.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name as given in the molecule description (e.g. "CT", "H1").
    pub name: String,
    /// Atomic mass; defaulted from the element prefix, overridden by the
    /// force field once the atom is matched.
    pub mass: f64,
    /// Cartesian position in Angstroms.
    pub position: Point3<f64>,
    params: Option<AtomParams>,
    /// Zero-based index into the system-wide atom type table.
    pub type_index: Option<usize>,
}

impl Atom {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mass: elements::atomic_weight(name),
            position: Point3::origin(),
            params: None,
            type_index: None,
        }
    }

    pub fn at(name: &str, position: Point3<f64>) -> Self {
        Self {
            position,
            ..Self::new(name)
        }
    }

    pub fn is_typed(&self) -> bool {
        self.params.is_some()
    }

    /// The resolved parameters, or an error if the atom is still untyped.
    pub fn params(&self) -> Result<&AtomParams, ModelError> {
        self.params
            .as_ref()
            .ok_or_else(|| ModelError::UntypedAtom(self.name.clone()))
    }

    /// The force-field type label, or an error if the atom is still untyped.
    pub fn type_label(&self) -> Result<&str, ModelError> {
        Ok(self.params()?.type_label.as_str())
    }

    /// Partial charge, or an error if the atom is still untyped.
    pub fn charge(&self) -> Result<f64, ModelError> {
        Ok(self.params()?.charge)
    }

    pub fn set_params(&mut self, params: AtomParams) {
        self.params = Some(params);
    }
}
