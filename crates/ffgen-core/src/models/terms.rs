use super::ModelError;

/// Returns the canonical, direction-independent key for a tuple of atom type
/// labels: the lexicographically smaller of the forward and reversed label
/// sequences, joined with `-`.
///
/// A bonded term matches a force-field record under either atom ordering, so
/// both type deduplication and parameter lookup go through this single key
/// instead of comparing forward and reversed name strings at every site.
pub fn canonical_key(labels: &[String]) -> String {
    let forward = labels.join("-");
    let reversed = labels
        .iter()
        .rev()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("-");
    if reversed < forward { reversed } else { forward }
}

/// Resolved force-field parameters for one bonded term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermParams {
    /// Display name in the term's own atom order ("CT-HC", "CT-CT-HC", ...).
    pub name: String,
    /// Atom type labels in the term's own atom order.
    pub labels: Vec<String>,
    /// Potential kind tag (e.g. "harm", "cons", "opls").
    pub kind: String,
    /// Parameter list, in the force field's own order and units.
    pub params: Vec<f64>,
}

impl TermParams {
    pub fn new(labels: Vec<String>, kind: &str, params: Vec<f64>) -> Self {
        Self {
            name: labels.join("-"),
            labels,
            kind: kind.to_string(),
            params,
        }
    }

    pub fn canonical_key(&self) -> String {
        canonical_key(&self.labels)
    }
}

macro_rules! typed_term_accessors {
    ($kind:literal) => {
        pub fn is_typed(&self) -> bool {
            self.params.is_some()
        }

        /// The resolved parameters, or an error if the term is untyped.
        pub fn params(&self) -> Result<&TermParams, ModelError> {
            self.params.as_ref().ok_or_else(|| ModelError::UntypedTerm {
                kind: $kind,
                atoms: self.atoms().to_vec(),
            })
        }

        /// The derived type name ("A-B[-C[-D]]"), or an error if untyped.
        pub fn name(&self) -> Result<&str, ModelError> {
            Ok(self.params()?.name.as_str())
        }

        pub fn set_params(&mut self, params: TermParams) {
            self.params = Some(params);
        }
    };
}

/// A covalent bond between two atoms of one molecule.
///
/// Endpoints are stored with `i < j`; construction normalizes the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    params: Option<TermParams>,
    pub type_index: Option<usize>,
}

impl Bond {
    pub fn new(i: usize, j: usize) -> Result<Self, ModelError> {
        if i == j {
            return Err(ModelError::DegenerateBond(i));
        }
        Ok(Self {
            i: i.min(j),
            j: i.max(j),
            params: None,
            type_index: None,
        })
    }

    pub fn atoms(&self) -> [usize; 2] {
        [self.i, self.j]
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.i == atom || self.j == atom
    }

    /// The endpoint opposite to `atom`, if `atom` is part of this bond.
    pub fn partner(&self, atom: usize) -> Option<usize> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }

    typed_term_accessors!("bond");
}

/// A valence angle i-j-k centered on atom j.
#[derive(Debug, Clone, PartialEq)]
pub struct Angle {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    params: Option<TermParams>,
    pub type_index: Option<usize>,
}

impl Angle {
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        Self {
            i,
            j,
            k,
            params: None,
            type_index: None,
        }
    }

    pub fn atoms(&self) -> [usize; 3] {
        [self.i, self.j, self.k]
    }

    typed_term_accessors!("angle");
}

/// A proper dihedral (torsion) spanning the bonded path i-j-k-l.
#[derive(Debug, Clone, PartialEq)]
pub struct Dihedral {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
    params: Option<TermParams>,
    pub type_index: Option<usize>,
}

impl Dihedral {
    pub fn new(i: usize, j: usize, k: usize, l: usize) -> Self {
        Self {
            i,
            j,
            k,
            l,
            params: None,
            type_index: None,
        }
    }

    pub fn atoms(&self) -> [usize; 4] {
        [self.i, self.j, self.k, self.l]
    }

    typed_term_accessors!("dihedral");
}

/// An improper dihedral keeping atom j close to the i-k-l plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Improper {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
    params: Option<TermParams>,
    pub type_index: Option<usize>,
}

impl Improper {
    pub fn new(i: usize, j: usize, k: usize, l: usize) -> Self {
        Self {
            i,
            j,
            k,
            l,
            params: None,
            type_index: None,
        }
    }

    pub fn atoms(&self) -> [usize; 4] {
        [self.i, self.j, self.k, self.l]
    }

    typed_term_accessors!("improper");
}
