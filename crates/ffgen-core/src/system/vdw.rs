//! Non-bonded pair interactions between atom types.

use super::{AtomType, SystemError};
use std::fmt;
use std::str::FromStr;

/// Combining rule for unlike-pair parameters.
///
/// The first parameter (size) follows the selected rule; all remaining
/// parameters (energy) always combine geometrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixingRule {
    #[default]
    Geometric,
    Arithmetic,
}

impl FromStr for MixingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "g" | "geometric" => Ok(MixingRule::Geometric),
            "a" | "arithmetic" => Ok(MixingRule::Arithmetic),
            other => Err(format!("unknown mixing rule '{other}', use 'g' or 'a'")),
        }
    }
}

impl fmt::Display for MixingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MixingRule::Geometric => "geometric",
            MixingRule::Arithmetic => "arithmetic",
        })
    }
}

/// Mixed interaction between one pair of atom types.
#[derive(Debug, Clone, PartialEq)]
pub struct VdwPair {
    /// Atom type indices, `i <= j`.
    pub i: usize,
    pub j: usize,
    pub i_name: String,
    pub j_name: String,
    pub kind: String,
    pub params: Vec<f64>,
}

/// Combines two atom types into a pair interaction.
///
/// A type paired with itself keeps its parameters verbatim. Unlike pairs
/// require the same potential kind and parameter count.
pub fn mix_pair(
    i: usize,
    j: usize,
    a: &AtomType,
    b: &AtomType,
    rule: MixingRule,
) -> Result<VdwPair, SystemError> {
    if a.params.kind != b.params.kind {
        return Err(SystemError::IncompatiblePotentials {
            i: a.name.clone(),
            j: b.name.clone(),
        });
    }

    let params = if a.name == b.name {
        a.params.params.clone()
    } else {
        if a.params.params.len() != b.params.params.len() {
            return Err(SystemError::MismatchedParameters {
                i: a.name.clone(),
                j: b.name.clone(),
            });
        }
        a.params
            .params
            .iter()
            .zip(&b.params.params)
            .enumerate()
            .map(|(k, (&pa, &pb))| match (k, rule) {
                (0, MixingRule::Arithmetic) => (pa + pb) / 2.0,
                _ => (pa * pb).sqrt(),
            })
            .collect()
    };

    Ok(VdwPair {
        i,
        j,
        i_name: a.name.clone(),
        j_name: b.name.clone(),
        kind: a.params.kind.clone(),
        params,
    })
}
