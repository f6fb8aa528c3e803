//! Static element data shared by every stage of the pipeline.
//!
//! Atom names in molecule descriptions and force fields are element symbols
//! with an optional disambiguating suffix (e.g. `CT`, `H1`, `Cl2`). The
//! element is recovered from the 2-letter prefix first, then the 1-letter
//! prefix, so that `Cl1` resolves to chlorine rather than carbon.

use phf::{Map, phf_map};
use tracing::warn;

static ATOMIC_WEIGHTS: Map<&'static str, f64> = phf_map! {
    "H" => 1.008,
    "Li" => 6.941,
    "B" => 10.811,
    "C" => 12.011,
    "N" => 14.006,
    "O" => 15.999,
    "F" => 18.998,
    "Ne" => 20.180,
    "Na" => 22.990,
    "Mg" => 24.305,
    "Al" => 26.982,
    "Si" => 28.086,
    "P" => 30.974,
    "S" => 32.065,
    "Cl" => 35.453,
    "Ar" => 39.948,
    "K" => 39.098,
    "Ca" => 40.078,
    "Fe" => 55.845,
    "Zn" => 65.38,
    "Br" => 79.904,
    "Mo" => 95.96,
    "I" => 126.904,
};

/// Returns the element symbol encoded in an atom name, or `None` if the
/// name's prefix matches no known element.
pub fn element_symbol(name: &str) -> Option<&'static str> {
    if name.len() >= 2 {
        let prefix = &name[..2];
        if let Some((symbol, _)) = ATOMIC_WEIGHTS.get_entry(prefix) {
            return Some(symbol);
        }
    }
    let prefix = name.get(..1)?;
    ATOMIC_WEIGHTS.get_entry(prefix).map(|(symbol, _)| *symbol)
}

/// Returns the atomic weight for an atom name, keyed by its element prefix.
///
/// Unknown prefixes log a warning and yield 0.0, so that a stray atom name
/// degrades the output mass table instead of aborting the whole run.
pub fn atomic_weight(name: &str) -> f64 {
    match element_symbol(name) {
        Some(symbol) => ATOMIC_WEIGHTS[symbol],
        None => {
            warn!("unknown atomic weight for atom '{}'", name);
            0.0
        }
    }
}

/// Returns the bare element symbol for an atom name, or an empty string for
/// an unrecognized prefix (with a warning, mirroring [`atomic_weight`]).
pub fn atomic_symbol(name: &str) -> &'static str {
    match element_symbol(name) {
        Some(symbol) => symbol,
        None => {
            warn!("unknown element symbol for atom '{}'", name);
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_letter_prefix_resolves_element() {
        assert_eq!(element_symbol("C"), Some("C"));
        assert_eq!(element_symbol("CT"), Some("C"));
        assert_eq!(element_symbol("H1"), Some("H"));
    }

    #[test]
    fn two_letter_prefix_wins_over_one_letter() {
        assert_eq!(element_symbol("Cl"), Some("Cl"));
        assert_eq!(element_symbol("Cl1"), Some("Cl"));
        assert_eq!(element_symbol("Na1"), Some("Na"));
        assert_eq!(element_symbol("Br"), Some("Br"));
    }

    #[test]
    fn weights_match_reference_table() {
        assert_eq!(atomic_weight("CT"), 12.011);
        assert_eq!(atomic_weight("HC"), 1.008);
        assert_eq!(atomic_weight("Cl"), 35.453);
        assert_eq!(atomic_weight("I"), 126.904);
    }

    #[test]
    fn unknown_name_yields_zero_weight_and_empty_symbol() {
        assert_eq!(atomic_weight("Xx"), 0.0);
        assert_eq!(atomic_symbol("Xx"), "");
        assert_eq!(element_symbol("Xx"), None);
    }

    #[test]
    fn empty_name_is_unknown() {
        assert_eq!(element_symbol(""), None);
        assert_eq!(atomic_weight(""), 0.0);
    }
}
