//! Core data structures for molecules and their bonded terms.
//!
//! The model distinguishes explicitly between *untyped* entities (name and
//! geometry only, as read from a molecule description) and *typed* entities
//! (carrying resolved force-field parameters). Parameters live behind an
//! `Option`, and the typed-only accessors return [`ModelError`] instead of
//! panicking when called too early, so a forgotten matching pass surfaces
//! as a clear configuration error.
//!
//! - [`atom`] - Atoms with position, mass, and optional parameters.
//! - [`terms`] - Bonds, angles, dihedrals, and improper dihedrals.
//! - [`molecule`] - A molecule species with its atom and term lists.
//! - [`cell`] - The simulation cell and its periodicity.

pub mod atom;
pub mod cell;
pub mod molecule;
pub mod terms;

use thiserror::Error;

/// Errors raised when the typed data model is used inconsistently.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("atom '{0}' has no force-field parameters assigned")]
    UntypedAtom(String),
    #[error("{kind} between atoms {atoms:?} has no force-field parameters assigned")]
    UntypedTerm { kind: &'static str, atoms: Vec<usize> },
    #[error("bond endpoints must be distinct (got atom {0} twice)")]
    DegenerateBond(usize),
    #[error("invalid cell lengths ({a}, {b}, {c}): all edges must be positive")]
    InvalidCell { a: f64, b: f64, c: f64 },
    #[error("invalid periodicity specification '{0}': only axes x, y, z are allowed")]
    InvalidPbc(String),
}
