//! Force-field parameter handling.
//!
//! [`params`] loads the sectioned parameter file into typed reference
//! records (with memoized loading per file name); [`matcher`] assigns those
//! records to the atoms and bonded terms of a molecule, validating observed
//! geometry against equilibrium values.

pub mod matcher;
pub mod params;
