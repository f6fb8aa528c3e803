//! Bonded topology: validated declared bonds, distance-based bond inference,
//! and enumeration of angles and dihedrals from the bond graph.

pub mod connectivity;
