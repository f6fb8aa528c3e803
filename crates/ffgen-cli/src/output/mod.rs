//! Writers for the generated simulation inputs: per-species xyz files and
//! the packmol script in the packing stage, LAMMPS or DL_POLY files in the
//! export stage.

pub mod coords;
pub mod dlpoly;
pub mod lammps;
pub mod packmol;
pub mod xyz;

pub const HEADER_COMMENT: &str = "created by ffgen";
