//! Geometric primitives for the pipeline.
//!
//! [`measure`] provides distance and angle measurement with optional
//! minimum-image corrections; [`zmatrix`] reconstructs Cartesian coordinates
//! from internal-coordinate records.

pub mod measure;
pub mod zmatrix;
