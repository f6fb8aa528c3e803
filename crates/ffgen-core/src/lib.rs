//! # ffgen Core Library
//!
//! A library for turning symbolic molecule descriptions (z-matrix internal
//! coordinates or raw Cartesian positions) into fully typed, force-field
//! parameterized molecular topologies, ready to drive a packing tool or a
//! molecular dynamics engine.
//!
//! ## Overview
//!
//! Building a simulation-ready system from a handful of small input files
//! involves three tightly coupled problems: reconstructing 3D coordinates
//! from internal coordinates, inferring covalent topology (bonds, angles,
//! dihedrals, impropers) from declared connectivity or interatomic
//! distances, and matching every atom and bonded term against a force-field
//! parameter database while deduplicating into a compact set of system-wide
//! types. This crate implements those three stages and nothing else:
//! serialization of the final system into any particular simulation input
//! format is left to downstream consumers operating on the typed model.
//!
//! ## Architecture
//!
//! - **[`models`]** - Atoms, bonded terms, molecules, the simulation cell,
//!   and the aggregated system type tables.
//! - **[`elements`]** - Static element symbol and atomic weight tables.
//! - **[`geometry`]** - Distance/angle measurement (with minimum-image
//!   corrections) and z-matrix coordinate reconstruction.
//! - **[`forcefield`]** - The parameter database, its loader and cache, and
//!   the per-molecule term matcher.
//! - **[`topology`]** - Bond-graph construction and angle/dihedral
//!   enumeration.
//! - **[`io`]** - Readers for the z-matrix, xyz, and MDL mol molecule
//!   description formats.
//! - **[`pipeline`]** - Per-species assembly: description -> geometry ->
//!   connectivity -> parameter matching.
//! - **[`system`]** - System-wide type deduplication and the van der Waals
//!   mixing table.

pub mod elements;
pub mod forcefield;
pub mod geometry;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod system;
pub mod topology;
