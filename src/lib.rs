//! dislo_pin
//!
//! A multi-stage workflow for molecular-dynamics simulations of an edge
//! dislocation interacting with a spherical precipitate in bcc iron. Lattice
//! construction, force evaluation, and defect analysis are delegated to the
//! external engines; this crate owns the parameter bookkeeping, the output
//! directory lifecycle, and the MPI file-batch dispatch that parallelizes the
//! post-processing of trajectory dump files over the worker ranks.

pub mod common;
pub mod io;
pub mod dispatch;
pub mod external;
pub mod stages;
