//! Evolutionary search for lumped hydrological model structures.
//!
//! A model structure is a set of genes: storages, the connections between
//! them and the parameters that switch optional processes on. Candidate
//! structures are created, mutated and crossed over, repaired until water can
//! leave the catchment, and scored by calibrating the resulting model against
//! observed discharge.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;

pub use error::{AcmeError, Result};
