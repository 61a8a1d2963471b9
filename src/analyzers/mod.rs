//! Aggregation routines over the normalized trip table.
//!
//! Every function in this module is a pure, deterministic transformation:
//! it takes a trip slice (pre-filtered by the caller if desired) plus typed
//! parameters and returns a derived summary. Nothing here retains state or
//! mutates the shared table.

pub mod aggregate;
pub mod filter;
pub mod sequences;
pub mod utility;
