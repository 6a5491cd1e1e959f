//! Normalization of uncrewed-aircraft-system (UAS) meteorological netCDF
//! files into the WMO UASDC archival format.
//!
//! Field-collected flight files arrive with inconsistent variable names,
//! patchy metadata and flight-relative timestamps. The UASDC data pipeline
//! expects a fixed schema: specific variable names, units, fill values and
//! global attributes, with time measured in seconds since the Unix epoch.
//! This crate renames variables to their canonical WMO names, rewrites
//! per-variable and global metadata while keeping anything the schema does
//! not cover, and shifts flight-relative time series onto the epoch.
//!
//! The usual flow, as driven by the `uasdc_process` binary:
//!
//! 1. copy the raw file into the upload directory under its
//!    `UASDC_<operatorID>_<airframeID>_<YYYYMMDDHHMMSS>Z.nc` name ([`stage`]),
//! 2. normalize it in place ([`driver::normalize`]),
//! 3. push it to the entry object store ([`upload`]).

pub mod driver;
pub mod error;
pub mod flighttime;
pub mod ncfile;
pub mod resolver;
pub mod rewrite;
pub mod schema;
pub mod stage;
pub mod upload;
