//! The normalization driver.
//!
//! One linear pass over a single flight file:
//! `Opened → VariablesResolved → TimeNormalized → AttributesRewritten → Closed`.
//! Each transition is one component call; a failure aborts the sequence, the
//! handle is released, and the failed transition travels with the error so
//! the caller can see how far normalization got. There is no rollback: the
//! staged copy may be left partially normalized (only `commit` writes to
//! disk, so in practice that means a commit interrupted midway), and the
//! original source file is never touched.

use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::NormalizeError;
use crate::flighttime;
use crate::ncfile::FlightFile;
use crate::resolver;
use crate::rewrite;
use crate::schema::Schema;

/// States of the driver's linear state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opened,
    VariablesResolved,
    TimeNormalized,
    AttributesRewritten,
    Closed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Opened => "opened",
            Stage::VariablesResolved => "variables resolved",
            Stage::TimeNormalized => "time normalized",
            Stage::AttributesRewritten => "attributes rewritten",
            Stage::Closed => "closed",
        })
    }
}

/// A failed normalization, tagged with the transition that failed.
///
/// Every stage before `stage` completed; nothing at or after it ran.
#[derive(Debug, thiserror::Error)]
#[error("normalization of `{file}` failed while reaching `{stage}`: {source}")]
pub struct DriverError {
    pub file: String,
    pub stage: Stage,
    #[source]
    pub source: NormalizeError,
}

/// Normalize `dir/fname` in place, trusting the file's own `platform_name`.
pub fn normalize(
    dir: &Path,
    fname: &str,
    schema: &Schema,
    reference_epoch: f64,
) -> Result<(), DriverError> {
    normalize_with_airframe(dir, fname, schema, reference_epoch, None)
}

/// Normalize `dir/fname` in place, overriding the `platform_name` global
/// with `airframe_id` when given.
///
/// `reference_epoch` is the flight's start in seconds since the Unix epoch;
/// it is only read if the time series turns out to be flight-relative.
pub fn normalize_with_airframe(
    dir: &Path,
    fname: &str,
    schema: &Schema,
    reference_epoch: f64,
    airframe_id: Option<&str>,
) -> Result<(), DriverError> {
    let fail = |stage: Stage| {
        let file = fname.to_string();
        move |source| DriverError { file, stage, source }
    };
    let path = dir.join(fname);

    let mut file = FlightFile::open(&path).map_err(fail(Stage::Opened))?;

    let plan = resolver::plan_renames(&file.variable_names(), schema);
    for rename in &plan {
        file.rename_variable(&rename.from, &rename.to)
            .map_err(fail(Stage::VariablesResolved))?;
        debug!(from = %rename.from, to = %rename.to, "renamed variable");
    }

    flighttime::normalize_time(&mut file, reference_epoch)
        .map_err(fail(Stage::TimeNormalized))?;

    rewrite::rewrite_variable_attributes(&mut file, schema);
    for warning in rewrite::rewrite_global_attributes(&mut file, schema, airframe_id) {
        warn!("{fname}: {warning}");
    }

    file.commit().map_err(fail(Stage::Closed))?;
    info!(file = fname, renames = plan.len(), "normalized");
    Ok(())
}
