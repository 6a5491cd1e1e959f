//! Staging: copy a raw flight file into the upload directory under its
//! UASDC name before the normalizer ever opens it. The raw file is never
//! mutated in place.

use std::fs;
use std::path::{Path, PathBuf};

use netcdf::AttributeValue;

use crate::error::NormalizeError;

/// The enforced output name:
/// `UASDC_<operatorID>_<airframeID>_<YYYYMMDDHHMMSS>Z.nc`, timestamp in UTC.
pub fn output_name(operator_id: &str, airframe_id: &str, flight_time: &str) -> String {
    format!("UASDC_{operator_id}_{airframe_id}_{flight_time}Z.nc")
}

/// Copy `src` into `upload_dir` under `name`, returning the staged path.
pub fn stage_file(src: &Path, upload_dir: &Path, name: &str) -> Result<PathBuf, NormalizeError> {
    let dest = upload_dir.join(name);
    fs::copy(src, &dest)?;
    Ok(dest)
}

/// Read a pre-existing `platform_name` global from a raw file, for callers
/// that did not supply an airframe ID. Empty or non-string values count as
/// absent.
pub fn airframe_from_file(path: &Path) -> Result<Option<String>, NormalizeError> {
    let nc = netcdf::open(path).map_err(|source| NormalizeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    match nc.attribute("platform_name") {
        Some(attr) => match attr.value()? {
            AttributeValue::Str(name) if !name.is_empty() => Ok(Some(name)),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}
