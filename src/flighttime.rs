//! Flight timestamps and time-axis normalization.

use chrono::NaiveDateTime;

use crate::error::NormalizeError;
use crate::ncfile::FlightFile;

/// A time series whose maximum sample is below one day of seconds is judged
/// to be flight-relative (elapsed seconds since takeoff) rather than
/// epoch-relative. A flight longer than 24 h reported in relative seconds
/// would be misclassified; the threshold is part of the UASDC contract and
/// must not change.
pub const EPOCH_THRESHOLD_SECS: f64 = 86_400.0;

/// Canonical name of the time variable, after resolution.
pub const TIME_VAR: &str = "time";

/// Parse a `YYYYMMDDHHMMSS` flight timestamp into seconds since
/// 1970-01-01T00:00:00Z.
pub fn flight_time_to_epoch(stamp: &str) -> Result<i64, NormalizeError> {
    let dt = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S")
        .map_err(|_| NormalizeError::BadTimestamp { value: stamp.to_string() })?;
    Ok(dt.and_utc().timestamp())
}

/// Extract the flight timestamp from the leading digits of a raw file name,
/// e.g. `20240501221756_Lat_47.57_Lon_9.04.nc`.
pub fn leading_timestamp(fname: &str) -> Result<String, NormalizeError> {
    let digits: String = fname.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() < 14 {
        return Err(NormalizeError::BadTimestamp { value: fname.to_string() });
    }
    Ok(digits[..14].to_string())
}

/// Shift a flight-relative time series onto the epoch.
///
/// If the maximum sample is already past [`EPOCH_THRESHOLD_SECS`] the series
/// is assumed epoch-relative and left alone, which also makes a second run
/// over the same file a no-op.
pub fn normalize_time(file: &mut FlightFile, reference_epoch: f64) -> Result<(), NormalizeError> {
    let var = file
        .vars
        .get_mut(TIME_VAR)
        .ok_or(NormalizeError::MissingTimeVariable)?;

    // f64::max skips NaN samples when judging the format
    let max = var.values.iter().fold(f64::NEG_INFINITY, |m, &x| m.max(x));
    if max < EPOCH_THRESHOLD_SECS {
        for sample in &mut var.values {
            *sample += reference_epoch;
        }
    }
    Ok(())
}
