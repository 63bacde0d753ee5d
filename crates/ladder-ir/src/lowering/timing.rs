//! Conversion of wall-clock timer delays into scan-count periods.

use crate::error::{Error, Result};

/// `period = delay/cycle_time - 1`. The `-1` offset makes equality with
/// `period` mean "one cycle after the period elapses."
///
/// A period below 1 scan is fatal (cycle time too coarse for this delay); a
/// period requiring 15 or more bits (`>= 2^15`) is fatal (cycle time too
/// long, or delay too large, for a 16-bit counter).
pub(crate) fn period_for_delay(delay_us: u32, cycle_time_us: u32) -> Result<i16> {
    let period = i64::from(delay_us / cycle_time_us) - 1;
    if period < 1 {
        return Err(Error::PeriodTooShort);
    }
    if period >= (1 << 15) {
        return Err(Error::PeriodTooLong);
    }
    Ok(period as i16)
}
