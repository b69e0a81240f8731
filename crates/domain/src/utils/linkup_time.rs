//! Vendor timestamp parsing
//!
//! LibreLinkUp renders sample timestamps as `M/D/YYYY h:mm:ss AM|PM` with
//! unpadded month, day and hour. `FactoryTimestamp` values are UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::constants::LINKUP_TIMESTAMP_FORMAT;
use crate::errors::{GlucolinkError, Result};

/// Parse a LibreLinkUp timestamp as UTC.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use glucolink_domain::parse_linkup_timestamp;
///
/// let ts = parse_linkup_timestamp("8/2/2023 6:51:00 AM").unwrap();
/// assert_eq!(ts, Utc.with_ymd_and_hms(2023, 8, 2, 6, 51, 0).unwrap());
/// ```
pub fn parse_linkup_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), LINKUP_TIMESTAMP_FORMAT).map_err(|e| {
        GlucolinkError::InvalidInput(format!("invalid LibreLinkUp timestamp '{raw}': {e}"))
    })?;
    Ok(Utc.from_utc_datetime(&naive))
}
