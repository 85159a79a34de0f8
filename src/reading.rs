use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::quantity::energy::KilowattHours;

/// One meter hour, as reported by the utility.
///
/// The «raw» quantities are the flows measured before the utility's bilateral
/// hourly balancing, the «net» ones after it. The net quantities are taken
/// as reported and never recomputed here.
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
#[must_use]
pub struct HourlyReading {
    /// Start of the metered hour, floored to the full hour by the loader.
    pub timestamp: NaiveDateTime,

    pub raw_import: KilowattHours,
    pub raw_export: KilowattHours,
    pub net_import: KilowattHours,
    pub net_export: KilowattHours,
}
