use chrono::NaiveDateTime;
use serde::Serialize;

use crate::quantity::energy::KilowattHours;

/// One simulated hour: the grid flows that remain after the storage took its
/// share, and the storage movements that produced them.
#[derive(Copy, Clone, Debug, Serialize)]
#[must_use]
pub struct LedgerEntry {
    pub timestamp: NaiveDateTime,
    pub grid_import: KilowattHours,
    pub grid_export: KilowattHours,
    pub discharged: KilowattHours,
    pub charged: KilowattHours,
    pub state_of_charge: KilowattHours,
}
