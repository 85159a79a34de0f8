use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    calendar::HolidayCalendar,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    tariff::TariffTable,
};

/// Import and export gathered for one zone over the period.
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct ZoneUsage {
    pub zone: String,
    pub unit_rate: KilowattHourRate,
    pub import: KilowattHours,
    pub export: KilowattHours,
}

impl ZoneUsage {
    /// Provisional cost of the zone before any settlement: every imported
    /// kilowatt-hour at the zone's unit rate.
    #[must_use]
    pub fn flat_cost(&self) -> Cost {
        self.import * self.unit_rate
    }
}

/// Folds hourly grid flows into per-zone totals for one tariff.
///
/// Hours that resolve to no zone are counted and otherwise dropped: they
/// contribute to no zone's totals, matching the resolver's contract.
#[must_use]
pub struct ZoneAccumulator<'a> {
    table: &'a TariffTable,
    tariff: &'a str,
    calendar: &'a HolidayCalendar,
    zones: BTreeMap<String, ZoneUsage>,
    excluded_hours: usize,
}

impl<'a> ZoneAccumulator<'a> {
    pub const fn new(table: &'a TariffTable, tariff: &'a str, calendar: &'a HolidayCalendar) -> Self {
        Self { table, tariff, calendar, zones: BTreeMap::new(), excluded_hours: 0 }
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, import: KilowattHours, export: KilowattHours) {
        let Some(price) = self.table.resolve(timestamp, self.tariff, self.calendar) else {
            self.excluded_hours += 1;
            return;
        };
        let usage = self.zones.entry(price.zone.clone()).or_insert_with(|| ZoneUsage {
            zone: price.zone.clone(),
            unit_rate: price.unit_rate(),
            import: KilowattHours::ZERO,
            export: KilowattHours::ZERO,
        });
        usage.import += import;
        usage.export += export;
    }

    /// Per-zone totals and the count of hours excluded from billing.
    pub fn finish(self) -> (Vec<ZoneUsage>, usize) {
        if self.excluded_hours != 0 {
            warn!(
                tariff = self.tariff,
                n_hours = self.excluded_hours,
                "Some hours resolved to no zone and are excluded from billing",
            );
        }
        (self.zones.into_values().collect(), self.excluded_hours)
    }
}
