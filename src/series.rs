use std::collections::HashSet;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use itertools::Itertools;
use serde::Serialize;

use crate::{prelude::*, quantity::energy::KilowattHours, reading::HourlyReading};

/// Hourly readings summed over one calendar day.
#[derive(Copy, Clone, Debug, Serialize)]
#[must_use]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub raw_import: KilowattHours,
    pub raw_export: KilowattHours,
    pub net_import: KilowattHours,
    pub net_export: KilowattHours,
}

impl DailyAggregate {
    /// A day that pushed more energy into the grid than it drew, after the
    /// hourly balancing.
    #[must_use]
    pub fn is_net_export_day(&self) -> bool {
        self.net_export > self.net_import
    }
}

/// Sum the (sorted) hourly readings into daily aggregates.
pub fn aggregate_daily(readings: &[HourlyReading]) -> Vec<DailyAggregate> {
    readings
        .iter()
        .chunk_by(|reading| reading.timestamp.date())
        .into_iter()
        .map(|(date, hours)| {
            let mut day = DailyAggregate {
                date,
                raw_import: KilowattHours::ZERO,
                raw_export: KilowattHours::ZERO,
                net_import: KilowattHours::ZERO,
                net_export: KilowattHours::ZERO,
            };
            for reading in hours {
                day.raw_import += reading.raw_import;
                day.raw_export += reading.raw_export;
                day.net_import += reading.net_import;
                day.net_export += reading.net_export;
            }
            day
        })
        .collect()
}

/// Period totals of the four metered quantities.
#[derive(Copy, Clone, Debug, Default, Serialize)]
#[must_use]
pub struct EnergyTotals {
    pub raw_import: KilowattHours,
    pub raw_export: KilowattHours,
    pub net_import: KilowattHours,
    pub net_export: KilowattHours,
}

impl<'a> FromIterator<&'a HourlyReading> for EnergyTotals {
    fn from_iter<I: IntoIterator<Item = &'a HourlyReading>>(readings: I) -> Self {
        let mut totals = Self::default();
        for reading in readings {
            totals.raw_import += reading.raw_import;
            totals.raw_export += reading.raw_export;
            totals.net_import += reading.net_import;
            totals.net_export += reading.net_export;
        }
        totals
    }
}

impl EnergyTotals {
    /// Energy self-consumed through the utility's hourly balancing: the part
    /// of the raw export that never made it into the net export.
    #[must_use]
    pub fn balanced_energy(&self) -> KilowattHours {
        self.raw_export - self.net_export
    }

    /// State of the virtual net-metering store: the scaled net export minus
    /// the net import. Negative when the period consumed more than its
    /// exports can cover.
    #[must_use]
    pub fn net_metering_balance(&self, ratio: f64) -> KilowattHours {
        self.net_export * ratio - self.net_import
    }
}

/// Share of net-export days over the period.
#[derive(Copy, Clone, Debug, Serialize)]
#[must_use]
pub struct DailyTrends {
    pub n_net_export_days: usize,
    pub n_days: usize,
}

impl DailyTrends {
    pub fn from_daily(daily: &[DailyAggregate]) -> Self {
        Self {
            n_net_export_days: daily.iter().filter(|day| day.is_net_export_day()).count(),
            n_days: daily.len(),
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn net_export_share(&self) -> f64 {
        if self.n_days == 0 {
            0.0
        } else {
            self.n_net_export_days as f64 / self.n_days as f64
        }
    }
}

/// Keep the readings within the inclusive calendar-date window. An unset
/// bound leaves that side open.
pub fn filter_by_date(
    readings: &[HourlyReading],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<HourlyReading> {
    let filtered: Vec<_> = readings
        .iter()
        .filter(|reading| {
            let date = reading.timestamp.date();
            from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
        })
        .copied()
        .collect();
    info!(n_kept = filtered.len(), n_total = readings.len(), "Filtered by date");
    filtered
}

/// Hour-aligned timestamps missing from the covered window.
///
/// The window runs from `from` at midnight (or the first reading) through the
/// last hour of `to` (or the last reading).
pub fn missing_hours(
    readings: &[HourlyReading],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<NaiveDateTime> {
    let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
        return Vec::new();
    };
    let start = from.map_or(first.timestamp, |date| date.and_time(NaiveTime::MIN));
    let end = to
        .and_then(|date| date.checked_add_days(Days::new(1)))
        .map_or(last.timestamp, |date| date.and_time(NaiveTime::MIN) - TimeDelta::hours(1));

    let present: HashSet<NaiveDateTime> =
        readings.iter().map(|reading| reading.timestamp).collect();
    let mut missing = Vec::new();
    let mut timestamp = start;
    while timestamp <= end {
        if !present.contains(&timestamp) {
            missing.push(timestamp);
        }
        timestamp += TimeDelta::hours(1);
    }
    if !missing.is_empty() {
        warn!(n_hours = missing.len(), "The period has gaps");
    }
    missing
}
