use bon::Builder;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    billing::{Settlement, SettlementStrategy, ZoneAccumulator, months_spanned, settle},
    calendar::HolidayCalendar,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
    reading::HourlyReading,
    storage::{LedgerEntry, Simulator, StorageParameters},
    tariff::TariffTable,
};

/// One full billing run: optional storage simulation, zone accumulation, and
/// settlement, over a sorted period of readings.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Analysis<'a> {
    readings: &'a [HourlyReading],
    table: &'a TariffTable,
    calendar: &'a HolidayCalendar,
    tariff: &'a str,
    storage: Option<StorageParameters>,
    #[builder(default = SettlementStrategy::Flat)]
    strategy: SettlementStrategy,
}

impl<'a, S: analysis_builder::IsComplete> AnalysisBuilder<'a, S> {
    pub fn run(self) -> AnalysisReport {
        self.build().run()
    }
}

/// Everything a billing run produces, read-only for downstream reporting.
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct AnalysisReport {
    pub settlement: Settlement,

    /// Per-hour storage ledger, present when a storage was simulated.
    pub ledger: Option<Vec<LedgerEntry>>,

    /// Grid import avoided by the storage: the raw demand minus what was
    /// actually billed across the zones. Zero without a storage.
    pub energy_saved: KilowattHours,

    /// Hours that resolved to no zone and were excluded from billing.
    pub n_excluded_hours: usize,
}

impl AnalysisReport {
    #[must_use]
    pub fn total_cost(&self) -> Cost {
        self.settlement.total_cost()
    }
}

impl Analysis<'_> {
    #[instrument(skip_all, fields(tariff = self.tariff, n_readings = self.readings.len()))]
    fn run(self) -> AnalysisReport {
        // A zero capacity means «no storage»: bill the utility's own net
        // quantities rather than a simulated pass-through of the raw ones.
        let ledger = self
            .storage
            .filter(|parameters| parameters.capacity > KilowattHours::ZERO)
            .map(|parameters| Simulator::new(parameters).run(self.readings));

        let mut accumulator = ZoneAccumulator::new(self.table, self.tariff, self.calendar);
        match &ledger {
            Some(entries) => {
                for entry in entries {
                    accumulator.push(entry.timestamp, entry.grid_import, entry.grid_export);
                }
            }
            None => {
                for reading in self.readings {
                    accumulator.push(reading.timestamp, reading.net_import, reading.net_export);
                }
            }
        }
        let (zones, n_excluded_hours) = accumulator.finish();

        let n_months = match (self.readings.first(), self.readings.last()) {
            (Some(first), Some(last)) => {
                months_spanned(first.timestamp.date(), last.timestamp.date())
            }
            _ => 0,
        };
        let settlement =
            settle(zones, self.strategy, self.table.fixed_fee(self.tariff), n_months);

        let energy_saved = if ledger.is_some() {
            let raw_demand: KilowattHours =
                self.readings.iter().map(|reading| reading.raw_import).sum();
            let billed: KilowattHours =
                settlement.zones.iter().map(|statement| statement.import).sum();
            raw_demand - billed
        } else {
            KilowattHours::ZERO
        };

        AnalysisReport { settlement, ledger, energy_saved, n_excluded_hours }
    }
}

/// Run the same analysis under every tariff of the table and rank the
/// reports by total cost, cheapest first.
///
/// Every run owns a fresh simulator and accumulator, so the runs are fully
/// independent.
pub fn compare_tariffs<'a>(
    readings: &[HourlyReading],
    table: &'a TariffTable,
    calendar: &HolidayCalendar,
    storage: Option<StorageParameters>,
    strategy: SettlementStrategy,
) -> Vec<(&'a str, AnalysisReport)> {
    table
        .tariffs()
        .map(|tariff| {
            let report = Analysis::builder()
                .readings(readings)
                .table(table)
                .calendar(calendar)
                .tariff(tariff)
                .maybe_storage(storage)
                .strategy(strategy)
                .run();
            (tariff, report)
        })
        .sorted_by_key(|(_, report)| report.total_cost())
        .collect()
}
