use serde::{Deserialize, Serialize};

use crate::{
    prelude::*,
    quantity::energy::KilowattHours,
    reading::HourlyReading,
    storage::ledger::LedgerEntry,
};

/// Caller-supplied storage configuration.
///
/// The values are taken at face value: a zero capacity means «no storage»,
/// and a zero efficiency means the storage can never charge. Neither is an
/// error.
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
#[must_use]
pub struct StorageParameters {
    pub capacity: KilowattHours,

    /// Fraction of energy retained when charging; discharging is lossless.
    pub round_trip_efficiency: f64,
}

/// Hour-by-hour storage simulation over the raw, pre-balancing meter flows.
///
/// Owns the running state of charge for exactly one run: comparing tariffs or
/// periods means constructing a fresh simulator per run.
#[must_use]
pub struct Simulator {
    parameters: StorageParameters,
    state_of_charge: KilowattHours,
}

impl Simulator {
    pub const fn new(parameters: StorageParameters) -> Self {
        Self { parameters, state_of_charge: KilowattHours::ZERO }
    }

    /// Simulate the whole period and return the per-hour ledger.
    pub fn run<'a>(
        mut self,
        readings: impl IntoIterator<Item = &'a HourlyReading>,
    ) -> Vec<LedgerEntry> {
        let ledger: Vec<_> = readings.into_iter().map(|reading| self.step(reading)).collect();
        debug!(
            n_hours = ledger.len(),
            final_state_of_charge = %self.state_of_charge,
            "Simulated the storage",
        );
        ledger
    }

    /// Apply one meter hour and return its ledger row.
    ///
    /// Exactly one branch applies, decided on the raw flows: a surplus hour
    /// charges (losing energy to the round-trip efficiency), a deficit hour
    /// discharges 1:1, a balanced hour leaves the storage untouched.
    fn step(&mut self, reading: &HourlyReading) -> LedgerEntry {
        let StorageParameters { capacity, round_trip_efficiency } = self.parameters;
        let mut entry = LedgerEntry {
            timestamp: reading.timestamp,
            grid_import: KilowattHours::ZERO,
            grid_export: KilowattHours::ZERO,
            discharged: KilowattHours::ZERO,
            charged: KilowattHours::ZERO,
            state_of_charge: self.state_of_charge,
        };

        if reading.raw_export > reading.raw_import {
            let surplus = reading.raw_export - reading.raw_import;
            let headroom = capacity - self.state_of_charge;
            // Filling the headroom takes `headroom / efficiency` of gross
            // surplus; with a zero efficiency the headroom is never fillable.
            if round_trip_efficiency > 0.0 {
                entry.charged = surplus.min(headroom / round_trip_efficiency);
            }
            // The division above may overshoot the headroom by an ulp:
            self.state_of_charge =
                (self.state_of_charge + entry.charged * round_trip_efficiency).min(capacity);
            entry.grid_export = surplus - entry.charged;
        } else if reading.raw_import > reading.raw_export {
            let deficit = reading.raw_import - reading.raw_export;
            entry.discharged = deficit.min(self.state_of_charge);
            self.state_of_charge -= entry.discharged;
            entry.grid_import = deficit - entry.discharged;
        }

        entry.state_of_charge = self.state_of_charge;
        entry
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn reading(hour: u32, raw_import: f64, raw_export: f64) -> HourlyReading {
        let timestamp: NaiveDateTime =
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap();
        HourlyReading {
            timestamp,
            raw_import: KilowattHours::from(raw_import),
            raw_export: KilowattHours::from(raw_export),
            net_import: KilowattHours::from((raw_import - raw_export).max(0.0)),
            net_export: KilowattHours::from((raw_export - raw_import).max(0.0)),
        }
    }

    fn simulator(capacity: f64, round_trip_efficiency: f64) -> Simulator {
        Simulator::new(StorageParameters {
            capacity: KilowattHours::from(capacity),
            round_trip_efficiency,
        })
    }

    /// Deficit with an empty storage, then a surplus, then a partly covered
    /// deficit: the state of charge follows by hand.
    #[test]
    fn test_charge_and_discharge() {
        let ledger = simulator(5.0, 1.0).run(&[
            reading(0, 1.0, 0.0),
            reading(1, 0.0, 2.5),
            reading(2, 2.0, 0.3),
        ]);

        assert_eq!(ledger[0].grid_import, KilowattHours::from(1.0));
        assert_eq!(ledger[0].state_of_charge, KilowattHours::ZERO);

        assert_eq!(ledger[1].charged, KilowattHours::from(2.5));
        assert_eq!(ledger[1].grid_export, KilowattHours::ZERO);
        assert_eq!(ledger[1].state_of_charge, KilowattHours::from(2.5));

        assert_eq!(ledger[2].discharged, KilowattHours::from(1.7));
        assert_eq!(ledger[2].grid_import, KilowattHours::ZERO);
        assert_abs_diff_eq!(ledger[2].state_of_charge.0.0, 0.8);
    }

    /// Charging loses energy, discharging does not.
    #[test]
    fn test_round_trip_efficiency() {
        let ledger = simulator(10.0, 0.8).run(&[reading(0, 0.0, 2.0), reading(1, 1.0, 0.0)]);
        assert_eq!(ledger[0].charged, KilowattHours::from(2.0));
        assert_abs_diff_eq!(ledger[0].state_of_charge.0.0, 1.6);
        assert_eq!(ledger[1].discharged, KilowattHours::from(1.0));
        assert_abs_diff_eq!(ledger[1].state_of_charge.0.0, 0.6);
    }

    /// A full storage passes the whole surplus through to the grid, and the
    /// gross draw needed to top up the headroom accounts for the losses.
    #[test]
    fn test_headroom() {
        let ledger = simulator(1.0, 0.5).run(&[reading(0, 0.0, 5.0)]);
        // 1 kWh of headroom takes 2 kWh of gross surplus at 50% efficiency:
        assert_eq!(ledger[0].charged, KilowattHours::from(2.0));
        assert_eq!(ledger[0].grid_export, KilowattHours::from(3.0));
        assert_eq!(ledger[0].state_of_charge, KilowattHours::from(1.0));

        let ledger = simulator(1.0, 0.5).run(&[reading(0, 0.0, 5.0), reading(1, 0.0, 1.0)]);
        assert_eq!(ledger[1].charged, KilowattHours::ZERO);
        assert_eq!(ledger[1].grid_export, KilowattHours::from(1.0));
    }

    /// Zero capacity degenerates to a pass-through of every flow.
    #[test]
    fn test_no_storage() {
        let ledger = simulator(0.0, 0.9).run(&[reading(0, 0.0, 2.5), reading(1, 2.0, 0.3)]);
        assert_eq!(ledger[0].grid_export, KilowattHours::from(2.5));
        assert_eq!(ledger[0].state_of_charge, KilowattHours::ZERO);
        assert_eq!(ledger[1].grid_import, KilowattHours::from(1.7));
    }

    /// Zero efficiency must not divide by zero: nothing ever charges.
    #[test]
    fn test_zero_efficiency() {
        let ledger = simulator(5.0, 0.0).run(&[reading(0, 0.0, 2.5)]);
        assert_eq!(ledger[0].charged, KilowattHours::ZERO);
        assert_eq!(ledger[0].grid_export, KilowattHours::from(2.5));
        assert_eq!(ledger[0].state_of_charge, KilowattHours::ZERO);
    }

    /// A balanced hour touches neither the grid nor the storage.
    #[test]
    fn test_balanced_hour() {
        let ledger = simulator(5.0, 1.0).run(&[reading(0, 0.0, 1.0), reading(1, 1.5, 1.5)]);
        assert_eq!(ledger[1].grid_import, KilowattHours::ZERO);
        assert_eq!(ledger[1].grid_export, KilowattHours::ZERO);
        assert_eq!(ledger[1].state_of_charge, ledger[0].state_of_charge);
    }

    /// Energy conservation across an arbitrary sequence: what went in, minus
    /// the losses, minus what came out, is the final state of charge, and it
    /// never leaves `[0, capacity]`.
    #[test]
    fn test_conservation() {
        let round_trip_efficiency = 0.9;
        let ledger = simulator(3.0, round_trip_efficiency).run(&[
            reading(0, 0.0, 4.0),
            reading(1, 1.0, 0.2),
            reading(2, 0.0, 2.0),
            reading(3, 5.0, 0.0),
            reading(4, 0.0, 0.5),
        ]);
        let charged: KilowattHours = ledger.iter().map(|entry| entry.charged).sum();
        let discharged: KilowattHours = ledger.iter().map(|entry| entry.discharged).sum();
        let last = ledger.last().unwrap();
        assert_abs_diff_eq!(
            (charged * round_trip_efficiency - discharged).0.0,
            last.state_of_charge.0.0,
            epsilon = 1e-12,
        );
        for entry in &ledger {
            assert!(entry.state_of_charge >= KilowattHours::ZERO);
            assert!(entry.state_of_charge <= KilowattHours::from(3.0));
        }
    }
}
