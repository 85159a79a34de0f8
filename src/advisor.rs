use itertools::Itertools;
use serde::Serialize;

use crate::{
    calendar::HolidayCalendar,
    prelude::*,
    quantity::energy::KilowattHours,
    reading::HourlyReading,
    series::DailyAggregate,
    tariff::TariffTable,
};

/// The two sizing bounds and their maximum.
///
/// A heuristic, not an optimizer: neither bound models multi-day carry-over
/// of the charge, nor do the two scenarios interact.
#[derive(Copy, Clone, Debug, Serialize)]
#[must_use]
pub struct Recommendation {
    /// Capacity needed on the worst net-export day to keep that day's own
    /// surplus out of the grid.
    pub export_bound: KilowattHours,

    /// Worst daily import within the tariff's most expensive zone: the
    /// energy a storage could shift to cheaper hours.
    pub arbitrage_bound: KilowattHours,
}

impl Recommendation {
    #[must_use]
    pub fn capacity(&self) -> KilowattHours {
        self.export_bound.max(self.arbitrage_bound)
    }
}

/// Derive a storage capacity from the demand history.
pub fn recommend(
    readings: &[HourlyReading],
    daily: &[DailyAggregate],
    table: &TariffTable,
    tariff: &str,
    calendar: &HolidayCalendar,
) -> Recommendation {
    let export_bound = daily
        .iter()
        .filter(|day| day.is_net_export_day())
        .map(|day| day.net_import)
        .fold(KilowattHours::ZERO, KilowattHours::max);

    let arbitrage_bound = table.priciest_zone(tariff).map_or(KilowattHours::ZERO, |priciest| {
        readings
            .iter()
            .filter(|reading| {
                table
                    .resolve(reading.timestamp, tariff, calendar)
                    .is_some_and(|price| price.zone == priciest.zone)
            })
            .chunk_by(|reading| reading.timestamp.date())
            .into_iter()
            .map(|(_, hours)| hours.map(|reading| reading.raw_import).sum::<KilowattHours>())
            .fold(KilowattHours::ZERO, KilowattHours::max)
    });

    let recommendation = Recommendation { export_bound, arbitrage_bound };
    info!(
        export_bound = %recommendation.export_bound,
        arbitrage_bound = %recommendation.arbitrage_bound,
        capacity = %recommendation.capacity(),
        "Recommended a storage capacity",
    );
    recommendation
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        quantity::{cost::Cost, rate::KilowattHourRate},
        series::aggregate_daily,
        tariff::{DayType, TariffRule},
    };

    fn rule(tariff: &str, zone: &str, start_hour: u32, end_hour: u32, rate: f64) -> TariffRule {
        TariffRule {
            tariff: tariff.to_string(),
            zone: zone.to_string(),
            day_type: DayType::All,
            start_hour,
            end_hour,
            energy_rate: KilowattHourRate::from(rate),
            distribution_rate: KilowattHourRate::ZERO,
            fixed_monthly_fee: Cost::ZERO,
        }
    }

    fn table() -> TariffTable {
        TariffTable::try_from_rules([
            rule("G12", "dzienna", 6, 22, 1.06),
            rule("G12", "nocna", 22, 6, 0.75),
            rule("G11", "stala", 0, 24, 0.97),
        ])
        .unwrap()
    }

    fn reading(hour: u32, raw_import: f64, raw_export: f64) -> HourlyReading {
        HourlyReading {
            timestamp: NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            raw_import: KilowattHours::from(raw_import),
            raw_export: KilowattHours::from(raw_export),
            net_import: KilowattHours::from((raw_import - raw_export).max(0.0)),
            net_export: KilowattHours::from((raw_export - raw_import).max(0.0)),
        }
    }

    /// One day importing 5 kWh in the expensive zone and exporting 10 kWh:
    /// both bounds are live and the larger one wins.
    #[test]
    fn test_both_bounds() {
        let calendar = HolidayCalendar::polish(2024..=2024);
        // Daytime imports, one big midday export:
        let readings =
            vec![reading(8, 2.0, 0.0), reading(12, 0.0, 10.0), reading(14, 3.0, 0.0)];
        let daily = aggregate_daily(&readings);
        assert!(daily[0].is_net_export_day());

        let recommendation = recommend(&readings, &daily, &table(), "G12", &calendar);
        assert_eq!(recommendation.arbitrage_bound, KilowattHours::from(5.0));
        assert_eq!(recommendation.export_bound, KilowattHours::from(5.0));
        assert_eq!(recommendation.capacity(), KilowattHours::from(5.0));
    }

    /// A flat tariff has no expensive zone, so only the export bound counts.
    #[test]
    fn test_flat_tariff() {
        let calendar = HolidayCalendar::polish(2024..=2024);
        let readings = vec![reading(8, 1.0, 0.0), reading(12, 0.0, 6.0)];
        let daily = aggregate_daily(&readings);

        let recommendation = recommend(&readings, &daily, &table(), "G11", &calendar);
        assert_eq!(recommendation.arbitrage_bound, KilowattHours::ZERO);
        assert_eq!(recommendation.export_bound, KilowattHours::from(1.0));
    }

    /// No net-export days and nothing drawn in the peak zone: zero all over.
    #[test]
    fn test_no_demand() {
        let calendar = HolidayCalendar::polish(2024..=2024);
        let readings = vec![reading(23, 1.0, 0.0)];
        let daily = aggregate_daily(&readings);
        let recommendation = recommend(&readings, &daily, &table(), "G12", &calendar);
        assert_eq!(recommendation.capacity(), KilowattHours::ZERO);
    }
}
