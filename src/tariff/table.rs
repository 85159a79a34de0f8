use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::{
    calendar::HolidayCalendar,
    prelude::*,
    quantity::{cost::Cost, rate::KilowattHourRate},
    tariff::rule::{DayType, TariffRule},
};

/// A priced zone, as resolved for a concrete hour.
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct ZonePrice {
    pub zone: String,
    pub energy_rate: KilowattHourRate,
    pub distribution_rate: KilowattHourRate,
}

impl ZonePrice {
    #[must_use]
    pub fn unit_rate(&self) -> KilowattHourRate {
        self.energy_rate + self.distribution_rate
    }
}

/// All tariffs, with the rule intervals unrolled into per-hour grids
/// so that a lookup is a single indexing operation.
#[must_use]
pub struct TariffTable {
    tariffs: BTreeMap<String, TariffEntry>,
}

struct TariffEntry {
    /// Monthly fee of the tariff's first rule.
    fixed_monthly_fee: Cost,

    /// Whether any rule names a concrete day type. A tariff priced the same
    /// on every day of the week is looked up under [`DayType::All`]
    /// regardless of the date.
    discriminates_day_type: bool,

    grids: HashMap<DayType, [Option<ZonePrice>; 24]>,

    /// Distinct zones of the tariff, by first occurrence in the rules.
    zones: BTreeMap<String, ZonePrice>,
}

impl TariffTable {
    /// Unroll the rules into per-hour grids.
    ///
    /// Rule sets are taken as they come: overlaps resolve in favour of the
    /// earlier rule, and uncovered hours stay unpriced, so resolving such an
    /// hour yields no zone rather than an error.
    pub fn try_from_rules(rules: impl IntoIterator<Item = TariffRule>) -> Result<Self> {
        let mut tariffs: BTreeMap<String, TariffEntry> = BTreeMap::new();
        let mut n_rules = 0_usize;

        for rule in rules {
            ensure!(
                rule.start_hour < 24,
                "`{}`/`{}`: start hour {} is out of range",
                rule.tariff,
                rule.zone,
                rule.start_hour,
            );
            ensure!(
                (1..=24).contains(&rule.end_hour),
                "`{}`/`{}`: end hour {} is out of range",
                rule.tariff,
                rule.zone,
                rule.end_hour,
            );
            n_rules += 1;

            let price = ZonePrice {
                zone: rule.zone.clone(),
                energy_rate: rule.energy_rate,
                distribution_rate: rule.distribution_rate,
            };
            let entry = tariffs.entry(rule.tariff.clone()).or_insert_with(|| TariffEntry {
                fixed_monthly_fee: rule.fixed_monthly_fee,
                discriminates_day_type: false,
                grids: HashMap::new(),
                zones: BTreeMap::new(),
            });
            entry.discriminates_day_type |= rule.day_type != DayType::All;
            entry.zones.entry(rule.zone.clone()).or_insert_with(|| price.clone());

            let grid = entry.grids.entry(rule.day_type).or_insert_with(|| [const { None }; 24]);
            for hour in 0..24 {
                if rule.matches_hour(hour) && grid[hour as usize].is_none() {
                    grid[hour as usize] = Some(price.clone());
                }
            }
        }

        debug!(n_rules, n_tariffs = tariffs.len(), "Unrolled the tariff rules");
        Ok(Self { tariffs })
    }

    /// Resolve the timestamp to the tariff's priced zone.
    ///
    /// `None` means the hour is excluded from zone billing: either the tariff
    /// is unknown, or its rules do not cover the hour for that day type.
    #[must_use]
    pub fn resolve(
        &self,
        timestamp: NaiveDateTime,
        tariff: &str,
        calendar: &HolidayCalendar,
    ) -> Option<&ZonePrice> {
        let entry = self.tariffs.get(tariff)?;
        let day_type = if entry.discriminates_day_type {
            DayType::of(timestamp.date(), calendar)
        } else {
            DayType::All
        };
        entry.grids.get(&day_type)?[timestamp.hour() as usize].as_ref()
    }

    /// Monthly fixed fee of the tariff, zero for an unknown tariff.
    #[must_use]
    pub fn fixed_fee(&self, tariff: &str) -> Cost {
        self.tariffs.get(tariff).map_or(Cost::ZERO, |entry| entry.fixed_monthly_fee)
    }

    /// Known tariff identifiers, in lexicographic order.
    pub fn tariffs(&self) -> impl Iterator<Item = &str> {
        self.tariffs.keys().map(String::as_str)
    }

    /// The tariff's most expensive zone by unit rate, ties broken by name.
    ///
    /// A single-zone tariff has no peak zone to arbitrage against, so it
    /// yields `None`.
    #[must_use]
    pub fn priciest_zone(&self, tariff: &str) -> Option<&ZonePrice> {
        let entry = self.tariffs.get(tariff)?;
        if entry.zones.len() < 2 {
            return None;
        }
        entry
            .zones
            .values()
            .max_by(|a, b| a.unit_rate().cmp(&b.unit_rate()).then_with(|| a.zone.cmp(&b.zone)))
    }
}
