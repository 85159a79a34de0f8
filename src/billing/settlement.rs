use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{
    billing::accumulator::ZoneUsage,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// How per-zone totals turn into money.
#[derive(Copy, Clone, Debug)]
pub enum SettlementStrategy {
    /// Every imported kilowatt-hour at its zone's unit rate.
    Flat,

    /// Net metering: exported energy scaled by the ratio becomes a credit
    /// consumed against imports, settled zone by zone from the most to the
    /// least expensive, with the remainder rolling over to the next zone.
    NetMetering { ratio: f64 },
}

/// Settlement outcome of one zone.
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct ZoneStatement {
    pub zone: String,
    pub unit_rate: KilowattHourRate,
    pub import: KilowattHours,
    pub export: KilowattHours,

    /// Credit generated by this zone's own exports.
    pub credit_generated: KilowattHours,

    /// Credit rolled over from the previous, more expensive zone.
    pub credit_carried_in: KilowattHours,

    pub billable: KilowattHours,
    pub cost: Cost,
}

/// Period settlement across all zones.
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct Settlement {
    /// Per-zone statements, ordered by descending unit rate.
    pub zones: Vec<ZoneStatement>,

    pub energy_cost: Cost,
    pub fixed_fees: Cost,

    /// Credit left after the cheapest zone. There is no cheaper zone to
    /// absorb it, so it is forfeited at the period end: reported, never
    /// billed.
    pub leftover_credit: KilowattHours,
}

impl Settlement {
    #[must_use]
    pub fn total_cost(&self) -> Cost {
        self.energy_cost + self.fixed_fees
    }
}

/// Settle the period: expensive zones first, so that generated credit offsets
/// the costliest energy before the cheaper one.
///
/// A pure function of its inputs: settling the same totals twice yields the
/// same statement.
pub fn settle(
    mut zones: Vec<ZoneUsage>,
    strategy: SettlementStrategy,
    fixed_monthly_fee: Cost,
    n_months: u32,
) -> Settlement {
    zones.sort_by(|a, b| {
        b.unit_rate.cmp(&a.unit_rate).then_with(|| a.zone.cmp(&b.zone))
    });

    let mut rollover = KilowattHours::ZERO;
    let statements: Vec<_> = zones
        .into_iter()
        .map(|usage| match strategy {
            SettlementStrategy::Flat => ZoneStatement {
                billable: usage.import,
                cost: usage.flat_cost(),
                credit_generated: KilowattHours::ZERO,
                credit_carried_in: KilowattHours::ZERO,
                zone: usage.zone,
                unit_rate: usage.unit_rate,
                import: usage.import,
                export: usage.export,
            },
            SettlementStrategy::NetMetering { ratio } => {
                let credit_generated = usage.export * ratio;
                let credit_carried_in = rollover;
                let credit = credit_generated + credit_carried_in;
                let billable = (usage.import - credit).max(KilowattHours::ZERO);
                rollover = (credit - usage.import).max(KilowattHours::ZERO);
                ZoneStatement {
                    billable,
                    cost: billable * usage.unit_rate,
                    credit_generated,
                    credit_carried_in,
                    zone: usage.zone,
                    unit_rate: usage.unit_rate,
                    import: usage.import,
                    export: usage.export,
                }
            }
        })
        .collect();

    let settlement = Settlement {
        energy_cost: statements.iter().map(|statement| statement.cost).sum(),
        fixed_fees: fixed_monthly_fee * f64::from(n_months),
        leftover_credit: rollover,
        zones: statements,
    };
    info!(
        energy_cost = %settlement.energy_cost,
        fixed_fees = %settlement.fixed_fees,
        leftover_credit = %settlement.leftover_credit,
        "Settled the period",
    );
    settlement
}

/// Inclusive count of calendar months between the two dates.
///
/// Fixed fees are monthly rates, so a period is billed by the months it
/// touches, not by its day count.
#[must_use]
#[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> u32 {
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    months.max(0) as u32
}
