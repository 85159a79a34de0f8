use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    prelude::*,
    quantity::{cost::Cost, rate::KilowattHourRate},
    reading::HourlyReading,
};

/// Hourly market prices, supplied by an external source.
pub type HourlyPrices = BTreeMap<NaiveDateTime, KilowattHourRate>;

/// Period outcome of market-price billing.
#[derive(Copy, Clone, Debug, Default, Serialize)]
#[must_use]
pub struct MarketBill {
    /// Cost of the net imported energy.
    pub cost: Cost,

    /// Income from the net exported energy.
    pub income: Cost,

    /// Hours skipped because the price table has no entry for them.
    pub n_unpriced_hours: usize,
}

/// Bill the net quantities straight at the hourly market price, bypassing
/// zone resolution entirely.
pub fn bill_at_market_prices(readings: &[HourlyReading], prices: &HourlyPrices) -> MarketBill {
    let mut bill = MarketBill::default();
    for reading in readings {
        let Some(price) = prices.get(&reading.timestamp) else {
            bill.n_unpriced_hours += 1;
            continue;
        };
        bill.cost += reading.net_import * *price;
        bill.income += reading.net_export * *price;
    }
    if bill.n_unpriced_hours != 0 {
        warn!(n_hours = bill.n_unpriced_hours, "Some hours have no market price");
    }
    info!(cost = %bill.cost, income = %bill.income, "Billed at market prices");
    bill
}
