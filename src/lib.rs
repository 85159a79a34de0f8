//! Time-of-use tariff billing over hourly grid meter data: zone resolution,
//! physical-storage simulation, net-metering credit settlement, and storage
//! sizing. Loading the readings and rendering the results are the caller's
//! business: everything here is an in-memory transformation.

pub mod advisor;
pub mod analysis;
pub mod billing;
pub mod calendar;
pub mod market;
pub mod prelude;
pub mod quantity;
pub mod reading;
pub mod series;
pub mod storage;
pub mod tariff;

pub use self::{
    advisor::{Recommendation, recommend},
    analysis::{Analysis, AnalysisReport, compare_tariffs},
    billing::{Settlement, SettlementStrategy},
    calendar::HolidayCalendar,
    market::{HourlyPrices, MarketBill, bill_at_market_prices},
    reading::HourlyReading,
    storage::StorageParameters,
    tariff::{DayType, TariffRule, TariffTable},
};
