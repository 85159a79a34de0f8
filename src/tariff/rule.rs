use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    calendar::HolidayCalendar,
    quantity::{cost::Cost, rate::KilowattHourRate},
};

/// Billing classification of a calendar date.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
    All,
}

impl DayType {
    /// Classify the date: public holidays count as weekends.
    pub fn of(date: NaiveDate, calendar: &HolidayCalendar) -> Self {
        if date.weekday().num_days_from_monday() >= 5 || calendar.is_holiday(date) {
            Self::Weekend
        } else {
            Self::Weekday
        }
    }
}

/// One row of a tariff definition: a priced zone active during
/// `[start_hour, end_hour)` on days of the given type.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[must_use]
pub struct TariffRule {
    pub tariff: String,
    pub zone: String,
    pub day_type: DayType,
    pub start_hour: u32,
    pub end_hour: u32,
    pub energy_rate: KilowattHourRate,
    pub distribution_rate: KilowattHourRate,
    pub fixed_monthly_fee: Cost,
}

impl TariffRule {
    /// Test the hour against the rule's interval.
    ///
    /// An interval with `start_hour > end_hour` wraps through midnight
    /// (for example, 22–6 covers 22, 23, 0…5). A zero-width interval
    /// never matches.
    #[must_use]
    pub fn matches_hour(&self, hour: u32) -> bool {
        match self.start_hour.cmp(&self.end_hour) {
            Ordering::Less => self.start_hour <= hour && hour < self.end_hour,
            Ordering::Greater => hour >= self.start_hour || hour < self.end_hour,
            Ordering::Equal => false,
        }
    }
}
