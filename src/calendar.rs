use std::{collections::HashSet, ops::RangeInclusive};

use chrono::NaiveDate;

use crate::prelude::*;

/// Polish public holiday calendar materialized for a bounded range of years.
///
/// Dates outside the range are simply not holidays: an undersized range makes
/// holiday detection silently fail for those years, so the caller must cover
/// every year touched by the dataset.
#[must_use]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn polish(years: RangeInclusive<i32>) -> Self {
        let mut holidays = HashSet::new();
        for year in years {
            for (month, day) in [
                (1, 1),   // Nowy Rok
                (1, 6),   // Trzech Króli
                (5, 1),   // Święto Pracy
                (5, 3),   // Święto Konstytucji 3 Maja
                (8, 15),  // Wniebowzięcie NMP
                (11, 1),  // Wszystkich Świętych
                (11, 11), // Święto Niepodległości
                (12, 25), // Boże Narodzenie
                (12, 26), // Drugi dzień Bożego Narodzenia
            ] {
                holidays.extend(NaiveDate::from_ymd_opt(year, month, day));
            }
            if year >= 2025 {
                // Wigilia is statutory from 2025.
                holidays.extend(NaiveDate::from_ymd_opt(year, 12, 24));
            }
            let easter = easter_sunday(year);
            holidays.insert(easter);
            holidays.extend(easter.checked_add_days(chrono::Days::new(1))); // Poniedziałek Wielkanocny
            holidays.extend(easter.checked_add_days(chrono::Days::new(49))); // Zielone Świątki
            holidays.extend(easter.checked_add_days(chrono::Days::new(60))); // Boże Ciało
        }
        debug!(n_holidays = holidays.len(), "Built the holiday calendar");
        Self { holidays }
    }

    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

/// Gregorian Easter Sunday by the anonymous (Meeus/Jones/Butcher) computus.
#[expect(clippy::cast_sign_loss)]
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .expect("the computus always yields a valid March or April date")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_easter() {
        assert_eq!(easter_sunday(2024), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026), date(2026, 4, 5));
    }

    #[test]
    fn test_fixed_holidays() {
        let calendar = HolidayCalendar::polish(2024..=2026);
        assert!(calendar.is_holiday(date(2025, 5, 1)));
        assert!(calendar.is_holiday(date(2024, 11, 11)));
        assert!(!calendar.is_holiday(date(2024, 5, 2)));
    }

    #[test]
    fn test_movable_holidays() {
        let calendar = HolidayCalendar::polish(2024..=2024);
        assert!(calendar.is_holiday(date(2024, 4, 1))); // Easter Monday
        assert!(calendar.is_holiday(date(2024, 5, 19))); // Pentecost
        assert!(calendar.is_holiday(date(2024, 5, 30))); // Corpus Christi
    }

    #[test]
    fn test_christmas_eve_from_2025() {
        let calendar = HolidayCalendar::polish(2024..=2025);
        assert!(!calendar.is_holiday(date(2024, 12, 24)));
        assert!(calendar.is_holiday(date(2025, 12, 24)));
    }

    #[test]
    fn test_out_of_range_year() {
        let calendar = HolidayCalendar::polish(2024..=2024);
        assert!(!calendar.is_holiday(date(2025, 1, 1)));
    }
}
