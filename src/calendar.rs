/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Business-day calendars for the datetime primitives.
//!
//! The holiday tables are bundled with the crate and cover 2020 through 2030 inclusive;
//! they are part of the consensus surface and must not be edited without a coordinated
//! upgrade. Outside the covered range only the weekend rule applies. All conversions start
//! from block-derived microseconds; nothing here reads a clock.

use chrono::{DateTime, Datelike, Days, Utc, Weekday};

use crate::error::EvalFail;
use crate::types::Timestamp;

/// A holiday calendar: a sorted table of (year, month, day) full-closure dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Calendar {
    /// England and Wales bank holidays.
    Uk,
    /// New York Stock Exchange full-closure days.
    Nyse,
}

/// England & Wales bank holidays, 2020-2030, substitutes included.
const UK_HOLIDAYS: &[(i32, u32, u32)] = &[
    (2020, 1, 1), (2020, 4, 10), (2020, 4, 13), (2020, 5, 8), (2020, 5, 25),
    (2020, 8, 31), (2020, 12, 25), (2020, 12, 28),
    (2021, 1, 1), (2021, 4, 2), (2021, 4, 5), (2021, 5, 3), (2021, 5, 31),
    (2021, 8, 30), (2021, 12, 27), (2021, 12, 28),
    (2022, 1, 3), (2022, 4, 15), (2022, 4, 18), (2022, 5, 2), (2022, 6, 2),
    (2022, 6, 3), (2022, 8, 29), (2022, 9, 19), (2022, 12, 26), (2022, 12, 27),
    (2023, 1, 2), (2023, 4, 7), (2023, 4, 10), (2023, 5, 1), (2023, 5, 8),
    (2023, 5, 29), (2023, 8, 28), (2023, 12, 25), (2023, 12, 26),
    (2024, 1, 1), (2024, 3, 29), (2024, 4, 1), (2024, 5, 6), (2024, 5, 27),
    (2024, 8, 26), (2024, 12, 25), (2024, 12, 26),
    (2025, 1, 1), (2025, 4, 18), (2025, 4, 21), (2025, 5, 5), (2025, 5, 26),
    (2025, 8, 25), (2025, 12, 25), (2025, 12, 26),
    (2026, 1, 1), (2026, 4, 3), (2026, 4, 6), (2026, 5, 4), (2026, 5, 25),
    (2026, 8, 31), (2026, 12, 25), (2026, 12, 28),
    (2027, 1, 1), (2027, 3, 26), (2027, 3, 29), (2027, 5, 3), (2027, 5, 31),
    (2027, 8, 30), (2027, 12, 27), (2027, 12, 28),
    (2028, 1, 3), (2028, 4, 14), (2028, 4, 17), (2028, 5, 1), (2028, 5, 29),
    (2028, 8, 28), (2028, 12, 25), (2028, 12, 26),
    (2029, 1, 1), (2029, 3, 30), (2029, 4, 2), (2029, 5, 7), (2029, 5, 28),
    (2029, 8, 27), (2029, 12, 25), (2029, 12, 26),
    (2030, 1, 1), (2030, 4, 19), (2030, 4, 22), (2030, 5, 6), (2030, 5, 27),
    (2030, 8, 26), (2030, 12, 25), (2030, 12, 26),
];

/// NYSE full-closure days, 2020-2030, observance shifts included. When New Year's Day
/// falls on a Saturday the exchange does not observe it, per NYSE rule 7.2.
const NYSE_HOLIDAYS: &[(i32, u32, u32)] = &[
    (2020, 1, 1), (2020, 1, 20), (2020, 2, 17), (2020, 4, 10), (2020, 5, 25),
    (2020, 7, 3), (2020, 9, 7), (2020, 11, 26), (2020, 12, 25),
    (2021, 1, 1), (2021, 1, 18), (2021, 2, 15), (2021, 4, 2), (2021, 5, 31),
    (2021, 7, 5), (2021, 9, 6), (2021, 11, 25), (2021, 12, 24),
    (2022, 1, 17), (2022, 2, 21), (2022, 4, 15), (2022, 5, 30), (2022, 6, 20),
    (2022, 7, 4), (2022, 9, 5), (2022, 11, 24), (2022, 12, 26),
    (2023, 1, 2), (2023, 1, 16), (2023, 2, 20), (2023, 4, 7), (2023, 5, 29),
    (2023, 6, 19), (2023, 7, 4), (2023, 9, 4), (2023, 11, 23), (2023, 12, 25),
    (2024, 1, 1), (2024, 1, 15), (2024, 2, 19), (2024, 3, 29), (2024, 5, 27),
    (2024, 6, 19), (2024, 7, 4), (2024, 9, 2), (2024, 11, 28), (2024, 12, 25),
    (2025, 1, 1), (2025, 1, 20), (2025, 2, 17), (2025, 4, 18), (2025, 5, 26),
    (2025, 6, 19), (2025, 7, 4), (2025, 9, 1), (2025, 11, 27), (2025, 12, 25),
    (2026, 1, 1), (2026, 1, 19), (2026, 2, 16), (2026, 4, 3), (2026, 5, 25),
    (2026, 6, 19), (2026, 7, 3), (2026, 9, 7), (2026, 11, 26), (2026, 12, 25),
    (2027, 1, 1), (2027, 1, 18), (2027, 2, 15), (2027, 3, 26), (2027, 5, 31),
    (2027, 6, 18), (2027, 7, 5), (2027, 9, 6), (2027, 11, 25), (2027, 12, 24),
    (2028, 1, 17), (2028, 2, 21), (2028, 4, 14), (2028, 5, 29), (2028, 6, 19),
    (2028, 7, 4), (2028, 9, 4), (2028, 11, 23), (2028, 12, 25),
    (2029, 1, 1), (2029, 1, 15), (2029, 2, 19), (2029, 3, 30), (2029, 5, 28),
    (2029, 6, 19), (2029, 7, 4), (2029, 9, 3), (2029, 11, 22), (2029, 12, 25),
    (2030, 1, 1), (2030, 1, 21), (2030, 2, 18), (2030, 4, 19), (2030, 5, 27),
    (2030, 6, 19), (2030, 7, 4), (2030, 9, 2), (2030, 11, 28), (2030, 12, 25),
];

impl Calendar {
    fn holidays(self) -> &'static [(i32, u32, u32)] {
        match self {
            Calendar::Uk => UK_HOLIDAYS,
            Calendar::Nyse => NYSE_HOLIDAYS,
        }
    }
}

fn to_utc(ts: Timestamp) -> Result<DateTime<Utc>, EvalFail> {
    DateTime::from_timestamp_micros(ts.0).ok_or(EvalFail::Overflow)
}

/// Whether the instant falls on a business day of the calendar: a weekday that is not a
/// listed holiday.
pub fn is_business_day(cal: Calendar, ts: Timestamp) -> Result<bool, EvalFail> {
    let date = to_utc(ts)?.date_naive();
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return Ok(false);
    }
    let ymd = (date.year(), date.month(), date.day());
    Ok(!cal.holidays().contains(&ymd))
}

/// The next business day strictly after the instant, at the same time of day.
pub fn next_business_day(cal: Calendar, ts: Timestamp) -> Result<Timestamp, EvalFail> {
    let mut cursor = to_utc(ts)?
        .checked_add_days(Days::new(1))
        .ok_or(EvalFail::Overflow)?;
    loop {
        let candidate = Timestamp(cursor.timestamp_micros());
        if is_business_day(cal, candidate)? {
            return Ok(candidate);
        }
        cursor = cursor
            .checked_add_days(Days::new(1))
            .ok_or(EvalFail::Overflow)?;
    }
}

/// The half-open `within` interval: `start <= now < end`.
pub fn between(now: Timestamp, start: Timestamp, end: Timestamp) -> bool {
    start <= now && now < end
}
