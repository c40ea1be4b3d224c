//! Read-time aggregation of the per-order sales log.
//!
//! `daily_stats.txt` gets one `(date, amount)` row per order; nothing is
//! aggregated at write time. The helpers here fold the raw rows into the
//! daily and weekly views the statistics menu shows.

use chrono::{Days, NaiveDate};

use crate::money::Money;

/// One sales-log row: the date and total of a single order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub amount: Money,
}

/// A run of sales starting at `start` and closed before `start + 7 days`.
///
/// Weeks are not calendar weeks: the first group is anchored at the earliest
/// sale, and the first record falling outside a group starts the next one at
/// its own date.
#[derive(Clone, Debug)]
pub struct WeekGroup {
    pub start: NaiveDate,
    pub records: Vec<SaleRecord>,
    pub total: Money,
}

/// Per-date totals, ascending.
pub fn daily_totals(records: &[SaleRecord]) -> Vec<(NaiveDate, Money)> {
    let mut totals: Vec<(NaiveDate, Money)> = Vec::new();
    for record in records {
        match totals.iter().position(|(date, _)| *date == record.date) {
            Some(index) => totals[index].1 += record.amount,
            None => totals.push((record.date, record.amount)),
        }
    }

    totals.sort_by_key(|(date, _)| *date);
    totals
}

/// Groups the log into seven-day runs.
pub fn weekly_groups(records: &[SaleRecord]) -> Vec<WeekGroup> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|record| record.date);

    let mut groups: Vec<WeekGroup> = Vec::new();
    for record in sorted {
        let starts_new_week = groups
            .last()
            .is_none_or(|group| record.date >= group.start + Days::new(7));
        if starts_new_week {
            groups.push(WeekGroup {
                start: record.date,
                total: Money::ZERO,
                records: Vec::new(),
            });
        }

        if let Some(group) = groups.last_mut() {
            group.total += record.amount;
            group.records.push(record);
        }
    }

    groups
}
