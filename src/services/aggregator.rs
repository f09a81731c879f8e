//! Field-wise summation of classified contributions, grouped by station or
//! time bucket. Aggregators are seeded with the full expected key set before
//! any data is folded in, so explicit calendar ranges emit zero rows instead
//! of gaps.

use crate::services::classifier::Contribution;
use crate::utils::time::{day_label, hour_label, month_label};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RevenueTotals {
    pub total_amount: Decimal,
    pub total_cash: Decimal,
    pub total_online: Decimal,
    pub total_no_of_tickets: u64,
}

impl RevenueTotals {
    pub fn fold(&mut self, c: &Contribution) {
        self.total_amount += c.amount;
        self.total_cash += c.cash;
        self.total_online += c.online;
        self.total_no_of_tickets += c.tickets;
    }
}

/// Calendar bucket in the business timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeBucket {
    Month { year: i32, month: u32 },
    Day(NaiveDate),
    Hour { date: NaiveDate, hour: u32 },
}

impl TimeBucket {
    pub fn day_of(ts: DateTime<Utc>, offset_minutes: i32) -> TimeBucket {
        TimeBucket::Day(to_local(ts, offset_minutes).date_naive())
    }

    pub fn hour_of(ts: DateTime<Utc>, offset_minutes: i32) -> TimeBucket {
        let local = to_local(ts, offset_minutes);
        TimeBucket::Hour {
            date: local.date_naive(),
            hour: local.hour(),
        }
    }

    pub fn month_of(ts: DateTime<Utc>, offset_minutes: i32) -> TimeBucket {
        use chrono::Datelike;
        let local = to_local(ts, offset_minutes).date_naive();
        TimeBucket::Month {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            TimeBucket::Month { year, month } => month_label(*year, *month),
            TimeBucket::Day(date) => day_label(*date),
            TimeBucket::Hour { hour, .. } => hour_label(*hour),
        }
    }
}

fn to_local(ts: DateTime<Utc>, offset_minutes: i32) -> DateTime<Utc> {
    ts + Duration::minutes(offset_minutes as i64)
}

/// Keyed fold over contributions. `BTreeMap` keeps groups in ascending key
/// order, which is the order reports are expected in.
#[derive(Debug)]
pub struct RevenueAggregator<K: Ord> {
    groups: BTreeMap<K, RevenueTotals>,
}

impl<K: Ord> RevenueAggregator<K> {
    pub fn seeded<I: IntoIterator<Item = K>>(keys: I) -> Self {
        Self {
            groups: keys
                .into_iter()
                .map(|k| (k, RevenueTotals::default()))
                .collect(),
        }
    }

    /// Folds one contribution into its group. Contributions for keys outside
    /// the seeded set are dropped: the key set defines the report's scope.
    pub fn fold(&mut self, key: K, c: &Contribution) {
        if let Some(totals) = self.groups.get_mut(&key) {
            totals.fold(c);
        }
    }

    pub fn into_groups(self) -> Vec<(K, RevenueTotals)> {
        self.groups.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn contribution(amount: Decimal, cash: Decimal, online: Decimal) -> Contribution {
        Contribution {
            amount,
            cash,
            online,
            tickets: 1,
        }
    }

    #[test]
    fn seeded_groups_survive_with_zero_values() {
        let months = (1..=12u32).map(|month| TimeBucket::Month { year: 2026, month });
        let agg = RevenueAggregator::seeded(months);

        let rows = agg.into_groups();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|(_, t)| *t == RevenueTotals::default()));
        assert_eq!(rows[0].0, TimeBucket::Month { year: 2026, month: 1 });
    }

    #[test]
    fn fold_sums_field_wise_within_a_group() {
        let mut agg = RevenueAggregator::seeded([10i64, 20i64]);
        agg.fold(10, &contribution(dec!(100), dec!(100), dec!(0)));
        agg.fold(10, &contribution(dec!(40), dec!(0), dec!(40)));
        agg.fold(20, &contribution(dec!(7.50), dec!(0), dec!(0)));

        let rows = agg.into_groups();
        assert_eq!(rows[0].1.total_amount, dec!(140));
        assert_eq!(rows[0].1.total_cash, dec!(100));
        assert_eq!(rows[0].1.total_online, dec!(40));
        assert_eq!(rows[0].1.total_no_of_tickets, 2);
        assert_eq!(rows[1].1.total_amount, dec!(7.50));
    }

    #[test]
    fn bucket_sums_never_exceed_the_total() {
        let mut agg = RevenueAggregator::seeded([1i64]);
        agg.fold(1, &contribution(dec!(100), dec!(100), dec!(0)));
        agg.fold(1, &contribution(dec!(30), dec!(0), dec!(0))); // unbucketed
        agg.fold(1, &contribution(dec!(20), dec!(0), dec!(20)));

        let (_, totals) = agg.into_groups().pop().unwrap();
        assert!(totals.total_cash + totals.total_online <= totals.total_amount);
        assert_eq!(totals.total_amount, dec!(150));
    }

    #[test]
    fn decimal_sums_keep_precision() {
        let mut agg = RevenueAggregator::seeded([1i64]);
        for _ in 0..10 {
            agg.fold(1, &contribution(dec!(0.1), dec!(0.1), dec!(0)));
        }
        let (_, totals) = agg.into_groups().pop().unwrap();
        assert_eq!(totals.total_amount, dec!(1.0));
    }

    #[test]
    fn station_groups_come_out_in_ascending_id_order() {
        let mut agg = RevenueAggregator::seeded([30i64, 10, 20]);
        agg.fold(30, &contribution(dec!(1), dec!(1), dec!(0)));
        let ids: Vec<i64> = agg.into_groups().into_iter().map(|(k, _)| k).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn time_buckets_respect_the_business_offset() {
        // 20:00 UTC is already the next day in IST (+05:30).
        let ts = DateTime::parse_from_rfc3339("2026-08-28T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            TimeBucket::day_of(ts, 330),
            TimeBucket::Day(NaiveDate::from_ymd_opt(2026, 8, 29).unwrap())
        );
        assert_eq!(
            TimeBucket::hour_of(ts, 330),
            TimeBucket::Hour {
                date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
                hour: 1
            }
        );
    }
}
