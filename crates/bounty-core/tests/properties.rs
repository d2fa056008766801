//! Property tests for day counting and the balance formula.

use bounty_core::{
    FlexBalanceOptions, Holiday, Weekday, Workdays, calc_flex_balance, count_days,
    count_days_by_iteration, holidays_in_range,
};
use chrono::NaiveDate;
use proptest::prelude::*;

/// 1970-01-01 counted from 0001-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
/// Roughly two centuries of start dates.
const START_SPAN_DAYS: i32 = 200 * 365;
/// Up to eight years per range.
const MAX_RANGE_DAYS: u64 = 8 * 365;

fn date_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0..START_SPAN_DAYS, 0..MAX_RANGE_DAYS).prop_map(|(start, length)| {
        let from = NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAYS_FROM_CE + start).unwrap();
        let to = from + chrono::Days::new(length);
        (from, to)
    })
}

fn workdays() -> impl Strategy<Value = Workdays> {
    proptest::sample::subsequence(Weekday::ALL.to_vec(), 0..=7).prop_map(Workdays::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2048))]

    #[test]
    fn closed_form_matches_iteration((from, to) in date_range()) {
        prop_assert_eq!(
            count_days(from, to).unwrap(),
            count_days_by_iteration(from, to).unwrap()
        );
    }

    #[test]
    fn weekday_counts_sum_to_total((from, to) in date_range()) {
        let counts = count_days(from, to).unwrap();
        prop_assert_eq!(counts.days, 1 + (to - from).num_days());
        let sum: i64 = Weekday::ALL.into_iter().map(|day| counts.count(day)).sum();
        prop_assert_eq!(sum, counts.days);
    }

    #[test]
    fn reversed_ranges_fail((from, to) in date_range()) {
        prop_assume!(from < to);
        prop_assert!(count_days(to, from).is_err());
        prop_assert!(holidays_in_range(to, from).is_err());
    }

    #[test]
    fn holidays_in_range_stay_in_range((from, to) in date_range()) {
        for holiday in holidays_in_range(from, to).unwrap() {
            prop_assert!(from <= holiday.date && holiday.date <= to);
        }
    }

    #[test]
    fn balance_is_monotonic(
        (from, to) in date_range(),
        workdays in workdays(),
        actual in 0.0..2000.0f64,
        reference in -100.0..100.0f64,
        hours in 0.0..12.0f64,
        extra in 0.1..50.0f64,
    ) {
        let options = FlexBalanceOptions::default()
            .with_to(to)
            .with_workdays(workdays)
            .with_hours_on_workdays(hours)
            .with_hours_on_holiday(Holiday::ChristmasEve, 3.75);
        let base = calc_flex_balance(actual, from, reference, &options).unwrap();

        let more_hours = calc_flex_balance(actual + extra, from, reference, &options).unwrap();
        prop_assert!(more_hours > base);

        let more_reference = calc_flex_balance(actual, from, reference + extra, &options).unwrap();
        prop_assert!(more_reference > base);

        let longer_days = options.clone().with_hours_on_workdays(hours + extra);
        let longer = calc_flex_balance(actual, from, reference, &longer_days).unwrap();
        prop_assert!(longer <= base);
    }
}
