//! Monthly averages.
//!
//! A month's average is its crash count over every year of data divided by
//! the number of times that calendar month has occurred since the dataset
//! began.

use chrono::{Datelike as _, NaiveDate};

/// Year the collision dataset starts.
pub const DATA_START_YEAR: i32 = 2012;

/// First month (1-based) with data in [`DATA_START_YEAR`].
pub const DATA_START_MONTH: u32 = 7;

/// Number of times `month` (1-12) has occurred between the start of the
/// dataset and `today`, inclusive of the current month. Never less than 1.
#[must_use]
pub fn month_denominator(month: u32, today: NaiveDate) -> u64 {
    let mut occurrences = i64::from(today.year()) - i64::from(DATA_START_YEAR) - 1;
    if month >= DATA_START_MONTH {
        occurrences += 1;
    }
    if today.month() >= month {
        occurrences += 1;
    }
    u64::try_from(occurrences.max(1)).unwrap_or(1)
}

/// Divides each month's count by its denominator, rounding half to even.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn monthly_averages(counts: &[u64; 12], today: NaiveDate) -> [u64; 12] {
    let mut averages = [0; 12];
    for (month0, (average, count)) in averages.iter_mut().zip(counts).enumerate() {
        let month = u32::try_from(month0 + 1).unwrap_or(12);
        let denominator = month_denominator(month, today);
        *average = (*count as f64 / denominator as f64).round_ties_even() as u64;
    }
    averages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_partial_first_year_and_current_month() {
        let today = date(2024, 3, 10);
        // Jan 2013..2023 = 11, plus Jan 2024.
        assert_eq!(month_denominator(1, today), 12);
        // Mar 2013..2023 = 11, plus Mar 2024 (current month).
        assert_eq!(month_denominator(3, today), 12);
        // Apr has not happened yet this year.
        assert_eq!(month_denominator(4, today), 11);
        // Jul 2012 + Jul 2013..2023.
        assert_eq!(month_denominator(7, today), 12);
        assert_eq!(month_denominator(12, today), 12);
    }

    #[test]
    fn denominator_is_never_zero() {
        for year in [2000, 2012, 2013, 2014, 2026] {
            for today_month in 1..=12 {
                let today = date(year, today_month, 1);
                for month in 1..=12 {
                    assert!(
                        month_denominator(month, today) >= 1,
                        "month {month} on {today} has zero denominator"
                    );
                }
            }
        }
    }

    #[test]
    fn averages_round_half_to_even() {
        let today = date(2014, 1, 1);
        // Jan: (2014 - 2013) + 0 + 1 = 2. Feb: 1 + 0 + 0 = 1.
        let mut counts = [0; 12];
        counts[0] = 5;
        counts[1] = 7;
        let averages = monthly_averages(&counts, today);
        assert_eq!(averages[0], 2);
        assert_eq!(averages[1], 7);

        counts[0] = 7;
        assert_eq!(monthly_averages(&counts, today)[0], 4);
    }
}
