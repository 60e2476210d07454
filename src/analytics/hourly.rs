//! Hourly bucketing of one day's reports, for the time-spike chart.

use chrono::{NaiveDate, Timelike, Utc};

use crate::config::TimeReference;
use crate::types::{HourlyCount, Report};

/// Bucket the reports falling on the target calendar day into 24 fixed
/// hour slots.
///
/// The day boundary and hour-of-day are evaluated under `time_ref` (the
/// viewer's clock by default, or a fixed venue offset). When `date` is
/// omitted, "today" under the same reference is used. The output is always
/// a dense 24-entry array, hours 0 through 23 in order and zero-filled, so
/// downstream charting never special-cases missing hours.
pub fn hourly_counts(
    reports: &[Report],
    date: Option<NaiveDate>,
    time_ref: &TimeReference,
) -> Vec<HourlyCount> {
    let offset = time_ref.offset();
    let day = date.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());

    let mut buckets = [0usize; 24];
    for report in reports {
        let local = report.report_time.with_timezone(&offset);
        if local.date_naive() == day {
            buckets[local.hour() as usize] += 1;
        }
    }

    buckets
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyCount {
            hour: hour as u32,
            count,
        })
        .collect()
}
