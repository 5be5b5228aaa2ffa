//! Daily visit streak.
//!
//! Streaks are counted in calendar days of the caller's time zone. Two visits
//! at 23:50 and 00:10 are one day apart even though only twenty minutes
//! elapsed, and a 30 hour gap across a DST change is still "yesterday".

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::engine::Transition;
use super::record::ProgressRecord;
use crate::events::Event;

/// How the current visit relates to the previous one, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGap {
    /// No previous visit recorded.
    First,
    /// Same calendar day. Also used when the clock went backwards.
    SameDay,
    NextDay,
    /// Two or more days since the last visit.
    Missed(i64),
}

pub fn day_gap(last: Option<NaiveDate>, today: NaiveDate) -> DayGap {
    match last {
        None => DayGap::First,
        Some(last) => match (today - last).num_days() {
            d if d <= 0 => DayGap::SameDay,
            1 => DayGap::NextDay,
            d => DayGap::Missed(d),
        },
    }
}

pub fn next_streak(current: u32, gap: DayGap) -> u32 {
    match gap {
        DayGap::First => 1,
        DayGap::SameDay => current,
        DayGap::NextDay => current.saturating_add(1),
        DayGap::Missed(_) => 1,
    }
}

/// Run the once-per-session streak check against `now`.
///
/// The previous visit is converted into `now`'s time zone before taking its
/// date, so only calendar days are compared. `last_visit_date` is always
/// refreshed.
pub fn evaluate<Tz: TimeZone>(record: &ProgressRecord, now: &DateTime<Tz>) -> Transition {
    let mut next = record.clone();
    let tz = now.timezone();
    let today = now.date_naive();
    let last = record
        .last_visit_date
        .map(|at| at.with_timezone(&tz).date_naive());

    let gap = day_gap(last, today);
    let before = record.streak;
    next.streak = next_streak(before, gap);
    next.last_visit_date = Some(now.with_timezone(&Utc));

    let mut events = Vec::new();
    if next.streak != before {
        events.push(Event::StreakUpdated {
            from: before,
            to: next.streak,
        });
    }
    tracing::debug!(?gap, from = before, to = next.streak, "streak evaluated");

    Transition {
        record: next,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(tz: &FixedOffset, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn record_with(streak: u32, last: DateTime<FixedOffset>) -> ProgressRecord {
        ProgressRecord {
            streak,
            last_visit_date: Some(last.with_timezone(&Utc)),
            ..ProgressRecord::default()
        }
    }

    #[test]
    fn yesterday_extends_streak() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, 2026, 2, 19, 9, 0);
        let record = record_with(5, now - Duration::days(1));

        let t = evaluate(&record, &now);
        assert_eq!(t.record.streak, 6);
        assert_eq!(t.record.last_visit_date, Some(now.with_timezone(&Utc)));
        assert_eq!(t.events, vec![Event::StreakUpdated { from: 5, to: 6 }]);
    }

    #[test]
    fn three_days_ago_resets_streak() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, 2026, 2, 19, 9, 0);
        let record = record_with(5, now - Duration::days(3));

        let t = evaluate(&record, &now);
        assert_eq!(t.record.streak, 1);
    }

    #[test]
    fn same_day_keeps_streak_but_refreshes_visit() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, 2026, 2, 19, 18, 0);
        let record = record_with(5, at(&tz, 2026, 2, 19, 7, 30));

        let t = evaluate(&record, &now);
        assert_eq!(t.record.streak, 5);
        assert_eq!(t.record.last_visit_date, Some(now.with_timezone(&Utc)));
        assert!(t.events.is_empty());
    }

    #[test]
    fn compares_calendar_days_not_elapsed_hours() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let last = at(&tz, 2026, 2, 18, 23, 50);
        let now = at(&tz, 2026, 2, 19, 0, 10);

        let t = evaluate(&record_with(2, last), &now);
        assert_eq!(t.record.streak, 3);
    }

    #[test]
    fn long_gap_within_two_days_is_still_next_day() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let last = at(&tz, 2026, 2, 18, 0, 5);
        let now = at(&tz, 2026, 2, 19, 23, 55);

        let t = evaluate(&record_with(4, last), &now);
        assert_eq!(t.record.streak, 5);
    }

    #[test]
    fn date_is_taken_in_callers_time_zone() {
        // 20:00 UTC on the 18th is already the 19th in UTC+5.
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus5 = FixedOffset::east_opt(5 * 3600).unwrap();
        let last = at(&utc, 2026, 2, 18, 20, 0);
        let now = at(&plus5, 2026, 2, 19, 9, 0);

        let t = evaluate(&record_with(7, last), &now);
        assert_eq!(t.record.streak, 7);
    }

    #[test]
    fn first_visit_starts_at_one() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, 2026, 2, 19, 9, 0);

        let t = evaluate(&ProgressRecord::default(), &now);
        assert_eq!(t.record.streak, 1);
        assert_eq!(t.events, vec![Event::StreakUpdated { from: 0, to: 1 }]);
    }

    #[test]
    fn clock_going_backwards_counts_as_same_day() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, 2026, 2, 19, 9, 0);
        let record = record_with(3, now + Duration::days(2));

        let t = evaluate(&record, &now);
        assert_eq!(t.record.streak, 3);
    }
}
