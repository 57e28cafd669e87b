use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Month,
    Week,
    Day,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Date window to request external events for:
/// month = first through last day, week = 7 days from the week's Sunday,
/// day = 00:00:00 through 23:59:59.
pub fn view_window(view: CalendarView, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    match view {
        CalendarView::Month => {
            let first = date.with_day(1).unwrap_or(date);
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(first);
            (midnight(first), midnight(last))
        }
        CalendarView::Week => {
            let start = date.week(Weekday::Sun).first_day();
            (midnight(start), midnight(start) + Duration::days(7))
        }
        CalendarView::Day => {
            let start = midnight(date);
            (start, start + Duration::days(1) - Duration::seconds(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_window_spans_first_to_last_day() {
        let (start, end) = view_window(CalendarView::Month, date(2026, 2, 14));
        assert_eq!(start, midnight(date(2026, 2, 1)));
        assert_eq!(end, midnight(date(2026, 2, 28)));
    }

    #[test]
    fn month_window_handles_december_rollover() {
        let (start, end) = view_window(CalendarView::Month, date(2026, 12, 3));
        assert_eq!(start, midnight(date(2026, 12, 1)));
        assert_eq!(end, midnight(date(2026, 12, 31)));
    }

    #[test]
    fn week_window_is_seven_days_from_sunday() {
        // 2026-03-11 is a Wednesday; the week starts Sunday 2026-03-08.
        let (start, end) = view_window(CalendarView::Week, date(2026, 3, 11));
        assert_eq!(start, midnight(date(2026, 3, 8)));
        assert_eq!(end, midnight(date(2026, 3, 15)));
    }

    #[test]
    fn day_window_ends_at_last_second() {
        let (start, end) = view_window(CalendarView::Day, date(2026, 3, 11));
        assert_eq!(start, midnight(date(2026, 3, 11)));
        assert_eq!(end, midnight(date(2026, 3, 12)) - Duration::seconds(1));
    }
}
