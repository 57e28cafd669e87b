use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::window::{CalendarView, view_window};

/// A request the caller should issue against the external provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPlan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub calendar_ids: Vec<String>,
}

/// Decides when the external events need refetching: whenever the active
/// date, the view, or the set of visible calendars changes. Visible ids
/// compare as unordered sets, so reordering alone never triggers a fetch.
///
/// In-flight fetches are not cancelled; when inputs change again quickly a
/// later response simply overwrites an earlier one (last-resolved-wins).
#[derive(Debug, Default)]
pub struct FetchPlanner {
    last: Option<(CalendarView, NaiveDate, BTreeSet<String>)>,
}

impl FetchPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(
        &mut self,
        view: CalendarView,
        date: NaiveDate,
        visible_calendar_ids: &[String],
    ) -> Option<FetchPlan> {
        let ids: BTreeSet<String> = visible_calendar_ids.iter().cloned().collect();
        if self
            .last
            .as_ref()
            .is_some_and(|(v, d, prev)| *v == view && *d == date && *prev == ids)
        {
            return None;
        }

        let (start, end) = view_window(view, date);
        let calendar_ids = ids.iter().cloned().collect();
        self.last = Some((view, date, ids));
        Some(FetchPlan { start, end, calendar_ids })
    }

    /// Forgets the last fetched inputs so the next `plan` call always fires.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn first_plan_always_fires() {
        let mut planner = FetchPlanner::new();
        let plan = planner
            .plan(CalendarView::Month, date(10), &ids(&["a", "b"]))
            .unwrap();
        assert_eq!(plan.calendar_ids, ids(&["a", "b"]));
    }

    #[test]
    fn reordered_visible_ids_do_not_refetch() {
        let mut planner = FetchPlanner::new();
        assert!(planner.plan(CalendarView::Month, date(10), &ids(&["a", "b"])).is_some());
        assert!(planner.plan(CalendarView::Month, date(10), &ids(&["b", "a"])).is_none());
    }

    #[test]
    fn changed_visible_set_refetches() {
        let mut planner = FetchPlanner::new();
        assert!(planner.plan(CalendarView::Month, date(10), &ids(&["a"])).is_some());
        assert!(planner.plan(CalendarView::Month, date(10), &ids(&["a", "b"])).is_some());
    }

    #[test]
    fn view_or_date_change_refetches() {
        let mut planner = FetchPlanner::new();
        assert!(planner.plan(CalendarView::Month, date(10), &ids(&["a"])).is_some());
        assert!(planner.plan(CalendarView::Week, date(10), &ids(&["a"])).is_some());
        assert!(planner.plan(CalendarView::Week, date(11), &ids(&["a"])).is_some());
        assert!(planner.plan(CalendarView::Week, date(11), &ids(&["a"])).is_none());
    }

    #[test]
    fn invalidate_forces_the_next_fetch() {
        let mut planner = FetchPlanner::new();
        assert!(planner.plan(CalendarView::Day, date(10), &ids(&["a"])).is_some());
        planner.invalidate();
        assert!(planner.plan(CalendarView::Day, date(10), &ids(&["a"])).is_some());
    }
}
