//! Weekly time grid.
//!
//! A timetable is laid over a fixed weekly grid of teaching periods.
//! Each period on each day is one [`TimeSlot`]; the slot index is the
//! ordinal of the period within its day and drives adjacency and gap math.
//!
//! # Time Model
//! Times are wall-clock [`NaiveTime`] values. Intervals are half-open:
//! a slot `[09:00, 10:00)` does not overlap a slot starting at 10:00.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Builds a wall-clock time, falling back to midnight on out-of-range input.
pub(crate) fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// A time interval [start, end).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: NaiveTime,
    /// Interval end (exclusive).
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Creates a window from hour/minute pairs.
    ///
    /// Out-of-range components (hour ≥ 24, minute ≥ 60) become 00:00, so
    /// `(24, 0)` is midnight at the start of the day. Use
    /// [`try_from_hm`](Self::try_from_hm) for untrusted input.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Self {
        Self::new(hm(start.0, start.1), hm(end.0, end.1))
    }

    /// Creates a window from hour/minute pairs, or `None` if either time
    /// is not a valid wall-clock time.
    ///
    /// ```
    /// use u_timetable::models::TimeWindow;
    ///
    /// assert!(TimeWindow::try_from_hm((9, 0), (10, 30)).is_some());
    /// assert!(TimeWindow::try_from_hm((23, 0), (24, 0)).is_none());
    /// ```
    pub fn try_from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        Some(Self::new(
            NaiveTime::from_hms_opt(start.0, start.1, 0)?,
            NaiveTime::from_hms_opt(end.0, end.1, 0)?,
        ))
    }

    /// The conventional 12:00–13:00 lunch hour.
    pub fn default_lunch() -> Self {
        Self::from_hm((12, 0), (13, 0))
    }

    /// Length of the window in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether a time falls within this window.
    #[inline]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether the interval `[start, end)` overlaps this window.
    #[inline]
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start < end && start < self.end
    }
}

/// One teaching period in the weekly grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day of the week.
    pub day: Weekday,
    /// Period start.
    pub start_time: NaiveTime,
    /// Period end.
    pub end_time: NaiveTime,
    /// Ordinal of this period within its day (0-based).
    pub slot_index: u32,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(
        id: impl Into<String>,
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        slot_index: u32,
    ) -> Self {
        Self {
            id: id.into(),
            day,
            start_time,
            end_time,
            slot_index,
        }
    }

    /// Builds the fixed weekly grid: every period on every day.
    ///
    /// Slot IDs are `"{day}-{n}"` with `n` starting at 1 (e.g. `Mon-1`),
    /// slot indices start at 0 and follow the order of `periods`.
    pub fn weekly_grid(days: &[Weekday], periods: &[TimeWindow]) -> Vec<Self> {
        days.iter()
            .flat_map(|&day| {
                periods.iter().enumerate().map(move |(i, period)| {
                    Self::new(
                        format!("{day}-{}", i + 1),
                        day,
                        period.start,
                        period.end,
                        i as u32,
                    )
                })
            })
            .collect()
    }

    /// The slot's interval as a window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Whether this slot overlaps the given window.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        window.overlaps(self.start_time, self.end_time)
    }

    /// Human-readable label, e.g. `Mon 09:00-10:00`.
    pub fn label(&self) -> String {
        format!(
            "{} {}-{}",
            self.day,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_overlap_half_open() {
        let lunch = TimeWindow::default_lunch();
        assert!(lunch.overlaps(hm(11, 30), hm(12, 30)));
        assert!(lunch.overlaps(hm(12, 0), hm(13, 0)));
        assert!(!lunch.overlaps(hm(11, 0), hm(12, 0)));
        assert!(!lunch.overlaps(hm(13, 0), hm(14, 0)));
        assert_eq!(lunch.duration_minutes(), 60);
    }

    #[test]
    fn test_window_contains() {
        let w = TimeWindow::from_hm((9, 0), (10, 0));
        assert!(w.contains(hm(9, 0)));
        assert!(w.contains(hm(9, 59)));
        assert!(!w.contains(hm(10, 0)));
    }

    #[test]
    fn test_weekly_grid() {
        let periods = vec![
            TimeWindow::from_hm((9, 0), (10, 0)),
            TimeWindow::from_hm((10, 0), (11, 0)),
            TimeWindow::from_hm((11, 0), (12, 0)),
        ];
        let grid = TimeSlot::weekly_grid(&[Weekday::Mon, Weekday::Tue], &periods);

        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0].id, "Mon-1");
        assert_eq!(grid[0].slot_index, 0);
        assert_eq!(grid[5].id, "Tue-3");
        assert_eq!(grid[5].day, Weekday::Tue);
        assert_eq!(grid[5].slot_index, 2);
    }

    #[test]
    fn test_slot_label() {
        let slot = TimeSlot::new("Mon-1", Weekday::Mon, hm(9, 0), hm(10, 0), 0);
        assert_eq!(slot.label(), "Mon 09:00-10:00");
        assert!(!slot.overlaps(&TimeWindow::default_lunch()));
    }

    #[test]
    fn test_try_from_hm_rejects_out_of_range() {
        assert_eq!(
            TimeWindow::try_from_hm((9, 0), (10, 0)),
            Some(TimeWindow::from_hm((9, 0), (10, 0)))
        );
        assert!(TimeWindow::try_from_hm((24, 0), (25, 0)).is_none());
        assert!(TimeWindow::try_from_hm((9, 60), (10, 0)).is_none());

        // The infallible constructor wraps to midnight instead.
        let wrapped = TimeWindow::from_hm((23, 0), (24, 0));
        assert_eq!(Some(wrapped.end), NaiveTime::from_hms_opt(0, 0, 0));
        assert!(wrapped.duration_minutes() < 0);
    }
}
