use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use gridpost_core::types::ScheduledPost;

use crate::resolve::to_grid_cell;

/// Column headings, Sunday first.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A post placed into a grid cell for display.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedPost {
    pub content: String,
    pub published: bool,
    pub hour: u8,
    #[serde(rename = "minutes")]
    pub minute: u8,
    #[serde(rename = "day")]
    pub day_id: u8,
    pub date: NaiveDate,
}

/// One hour row: seven per-day cell lists.
#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub time: u8,
    pub schedule: [Vec<PlacedPost>; 7],
}

/// The 24-row weekly grid.
///
/// [`WeekGrid::empty`] is a pure factory: every call returns a fresh
/// structure, so no two requests can alias the same rows.
#[derive(Debug, Clone, Serialize)]
pub struct WeekGrid {
    pub rows: Vec<GridRow>,
}

impl WeekGrid {
    /// Fresh empty grid, one row per hour.
    pub fn empty() -> Self {
        let rows = (0u8..24)
            .map(|time| GridRow {
                time,
                schedule: std::array::from_fn(|_| Vec::new()),
            })
            .collect();
        Self { rows }
    }

    /// Place a fetched post into its cell, derived from `scheduled_at` in
    /// the viewer's timezone.
    pub fn place(&mut self, post: &ScheduledPost, tz: Tz) {
        let cell = to_grid_cell(post.scheduled_at, tz);
        self.rows[cell.hour as usize].schedule[cell.day_id as usize].push(PlacedPost {
            content: post.content.clone(),
            published: post.published,
            hour: cell.hour,
            minute: cell.minute,
            day_id: cell.day_id,
            date: cell.date,
        });
    }
}

/// The seven calendar dates (Sunday..Saturday) of the displayed week,
/// `week_offset` weeks from the week containing `now` in `tz`.
pub fn week_dates(week_offset: i32, tz: Tz, now: DateTime<Utc>) -> [NaiveDate; 7] {
    let local_now = now.with_timezone(&tz);
    let week_start = local_now.date_naive()
        - Duration::days(local_now.weekday().num_days_from_sunday() as i64)
        + Duration::days(week_offset as i64 * 7);
    std::array::from_fn(|i| week_start + Duration::days(i as i64))
}

/// Row label for an hour: "Midnight", "9am", "12 Noon", "3pm".
pub fn format_hour_label(hour: u8) -> String {
    match hour {
        0 => "Midnight".to_string(),
        1..=11 => format!("{hour}am"),
        12 => "12 Noon".to_string(),
        _ => format!("{}pm", hour % 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(content: &str, at: DateTime<Utc>) -> ScheduledPost {
        ScheduledPost {
            id: "p1".into(),
            owner: "alice".into(),
            content: content.into(),
            day_id: 0,
            scheduled_at: at,
            published: false,
            created_at: at.to_rfc3339(),
            updated_at: at.to_rfc3339(),
        }
    }

    #[test]
    fn empty_returns_independent_grids() {
        let mut a = WeekGrid::empty();
        let b = WeekGrid::empty();
        a.rows[3].schedule[2].push(PlacedPost {
            content: "x".into(),
            published: false,
            hour: 3,
            minute: 0,
            day_id: 2,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        });
        assert_eq!(a.rows[3].schedule[2].len(), 1);
        assert!(b.rows[3].schedule[2].is_empty());
        assert_eq!(b.rows.len(), 24);
    }

    #[test]
    fn place_uses_viewer_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 14:30 UTC = 09:30 EST on Tuesday 2024-03-05.
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let mut grid = WeekGrid::empty();
        grid.place(&post("hello", at), tz);

        let cell = &grid.rows[9].schedule[2];
        assert_eq!(cell.len(), 1);
        assert_eq!(cell[0].minute, 30);
        assert_eq!(cell[0].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn week_dates_start_on_sunday() {
        let tz: Tz = "UTC".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(); // Tuesday
        let dates = week_dates(0, tz, now);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());

        let next = week_dates(1, tz, now);
        assert_eq!(next[0], NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn hour_labels() {
        assert_eq!(format_hour_label(0), "Midnight");
        assert_eq!(format_hour_label(9), "9am");
        assert_eq!(format_hour_label(11), "11am");
        assert_eq!(format_hour_label(12), "12 Noon");
        assert_eq!(format_hour_label(15), "3pm");
        assert_eq!(format_hour_label(23), "11pm");
    }
}
