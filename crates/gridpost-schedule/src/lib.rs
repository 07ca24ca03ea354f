//! `gridpost-schedule` — schedule date resolution and the weekly grid.
//!
//! # Overview
//!
//! The weekly view is a 24-row × 7-day grid. A cell selection is a
//! [`GridSlot`] (day-of-week, hour, minute) plus a week offset;
//! [`resolve::resolve_scheduled_at`] turns it into an absolute UTC instant
//! using the viewer's IANA timezone rule *at the target date*, so daylight
//! saving transitions on either side of "now" are handled by the timezone
//! database rather than a hardcoded transition day.
//!
//! [`resolve::to_grid_cell`] is the exact inverse for any instant the
//! forward operation produced, and is what places fetched posts back onto a
//! fresh [`grid::WeekGrid`].

pub mod error;
pub mod grid;
pub mod resolve;

pub use error::{Result, ScheduleError};
pub use grid::{format_hour_label, week_dates, WeekGrid, DAY_NAMES};
pub use resolve::{parse_timezone, resolve_scheduled_at, to_grid_cell, GridCell, GridSlot};
