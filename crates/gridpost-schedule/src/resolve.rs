use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// A selected cell in the weekly grid: day-of-week (0 = Sunday), hour row
/// and minute offset past the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub day_id: u8,
    pub hour: u8,
    pub minute: u8,
}

/// The grid position a stored instant maps back to, plus the calendar date
/// it falls on in the viewer's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub day_id: u8,
    pub hour: u8,
    pub minute: u8,
    pub date: NaiveDate,
}

/// Parse an IANA timezone identifier like "America/New_York".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| ScheduleError::UnknownTimezone(tz.to_string()))
}

/// Resolve a grid selection into an absolute UTC instant.
///
/// The target calendar date is `day_id + week_offset * 7` days from the
/// start (Sunday) of the week containing `now` in the viewer's local
/// calendar. The wall-clock time `hour:minute` on that date is converted to
/// UTC with the timezone rule in force *on the target date* — never an
/// offset sampled at `now`, which is off by an hour whenever the target
/// sits on the far side of a DST transition.
///
/// Ambiguous fall-back times resolve to the earlier instant. Nonexistent
/// spring-forward times and instants strictly before `now` are errors.
pub fn resolve_scheduled_at(
    slot: GridSlot,
    week_offset: i32,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    validate_slot(slot)?;

    let local_now = now.with_timezone(&tz);
    let days_from_sunday = local_now.weekday().num_days_from_sunday() as i64;
    let week_start = local_now.date_naive() - Duration::days(days_from_sunday);
    let target_date =
        week_start + Duration::days(slot.day_id as i64 + week_offset as i64 * 7);

    // hour/minute were range-checked above, so this cannot fail.
    let time = NaiveTime::from_hms_opt(slot.hour as u32, slot.minute as u32, 0)
        .ok_or_else(|| ScheduleError::InvalidSlot(format!("{}:{}", slot.hour, slot.minute)))?;
    let naive = target_date.and_time(time);

    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // Fall-back repeats the hour; take the earlier occurrence.
        LocalResult::Ambiguous(earliest, _latest) => earliest,
        LocalResult::None => {
            return Err(ScheduleError::NonexistentLocalTime {
                local: naive.to_string(),
                tz: tz.name().to_string(),
            })
        }
    };

    let at = local.with_timezone(&Utc);
    if at < now {
        return Err(ScheduleError::PastSchedule { at });
    }
    Ok(at)
}

/// Map a stored instant back onto the grid in the viewer's timezone.
///
/// Exact inverse of [`resolve_scheduled_at`] for any instant it produced.
pub fn to_grid_cell(at: DateTime<Utc>, tz: Tz) -> GridCell {
    let local = at.with_timezone(&tz);
    GridCell {
        day_id: local.weekday().num_days_from_sunday() as u8,
        hour: local.hour() as u8,
        minute: local.minute() as u8,
        date: local.date_naive(),
    }
}

fn validate_slot(slot: GridSlot) -> Result<()> {
    if slot.day_id > 6 {
        return Err(ScheduleError::InvalidSlot(format!(
            "day_id {} out of range 0-6",
            slot.day_id
        )));
    }
    if slot.hour > 23 {
        return Err(ScheduleError::InvalidSlot(format!(
            "hour {} out of range 0-23",
            slot.hour
        )));
    }
    if slot.minute > 59 {
        return Err(ScheduleError::InvalidSlot(format!(
            "minute {} out of range 0-59",
            slot.minute
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day_id: u8, hour: u8, minute: u8) -> GridSlot {
        GridSlot {
            day_id,
            hour,
            minute,
        }
    }

    fn tz(name: &str) -> Tz {
        parse_timezone(name).unwrap()
    }

    /// Monday 2024-03-04 12:00 UTC — the week before the US spring-forward
    /// transition on Sunday 2024-03-10.
    fn now_before_spring_forward() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn resolves_in_current_week() {
        let now = now_before_spring_forward();
        // Tuesday 2024-03-05 09:00 EST = 14:00 UTC.
        let at = resolve_scheduled_at(slot(2, 9, 0), 0, tz("America/New_York"), now).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap());
    }

    #[test]
    fn uses_target_date_offset_across_spring_forward() {
        let now = now_before_spring_forward();
        let ny = tz("America/New_York");

        let this_week = resolve_scheduled_at(slot(2, 9, 0), 0, ny, now).unwrap();
        let next_week = resolve_scheduled_at(slot(2, 9, 0), 1, ny, now).unwrap();

        // Tuesday 2024-03-12 09:00 is EDT (UTC-4), not EST: 13:00 UTC.
        assert_eq!(
            next_week,
            Utc.with_ymd_and_hms(2024, 3, 12, 13, 0, 0).unwrap()
        );
        // The naive "apply today's offset" answer would be exactly 7 days
        // after this_week; crossing the transition shortens it by one hour.
        assert_eq!(next_week - this_week, Duration::days(7) - Duration::hours(1));
    }

    #[test]
    fn uses_target_date_offset_across_fall_back() {
        // Monday 2024-10-28, the week before the US fall-back on 2024-11-03.
        let now = Utc.with_ymd_and_hms(2024, 10, 28, 12, 0, 0).unwrap();
        let ny = tz("America/New_York");

        let this_week = resolve_scheduled_at(slot(2, 9, 0), 0, ny, now).unwrap();
        let next_week = resolve_scheduled_at(slot(2, 9, 0), 1, ny, now).unwrap();

        assert_eq!(
            this_week,
            Utc.with_ymd_and_hms(2024, 10, 29, 13, 0, 0).unwrap()
        );
        assert_eq!(next_week, Utc.with_ymd_and_hms(2024, 11, 5, 14, 0, 0).unwrap());
        assert_eq!(next_week - this_week, Duration::days(7) + Duration::hours(1));
    }

    #[test]
    fn southern_hemisphere_transition() {
        // Sydney springs forward on 2024-10-06 — a date no northern
        // hemisphere heuristic would pick.
        let now = Utc.with_ymd_and_hms(2024, 9, 30, 0, 0, 0).unwrap();
        let sydney = tz("Australia/Sydney");

        let this_week = resolve_scheduled_at(slot(3, 9, 0), 0, sydney, now).unwrap();
        let next_week = resolve_scheduled_at(slot(3, 9, 0), 1, sydney, now).unwrap();

        // Wed 2024-10-02 09:00 AEST (+10) = 2024-10-01 23:00 UTC.
        assert_eq!(this_week, Utc.with_ymd_and_hms(2024, 10, 1, 23, 0, 0).unwrap());
        // Wed 2024-10-09 09:00 AEDT (+11) = 2024-10-08 22:00 UTC.
        assert_eq!(next_week, Utc.with_ymd_and_hms(2024, 10, 8, 22, 0, 0).unwrap());
    }

    #[test]
    fn ambiguous_fall_back_time_takes_earlier_instant() {
        let now = Utc.with_ymd_and_hms(2024, 10, 28, 12, 0, 0).unwrap();
        // Sunday 2024-11-03 01:30 happens twice in New York; the earlier
        // occurrence is still EDT (UTC-4).
        let at =
            resolve_scheduled_at(slot(0, 1, 30), 1, tz("America/New_York"), now).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn nonexistent_spring_forward_time_is_rejected() {
        let now = now_before_spring_forward();
        // Sunday 2024-03-10 02:30 does not exist in New York.
        let err =
            resolve_scheduled_at(slot(0, 2, 30), 1, tz("America/New_York"), now).unwrap_err();
        assert!(matches!(err, ScheduleError::NonexistentLocalTime { .. }));
    }

    #[test]
    fn past_instant_is_rejected() {
        // Tuesday 2024-03-05 18:00 UTC = 13:00 EST; 09:00 today has passed.
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap();
        let err =
            resolve_scheduled_at(slot(2, 9, 0), 0, tz("America/New_York"), now).unwrap_err();
        assert!(matches!(err, ScheduleError::PastSchedule { .. }));
    }

    #[test]
    fn instant_equal_to_now_is_accepted() {
        // Rejection is strictly-before: scheduling the current minute is fine.
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap();
        let at = resolve_scheduled_at(slot(2, 9, 0), 0, tz("America/New_York"), now).unwrap();
        assert_eq!(at, now);
    }

    #[test]
    fn out_of_range_slots_are_rejected() {
        let now = now_before_spring_forward();
        let utc = tz("UTC");
        for bad in [slot(7, 0, 0), slot(0, 24, 0), slot(0, 0, 60)] {
            let err = resolve_scheduled_at(bad, 0, utc, now).unwrap_err();
            assert!(matches!(err, ScheduleError::InvalidSlot(_)), "{bad:?}");
        }
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(ScheduleError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn round_trips_through_the_grid() {
        let now = now_before_spring_forward();
        let zones = ["America/New_York", "Australia/Sydney", "Europe/Berlin", "UTC"];
        for zone in zones {
            let z = tz(zone);
            for (day_id, hour, minute, week_offset) in
                [(0u8, 0u8, 0u8, 1i32), (3, 14, 30, 0), (6, 23, 59, 2), (2, 12, 5, 4)]
            {
                let s = slot(day_id, hour, minute);
                let at = resolve_scheduled_at(s, week_offset, z, now).unwrap();
                let cell = to_grid_cell(at, z);
                assert_eq!(
                    (cell.day_id, cell.hour, cell.minute),
                    (day_id, hour, minute),
                    "round-trip failed for {s:?} offset {week_offset} in {zone}"
                );
            }
        }
    }

    #[test]
    fn inverse_reports_the_target_calendar_date() {
        let now = now_before_spring_forward();
        let ny = tz("America/New_York");
        let at = resolve_scheduled_at(slot(5, 10, 15), 1, ny, now).unwrap();
        let cell = to_grid_cell(at, ny);
        // Friday of the following week.
        assert_eq!(cell.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }
}
