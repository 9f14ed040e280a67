use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::Service;

/// Candidate start times are generated on a fixed half-hour grid.
pub const SLOT_STEP_MINUTES: i64 = 30;

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// share an instant iff a starts before b ends and a ends after b starts.
/// Back-to-back appointments do not overlap.
pub fn overlaps(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// End of an interval starting at `start`, or `None` if it would run past
/// midnight. Appointments never wrap into the next day.
pub fn slot_end(start: NaiveTime, duration_minutes: i64) -> Option<NaiveTime> {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(duration_minutes));
    (wrapped == 0).then_some(end)
}

/// All bookable start times on `date` for `service`, ascending.
///
/// Empty when the salon is closed that weekday. A candidate survives only
/// if the full service fits before closing and it overlaps no pending or
/// confirmed appointment.
pub fn available_slots(
    conn: &Connection,
    date: NaiveDate,
    service: &Service,
) -> anyhow::Result<Vec<NaiveTime>> {
    let day_of_week = date.weekday().num_days_from_monday() as u8;

    let mut rows = queries::get_working_hours_for_day(conn, day_of_week)?;
    if rows.len() > 1 {
        tracing::warn!(
            day_of_week,
            rows = rows.len(),
            "multiple working-hours rows for one weekday, using the oldest"
        );
    }
    let hours = match rows.drain(..).next() {
        Some(h) => h,
        None => return Ok(vec![]),
    };
    if !hours.is_working {
        return Ok(vec![]);
    }

    let booked = queries::get_active_appointments_on(conn, date)?;

    let mut slots = vec![];
    let mut candidate = hours.start_time;
    while candidate < hours.end_time {
        if let Some(end) = slot_end(candidate, service.duration_minutes as i64) {
            if end <= hours.end_time {
                let taken = booked.iter().any(|a| {
                    // A stored row that would run past midnight is capped at
                    // closing rather than wrapped.
                    let booked_end = slot_end(a.start_time, a.duration_minutes as i64)
                        .unwrap_or(hours.end_time);
                    overlaps(candidate, end, a.start_time, booked_end)
                });
                if !taken {
                    slots.push(candidate);
                }
            }
        }

        match slot_end(candidate, SLOT_STEP_MINUTES) {
            Some(next) => candidate = next,
            None => break,
        }
    }

    Ok(slots)
}
