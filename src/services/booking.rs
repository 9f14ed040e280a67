use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::db::queries;
use crate::models::{Appointment, AppointmentStatus};
use crate::services::availability;

#[derive(Debug)]
pub enum BookingError {
    MissingField(&'static str),
    PastDate,
    UnknownService,
    InactiveService,
    InvalidDuration,
    InvalidTime,
    SlotTaken,
    Store(anyhow::Error),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::MissingField(field) => {
                write!(f, "Please fill in your {field}.")
            }
            BookingError::PastDate => {
                write!(f, "You cannot book an appointment in the past.")
            }
            BookingError::UnknownService => {
                write!(f, "That service does not exist.")
            }
            BookingError::InactiveService => {
                write!(f, "That service is no longer offered.")
            }
            BookingError::InvalidDuration => {
                write!(f, "That service has no bookable duration.")
            }
            BookingError::InvalidTime => {
                write!(f, "Appointments must end by midnight.")
            }
            BookingError::SlotTaken => {
                write!(
                    f,
                    "Sorry, this time slot is no longer available. Please choose a different time."
                )
            }
            BookingError::Store(e) => write!(f, "storage error: {e}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub special_requests: Option<String>,
}

fn validate_client_fields(req: &BookingRequest) -> Result<(), BookingError> {
    if req.client_name.trim().is_empty() {
        return Err(BookingError::MissingField("name"));
    }
    if req.client_email.trim().is_empty() || !req.client_email.contains('@') {
        return Err(BookingError::MissingField("email address"));
    }
    if req.client_phone.trim().is_empty() {
        return Err(BookingError::MissingField("phone number"));
    }
    Ok(())
}

/// Validates a submission against business rules and current bookings, then
/// persists it as a pending appointment with the service duration copied in.
///
/// The conflict re-check and the insert run inside one IMMEDIATE
/// transaction, so two submissions racing for the same slot serialize and
/// the loser sees the winner's row. Past dates are rejected; a same-day
/// booking at an already-elapsed time is still accepted, as the original
/// intake form only checked the date.
pub fn submit_booking(
    conn: &mut Connection,
    req: &BookingRequest,
) -> Result<Appointment, BookingError> {
    validate_client_fields(req)?;

    let today = Utc::now().date_naive();
    if req.date < today {
        return Err(BookingError::PastDate);
    }

    let service = queries::get_service(conn, req.service_id)
        .map_err(BookingError::Store)?
        .ok_or(BookingError::UnknownService)?;
    if !service.is_active {
        return Err(BookingError::InactiveService);
    }
    if service.duration_minutes <= 0 {
        return Err(BookingError::InvalidDuration);
    }

    let end = availability::slot_end(req.start_time, service.duration_minutes as i64)
        .ok_or(BookingError::InvalidTime)?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| BookingError::Store(e.into()))?;

    let booked = queries::get_active_appointments_on(&tx, req.date).map_err(BookingError::Store)?;
    let conflict = booked.iter().any(|existing| {
        match availability::slot_end(existing.start_time, existing.duration_minutes as i64) {
            Some(existing_end) => {
                availability::overlaps(req.start_time, end, existing.start_time, existing_end)
            }
            // A stored row that would run past midnight blocks everything
            // from its start onward.
            None => end > existing.start_time,
        }
    });
    if conflict {
        return Err(BookingError::SlotTaken);
    }

    let appointment = Appointment {
        id: Uuid::new_v4().to_string(),
        client_name: req.client_name.trim().to_string(),
        client_email: req.client_email.trim().to_string(),
        client_phone: req.client_phone.trim().to_string(),
        service_id: service.id,
        service_name: service.name.clone(),
        date: req.date,
        start_time: req.start_time,
        duration_minutes: service.duration_minutes,
        special_requests: req.special_requests.clone(),
        status: AppointmentStatus::Pending,
        created_at: Utc::now().naive_utc(),
    };
    queries::create_appointment(&tx, &appointment).map_err(BookingError::Store)?;
    tx.commit().map_err(|e| BookingError::Store(e.into()))?;

    tracing::info!(
        appointment = %appointment.id,
        service = %appointment.service_name,
        date = %appointment.date,
        time = %appointment.start_time.format("%H:%M"),
        "booked new appointment"
    );
    Ok(appointment)
}
