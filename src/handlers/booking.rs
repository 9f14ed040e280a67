use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Appointment;
use crate::services::booking::{self, BookingError, BookingRequest};
use crate::services::{availability, notifications};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_id: i64,
    pub service_name: String,
    pub date: String,
    pub time: String,
    pub duration_minutes: i32,
    pub special_requests: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            client_name: a.client_name,
            client_email: a.client_email,
            client_phone: a.client_phone,
            service_id: a.service_id,
            service_name: a.service_name,
            date: a.date.format("%Y-%m-%d").to_string(),
            time: a.start_time.format("%H:%M").to_string(),
            duration_minutes: a.duration_minutes,
            special_requests: a.special_requests,
            status: a.status.as_str().to_string(),
            created_at: a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// GET /api/availability?date=YYYY-MM-DD&service_id=N
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    pub service_id: i64,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", query.date)))?;

    let db = state.db.lock().unwrap();
    let service = queries::get_service(&db, query.service_id)?
        .ok_or_else(|| AppError::Validation(format!("unknown service id: {}", query.service_id)))?;
    if service.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "service has no bookable duration".to_string(),
        ));
    }

    let slots = availability::available_slots(&db, date, &service)?;
    Ok(Json(
        slots
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect(),
    ))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct BookingSubmission {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_id: i64,
    pub date: String,
    pub time: String,
    pub special_requests: Option<String>,
}

pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BookingSubmission>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let date = NaiveDate::parse_from_str(&body.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", body.date)))?;
    let start_time = NaiveTime::parse_from_str(&body.time, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid time: {}", body.time)))?;

    let request = BookingRequest {
        client_name: body.client_name,
        client_email: body.client_email,
        client_phone: body.client_phone,
        service_id: body.service_id,
        date,
        start_time,
        special_requests: body.special_requests.filter(|s| !s.trim().is_empty()),
    };

    let result = {
        let mut db = state.db.lock().unwrap();
        booking::submit_booking(&mut db, &request)
    };
    let appointment = match result {
        Ok(appointment) => appointment,
        Err(BookingError::SlotTaken) => {
            return Err(AppError::Conflict(BookingError::SlotTaken.to_string()))
        }
        Err(BookingError::Store(e)) => return Err(AppError::Internal(e)),
        Err(e) => return Err(AppError::Validation(e.to_string())),
    };

    // The booking is committed; notification trouble only gets logged.
    let service = {
        let db = state.db.lock().unwrap();
        queries::get_service(&db, appointment.service_id)?
    };
    if let Some(service) = service {
        notifications::send_booking_notifications(
            state.mailer.as_ref(),
            &state.config,
            &appointment,
            &service,
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(appointment.into())))
}
