use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::working_hours::day_name;
use crate::models::{AppointmentStatus, NailShape, WorkingHours};
use crate::state::AppState;

use super::booking::AppointmentResponse;
use super::public::{PortfolioResponse, ServiceResponse};

const PAGE_SIZE: i64 = 10;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/dashboard/summary
#[derive(Serialize)]
pub struct SummaryResponse {
    pub today: Vec<AppointmentResponse>,
    pub tomorrow: Vec<AppointmentResponse>,
    pub pending_count: i64,
    pub confirmed_count: i64,
    pub completed_count: i64,
    pub total_count: i64,
    pub recent: Vec<AppointmentResponse>,
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SummaryResponse>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let today = Utc::now().date_naive();
    let tomorrow = today + Duration::days(1);
    let week_ago = Utc::now().naive_utc() - Duration::days(7);

    let db = state.db.lock().unwrap();
    let todays = queries::get_active_appointments_on(&db, today)?;
    let tomorrows = queries::get_active_appointments_on(&db, tomorrow)?;
    let counts = queries::get_status_counts(&db)?;
    let recent = queries::get_recent_appointments(&db, week_ago, 10)?;

    Ok(Json(SummaryResponse {
        today: todays.into_iter().map(Into::into).collect(),
        tomorrow: tomorrows.into_iter().map(Into::into).collect(),
        pending_count: counts.pending,
        confirmed_count: counts.confirmed,
        completed_count: counts.completed,
        total_count: counts.total,
        recent: recent.into_iter().map(Into::into).collect(),
    }))
}

// GET /api/dashboard/appointments
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

#[derive(Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentResponse>,
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<AppointmentListResponse>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            AppointmentStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {s}")))?,
        ),
        None => None,
    };
    let date = match query.date.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("invalid date: {s}")))?,
        ),
        None => None,
    };
    let filter = queries::AppointmentFilter {
        status,
        date,
        search: query.search.filter(|s| !s.is_empty()),
    };

    let db = state.db.lock().unwrap();
    let total = queries::count_appointments(&db, &filter)?;
    let total_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
    // Out-of-range pages clamp to the nearest valid one.
    let page = query.page.unwrap_or(1).clamp(1, total_pages);
    let appointments =
        queries::search_appointments(&db, &filter, PAGE_SIZE, (page - 1) * PAGE_SIZE)?;

    Ok(Json(AppointmentListResponse {
        appointments: appointments.into_iter().map(Into::into).collect(),
        page,
        total_pages,
        total,
    }))
}

// GET /api/dashboard/appointments/:id
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let db = state.db.lock().unwrap();
    let appointment = queries::get_appointment(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;
    Ok(Json(appointment.into()))
}

// POST /api/dashboard/appointments/:id/status
#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<AppointmentResponse>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let db = state.db.lock().unwrap();
    let appointment = queries::get_appointment(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

    match AppointmentStatus::parse(&body.status) {
        Some(status) => {
            queries::update_appointment_status(&db, &id, status)?;
            let updated = queries::get_appointment(&db, &id)?
                .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;
            Ok(Json(updated.into()))
        }
        None => {
            // Unrecognized values are ignored rather than failing the form.
            tracing::warn!(
                appointment = %id,
                status = %body.status,
                "ignoring unrecognized appointment status"
            );
            Ok(Json(appointment.into()))
        }
    }
}

// GET /api/dashboard/clients
#[derive(Deserialize)]
pub struct ClientsQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct ClientResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub total_bookings: i64,
    pub last_visit: Option<String>,
}

pub async fn get_clients(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ClientsQuery>,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let db = state.db.lock().unwrap();
    let clients = queries::get_clients(&db, query.search.as_deref().filter(|s| !s.is_empty()))?;

    Ok(Json(
        clients
            .into_iter()
            .map(|c| ClientResponse {
                name: c.name,
                email: c.email,
                phone: c.phone,
                total_bookings: c.total_bookings,
                last_visit: c.last_visit,
            })
            .collect(),
    ))
}

// GET /api/dashboard/analytics
#[derive(Serialize)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

#[derive(Serialize)]
pub struct ServiceRevenueResponse {
    pub service: String,
    pub count: i64,
    pub revenue_cents: i64,
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub total_appointments: i64,
    pub total_revenue_cents: i64,
    pub by_status: Vec<StatusCountResponse>,
    pub by_service: Vec<ServiceRevenueResponse>,
    pub booked_last_30_days: i64,
}

pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsResponse>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let cutoff = Utc::now().naive_utc() - Duration::days(30);
    let db = state.db.lock().unwrap();
    let summary = queries::get_analytics(&db, cutoff)?;

    Ok(Json(AnalyticsResponse {
        total_appointments: summary.total_appointments,
        total_revenue_cents: summary.total_revenue_cents,
        by_status: summary
            .by_status
            .into_iter()
            .map(|s| StatusCountResponse {
                status: s.status,
                count: s.count,
            })
            .collect(),
        by_service: summary
            .by_service
            .into_iter()
            .map(|s| ServiceRevenueResponse {
                service: s.service,
                count: s.count,
                revenue_cents: s.revenue_cents,
            })
            .collect(),
        booked_last_30_days: summary.booked_last_30_days,
    }))
}

// GET /api/dashboard/schedule
#[derive(Serialize)]
pub struct WorkingHoursResponse {
    pub day_of_week: u8,
    pub day: &'static str,
    pub start_time: String,
    pub end_time: String,
    pub is_working: bool,
}

impl From<WorkingHours> for WorkingHoursResponse {
    fn from(h: WorkingHours) -> Self {
        Self {
            day_of_week: h.day_of_week,
            day: day_name(h.day_of_week),
            start_time: h.start_time.format("%H:%M").to_string(),
            end_time: h.end_time.format("%H:%M").to_string(),
            is_working: h.is_working,
        }
    }
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<WorkingHoursResponse>>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let db = state.db.lock().unwrap();
    let schedule = queries::get_weekly_schedule(&db)?;
    Ok(Json(schedule.into_iter().map(Into::into).collect()))
}

// PUT /api/dashboard/schedule
#[derive(Deserialize)]
pub struct ScheduleUpdate {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_working: bool,
}

pub async fn put_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ScheduleUpdate>,
) -> Result<Json<Vec<WorkingHoursResponse>>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    if body.day_of_week > 6 {
        return Err(AppError::Validation(
            "day_of_week must be between 0 (Monday) and 6 (Sunday)".to_string(),
        ));
    }
    let start_time = NaiveTime::parse_from_str(&body.start_time, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid start_time: {}", body.start_time)))?;
    let end_time = NaiveTime::parse_from_str(&body.end_time, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid end_time: {}", body.end_time)))?;
    if end_time < start_time {
        return Err(AppError::Validation(
            "end_time is before start_time".to_string(),
        ));
    }

    let db = state.db.lock().unwrap();
    queries::upsert_working_hours(&db, body.day_of_week, start_time, end_time, body.is_working)?;
    let schedule = queries::get_weekly_schedule(&db)?;
    Ok(Json(schedule.into_iter().map(Into::into).collect()))
}

// GET /api/dashboard/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let db = state.db.lock().unwrap();
    let services = queries::get_all_services(&db)?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

// POST /api/dashboard/services
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("service name is required".to_string()));
    }
    if body.price_cents < 0 {
        return Err(AppError::Validation(
            "price_cents must not be negative".to_string(),
        ));
    }
    if body.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "duration_minutes must be positive".to_string(),
        ));
    }

    let db = state.db.lock().unwrap();
    let service = queries::create_service(
        &db,
        body.name.trim(),
        body.description.as_deref().unwrap_or(""),
        body.price_cents,
        body.duration_minutes,
    )?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

// PATCH /api/dashboard/services/:id
#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    let db = state.db.lock().unwrap();
    let mut service = queries::get_service(&db, id)?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("service name is required".to_string()));
        }
        service.name = name.trim().to_string();
    }
    if let Some(description) = body.description {
        service.description = description;
    }
    if let Some(price_cents) = body.price_cents {
        if price_cents < 0 {
            return Err(AppError::Validation(
                "price_cents must not be negative".to_string(),
            ));
        }
        service.price_cents = price_cents;
    }
    if let Some(duration_minutes) = body.duration_minutes {
        if duration_minutes <= 0 {
            return Err(AppError::Validation(
                "duration_minutes must be positive".to_string(),
            ));
        }
        service.duration_minutes = duration_minutes;
    }
    if let Some(is_active) = body.is_active {
        service.is_active = is_active;
    }

    queries::update_service(&db, &service)?;
    Ok(Json(service.into()))
}

// POST /api/dashboard/portfolio
#[derive(Deserialize)]
pub struct CreatePortfolioRequest {
    pub title: String,
    pub image_path: String,
    pub description: Option<String>,
    pub nail_shape: Option<String>,
    pub tags: Option<String>,
    pub featured: Option<bool>,
}

pub async fn create_portfolio_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePortfolioRequest>,
) -> Result<(StatusCode, Json<PortfolioResponse>), AppError> {
    check_auth(&headers, &state.config.staff_token)?;

    if body.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if body.image_path.trim().is_empty() {
        return Err(AppError::Validation("image_path is required".to_string()));
    }
    let nail_shape = match body.nail_shape.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            NailShape::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown nail shape: {s}")))?,
        ),
        None => None,
    };

    let db = state.db.lock().unwrap();
    let item = queries::create_portfolio_item(
        &db,
        body.title.trim(),
        body.image_path.trim(),
        body.description.as_deref().unwrap_or(""),
        nail_shape,
        body.tags.as_deref().unwrap_or(""),
        body.featured.unwrap_or(false),
    )?;
    Ok((StatusCode::CREATED, Json(item.into())))
}
