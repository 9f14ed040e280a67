use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection};

use crate::models::{
    Appointment, AppointmentStatus, NailShape, PortfolioItem, Service, WorkingHours,
};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ── Services ──

pub fn create_service(
    conn: &Connection,
    name: &str,
    description: &str,
    price_cents: i64,
    duration_minutes: i32,
) -> anyhow::Result<Service> {
    conn.execute(
        "INSERT INTO services (name, description, price_cents, duration_minutes, is_active)
         VALUES (?1, ?2, ?3, ?4, 1)",
        params![name, description, price_cents, duration_minutes],
    )?;
    Ok(Service {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        description: description.to_string(),
        price_cents,
        duration_minutes,
        is_active: true,
    })
}

pub fn get_service(conn: &Connection, id: i64) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, name, description, price_cents, duration_minutes, is_active
         FROM services WHERE id = ?1",
        params![id],
        |row| Ok(parse_service_row(row)),
    );

    match result {
        Ok(service) => Ok(Some(service?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_active_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, price_cents, duration_minutes, is_active
         FROM services WHERE is_active = 1 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_service_row(row)))?;

    let mut services = vec![];
    for row in rows {
        services.push(row??);
    }
    Ok(services)
}

pub fn get_all_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, price_cents, duration_minutes, is_active
         FROM services ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_service_row(row)))?;

    let mut services = vec![];
    for row in rows {
        services.push(row??);
    }
    Ok(services)
}

pub fn update_service(conn: &Connection, service: &Service) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE services SET name = ?1, description = ?2, price_cents = ?3,
         duration_minutes = ?4, is_active = ?5 WHERE id = ?6",
        params![
            service.name,
            service.description,
            service.price_cents,
            service.duration_minutes,
            service.is_active as i32,
            service.id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_service_row(row: &rusqlite::Row) -> anyhow::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price_cents: row.get(3)?,
        duration_minutes: row.get(4)?,
        is_active: row.get::<_, i32>(5)? != 0,
    })
}

// ── Working Hours ──

pub fn get_working_hours_for_day(
    conn: &Connection,
    day_of_week: u8,
) -> anyhow::Result<Vec<WorkingHours>> {
    let mut stmt = conn.prepare(
        "SELECT id, day_of_week, start_time, end_time, is_working
         FROM working_hours WHERE day_of_week = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![day_of_week], |row| Ok(parse_working_hours_row(row)))?;

    let mut hours = vec![];
    for row in rows {
        hours.push(row??);
    }
    Ok(hours)
}

pub fn get_weekly_schedule(conn: &Connection) -> anyhow::Result<Vec<WorkingHours>> {
    let mut stmt = conn.prepare(
        "SELECT id, day_of_week, start_time, end_time, is_working
         FROM working_hours ORDER BY day_of_week ASC, id ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_working_hours_row(row)))?;

    let mut schedule = vec![];
    for row in rows {
        schedule.push(row??);
    }
    Ok(schedule)
}

/// Updates the oldest row for the weekday, or inserts one if the day has
/// no row yet. Duplicate rows beyond the oldest are left untouched; the
/// availability calculator reports them.
pub fn upsert_working_hours(
    conn: &Connection,
    day_of_week: u8,
    start_time: NaiveTime,
    end_time: NaiveTime,
    is_working: bool,
) -> anyhow::Result<()> {
    let start_s = start_time.format(TIME_FMT).to_string();
    let end_s = end_time.format(TIME_FMT).to_string();

    let updated = conn.execute(
        "UPDATE working_hours SET start_time = ?2, end_time = ?3, is_working = ?4
         WHERE id = (SELECT MIN(id) FROM working_hours WHERE day_of_week = ?1)",
        params![day_of_week, start_s, end_s, is_working as i32],
    )?;
    if updated == 0 {
        conn.execute(
            "INSERT INTO working_hours (day_of_week, start_time, end_time, is_working)
             VALUES (?1, ?2, ?3, ?4)",
            params![day_of_week, start_s, end_s, is_working as i32],
        )?;
    }
    Ok(())
}

fn parse_working_hours_row(row: &rusqlite::Row) -> anyhow::Result<WorkingHours> {
    let start_str: String = row.get(2)?;
    let end_str: String = row.get(3)?;
    Ok(WorkingHours {
        id: row.get(0)?,
        day_of_week: row.get::<_, i64>(1)? as u8,
        start_time: NaiveTime::parse_from_str(&start_str, TIME_FMT)?,
        end_time: NaiveTime::parse_from_str(&end_str, TIME_FMT)?,
        is_working: row.get::<_, i32>(4)? != 0,
    })
}

// ── Appointments ──

const APPOINTMENT_COLUMNS: &str =
    "a.id, a.client_name, a.client_email, a.client_phone, a.service_id, s.name,
     a.appointment_date, a.start_time, a.duration_minutes, a.special_requests,
     a.status, a.created_at";

pub fn create_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, client_name, client_email, client_phone, service_id,
         appointment_date, start_time, duration_minutes, special_requests, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appointment.id,
            appointment.client_name,
            appointment.client_email,
            appointment.client_phone,
            appointment.service_id,
            appointment.date.format(DATE_FMT).to_string(),
            appointment.start_time.format(TIME_FMT).to_string(),
            appointment.duration_minutes,
            appointment.special_requests,
            appointment.status.as_str(),
            appointment.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments a
         JOIN services s ON s.id = a.service_id WHERE a.id = ?1"
    );
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_appointment_row(row)));

    match result {
        Ok(appointment) => Ok(Some(appointment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Appointments that hold a slot on the date: pending or confirmed only.
pub fn get_active_appointments_on(
    conn: &Connection,
    date: NaiveDate,
) -> anyhow::Result<Vec<Appointment>> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments a
         JOIN services s ON s.id = a.service_id
         WHERE a.appointment_date = ?1 AND a.status IN ('pending', 'confirmed')
         ORDER BY a.start_time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let date_s = date.format(DATE_FMT).to_string();
    let rows = stmt.query_map(params![date_s], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
}

fn filter_clauses(
    filter: &AppointmentFilter,
) -> (String, Vec<Box<dyn rusqlite::types::ToSql>>) {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = filter.status {
        clauses.push("a.status = ?".to_string());
        params_vec.push(Box::new(status.as_str().to_string()));
    }
    if let Some(date) = filter.date {
        clauses.push("a.appointment_date = ?".to_string());
        params_vec.push(Box::new(date.format(DATE_FMT).to_string()));
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{search}%");
        clauses.push(
            "(a.client_name LIKE ? OR a.client_email LIKE ? OR a.client_phone LIKE ? OR s.name LIKE ?)"
                .to_string(),
        );
        for _ in 0..4 {
            params_vec.push(Box::new(pattern.clone()));
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (where_sql, params_vec)
}

pub fn search_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Appointment>> {
    let (where_sql, mut params_vec) = filter_clauses(filter);
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments a
         JOIN services s ON s.id = a.service_id{where_sql}
         ORDER BY a.appointment_date DESC, a.start_time DESC LIMIT ? OFFSET ?"
    );
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn count_appointments(conn: &Connection, filter: &AppointmentFilter) -> anyhow::Result<i64> {
    let (where_sql, params_vec) = filter_clauses(filter);
    let sql = format!(
        "SELECT COUNT(*) FROM appointments a JOIN services s ON s.id = a.service_id{where_sql}"
    );
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn get_recent_appointments(
    conn: &Connection,
    since: NaiveDateTime,
    limit: i64,
) -> anyhow::Result<Vec<Appointment>> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments a
         JOIN services s ON s.id = a.service_id
         WHERE a.created_at >= ?1 ORDER BY a.created_at DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let since_s = since.format(DATETIME_FMT).to_string();
    let rows = stmt.query_map(params![since_s, limit], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let date_str: String = row.get(6)?;
    let time_str: String = row.get(7)?;
    let status_str: String = row.get(10)?;
    let created_str: String = row.get(11)?;

    Ok(Appointment {
        id: row.get(0)?,
        client_name: row.get(1)?,
        client_email: row.get(2)?,
        client_phone: row.get(3)?,
        service_id: row.get(4)?,
        service_name: row.get(5)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FMT)?,
        start_time: NaiveTime::parse_from_str(&time_str, TIME_FMT)?,
        duration_minutes: row.get(8)?,
        special_requests: row.get(9)?,
        status: AppointmentStatus::parse(&status_str)
            .ok_or_else(|| anyhow::anyhow!("unknown appointment status: {status_str}"))?,
        created_at: NaiveDateTime::parse_from_str(&created_str, DATETIME_FMT)?,
    })
}

// ── Dashboard Stats ──

pub struct StatusCounts {
    pub pending: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub total: i64,
}

pub fn get_status_counts(conn: &Connection) -> anyhow::Result<StatusCounts> {
    let count_for = |status: &str| -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM appointments WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )
        .unwrap_or(0)
    };

    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(StatusCounts {
        pending: count_for("pending"),
        confirmed: count_for("confirmed"),
        completed: count_for("completed"),
        cancelled: count_for("cancelled"),
        total,
    })
}

// ── Clients ──

pub struct ClientSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub total_bookings: i64,
    pub last_visit: Option<String>,
}

pub fn get_clients(
    conn: &Connection,
    search: Option<&str>,
) -> anyhow::Result<Vec<ClientSummary>> {
    let (where_sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match search {
        Some(q) => {
            let pattern = format!("%{q}%");
            (
                " WHERE client_name LIKE ?1 OR client_email LIKE ?1 OR client_phone LIKE ?1"
                    .to_string(),
                vec![Box::new(pattern) as Box<dyn rusqlite::types::ToSql>],
            )
        }
        None => (String::new(), vec![]),
    };

    let sql = format!(
        "SELECT client_name, client_email, client_phone, COUNT(*), MAX(appointment_date)
         FROM appointments{where_sql}
         GROUP BY client_name, client_email, client_phone
         ORDER BY MAX(appointment_date) DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok(ClientSummary {
            name: row.get(0)?,
            email: row.get(1)?,
            phone: row.get(2)?,
            total_bookings: row.get(3)?,
            last_visit: row.get(4)?,
        })
    })?;

    let mut clients = vec![];
    for row in rows {
        clients.push(row?);
    }
    Ok(clients)
}

// ── Analytics ──

pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

pub struct ServiceRevenue {
    pub service: String,
    pub count: i64,
    pub revenue_cents: i64,
}

pub struct AnalyticsSummary {
    pub total_appointments: i64,
    pub total_revenue_cents: i64,
    pub by_status: Vec<StatusCount>,
    pub by_service: Vec<ServiceRevenue>,
    pub booked_last_30_days: i64,
}

/// Revenue sums the current service price over every appointment row,
/// matching how the original reported it (all statuses included).
pub fn get_analytics(conn: &Connection, since: NaiveDateTime) -> anyhow::Result<AnalyticsSummary> {
    let total_appointments: i64 =
        conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;

    let total_revenue_cents: i64 = conn.query_row(
        "SELECT COALESCE(SUM(s.price_cents), 0) FROM appointments a
         JOIN services s ON s.id = a.service_id",
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM appointments GROUP BY status ORDER BY status",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StatusCount {
            status: row.get(0)?,
            count: row.get(1)?,
        })
    })?;
    let mut by_status = vec![];
    for row in rows {
        by_status.push(row?);
    }

    let mut stmt = conn.prepare(
        "SELECT s.name, COUNT(*), COALESCE(SUM(s.price_cents), 0)
         FROM appointments a JOIN services s ON s.id = a.service_id
         GROUP BY s.id, s.name ORDER BY COUNT(*) DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ServiceRevenue {
            service: row.get(0)?,
            count: row.get(1)?,
            revenue_cents: row.get(2)?,
        })
    })?;
    let mut by_service = vec![];
    for row in rows {
        by_service.push(row?);
    }

    let since_s = since.format(DATETIME_FMT).to_string();
    let booked_last_30_days: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE created_at >= ?1",
        params![since_s],
        |row| row.get(0),
    )?;

    Ok(AnalyticsSummary {
        total_appointments,
        total_revenue_cents,
        by_status,
        by_service,
        booked_last_30_days,
    })
}

// ── Portfolio ──

pub fn create_portfolio_item(
    conn: &Connection,
    title: &str,
    image_path: &str,
    description: &str,
    nail_shape: Option<NailShape>,
    tags: &str,
    featured: bool,
) -> anyhow::Result<PortfolioItem> {
    conn.execute(
        "INSERT INTO portfolio_items (title, image_path, description, nail_shape, tags, featured)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            title,
            image_path,
            description,
            nail_shape.map(|s| s.as_str()),
            tags,
            featured as i32,
        ],
    )?;
    Ok(PortfolioItem {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        image_path: image_path.to_string(),
        description: description.to_string(),
        nail_shape,
        tags: tags.to_string(),
        featured,
    })
}

pub fn get_portfolio(
    conn: &Connection,
    shape: Option<NailShape>,
    featured_only: bool,
) -> anyhow::Result<Vec<PortfolioItem>> {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(shape) = shape {
        clauses.push("nail_shape = ?".to_string());
        params_vec.push(Box::new(shape.as_str().to_string()));
    }
    if featured_only {
        clauses.push("featured = 1".to_string());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT id, title, image_path, description, nail_shape, tags, featured
         FROM portfolio_items{where_sql} ORDER BY id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_portfolio_row(row)))?;

    let mut items = vec![];
    for row in rows {
        items.push(row??);
    }
    Ok(items)
}

pub fn get_featured_portfolio(conn: &Connection, limit: i64) -> anyhow::Result<Vec<PortfolioItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, image_path, description, nail_shape, tags, featured
         FROM portfolio_items WHERE featured = 1 ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| Ok(parse_portfolio_row(row)))?;

    let mut items = vec![];
    for row in rows {
        items.push(row??);
    }
    Ok(items)
}

fn parse_portfolio_row(row: &rusqlite::Row) -> anyhow::Result<PortfolioItem> {
    let shape_str: Option<String> = row.get(4)?;
    Ok(PortfolioItem {
        id: row.get(0)?,
        title: row.get(1)?,
        image_path: row.get(2)?,
        description: row.get(3)?,
        nail_shape: shape_str.as_deref().and_then(NailShape::parse),
        tags: row.get(5)?,
        featured: row.get::<_, i32>(6)? != 0,
    })
}
