use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::routing::{get, patch, post};
use axum::Router;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tower::ServiceExt;

use salon::config::AppConfig;
use salon::db;
use salon::db::queries;
use salon::handlers;
use salon::models::{Appointment, AppointmentStatus};
use salon::services::mailer::Mailer;
use salon::state::AppState;

// ── Mock Mailers ──

struct MockMailer {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

struct FailMailer;

#[async_trait]
impl Mailer for FailMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("mail provider unreachable"))
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        staff_token: "test-token".to_string(),
        salon_name: "Elegant Nails".to_string(),
        staff_email: "owner@example.com".to_string(),
        mail_from: "bookings@example.com".to_string(),
        mailgun_domain: String::new(),
        mailgun_api_key: String::new(),
    }
}

fn test_state_with_mailer(mailer: Box<dyn Mailer>) -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        mailer,
    })
}

fn test_state() -> Arc<AppState> {
    test_state_with_mailer(Box::new(MockMailer {
        sent: Arc::new(Mutex::new(vec![])),
    }))
}

fn test_state_with_sent() -> (Arc<AppState>, Arc<Mutex<Vec<(String, String)>>>) {
    let sent = Arc::new(Mutex::new(vec![]));
    let state = test_state_with_mailer(Box::new(MockMailer {
        sent: Arc::clone(&sent),
    }));
    (state, sent)
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::public::index_page))
        .route("/dashboard", get(handlers::public::dashboard_page))
        .route("/health", get(handlers::health::health))
        .route("/api/home", get(handlers::public::get_home))
        .route("/api/services", get(handlers::public::get_services))
        .route("/api/portfolio", get(handlers::public::get_portfolio))
        .route("/api/availability", get(handlers::booking::get_availability))
        .route("/api/bookings", post(handlers::booking::submit_booking))
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .route(
            "/api/dashboard/appointments",
            get(handlers::dashboard::list_appointments),
        )
        .route(
            "/api/dashboard/appointments/:id",
            get(handlers::dashboard::get_appointment),
        )
        .route(
            "/api/dashboard/appointments/:id/status",
            post(handlers::dashboard::update_status),
        )
        .route("/api/dashboard/clients", get(handlers::dashboard::get_clients))
        .route(
            "/api/dashboard/analytics",
            get(handlers::dashboard::get_analytics),
        )
        .route(
            "/api/dashboard/schedule",
            get(handlers::dashboard::get_schedule).put(handlers::dashboard::put_schedule),
        )
        .route(
            "/api/dashboard/services",
            get(handlers::dashboard::list_services).post(handlers::dashboard::create_service),
        )
        .route(
            "/api/dashboard/services/:id",
            patch(handlers::dashboard::update_service),
        )
        .route(
            "/api/dashboard/portfolio",
            post(handlers::dashboard::create_portfolio_item),
        )
        .with_state(state)
}

fn seed_service(state: &Arc<AppState>, name: &str, price_cents: i64, duration: i32) -> i64 {
    let db = state.db.lock().unwrap();
    queries::create_service(&db, name, "", price_cents, duration)
        .unwrap()
        .id
}

#[allow(clippy::too_many_arguments)]
fn insert_appointment(
    state: &Arc<AppState>,
    name: &str,
    email: &str,
    service_id: i64,
    date: &str,
    time: &str,
    duration: i32,
    status: AppointmentStatus,
) -> String {
    let appointment = Appointment {
        id: uuid::Uuid::new_v4().to_string(),
        client_name: name.to_string(),
        client_email: email.to_string(),
        client_phone: "+15551110000".to_string(),
        service_id,
        service_name: String::new(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        start_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
        duration_minutes: duration,
        special_requests: None,
        status,
        created_at: Utc::now().naive_utc(),
    };
    let db = state.db.lock().unwrap();
    queries::create_appointment(&db, &appointment).unwrap();
    appointment.id
}

async fn body_json(res: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn staff_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

fn staff_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn booking_request(service_id: i64, date: &str, time: &str, email: &str) -> Request<Body> {
    let body = serde_json::json!({
        "client_name": "Alice",
        "client_email": email,
        "client_phone": "+15551110000",
        "service_id": service_id,
        "date": date,
        "time": time,
        "special_requests": "French tips please",
    });
    Request::builder()
        .method("POST")
        .uri("/api/bookings")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// 2099-01-05 is a Monday (seeded hours 09:00-17:00), 2099-01-04 a Sunday
// (seeded closed). Far enough out to stay in the future for a while.
const MONDAY: &str = "2099-01-05";
const SUNDAY: &str = "2099-01-04";

// ── Health and Pages ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state());
    let res = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_pages_serve_html() {
    let state = test_state();

    let res = test_app(state.clone())
        .oneshot(get_request("/"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("<!DOCTYPE html>"));
    assert!(text.contains("Book an Appointment"));

    let res = test_app(state)
        .oneshot(get_request("/dashboard"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Public Content ──

#[tokio::test]
async fn test_home_lists_services_and_featured_work() {
    let state = test_state();
    seed_service(&state, "Gel Manicure", 4500, 60);
    {
        let db = state.db.lock().unwrap();
        queries::create_portfolio_item(
            &db,
            "Spring set",
            "portfolio/spring.jpg",
            "",
            Some(salon::models::NailShape::Almond),
            "floral, summer",
            true,
        )
        .unwrap();
        queries::create_portfolio_item(&db, "Plain set", "portfolio/plain.jpg", "", None, "", false)
            .unwrap();
    }

    let res = test_app(state)
        .oneshot(get_request("/api/home"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["services"].as_array().unwrap().len(), 1);
    assert_eq!(json["services"][0]["display_price"], "$45.00");
    // Only the featured item shows on the home page.
    assert_eq!(json["featured"].as_array().unwrap().len(), 1);
    assert_eq!(json["featured"][0]["title"], "Spring set");
    assert_eq!(json["featured"][0]["tags"][0], "floral");
}

#[tokio::test]
async fn test_services_hides_inactive() {
    let state = test_state();
    seed_service(&state, "Gel Manicure", 4500, 60);
    let retired = seed_service(&state, "Acrylic Full Set", 6000, 90);
    {
        let db = state.db.lock().unwrap();
        let mut service = queries::get_service(&db, retired).unwrap().unwrap();
        service.is_active = false;
        queries::update_service(&db, &service).unwrap();
    }

    let res = test_app(state)
        .oneshot(get_request("/api/services"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Gel Manicure");
}

#[tokio::test]
async fn test_portfolio_shape_filter() {
    let state = test_state();
    {
        let db = state.db.lock().unwrap();
        queries::create_portfolio_item(
            &db,
            "Almond art",
            "portfolio/a.jpg",
            "",
            Some(salon::models::NailShape::Almond),
            "",
            false,
        )
        .unwrap();
        queries::create_portfolio_item(
            &db,
            "Square art",
            "portfolio/b.jpg",
            "",
            Some(salon::models::NailShape::Square),
            "",
            false,
        )
        .unwrap();
    }

    let res = test_app(state.clone())
        .oneshot(get_request("/api/portfolio?shape=almond"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Almond art");

    let res = test_app(state)
        .oneshot(get_request("/api/portfolio?shape=round"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Availability ──

#[tokio::test]
async fn test_availability_rejects_malformed_input() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(get_request(&format!(
            "/api/availability?date=not-a-date&service_id={service_id}"
        )))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert!(json["error"].as_str().unwrap().contains("invalid date"));

    let res = test_app(state)
        .oneshot(get_request(&format!(
            "/api/availability?date={MONDAY}&service_id=999"
        )))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_open_monday() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state)
        .oneshot(get_request(&format!(
            "/api/availability?date={MONDAY}&service_id={service_id}"
        )))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    let slots = json.as_array().unwrap();
    assert_eq!(slots.len(), 15);
    assert_eq!(slots.first().unwrap(), "09:00");
    assert_eq!(slots.last().unwrap(), "16:00");
}

#[tokio::test]
async fn test_availability_closed_sunday_is_empty_array() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state)
        .oneshot(get_request(&format!(
            "/api/availability?date={SUNDAY}&service_id={service_id}"
        )))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_availability_excludes_booked_windows() {
    let state = test_state();
    let service_id = seed_service(&state, "Polish Change", 2000, 30);
    insert_appointment(
        &state,
        "Bea",
        "bea@example.com",
        service_id,
        MONDAY,
        "10:00",
        60,
        AppointmentStatus::Confirmed,
    );

    let res = test_app(state)
        .oneshot(get_request(&format!(
            "/api/availability?date={MONDAY}&service_id={service_id}"
        )))
        .await
        .unwrap();
    let json = body_json(res).await;
    let slots: Vec<&str> = json.as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert!(slots.contains(&"09:30"));
    assert!(!slots.contains(&"10:00"));
    assert!(!slots.contains(&"10:30"));
    assert!(slots.contains(&"11:00"));
}

// ── Booking Submission ──

#[tokio::test]
async fn test_booking_success_creates_pending_and_notifies() {
    let (state, sent) = test_state_with_sent();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, MONDAY, "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["status"], "pending");
    assert_eq!(json["duration_minutes"], 60);
    assert_eq!(json["service_name"], "Gel Manicure");

    // Exactly one row was created.
    {
        let db = state.db.lock().unwrap();
        let count: i64 = db
            .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    // Client confirmation plus staff alert.
    let messages = sent.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0, "alice@example.com");
    assert_eq!(messages[1].0, "owner@example.com");
}

#[tokio::test]
async fn test_booking_past_date_rejected_without_record() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, "2020-01-06", "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert!(json["error"].as_str().unwrap().contains("in the past"));

    let db = state.db.lock().unwrap();
    let count: i64 = db
        .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_booking_conflicting_slot_rejected() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, MONDAY, "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Second submission for an overlapping window loses.
    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, MONDAY, "10:30", "bob@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let json = body_json(res).await;
    assert!(json["error"].as_str().unwrap().contains("no longer available"));

    let db = state.db.lock().unwrap();
    let count: i64 = db
        .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_booking_invalid_payloads_rejected() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, "01/05/2099", "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, MONDAY, "10am", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state)
        .oneshot(booking_request(999, MONDAY, "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_survives_notification_failure() {
    let state = test_state_with_mailer(Box::new(FailMailer));
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(booking_request(service_id, MONDAY, "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let db = state.db.lock().unwrap();
    let status: String = db
        .query_row("SELECT status FROM appointments", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, "pending");
}

// ── Staff Auth ──

#[tokio::test]
async fn test_dashboard_requires_auth() {
    let app = test_app(test_state());
    let res = app
        .oneshot(get_request("/api/dashboard/summary"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_rejects_wrong_token() {
    let app = test_app(test_state());
    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/summary")
                .header("Authorization", "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

// ── Staff Dashboard ──

#[tokio::test]
async fn test_summary_counts() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let tomorrow = (Utc::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();

    insert_appointment(&state, "A", "a@example.com", service_id, &today, "10:00", 60, AppointmentStatus::Pending);
    insert_appointment(&state, "B", "b@example.com", service_id, &tomorrow, "11:00", 60, AppointmentStatus::Confirmed);
    insert_appointment(&state, "C", "c@example.com", service_id, &tomorrow, "13:00", 60, AppointmentStatus::Cancelled);

    let res = test_app(state)
        .oneshot(staff_get("/api/dashboard/summary"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["pending_count"], 1);
    assert_eq!(json["confirmed_count"], 1);
    assert_eq!(json["total_count"], 3);
    assert_eq!(json["today"].as_array().unwrap().len(), 1);
    // The cancelled appointment does not show in tomorrow's schedule.
    assert_eq!(json["tomorrow"].as_array().unwrap().len(), 1);
    assert_eq!(json["recent"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_status_transition() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);
    let id = insert_appointment(
        &state,
        "Alice",
        "alice@example.com",
        service_id,
        MONDAY,
        "10:00",
        60,
        AppointmentStatus::Pending,
    );

    let res = test_app(state.clone())
        .oneshot(staff_json(
            "POST",
            &format!("/api/dashboard/appointments/{id}/status"),
            serde_json::json!({"status": "confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "confirmed");

    let res = test_app(state)
        .oneshot(staff_get(&format!("/api/dashboard/appointments/{id}")))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["status"], "confirmed");
}

#[tokio::test]
async fn test_status_transition_unknown_value_is_noop() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);
    let id = insert_appointment(
        &state,
        "Alice",
        "alice@example.com",
        service_id,
        MONDAY,
        "10:00",
        60,
        AppointmentStatus::Pending,
    );

    let res = test_app(state.clone())
        .oneshot(staff_json(
            "POST",
            &format!("/api/dashboard/appointments/{id}/status"),
            serde_json::json!({"status": "rescheduled"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn test_status_transition_missing_appointment() {
    let state = test_state();
    let res = test_app(state)
        .oneshot(staff_json(
            "POST",
            "/api/dashboard/appointments/nonexistent/status",
            serde_json::json!({"status": "confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_appointment_list_filters_and_pagination() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    for i in 0..12 {
        let status = if i % 2 == 0 {
            AppointmentStatus::Pending
        } else {
            AppointmentStatus::Confirmed
        };
        insert_appointment(
            &state,
            &format!("Client {i}"),
            &format!("client{i}@example.com"),
            service_id,
            &format!("2099-02-{:02}", i + 1),
            "10:00",
            60,
            status,
        );
    }

    // Page 1 holds ten, page 2 the remaining two.
    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/appointments"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["appointments"].as_array().unwrap().len(), 10);
    assert_eq!(json["total"], 12);
    assert_eq!(json["total_pages"], 2);

    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/appointments?page=2"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["appointments"].as_array().unwrap().len(), 2);

    // Out-of-range pages clamp instead of erroring.
    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/appointments?page=99"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["page"], 2);

    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/appointments?status=pending"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["total"], 6);

    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/appointments?search=Client%203"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["appointments"][0]["client_name"], "Client 3");

    let res = test_app(state)
        .oneshot(staff_get("/api/dashboard/appointments?status=bogus"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clients_deduped_and_searchable() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);
    insert_appointment(&state, "Alice", "alice@example.com", service_id, "2099-02-01", "10:00", 60, AppointmentStatus::Completed);
    insert_appointment(&state, "Alice", "alice@example.com", service_id, "2099-03-01", "10:00", 60, AppointmentStatus::Pending);
    insert_appointment(&state, "Bob", "bob@example.com", service_id, "2099-02-02", "11:00", 60, AppointmentStatus::Pending);

    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/clients"))
        .await
        .unwrap();
    let json = body_json(res).await;
    let clients = json.as_array().unwrap();
    assert_eq!(clients.len(), 2);

    let alice = clients
        .iter()
        .find(|c| c["email"] == "alice@example.com")
        .unwrap();
    assert_eq!(alice["total_bookings"], 2);
    assert_eq!(alice["last_visit"], "2099-03-01");

    let res = test_app(state)
        .oneshot(staff_get("/api/dashboard/clients?search=bob"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Bob");
}

#[tokio::test]
async fn test_analytics_revenue_by_service() {
    let state = test_state();
    let manicure = seed_service(&state, "Gel Manicure", 4500, 60);
    let pedicure = seed_service(&state, "Spa Pedicure", 5500, 60);
    insert_appointment(&state, "A", "a@example.com", manicure, "2099-02-01", "10:00", 60, AppointmentStatus::Completed);
    insert_appointment(&state, "B", "b@example.com", manicure, "2099-02-02", "10:00", 60, AppointmentStatus::Pending);
    insert_appointment(&state, "C", "c@example.com", pedicure, "2099-02-03", "10:00", 60, AppointmentStatus::Cancelled);

    let res = test_app(state)
        .oneshot(staff_get("/api/dashboard/analytics"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["total_appointments"], 3);
    assert_eq!(json["total_revenue_cents"], 14500);
    assert_eq!(json["booked_last_30_days"], 3);

    let by_service = json["by_service"].as_array().unwrap();
    let manicure_row = by_service
        .iter()
        .find(|s| s["service"] == "Gel Manicure")
        .unwrap();
    assert_eq!(manicure_row["count"], 2);
    assert_eq!(manicure_row["revenue_cents"], 9000);
}

// ── Schedule Management ──

#[tokio::test]
async fn test_schedule_roundtrip_and_closing_a_day() {
    let state = test_state();
    let service_id = seed_service(&state, "Gel Manicure", 4500, 60);

    let res = test_app(state.clone())
        .oneshot(staff_get("/api/dashboard/schedule"))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 7);
    assert_eq!(json[0]["day"], "Monday");
    assert_eq!(json[0]["start_time"], "09:00");

    // Close Mondays; availability dries up.
    let res = test_app(state.clone())
        .oneshot(staff_json(
            "PUT",
            "/api/dashboard/schedule",
            serde_json::json!({
                "day_of_week": 0,
                "start_time": "09:00",
                "end_time": "17:00",
                "is_working": false,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(get_request(&format!(
            "/api/availability?date={MONDAY}&service_id={service_id}"
        )))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_schedule_update_validation() {
    let state = test_state();

    let res = test_app(state.clone())
        .oneshot(staff_json(
            "PUT",
            "/api/dashboard/schedule",
            serde_json::json!({
                "day_of_week": 7,
                "start_time": "09:00",
                "end_time": "17:00",
                "is_working": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state)
        .oneshot(staff_json(
            "PUT",
            "/api/dashboard/schedule",
            serde_json::json!({
                "day_of_week": 0,
                "start_time": "17:00",
                "end_time": "09:00",
                "is_working": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Service Management ──

#[tokio::test]
async fn test_service_create_and_retire() {
    let state = test_state();

    let res = test_app(state.clone())
        .oneshot(staff_json(
            "POST",
            "/api/dashboard/services",
            serde_json::json!({
                "name": "Nail Art Add-on",
                "description": "Hand-painted designs",
                "price_cents": 1500,
                "duration_minutes": 30,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    let service_id = json["id"].as_i64().unwrap();
    assert_eq!(json["is_active"], true);

    // Retire it; booking attempts are then turned away.
    let res = test_app(state.clone())
        .oneshot(staff_json(
            "PATCH",
            &format!("/api/dashboard/services/{service_id}"),
            serde_json::json!({"is_active": false}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(booking_request(service_id, MONDAY, "10:00", "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert!(json["error"].as_str().unwrap().contains("no longer offered"));
}

#[tokio::test]
async fn test_service_create_validation() {
    let state = test_state();

    let res = test_app(state)
        .oneshot(staff_json(
            "POST",
            "/api/dashboard/services",
            serde_json::json!({
                "name": "  ",
                "price_cents": 1500,
                "duration_minutes": 30,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
