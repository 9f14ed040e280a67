use crate::config::AppConfig;
use crate::models::{Appointment, Service};
use crate::services::mailer::Mailer;

/// Sends the client confirmation and the staff alert for a committed
/// booking. Both sends are best-effort: a delivery failure is logged and
/// never surfaced to the submitter, and the appointment stays persisted.
pub async fn send_booking_notifications(
    mailer: &dyn Mailer,
    config: &AppConfig,
    appointment: &Appointment,
    service: &Service,
) {
    let (subject, body) = client_confirmation(config, appointment, service);
    if let Err(e) = mailer.send(&appointment.client_email, &subject, &body).await {
        tracing::warn!(
            error = %e,
            appointment = %appointment.id,
            "failed to send client confirmation email"
        );
    }

    if config.staff_email.is_empty() {
        tracing::warn!("STAFF_EMAIL not configured, skipping staff alert");
        return;
    }
    let (subject, body) = staff_alert(appointment, service);
    if let Err(e) = mailer.send(&config.staff_email, &subject, &body).await {
        tracing::warn!(
            error = %e,
            appointment = %appointment.id,
            "failed to send staff alert email"
        );
    }
}

fn client_confirmation(
    config: &AppConfig,
    appointment: &Appointment,
    service: &Service,
) -> (String, String) {
    let subject = format!(
        "Appointment received - {} - {}",
        service.name, config.salon_name
    );
    let body = format!(
        "Hello {name},\n\n\
         We have received your appointment request!\n\n\
         Service: {service}\n\
         Date: {date}\n\
         Time: {time}\n\
         Duration: {duration} minutes\n\
         Price: {price}\n\n\
         Please arrive 5-10 minutes before your appointment.\n\n\
         We look forward to seeing you!\n\n\
         The {salon} Team\n",
        name = appointment.client_name,
        service = service.name,
        date = appointment.date.format("%Y-%m-%d"),
        time = appointment.start_time.format("%H:%M"),
        duration = appointment.duration_minutes,
        price = service.display_price(),
        salon = config.salon_name,
    );
    (subject, body)
}

fn staff_alert(appointment: &Appointment, service: &Service) -> (String, String) {
    let subject = format!(
        "New booking: {} - {}",
        appointment.client_name,
        appointment.date.format("%Y-%m-%d")
    );
    let body = format!(
        "New appointment booking\n\n\
         Client: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\n\
         Service: {service}\n\
         Date: {date}\n\
         Time: {time}\n\n\
         Special requests: {requests}\n",
        name = appointment.client_name,
        email = appointment.client_email,
        phone = appointment.client_phone,
        service = service.name,
        date = appointment.date.format("%Y-%m-%d"),
        time = appointment.start_time.format("%H:%M"),
        requests = appointment
            .special_requests
            .as_deref()
            .unwrap_or("None"),
    );
    (subject, body)
}
