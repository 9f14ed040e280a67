pub mod appointment;
pub mod portfolio;
pub mod service;
pub mod working_hours;

pub use appointment::{Appointment, AppointmentStatus};
pub use portfolio::{NailShape, PortfolioItem};
pub use service::Service;
pub use working_hours::WorkingHours;
