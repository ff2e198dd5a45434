//! Core domain logic for the hospital management system.
//!
//! This crate owns the SQLite store and every domain rule that sits above
//! it: the appointment scheduler with its conflict engine, the entity
//! store for the collaborator records, the dashboard reporting queries and
//! the paginated listing layer. API crates stay thin; anything a handler
//! does beyond translating HTTP lives here.

pub mod config;
pub mod db;
pub mod error;
pub mod listings;
pub mod models;
pub mod reporting;
pub mod scheduler;
pub mod store;

pub use config::CoreConfig;
pub use error::{HmsError, HmsResult};
pub use models::{Appointment, AppointmentDetail, AppointmentStatus};
pub use scheduler::{AppointmentScheduler, ListQuery, RestoreOutcome};
