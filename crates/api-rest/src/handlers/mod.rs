//! Request handlers, grouped by resource.

pub mod appointments;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod patients;
pub mod payments;
pub mod records;
pub mod specializations;
