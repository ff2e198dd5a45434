//! Entity models backing the HMS store.
//!
//! All entities carry an `is_archived` soft-delete flag; archived rows are
//! excluded from default listings but retained for audit and detail lookup.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lifecycle state of an appointment.
///
/// Transitions are one-directional: nothing ever returns to `Pending`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Rejected => "Rejected",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
    Insurance,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// A patient profile. The credential hash is stored in the database but
/// never selected into this model.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub age: i64,
    pub gender: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// A doctor profile. Available weekdays live in a child table and are
/// attached by the listing layer.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Doctor {
    pub id: i64,
    pub doctor_name: String,
    pub email: String,
    pub qualifications: String,
    pub years_of_experience: i64,
    pub consultation_fee: f64,
    pub specialization_id: i64,
    pub image: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Specialization {
    pub id: i64,
    pub specialization_name: String,
    pub description: Option<String>,
    /// Stored as a JSON array column; no delimited-string round trip.
    #[schema(value_type = Vec<String>)]
    pub common_conditions: Json<Vec<String>>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// The central entity: one booking of a doctor's slot by a patient.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: i64,
    /// Human-facing sequential number, e.g. `PATIENT01`. Assigned from the
    /// row id inside the creating transaction.
    pub appointment_no: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    /// Canonical `HH:MM` slot time.
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub reason_for_visit: String,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MedicalRecord {
    pub id: i64,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: i64,
    pub patient_id: i64,
    pub appointment_id: Option<i64>,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_date: NaiveDate,
    /// Set when the payment is confirmed as Paid.
    pub payment_date: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// One row of the appointment list view, with party names resolved.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AppointmentListItem {
    pub id: i64,
    pub appointment_no: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub reason_for_visit: String,
    pub is_paid: bool,
}

/// Full appointment detail with its associations. Returned by id lookups
/// regardless of archive state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub patient: Option<Patient>,
    pub doctor: Option<Doctor>,
    pub payment: Option<Payment>,
    pub medical_record: Option<MedicalRecord>,
}

/// Formats the human-facing appointment number for a row id.
///
/// Zero-padded to at least two digits: id 1 becomes `PATIENT01`, id 100
/// becomes `PATIENT100`.
pub fn appointment_no(id: i64) -> String {
    format!("PATIENT{id:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_no_pads_to_two_digits() {
        assert_eq!(appointment_no(1), "PATIENT01");
        assert_eq!(appointment_no(9), "PATIENT09");
        assert_eq!(appointment_no(10), "PATIENT10");
        assert_eq!(appointment_no(123), "PATIENT123");
    }
}
