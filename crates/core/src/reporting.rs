//! Dashboard aggregation, derived from appointment and payment state.
//!
//! Reads go straight to the store; nothing here mutates anything. Earnings
//! always mean Paid, non-archived payments.

use crate::models::AppointmentStatus;
use crate::{HmsError, HmsResult};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;

/// Headline totals on the admin dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminTotals {
    pub doctors: i64,
    pub patients: i64,
    pub appointments: i64,
    pub earnings: f64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LatestAppointment {
    pub id: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TopDoctor {
    pub doctor_name: String,
    pub specialization: String,
    pub appointments_completed: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub summary: AdminTotals,
    #[serde(rename = "latestAppointments")]
    pub latest_appointments: Vec<LatestAppointment>,
    #[serde(rename = "topDoctors")]
    pub top_doctors: Vec<TopDoctor>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorTotals {
    pub earnings: f64,
    pub appointments: i64,
    pub patients: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LatestBooking {
    pub patient_name: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorDashboard {
    pub summary: DoctorTotals,
    #[serde(rename = "latestBookings")]
    pub latest_bookings: Vec<LatestBooking>,
}

/// Read-only aggregation service over the shared pool.
#[derive(Clone)]
pub struct ReportingService {
    pool: SqlitePool,
}

impl ReportingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// System-wide summary: non-archived entity counts, total Paid earnings,
    /// the five most recent appointments, and the five doctors with the most
    /// completed appointments (ties broken by id order).
    pub async fn admin_summary(&self) -> HmsResult<AdminDashboard> {
        let doctors = self.count("doctors").await?;
        let patients = self.count("patients").await?;
        let appointments = self.count("appointments").await?;

        let earnings: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0)
             FROM payments
             WHERE is_archived = 0 AND payment_status = 'Paid'",
        )
        .fetch_one(&self.pool)
        .await?;

        let latest_appointments = sqlx::query_as::<_, LatestAppointment>(
            "SELECT a.id,
                    COALESCE(p.full_name, 'Unknown') AS patient_name,
                    COALESCE(d.doctor_name, 'Unknown') AS doctor_name,
                    a.appointment_date, a.status
             FROM appointments a
             LEFT JOIN patients p ON p.id = a.patient_id
             LEFT JOIN doctors d ON d.id = a.doctor_id
             ORDER BY a.appointment_date DESC, a.id DESC
             LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        let top_doctors = sqlx::query_as::<_, TopDoctor>(
            "SELECT d.doctor_name,
                    COALESCE(s.specialization_name, 'N/A') AS specialization,
                    (SELECT COUNT(*) FROM appointments a
                     WHERE a.doctor_id = d.id AND a.status = 'Completed') AS appointments_completed
             FROM doctors d
             LEFT JOIN specializations s ON s.id = d.specialization_id
             ORDER BY appointments_completed DESC, d.id ASC
             LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AdminDashboard {
            summary: AdminTotals {
                doctors,
                patients,
                appointments,
                earnings,
            },
            latest_appointments,
            top_doctors,
        })
    }

    /// Per-doctor summary: this doctor's non-archived appointment count,
    /// distinct patients seen, earnings through their appointments, and the
    /// five most recent bookings.
    pub async fn doctor_summary(&self, doctor_id: i64) -> HmsResult<DoctorDashboard> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM doctors WHERE id = ?)")
            .bind(doctor_id)
            .fetch_one(&self.pool)
            .await?;
        if exists == 0 {
            return Err(HmsError::not_found("Doctor"));
        }

        let appointments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE doctor_id = ? AND is_archived = 0",
        )
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        let patients: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT patient_id) FROM appointments
             WHERE doctor_id = ? AND is_archived = 0",
        )
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        let earnings: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(p.amount), 0.0)
             FROM payments p
             JOIN appointments a ON a.id = p.appointment_id
             WHERE a.doctor_id = ? AND p.payment_status = 'Paid' AND p.is_archived = 0",
        )
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        let latest_bookings = sqlx::query_as::<_, LatestBooking>(
            "SELECT COALESCE(p.full_name, 'Unknown') AS patient_name, a.status
             FROM appointments a
             LEFT JOIN patients p ON p.id = a.patient_id
             WHERE a.doctor_id = ? AND a.is_archived = 0
             ORDER BY a.appointment_date DESC, a.id DESC
             LIMIT 5",
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(DoctorDashboard {
            summary: DoctorTotals {
                earnings,
                appointments,
                patients,
            },
            latest_bookings,
        })
    }

    async fn count(&self, table: &str) -> HmsResult<i64> {
        let count = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE is_archived = 0"
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
