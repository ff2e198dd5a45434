//! The appointment scheduler.
//!
//! Owns the whole appointment lifecycle: validated creation under conflict
//! constraints, the status machine (Pending -> Approved/Rejected ->
//! Completed/Cancelled), soft archival and restore, and the searchable
//! listing.
//!
//! ## Conflict model
//!
//! A slot is the `(doctor, date, time)` triple. Two rules hold for
//! non-archived rows:
//!
//! 1. a slot is booked at most once;
//! 2. a patient holds at most one Pending/Approved appointment per date.
//!
//! Both are enforced twice. Pre-checks inside the creating transaction give
//! precise `Conflict` messages; the partial unique indexes
//! (`uq_appointments_slot`, `uq_appointments_patient_day`) are the
//! authoritative backstop, so two racing requests for the same slot can
//! never both commit. Index violations are translated back into the same
//! `Conflict` error the pre-check would have raised.

use crate::error::{violated_constraint, HmsError, HmsResult};
use crate::models::{
    appointment_no, Appointment, AppointmentDetail, AppointmentListItem, AppointmentStatus,
    Doctor, MedicalRecord, Patient, Payment,
};
use api_shared::PageMeta;
use chrono::{NaiveDate, Utc};
use hms_types::{SlotTime, VisitNotes, VisitReason};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use utoipa::ToSchema;

const MSG_SLOT_TAKEN: &str = "This time slot is already booked for the selected doctor.";
const MSG_PATIENT_DOUBLE_BOOKED: &str =
    "The patient already has an active appointment on this date.";
const DEFAULT_REJECT_REASON: &str = "No reason provided";

/// Request to create an appointment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    /// Strict 24-hour `HH:MM`.
    pub appointment_time: String,
    pub reason_for_visit: String,
    pub notes: Option<String>,
}

/// Request to edit an appointment's scheduling and clinical details.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AppointmentUpdate {
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason_for_visit: String,
    pub notes: Option<String>,
}

/// Listing parameters: optional free-text search plus a page request.
///
/// Omitted query parameters fall back to the first page of ten rows.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            per_page: 10,
        }
    }
}

impl ListQuery {
    /// Clamps the page request to sane bounds.
    pub fn normalised(&self) -> (u32, u32) {
        (self.page.max(1), self.per_page.clamp(1, 100))
    }

    /// The LIKE pattern for the search term, if one was given.
    pub fn like_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()))
    }
}

/// Outcome of a restore request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    AlreadyActive,
}

/// Scheduler service over the shared pool.
#[derive(Clone)]
pub struct AppointmentScheduler {
    pool: SqlitePool,
}

impl AppointmentScheduler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Books a new appointment with status `Pending`.
    ///
    /// Validates the scheduling and clinical fields, checks that both
    /// parties exist and are not archived, runs both conflict checks, and
    /// inserts, all inside one transaction. The appointment number is
    /// derived from the freshly assigned row id in the same transaction, so
    /// numbering is unique and monotonic regardless of concurrent creation
    /// order.
    pub async fn create(&self, req: NewAppointment) -> HmsResult<AppointmentDetail> {
        let time = SlotTime::parse(&req.appointment_time)
            .map_err(|e| HmsError::validation("appointment_time", e))?;
        let reason = VisitReason::new(&req.reason_for_visit)
            .map_err(|e| HmsError::validation("reason_for_visit", e))?;
        let notes = VisitNotes::from_optional(req.notes.as_deref())
            .map_err(|e| HmsError::validation("notes", e))?;

        let today = Utc::now().date_naive();
        if req.appointment_date < today {
            return Err(HmsError::validation(
                "appointment_date",
                "appointment date must be today or later",
            ));
        }

        let mut tx = self.pool.begin().await?;

        let patient_active: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ? AND is_archived = 0)",
        )
        .bind(req.patient_id)
        .fetch_one(&mut *tx)
        .await?;
        if patient_active == 0 {
            return Err(HmsError::not_found("Patient"));
        }

        let doctor_active: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM doctors WHERE id = ? AND is_archived = 0)",
        )
        .bind(req.doctor_id)
        .fetch_one(&mut *tx)
        .await?;
        if doctor_active == 0 {
            return Err(HmsError::not_found("Doctor"));
        }

        check_conflicts(
            &mut tx,
            req.doctor_id,
            req.patient_id,
            req.appointment_date,
            &time.to_string(),
            None,
        )
        .await?;

        let result = sqlx::query(
            "INSERT INTO appointments (patient_id, doctor_id, appointment_date, appointment_time, status, reason_for_visit, notes, is_paid, is_archived, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?)",
        )
        .bind(req.patient_id)
        .bind(req.doctor_id)
        .bind(req.appointment_date)
        .bind(time.to_string())
        .bind(AppointmentStatus::Pending)
        .bind(reason.as_str())
        .bind(notes.as_ref().map(VisitNotes::as_str))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(conflict_from_db)?;

        let id = result.last_insert_rowid();
        sqlx::query("UPDATE appointments SET appointment_no = ? WHERE id = ?")
            .bind(appointment_no(id))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            appointment_id = id,
            patient_id = req.patient_id,
            doctor_id = req.doctor_id,
            date = %req.appointment_date,
            time = %time,
            "appointment created"
        );

        self.get(id).await
    }

    /// Paginated, searchable list of non-archived appointments, most recent
    /// date first (stable: ties keep insertion order).
    pub async fn list(&self, query: &ListQuery) -> HmsResult<(Vec<AppointmentListItem>, PageMeta)> {
        let (page, per_page) = query.normalised();
        let pattern = query.like_pattern();

        let search_clause = if pattern.is_some() {
            " AND (LOWER(COALESCE(p.full_name, '')) LIKE ?
               OR LOWER(COALESCE(d.doctor_name, '')) LIKE ?
               OR a.appointment_date LIKE ?
               OR LOWER(a.status) LIKE ?)"
        } else {
            ""
        };

        let count_sql = format!(
            "SELECT COUNT(*)
             FROM appointments a
             LEFT JOIN patients p ON p.id = a.patient_id
             LEFT JOIN doctors d ON d.id = a.doctor_id
             WHERE a.is_archived = 0{search_clause}"
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref pattern) = pattern {
            for _ in 0..4 {
                count_query = count_query.bind(pattern.clone());
            }
        }
        let total = count_query.fetch_one(&self.pool).await? as u64;

        let rows_sql = format!(
            "SELECT a.id, a.appointment_no, a.patient_id, a.doctor_id,
                    COALESCE(p.full_name, 'Unknown') AS patient_name,
                    COALESCE(d.doctor_name, 'Unknown') AS doctor_name,
                    a.appointment_date, a.appointment_time, a.status,
                    a.reason_for_visit, a.is_paid
             FROM appointments a
             LEFT JOIN patients p ON p.id = a.patient_id
             LEFT JOIN doctors d ON d.id = a.doctor_id
             WHERE a.is_archived = 0{search_clause}
             ORDER BY a.appointment_date DESC, a.id ASC
             LIMIT ? OFFSET ?"
        );
        let mut rows_query = sqlx::query_as::<_, AppointmentListItem>(&rows_sql);
        if let Some(ref pattern) = pattern {
            for _ in 0..4 {
                rows_query = rows_query.bind(pattern.clone());
            }
        }
        let rows = rows_query
            .bind(i64::from(per_page))
            .bind(i64::from(page - 1) * i64::from(per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, PageMeta::new(page, per_page, total)))
    }

    /// Fetches an appointment by id with its associations.
    ///
    /// Unlike the list view, the detail lookup is not archive-filtered.
    pub async fn get(&self, id: i64) -> HmsResult<AppointmentDetail> {
        let appointment = self.row(id).await?;

        let patient = sqlx::query_as::<_, Patient>(
            "SELECT id, full_name, age, gender, email, phone_number, address, image, is_archived, created_at
             FROM patients WHERE id = ?",
        )
        .bind(appointment.patient_id)
        .fetch_optional(&self.pool)
        .await?;

        let doctor = sqlx::query_as::<_, Doctor>(
            "SELECT id, doctor_name, email, qualifications, years_of_experience, consultation_fee, specialization_id, image, is_archived, created_at
             FROM doctors WHERE id = ?",
        )
        .bind(appointment.doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        let payment = sqlx::query_as::<_, Payment>(
            "SELECT id, patient_id, appointment_id, amount, payment_method, payment_status, transaction_date, payment_date, is_archived, created_at
             FROM payments WHERE appointment_id = ? ORDER BY id LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let medical_record = sqlx::query_as::<_, MedicalRecord>(
            "SELECT id, appointment_id, patient_id, doctor_id, blood_pressure, heart_rate, temperature, weight, diagnosis, treatment, is_archived, created_at
             FROM medical_records WHERE appointment_id = ? ORDER BY id LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(AppointmentDetail {
            appointment,
            patient,
            doctor,
            payment,
            medical_record,
        })
    }

    /// Edits scheduling and clinical details of a non-archived appointment.
    ///
    /// Both conflict checks run again for the new slot, excluding the
    /// appointment being moved.
    pub async fn update_details(&self, id: i64, req: AppointmentUpdate) -> HmsResult<AppointmentDetail> {
        let time = SlotTime::parse(&req.appointment_time)
            .map_err(|e| HmsError::validation("appointment_time", e))?;
        let reason = VisitReason::new(&req.reason_for_visit)
            .map_err(|e| HmsError::validation("reason_for_visit", e))?;
        let notes = VisitNotes::from_optional(req.notes.as_deref())
            .map_err(|e| HmsError::validation("notes", e))?;

        let current = self.row(id).await?;
        if current.is_archived {
            return Err(HmsError::conflict("Cannot update an archived appointment."));
        }

        let mut tx = self.pool.begin().await?;
        check_conflicts(
            &mut tx,
            current.doctor_id,
            current.patient_id,
            req.appointment_date,
            &time.to_string(),
            Some(id),
        )
        .await?;

        sqlx::query(
            "UPDATE appointments
             SET appointment_date = ?, appointment_time = ?, reason_for_visit = ?, notes = ?
             WHERE id = ?",
        )
        .bind(req.appointment_date)
        .bind(time.to_string())
        .bind(reason.as_str())
        .bind(notes.as_ref().map(VisitNotes::as_str))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(conflict_from_db)?;
        tx.commit().await?;

        self.get(id).await
    }

    /// Approves a pending appointment.
    ///
    /// Guarded: only `Pending` appointments transition.
    pub async fn approve(&self, id: i64) -> HmsResult<AppointmentDetail> {
        self.transition(id, AppointmentStatus::Approved, None).await
    }

    /// Rejects a pending appointment, recording the reason in its notes.
    pub async fn reject(&self, id: i64, reason: Option<String>) -> HmsResult<AppointmentDetail> {
        let reason = reason
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_owned());
        self.transition(id, AppointmentStatus::Rejected, Some(reason)).await
    }

    /// Marks an approved appointment as completed.
    pub async fn complete(&self, id: i64) -> HmsResult<AppointmentDetail> {
        self.transition(id, AppointmentStatus::Completed, None).await
    }

    /// Cancels a pending or approved appointment.
    pub async fn cancel(&self, id: i64) -> HmsResult<AppointmentDetail> {
        self.transition(id, AppointmentStatus::Cancelled, None).await
    }

    /// Archives an appointment. The status is left untouched.
    pub async fn archive(&self, id: i64) -> HmsResult<()> {
        let result = sqlx::query("UPDATE appointments SET is_archived = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HmsError::not_found("Appointment"));
        }
        tracing::info!(appointment_id = id, "appointment archived");
        Ok(())
    }

    /// Restores an archived appointment to exactly its pre-archive state.
    ///
    /// Restoring re-enters the row into the conflict indexes, so a slot
    /// that was re-booked in the meantime surfaces as `Conflict`.
    pub async fn restore(&self, id: i64) -> HmsResult<RestoreOutcome> {
        let current = self.row(id).await?;
        if !current.is_archived {
            return Ok(RestoreOutcome::AlreadyActive);
        }

        sqlx::query("UPDATE appointments SET is_archived = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(conflict_from_db)?;

        tracing::info!(appointment_id = id, "appointment restored");
        Ok(RestoreOutcome::Restored)
    }

    async fn row(&self, id: i64) -> HmsResult<Appointment> {
        sqlx::query_as::<_, Appointment>(
            "SELECT id, appointment_no, patient_id, doctor_id, appointment_date, appointment_time, status, reason_for_visit, notes, is_paid, is_archived, created_at
             FROM appointments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Appointment"))
    }

    async fn transition(
        &self,
        id: i64,
        to: AppointmentStatus,
        notes: Option<String>,
    ) -> HmsResult<AppointmentDetail> {
        let current = self.row(id).await?;
        if current.is_archived {
            return Err(HmsError::conflict("Cannot update an archived appointment."));
        }
        let allowed = match to {
            AppointmentStatus::Approved | AppointmentStatus::Rejected => {
                current.status == AppointmentStatus::Pending
            }
            AppointmentStatus::Completed => current.status == AppointmentStatus::Approved,
            AppointmentStatus::Cancelled => matches!(
                current.status,
                AppointmentStatus::Pending | AppointmentStatus::Approved
            ),
            AppointmentStatus::Pending => false,
        };
        if !allowed {
            return Err(HmsError::conflict(format!(
                "Cannot move a {} appointment to {}.",
                current.status, to
            )));
        }

        // The expected status is repeated in the WHERE clause so a racing
        // transition cannot sneak in between the guard read and the write.
        let result = match notes {
            Some(notes) => {
                sqlx::query("UPDATE appointments SET status = ?, notes = ? WHERE id = ? AND status = ?")
                    .bind(to)
                    .bind(notes)
                    .bind(id)
                    .bind(current.status)
                    .execute(&self.pool)
                    .await
                    .map_err(conflict_from_db)?
            }
            None => {
                sqlx::query("UPDATE appointments SET status = ? WHERE id = ? AND status = ?")
                    .bind(to)
                    .bind(id)
                    .bind(current.status)
                    .execute(&self.pool)
                    .await
                    .map_err(conflict_from_db)?
            }
        };
        if result.rows_affected() == 0 {
            return Err(HmsError::conflict(format!(
                "Appointment is no longer {}.",
                current.status
            )));
        }

        tracing::info!(appointment_id = id, status = %to, "appointment status changed");
        self.get(id).await
    }
}

/// Runs both conflict pre-checks for a slot inside the caller's transaction.
async fn check_conflicts(
    tx: &mut SqliteConnection,
    doctor_id: i64,
    patient_id: i64,
    date: NaiveDate,
    time: &str,
    exclude_id: Option<i64>,
) -> HmsResult<()> {
    let exclude_id = exclude_id.unwrap_or(0);

    let slot_taken: i64 = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM appointments
            WHERE doctor_id = ? AND appointment_date = ? AND appointment_time = ?
              AND is_archived = 0 AND id != ?)",
    )
    .bind(doctor_id)
    .bind(date)
    .bind(time)
    .bind(exclude_id)
    .fetch_one(&mut *tx)
    .await?;
    if slot_taken != 0 {
        return Err(HmsError::conflict(MSG_SLOT_TAKEN));
    }

    let double_booked: i64 = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM appointments
            WHERE patient_id = ? AND appointment_date = ?
              AND is_archived = 0 AND status IN ('Pending', 'Approved') AND id != ?)",
    )
    .bind(patient_id)
    .bind(date)
    .bind(exclude_id)
    .fetch_one(&mut *tx)
    .await?;
    if double_booked != 0 {
        return Err(HmsError::conflict(MSG_PATIENT_DOUBLE_BOOKED));
    }

    Ok(())
}

/// Translates a unique-index violation into the matching `Conflict`.
///
/// SQLite names the violated columns, not the index: the slot index reports
/// `appointments.doctor_id, appointments.appointment_date,
/// appointments.appointment_time` and the patient-day index
/// `appointments.patient_id, appointments.appointment_date`, so each arm
/// keys on the column unique to that index.
fn conflict_from_db(err: sqlx::Error) -> HmsError {
    match violated_constraint(&err) {
        Some(message) if message.contains("appointments.appointment_time") => {
            HmsError::conflict(MSG_SLOT_TAKEN)
        }
        Some(message) if message.contains("appointments.patient_id") => {
            HmsError::conflict(MSG_PATIENT_DOUBLE_BOOKED)
        }
        Some(message) if message.contains("appointments.appointment_no") => {
            HmsError::conflict("Appointment number already assigned.")
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::store::{EntityStore, NewDoctor, NewPatient, NewSpecialization};
    use chrono::Days;

    struct Fixture {
        scheduler: AppointmentScheduler,
        store: EntityStore,
        patient_id: i64,
        doctor_id: i64,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let store = EntityStore::new(pool.clone());
        let spec = store
            .create_specialization(NewSpecialization {
                specialization_name: "General Medicine".into(),
                description: None,
                common_conditions: vec![],
            })
            .await
            .unwrap();
        let doctor = store
            .create_doctor(NewDoctor {
                doctor_name: "Dr. Santos".into(),
                email: "santos@clinic.test".into(),
                qualifications: "MD".into(),
                years_of_experience: 8,
                consultation_fee: 400.0,
                specialization_id: spec.id,
                available_days: vec!["Monday".into()],
                image: None,
            })
            .await
            .unwrap();
        let patient = seed_patient(&store, "Mia Flores", "mia@example.test").await;
        Fixture {
            scheduler: AppointmentScheduler::new(pool),
            store,
            patient_id: patient,
            doctor_id: doctor.id,
        }
    }

    async fn seed_patient(store: &EntityStore, name: &str, email: &str) -> i64 {
        store
            .create_patient(NewPatient {
                full_name: name.into(),
                age: 30,
                gender: "Female".into(),
                email: email.into(),
                phone_number: None,
                address: None,
                image: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_doctor(store: &EntityStore, name: &str, email: &str) -> i64 {
        let spec = store
            .create_specialization(NewSpecialization {
                specialization_name: format!("{name} specialty"),
                description: None,
                common_conditions: vec![],
            })
            .await
            .unwrap();
        store
            .create_doctor(NewDoctor {
                doctor_name: name.into(),
                email: email.into(),
                qualifications: "MD".into(),
                years_of_experience: 5,
                consultation_fee: 350.0,
                specialization_id: spec.id,
                available_days: vec!["Tuesday".into()],
                image: None,
            })
            .await
            .unwrap()
            .id
    }

    fn future_date(days: u64) -> NaiveDate {
        Utc::now().date_naive() + Days::new(days)
    }

    fn booking(patient_id: i64, doctor_id: i64, date: NaiveDate, time: &str) -> NewAppointment {
        NewAppointment {
            patient_id,
            doctor_id,
            appointment_date: date,
            appointment_time: time.into(),
            reason_for_visit: "Routine check-up".into(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_pending_status_and_number() {
        let fx = fixture().await;
        let detail = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap();

        let a = &detail.appointment;
        assert_eq!(a.status, AppointmentStatus::Pending);
        assert_eq!(a.appointment_no, "PATIENT01");
        assert!(!a.is_archived);
        assert!(!a.is_paid);
        assert_eq!(a.appointment_time, "09:00");
        assert_eq!(detail.patient.as_ref().unwrap().full_name, "Mia Flores");
        assert_eq!(detail.doctor.as_ref().unwrap().doctor_name, "Dr. Santos");
        assert!(detail.payment.is_none());
        assert!(detail.medical_record.is_none());
    }

    #[tokio::test]
    async fn same_slot_booked_twice_conflicts() {
        let fx = fixture().await;
        let date = future_date(7);
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap();

        let other_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        let err = fx
            .scheduler
            .create(booking(other_patient, fx.doctor_id, date, "09:00"))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, HmsError::Conflict(m) if m == MSG_SLOT_TAKEN),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn patient_cannot_hold_two_active_appointments_per_day() {
        let fx = fixture().await;
        let date = future_date(7);
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap();

        let other_doctor = seed_doctor(&fx.store, "Dr. Uy", "uy@clinic.test").await;
        let err = fx
            .scheduler
            .create(booking(fx.patient_id, other_doctor, date, "10:00"))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, HmsError::Conflict(m) if m == MSG_PATIENT_DOUBLE_BOOKED),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn rejected_appointment_frees_the_patient_for_that_day() {
        let fx = fixture().await;
        let date = future_date(7);
        let first = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap();
        fx.scheduler.reject(first.appointment.id, None).await.unwrap();

        // Same patient, same date: allowed again once nothing is Pending/Approved.
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "10:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_validates_time_date_and_reason() {
        let fx = fixture().await;

        let bad_time = booking(fx.patient_id, fx.doctor_id, future_date(7), "9:00");
        let err = fx.scheduler.create(bad_time).await.unwrap_err();
        assert!(matches!(err, HmsError::Validation { field: "appointment_time", .. }));

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let err = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, yesterday, "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::Validation { field: "appointment_date", .. }));

        let mut long_reason = booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00");
        long_reason.reason_for_visit = "x".repeat(256);
        let err = fx.scheduler.create(long_reason).await.unwrap_err();
        assert!(matches!(err, HmsError::Validation { field: "reason_for_visit", .. }));

        let mut long_notes = booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00");
        long_notes.notes = Some("n".repeat(501));
        let err = fx.scheduler.create(long_notes).await.unwrap_err();
        assert!(matches!(err, HmsError::Validation { field: "notes", .. }));
    }

    #[tokio::test]
    async fn booking_against_archived_parties_is_not_found() {
        let fx = fixture().await;
        fx.store.archive_doctor(fx.doctor_id).await.unwrap();
        let err = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_bookings_for_one_slot_admit_exactly_one() {
        let fx = fixture().await;
        let other_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        let date = future_date(7);

        let first = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"));
        let second = fx
            .scheduler
            .create(booking(other_patient, fx.doctor_id, date, "09:00"));
        let (a, b) = tokio::join!(first, second);

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one booking should win the slot");
        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(loser, HmsError::Conflict(_)));
    }

    #[tokio::test]
    async fn appointment_numbers_stay_unique_and_monotonic() {
        let fx = fixture().await;
        let second_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        let third_patient = seed_patient(&fx.store, "Ana Cruz", "ana@example.test").await;

        let mut numbers = Vec::new();
        for (patient, day) in [(fx.patient_id, 7), (second_patient, 8), (third_patient, 9)] {
            let detail = fx
                .scheduler
                .create(booking(patient, fx.doctor_id, future_date(day), "09:00"))
                .await
                .unwrap();
            numbers.push(detail.appointment.appointment_no);
        }
        assert_eq!(numbers, ["PATIENT01", "PATIENT02", "PATIENT03"]);
    }

    #[tokio::test]
    async fn approve_and_reject_are_guarded_by_pending_status() {
        let fx = fixture().await;
        let id = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap()
            .appointment
            .id;

        let approved = fx.scheduler.approve(id).await.unwrap();
        assert_eq!(approved.appointment.status, AppointmentStatus::Approved);

        // Pinned policy: transitions out of Pending are final.
        assert!(matches!(fx.scheduler.approve(id).await.unwrap_err(), HmsError::Conflict(_)));
        assert!(matches!(
            fx.scheduler.reject(id, None).await.unwrap_err(),
            HmsError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn reject_records_default_reason_in_notes() {
        let fx = fixture().await;
        let id = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap()
            .appointment
            .id;

        let rejected = fx.scheduler.reject(id, None).await.unwrap();
        assert_eq!(rejected.appointment.status, AppointmentStatus::Rejected);
        assert_eq!(rejected.appointment.notes.as_deref(), Some(DEFAULT_REJECT_REASON));

        // Approving a rejected appointment is disallowed (pinned policy).
        assert!(matches!(fx.scheduler.approve(id).await.unwrap_err(), HmsError::Conflict(_)));
    }

    #[tokio::test]
    async fn complete_requires_approval_first() {
        let fx = fixture().await;
        let id = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap()
            .appointment
            .id;

        assert!(matches!(fx.scheduler.complete(id).await.unwrap_err(), HmsError::Conflict(_)));
        fx.scheduler.approve(id).await.unwrap();
        let done = fx.scheduler.complete(id).await.unwrap();
        assert_eq!(done.appointment.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn archive_hides_from_list_but_not_from_detail() {
        let fx = fixture().await;
        let detail = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap();
        let id = detail.appointment.id;
        let before = detail.appointment.clone();

        fx.scheduler.archive(id).await.unwrap();

        let (rows, meta) = fx.scheduler.list(&ListQuery::default()).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(meta.total, 0);

        let archived = fx.scheduler.get(id).await.unwrap().appointment;
        assert!(archived.is_archived);
        assert_eq!(archived.status, before.status);

        assert_eq!(fx.scheduler.restore(id).await.unwrap(), RestoreOutcome::Restored);
        let restored = fx.scheduler.get(id).await.unwrap().appointment;
        assert!(!restored.is_archived);
        // Everything but the archive flag round-trips.
        assert_eq!(restored.appointment_no, before.appointment_no);
        assert_eq!(restored.status, before.status);
        assert_eq!(restored.appointment_date, before.appointment_date);
        assert_eq!(restored.appointment_time, before.appointment_time);
        assert_eq!(restored.reason_for_visit, before.reason_for_visit);
        assert_eq!(restored.notes, before.notes);

        let (rows, _) = fx.scheduler.list(&ListQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 1);

        assert_eq!(
            fx.scheduler.restore(id).await.unwrap(),
            RestoreOutcome::AlreadyActive
        );
    }

    #[tokio::test]
    async fn restore_into_a_retaken_slot_conflicts() {
        let fx = fixture().await;
        let date = future_date(7);
        let first = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap()
            .appointment
            .id;
        fx.scheduler.archive(first).await.unwrap();

        let other_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        fx.scheduler
            .create(booking(other_patient, fx.doctor_id, date, "09:00"))
            .await
            .unwrap();

        let err = fx.scheduler.restore(first).await.unwrap_err();
        assert!(matches!(&err, HmsError::Conflict(m) if m == MSG_SLOT_TAKEN), "got {err:?}");
    }

    #[tokio::test]
    async fn restore_into_a_double_booked_day_conflicts() {
        let fx = fixture().await;
        let date = future_date(7);
        let first = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap()
            .appointment
            .id;
        fx.scheduler.archive(first).await.unwrap();

        // Same patient, same day, different slot: fine while the first is
        // archived, but restoring the first would double-book the day.
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "10:00"))
            .await
            .unwrap();

        let err = fx.scheduler.restore(first).await.unwrap_err();
        assert!(
            matches!(&err, HmsError::Conflict(m) if m == MSG_PATIENT_DOUBLE_BOOKED),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn list_tolerates_out_of_range_page_numbers() {
        let fx = fixture().await;
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap();

        let query = ListQuery {
            search: None,
            page: u32::MAX,
            per_page: 100,
        };
        let (rows, meta) = fx.scheduler.list(&query).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(meta.total, 1);
    }

    #[tokio::test]
    async fn reschedule_into_taken_slot_conflicts() {
        let fx = fixture().await;
        let date = future_date(7);
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap();

        let other_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        let second = fx
            .scheduler
            .create(booking(other_patient, fx.doctor_id, date, "10:00"))
            .await
            .unwrap()
            .appointment
            .id;

        let err = fx
            .scheduler
            .update_details(
                second,
                AppointmentUpdate {
                    appointment_date: date,
                    appointment_time: "09:00".into(),
                    reason_for_visit: "Routine check-up".into(),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(&err, HmsError::Conflict(m) if m == MSG_SLOT_TAKEN), "got {err:?}");

        // Keeping its own slot is not a conflict with itself.
        let kept = fx
            .scheduler
            .update_details(
                second,
                AppointmentUpdate {
                    appointment_date: date,
                    appointment_time: "10:00".into(),
                    reason_for_visit: "Follow-up".into(),
                    notes: Some("bring lab results".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.appointment.reason_for_visit, "Follow-up");
        assert_eq!(kept.appointment.notes.as_deref(), Some("bring lab results"));
    }

    #[tokio::test]
    async fn archived_appointments_cannot_be_edited() {
        let fx = fixture().await;
        let date = future_date(7);
        let id = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, date, "09:00"))
            .await
            .unwrap()
            .appointment
            .id;
        fx.scheduler.archive(id).await.unwrap();

        let err = fx
            .scheduler
            .update_details(
                id,
                AppointmentUpdate {
                    appointment_date: date,
                    appointment_time: "11:00".into(),
                    reason_for_visit: "Routine check-up".into(),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)));
        assert!(matches!(fx.scheduler.approve(id).await.unwrap_err(), HmsError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_searches_names_dates_and_status() {
        let fx = fixture().await;
        let other_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        fx.scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap();
        let second = fx
            .scheduler
            .create(booking(other_patient, fx.doctor_id, future_date(8), "09:00"))
            .await
            .unwrap()
            .appointment
            .id;
        fx.scheduler.approve(second).await.unwrap();

        let by_name = |search: &str| ListQuery {
            search: Some(search.into()),
            ..ListQuery::default()
        };

        let (rows, _) = fx.scheduler.list(&by_name("mia")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_name, "Mia Flores");

        let (rows, _) = fx.scheduler.list(&by_name("santos")).await.unwrap();
        assert_eq!(rows.len(), 2);

        let (rows, _) = fx.scheduler.list(&by_name("approved")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second);

        let (rows, _) = fx.scheduler.list(&by_name("no such thing")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn list_sorts_by_date_descending() {
        let fx = fixture().await;
        let other_patient = seed_patient(&fx.store, "Leo Tan", "leo@example.test").await;
        let early = fx
            .scheduler
            .create(booking(fx.patient_id, fx.doctor_id, future_date(7), "09:00"))
            .await
            .unwrap()
            .appointment
            .id;
        let late = fx
            .scheduler
            .create(booking(other_patient, fx.doctor_id, future_date(14), "09:00"))
            .await
            .unwrap()
            .appointment
            .id;

        let (rows, meta) = fx.scheduler.list(&ListQuery::default()).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![late, early]);
        assert_eq!(meta.total, 2);
        assert_eq!(meta.last_page, 1);
        assert!(!meta.has_more_pages);
    }
}
