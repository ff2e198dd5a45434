//! Thin create/archive operations for the collaborator entities.
//!
//! These are deliberately simple: profile CRUD carries no invariants of its
//! own beyond referential existence and unique emails. The one guarded
//! transition here is `confirm_payment`, which is one-way Pending -> Paid.

use crate::error::{is_unique_violation, HmsError, HmsResult};
use crate::models::{
    Doctor, MedicalRecord, Patient, Payment, PaymentMethod, PaymentStatus, Specialization,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPatient {
    pub full_name: String,
    pub age: i64,
    pub gender: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewDoctor {
    pub doctor_name: String,
    pub email: String,
    pub qualifications: String,
    pub years_of_experience: i64,
    pub consultation_fee: f64,
    pub specialization_id: i64,
    pub available_days: Vec<String>,
    pub image: Option<String>,
}

/// Full-profile doctor edit; `available_days` is replaced wholesale.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DoctorUpdate {
    pub doctor_name: String,
    pub email: String,
    pub qualifications: String,
    pub years_of_experience: i64,
    pub consultation_fee: f64,
    pub specialization_id: i64,
    pub available_days: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewSpecialization {
    pub specialization_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub common_conditions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPayment {
    pub patient_id: i64,
    pub appointment_id: Option<i64>,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub transaction_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewMedicalRecord {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub diagnosis: String,
    pub treatment: Option<String>,
}

/// Durable-record operations over the shared pool.
#[derive(Clone)]
pub struct EntityStore {
    pool: SqlitePool,
}

impl EntityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Patients
    // ------------------------------------------------------------------

    pub async fn create_patient(&self, req: NewPatient) -> HmsResult<Patient> {
        if req.full_name.trim().is_empty() {
            return Err(HmsError::validation("full_name", "full_name is required"));
        }
        if req.email.trim().is_empty() {
            return Err(HmsError::validation("email", "email is required"));
        }
        if req.age < 0 {
            return Err(HmsError::validation("age", "age cannot be negative"));
        }

        let result = sqlx::query(
            "INSERT INTO patients (full_name, age, gender, email, phone_number, address, image, is_archived, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(req.full_name.trim())
        .bind(req.age)
        .bind(req.gender.trim())
        .bind(req.email.trim())
        .bind(&req.phone_number)
        .bind(&req.address)
        .bind(&req.image)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HmsError::conflict("A patient with this email already exists.")
            } else {
                e.into()
            }
        })?;

        self.patient(result.last_insert_rowid()).await
    }

    pub async fn patient(&self, id: i64) -> HmsResult<Patient> {
        sqlx::query_as::<_, Patient>(
            "SELECT id, full_name, age, gender, email, phone_number, address, image, is_archived, created_at
             FROM patients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Patient"))
    }

    pub async fn archive_patient(&self, id: i64) -> HmsResult<()> {
        self.archive_row("patients", "Patient", id).await
    }

    // ------------------------------------------------------------------
    // Doctors
    // ------------------------------------------------------------------

    pub async fn create_doctor(&self, req: NewDoctor) -> HmsResult<Doctor> {
        if req.doctor_name.trim().is_empty() {
            return Err(HmsError::validation("doctor_name", "doctor_name is required"));
        }
        if req.available_days.is_empty() {
            return Err(HmsError::validation(
                "available_days",
                "at least one available day is required",
            ));
        }
        if req.years_of_experience < 0 {
            return Err(HmsError::validation(
                "years_of_experience",
                "years_of_experience cannot be negative",
            ));
        }
        if req.consultation_fee < 0.0 {
            return Err(HmsError::validation(
                "consultation_fee",
                "consultation_fee cannot be negative",
            ));
        }

        let mut tx = self.pool.begin().await?;

        let specialization_exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM specializations WHERE id = ? AND is_archived = 0)",
        )
        .bind(req.specialization_id)
        .fetch_one(&mut *tx)
        .await?;
        if specialization_exists == 0 {
            return Err(HmsError::not_found("Specialization"));
        }

        let result = sqlx::query(
            "INSERT INTO doctors (doctor_name, email, qualifications, years_of_experience, consultation_fee, specialization_id, image, is_archived, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(req.doctor_name.trim())
        .bind(req.email.trim())
        .bind(req.qualifications.trim())
        .bind(req.years_of_experience)
        .bind(req.consultation_fee)
        .bind(req.specialization_id)
        .bind(&req.image)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HmsError::conflict("A doctor with this email already exists.")
            } else {
                HmsError::from(e)
            }
        })?;
        let doctor_id = result.last_insert_rowid();

        for (position, day) in req.available_days.iter().enumerate() {
            sqlx::query(
                "INSERT INTO doctor_available_days (doctor_id, day_of_week, position) VALUES (?, ?, ?)",
            )
            .bind(doctor_id)
            .bind(day.trim())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.doctor(doctor_id).await
    }

    pub async fn doctor(&self, id: i64) -> HmsResult<Doctor> {
        sqlx::query_as::<_, Doctor>(
            "SELECT id, doctor_name, email, qualifications, years_of_experience, consultation_fee, specialization_id, image, is_archived, created_at
             FROM doctors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Doctor"))
    }

    /// Rewrites a doctor's profile and resyncs their available days.
    pub async fn update_doctor(&self, id: i64, req: DoctorUpdate) -> HmsResult<Doctor> {
        if req.doctor_name.trim().is_empty() {
            return Err(HmsError::validation("doctor_name", "doctor_name is required"));
        }
        if req.available_days.is_empty() {
            return Err(HmsError::validation(
                "available_days",
                "at least one available day is required",
            ));
        }
        if req.years_of_experience < 0 {
            return Err(HmsError::validation(
                "years_of_experience",
                "years_of_experience cannot be negative",
            ));
        }
        if req.consultation_fee < 0.0 {
            return Err(HmsError::validation(
                "consultation_fee",
                "consultation_fee cannot be negative",
            ));
        }

        let current = self.doctor(id).await?;
        if current.is_archived {
            return Err(HmsError::conflict("Cannot edit an archived doctor."));
        }

        let specialization_exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM specializations WHERE id = ? AND is_archived = 0)",
        )
        .bind(req.specialization_id)
        .fetch_one(&self.pool)
        .await?;
        if specialization_exists == 0 {
            return Err(HmsError::not_found("Specialization"));
        }

        sqlx::query(
            "UPDATE doctors SET doctor_name = ?, email = ?, qualifications = ?, years_of_experience = ?, consultation_fee = ?, specialization_id = ?, image = ?
             WHERE id = ?",
        )
        .bind(req.doctor_name.trim())
        .bind(req.email.trim())
        .bind(req.qualifications.trim())
        .bind(req.years_of_experience)
        .bind(req.consultation_fee)
        .bind(req.specialization_id)
        .bind(&req.image)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HmsError::conflict("A doctor with this email already exists.")
            } else {
                HmsError::from(e)
            }
        })?;

        self.set_available_days(id, &req.available_days).await?;
        self.doctor(id).await
    }

    /// Replaces a doctor's available weekdays wholesale, preserving order.
    pub async fn set_available_days(&self, doctor_id: i64, days: &[String]) -> HmsResult<()> {
        if days.is_empty() {
            return Err(HmsError::validation(
                "available_days",
                "at least one available day is required",
            ));
        }
        self.doctor(doctor_id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM doctor_available_days WHERE doctor_id = ?")
            .bind(doctor_id)
            .execute(&mut *tx)
            .await?;
        for (position, day) in days.iter().enumerate() {
            sqlx::query(
                "INSERT INTO doctor_available_days (doctor_id, day_of_week, position) VALUES (?, ?, ?)",
            )
            .bind(doctor_id)
            .bind(day.trim())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn available_days(&self, doctor_id: i64) -> HmsResult<Vec<String>> {
        let days = sqlx::query_scalar::<_, String>(
            "SELECT day_of_week FROM doctor_available_days WHERE doctor_id = ? ORDER BY position",
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(days)
    }

    pub async fn archive_doctor(&self, id: i64) -> HmsResult<()> {
        self.archive_row("doctors", "Doctor", id).await
    }

    // ------------------------------------------------------------------
    // Specializations
    // ------------------------------------------------------------------

    pub async fn create_specialization(&self, req: NewSpecialization) -> HmsResult<Specialization> {
        if req.specialization_name.trim().is_empty() {
            return Err(HmsError::validation(
                "specialization_name",
                "specialization_name is required",
            ));
        }

        let result = sqlx::query(
            "INSERT INTO specializations (specialization_name, description, common_conditions, is_archived, created_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(req.specialization_name.trim())
        .bind(&req.description)
        .bind(Json(&req.common_conditions))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.specialization(result.last_insert_rowid()).await
    }

    pub async fn specialization(&self, id: i64) -> HmsResult<Specialization> {
        sqlx::query_as::<_, Specialization>(
            "SELECT id, specialization_name, description, common_conditions, is_archived, created_at
             FROM specializations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Specialization"))
    }

    pub async fn archive_specialization(&self, id: i64) -> HmsResult<()> {
        self.archive_row("specializations", "Specialization", id).await
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn create_payment(&self, req: NewPayment) -> HmsResult<Payment> {
        if req.amount <= 0.0 {
            return Err(HmsError::validation("amount", "amount must be positive"));
        }
        self.patient(req.patient_id).await?;
        if let Some(appointment_id) = req.appointment_id {
            let exists: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM appointments WHERE id = ?)")
                    .bind(appointment_id)
                    .fetch_one(&self.pool)
                    .await?;
            if exists == 0 {
                return Err(HmsError::not_found("Appointment"));
            }
        }

        let result = sqlx::query(
            "INSERT INTO payments (patient_id, appointment_id, amount, payment_method, payment_status, transaction_date, is_archived, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(req.patient_id)
        .bind(req.appointment_id)
        .bind(req.amount)
        .bind(req.payment_method)
        .bind(PaymentStatus::Pending)
        .bind(req.transaction_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.payment(result.last_insert_rowid()).await
    }

    pub async fn payment(&self, id: i64) -> HmsResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "SELECT id, patient_id, appointment_id, amount, payment_method, payment_status, transaction_date, payment_date, is_archived, created_at
             FROM payments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Payment"))
    }

    /// Confirms a pending payment as Paid.
    ///
    /// One-way transition: archived and already-Paid payments are rejected.
    /// When the payment is tied to an appointment, the appointment's
    /// `is_paid` flag is set in the same transaction.
    pub async fn confirm_payment(&self, id: i64) -> HmsResult<Payment> {
        let payment = self.payment(id).await?;

        if payment.is_archived {
            return Err(HmsError::conflict("Cannot confirm an archived payment."));
        }
        if payment.payment_status == PaymentStatus::Paid {
            return Err(HmsError::conflict(
                "This payment has already been confirmed as Paid.",
            ));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE payments SET payment_status = ?, payment_date = ? WHERE id = ?")
            .bind(PaymentStatus::Paid)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(appointment_id) = payment.appointment_id {
            sqlx::query("UPDATE appointments SET is_paid = 1 WHERE id = ?")
                .bind(appointment_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(payment_id = id, "payment confirmed");
        self.payment(id).await
    }

    pub async fn archive_payment(&self, id: i64) -> HmsResult<()> {
        self.archive_row("payments", "Payment", id).await
    }

    // ------------------------------------------------------------------
    // Medical records
    // ------------------------------------------------------------------

    pub async fn create_medical_record(&self, req: NewMedicalRecord) -> HmsResult<MedicalRecord> {
        if req.diagnosis.trim().is_empty() {
            return Err(HmsError::validation("diagnosis", "diagnosis is required"));
        }
        let appointment_exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM appointments WHERE id = ?)")
                .bind(req.appointment_id)
                .fetch_one(&self.pool)
                .await?;
        if appointment_exists == 0 {
            return Err(HmsError::not_found("Appointment"));
        }
        self.patient(req.patient_id).await?;
        self.doctor(req.doctor_id).await?;

        let result = sqlx::query(
            "INSERT INTO medical_records (appointment_id, patient_id, doctor_id, blood_pressure, heart_rate, temperature, weight, diagnosis, treatment, is_archived, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(req.appointment_id)
        .bind(req.patient_id)
        .bind(req.doctor_id)
        .bind(&req.blood_pressure)
        .bind(req.heart_rate)
        .bind(req.temperature)
        .bind(req.weight)
        .bind(req.diagnosis.trim())
        .bind(&req.treatment)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.medical_record(result.last_insert_rowid()).await
    }

    pub async fn medical_record(&self, id: i64) -> HmsResult<MedicalRecord> {
        sqlx::query_as::<_, MedicalRecord>(
            "SELECT id, appointment_id, patient_id, doctor_id, blood_pressure, heart_rate, temperature, weight, diagnosis, treatment, is_archived, created_at
             FROM medical_records WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Medical record"))
    }

    pub async fn archive_medical_record(&self, id: i64) -> HmsResult<()> {
        self.archive_row("medical_records", "Medical record", id).await
    }

    // ------------------------------------------------------------------

    async fn archive_row(&self, table: &str, entity: &str, id: i64) -> HmsResult<()> {
        let result = sqlx::query(&format!("UPDATE {table} SET is_archived = 1 WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HmsError::not_found(entity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    pub(crate) async fn seed_specialization(store: &EntityStore) -> Specialization {
        store
            .create_specialization(NewSpecialization {
                specialization_name: "Cardiology".into(),
                description: Some("Heart and vessels".into()),
                common_conditions: vec!["Hypertension".into(), "Arrhythmia".into()],
            })
            .await
            .expect("specialization should be created")
    }

    #[tokio::test]
    async fn doctor_days_are_ordered_and_replaced_wholesale() {
        let store = EntityStore::new(test_pool().await);
        let spec = seed_specialization(&store).await;
        let doctor = store
            .create_doctor(NewDoctor {
                doctor_name: "Dr. Reyes".into(),
                email: "reyes@clinic.test".into(),
                qualifications: "MD".into(),
                years_of_experience: 12,
                consultation_fee: 500.0,
                specialization_id: spec.id,
                available_days: vec!["Monday".into(), "Wednesday".into()],
                image: None,
            })
            .await
            .unwrap();

        assert_eq!(
            store.available_days(doctor.id).await.unwrap(),
            vec!["Monday", "Wednesday"]
        );

        store
            .set_available_days(doctor.id, &["Friday".into(), "Monday".into()])
            .await
            .unwrap();
        assert_eq!(
            store.available_days(doctor.id).await.unwrap(),
            vec!["Friday", "Monday"]
        );
    }

    #[tokio::test]
    async fn update_doctor_rewrites_profile_and_days() {
        let store = EntityStore::new(test_pool().await);
        let spec = seed_specialization(&store).await;
        let doctor = store
            .create_doctor(NewDoctor {
                doctor_name: "Dr. Reyes".into(),
                email: "reyes@clinic.test".into(),
                qualifications: "MD".into(),
                years_of_experience: 12,
                consultation_fee: 500.0,
                specialization_id: spec.id,
                available_days: vec!["Monday".into()],
                image: None,
            })
            .await
            .unwrap();

        let update = DoctorUpdate {
            doctor_name: "Dr. Reyes-Cruz".into(),
            email: "reyes@clinic.test".into(),
            qualifications: "MD, FPCP".into(),
            years_of_experience: 13,
            consultation_fee: 550.0,
            specialization_id: spec.id,
            available_days: vec!["Friday".into(), "Saturday".into()],
            image: None,
        };
        let updated = store.update_doctor(doctor.id, update.clone()).await.unwrap();
        assert_eq!(updated.doctor_name, "Dr. Reyes-Cruz");
        assert_eq!(updated.consultation_fee, 550.0);
        assert_eq!(
            store.available_days(doctor.id).await.unwrap(),
            vec!["Friday", "Saturday"]
        );

        store.archive_doctor(doctor.id).await.unwrap();
        let err = store.update_doctor(doctor.id, update).await.unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn duplicate_patient_email_conflicts() {
        let store = EntityStore::new(test_pool().await);
        let req = NewPatient {
            full_name: "Ana Cruz".into(),
            age: 34,
            gender: "Female".into(),
            email: "ana@example.test".into(),
            phone_number: None,
            address: None,
            image: None,
        };
        store.create_patient(req.clone()).await.unwrap();
        let err = store.create_patient(req).await.unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn specialization_conditions_round_trip_as_list() {
        let store = EntityStore::new(test_pool().await);
        let spec = seed_specialization(&store).await;
        let fetched = store.specialization(spec.id).await.unwrap();
        assert_eq!(fetched.common_conditions.0, vec!["Hypertension", "Arrhythmia"]);
    }

    #[tokio::test]
    async fn confirm_payment_is_one_way() {
        let store = EntityStore::new(test_pool().await);
        let patient = store
            .create_patient(NewPatient {
                full_name: "Ben Ocampo".into(),
                age: 41,
                gender: "Male".into(),
                email: "ben@example.test".into(),
                phone_number: None,
                address: None,
                image: None,
            })
            .await
            .unwrap();

        let payment = store
            .create_payment(NewPayment {
                patient_id: patient.id,
                appointment_id: None,
                amount: 750.0,
                payment_method: PaymentMethod::Cash,
                transaction_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(payment.payment_status, PaymentStatus::Pending);

        let confirmed = store.confirm_payment(payment.id).await.unwrap();
        assert_eq!(confirmed.payment_status, PaymentStatus::Paid);
        assert!(confirmed.payment_date.is_some());

        let err = store.confirm_payment(payment.id).await.unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)));
    }

    #[tokio::test]
    async fn confirm_archived_payment_is_rejected() {
        let store = EntityStore::new(test_pool().await);
        let patient = store
            .create_patient(NewPatient {
                full_name: "Cara Lim".into(),
                age: 29,
                gender: "Female".into(),
                email: "cara@example.test".into(),
                phone_number: None,
                address: None,
                image: None,
            })
            .await
            .unwrap();
        let payment = store
            .create_payment(NewPayment {
                patient_id: patient.id,
                appointment_id: None,
                amount: 300.0,
                payment_method: PaymentMethod::Card,
                transaction_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            })
            .await
            .unwrap();

        store.archive_payment(payment.id).await.unwrap();
        let err = store.confirm_payment(payment.id).await.unwrap_err();
        assert!(matches!(err, HmsError::Conflict(_)));
    }
}
