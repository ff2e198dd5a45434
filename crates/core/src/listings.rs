//! The query/listing layer: paginated, searchable, archive-filtered reads
//! over the collaborator entities, with display URLs attached for stored
//! image paths.
//!
//! Search is a case-insensitive substring match over each collection's
//! natural display fields. Archived rows are excluded from every list;
//! detail lookups by id are not archive-filtered, except payments, which
//! the original API hides once archived.

use crate::config::CoreConfig;
use crate::models::{PaymentMethod, PaymentStatus, Specialization};
use crate::scheduler::ListQuery;
use crate::{HmsError, HmsResult};
use api_shared::PageMeta;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;

/// A doctor as presented by the API: specialization resolved, available
/// days attached in order, image path turned into a display URL.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorProfile {
    pub id: i64,
    pub doctor_name: String,
    pub email: String,
    pub qualifications: String,
    pub years_of_experience: i64,
    pub consultation_fee: f64,
    pub specialization_id: i64,
    pub specialization_name: Option<String>,
    pub available_days: Vec<String>,
    pub image_url: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DoctorRow {
    id: i64,
    doctor_name: String,
    email: String,
    qualifications: String,
    years_of_experience: i64,
    consultation_fee: f64,
    specialization_id: i64,
    specialization_name: Option<String>,
    image: Option<String>,
    is_archived: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientProfile {
    pub id: i64,
    pub full_name: String,
    pub age: i64,
    pub gender: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_url: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct PatientRow {
    id: i64,
    full_name: String,
    age: i64,
    gender: String,
    email: String,
    phone_number: Option<String>,
    address: Option<String>,
    image: Option<String>,
    is_archived: bool,
    created_at: DateTime<Utc>,
}

/// A payment with its patient and appointment context resolved.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PaymentView {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: Option<String>,
    pub appointment_id: Option<i64>,
    pub appointment_date: Option<NaiveDate>,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_date: NaiveDate,
    pub payment_date: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MedicalRecordView {
    pub id: i64,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Read service over the collaborator collections.
#[derive(Clone)]
pub struct ListingService {
    pool: SqlitePool,
    cfg: CoreConfig,
}

impl ListingService {
    pub fn new(pool: SqlitePool, cfg: CoreConfig) -> Self {
        Self { pool, cfg }
    }

    // ------------------------------------------------------------------
    // Doctors
    // ------------------------------------------------------------------

    pub async fn doctors(&self, query: &ListQuery) -> HmsResult<(Vec<DoctorProfile>, PageMeta)> {
        let (page, per_page) = query.normalised();
        let pattern = query.like_pattern();

        let search_clause = if pattern.is_some() {
            " AND (LOWER(d.doctor_name) LIKE ?
               OR LOWER(d.qualifications) LIKE ?
               OR LOWER(COALESCE(s.specialization_name, '')) LIKE ?)"
        } else {
            ""
        };

        let count_sql = format!(
            "SELECT COUNT(*)
             FROM doctors d
             LEFT JOIN specializations s ON s.id = d.specialization_id
             WHERE d.is_archived = 0{search_clause}"
        );
        let total = self.count(&count_sql, pattern.as_deref(), 3).await?;

        let rows_sql = format!(
            "SELECT d.id, d.doctor_name, d.email, d.qualifications, d.years_of_experience,
                    d.consultation_fee, d.specialization_id, s.specialization_name,
                    d.image, d.is_archived, d.created_at
             FROM doctors d
             LEFT JOIN specializations s ON s.id = d.specialization_id
             WHERE d.is_archived = 0{search_clause}
             ORDER BY d.created_at DESC, d.id DESC
             LIMIT ? OFFSET ?"
        );
        let mut rows_query = sqlx::query_as::<_, DoctorRow>(&rows_sql);
        if let Some(ref pattern) = pattern {
            for _ in 0..3 {
                rows_query = rows_query.bind(pattern.clone());
            }
        }
        let rows = rows_query
            .bind(i64::from(per_page))
            .bind(i64::from(page - 1) * i64::from(per_page))
            .fetch_all(&self.pool)
            .await?;

        let mut profiles = Vec::with_capacity(rows.len());
        for row in rows {
            profiles.push(self.doctor_profile(row).await?);
        }
        Ok((profiles, PageMeta::new(page, per_page, total)))
    }

    pub async fn doctor(&self, id: i64) -> HmsResult<DoctorProfile> {
        let row = sqlx::query_as::<_, DoctorRow>(
            "SELECT d.id, d.doctor_name, d.email, d.qualifications, d.years_of_experience,
                    d.consultation_fee, d.specialization_id, s.specialization_name,
                    d.image, d.is_archived, d.created_at
             FROM doctors d
             LEFT JOIN specializations s ON s.id = d.specialization_id
             WHERE d.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Doctor"))?;
        self.doctor_profile(row).await
    }

    async fn doctor_profile(&self, row: DoctorRow) -> HmsResult<DoctorProfile> {
        let available_days = sqlx::query_scalar::<_, String>(
            "SELECT day_of_week FROM doctor_available_days WHERE doctor_id = ? ORDER BY position",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(DoctorProfile {
            id: row.id,
            doctor_name: row.doctor_name,
            email: row.email,
            qualifications: row.qualifications,
            years_of_experience: row.years_of_experience,
            consultation_fee: row.consultation_fee,
            specialization_id: row.specialization_id,
            specialization_name: row.specialization_name,
            available_days,
            image_url: self.cfg.image_url(row.image.as_deref()),
            is_archived: row.is_archived,
            created_at: row.created_at,
        })
    }

    // ------------------------------------------------------------------
    // Patients
    // ------------------------------------------------------------------

    pub async fn patients(&self, query: &ListQuery) -> HmsResult<(Vec<PatientProfile>, PageMeta)> {
        let (page, per_page) = query.normalised();
        let pattern = query.like_pattern();

        let search_clause = if pattern.is_some() {
            " AND (LOWER(full_name) LIKE ?
               OR LOWER(email) LIKE ?
               OR LOWER(COALESCE(phone_number, '')) LIKE ?)"
        } else {
            ""
        };

        let count_sql =
            format!("SELECT COUNT(*) FROM patients WHERE is_archived = 0{search_clause}");
        let total = self.count(&count_sql, pattern.as_deref(), 3).await?;

        let rows_sql = format!(
            "SELECT id, full_name, age, gender, email, phone_number, address, image, is_archived, created_at
             FROM patients
             WHERE is_archived = 0{search_clause}
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?"
        );
        let mut rows_query = sqlx::query_as::<_, PatientRow>(&rows_sql);
        if let Some(ref pattern) = pattern {
            for _ in 0..3 {
                rows_query = rows_query.bind(pattern.clone());
            }
        }
        let rows = rows_query
            .bind(i64::from(per_page))
            .bind(i64::from(page - 1) * i64::from(per_page))
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows.into_iter().map(|r| self.patient_profile(r)).collect();
        Ok((profiles, PageMeta::new(page, per_page, total)))
    }

    pub async fn patient(&self, id: i64) -> HmsResult<PatientProfile> {
        let row = sqlx::query_as::<_, PatientRow>(
            "SELECT id, full_name, age, gender, email, phone_number, address, image, is_archived, created_at
             FROM patients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Patient"))?;
        Ok(self.patient_profile(row))
    }

    fn patient_profile(&self, row: PatientRow) -> PatientProfile {
        PatientProfile {
            id: row.id,
            full_name: row.full_name,
            age: row.age,
            gender: row.gender,
            email: row.email,
            phone_number: row.phone_number,
            address: row.address,
            image_url: self.cfg.image_url(row.image.as_deref()),
            is_archived: row.is_archived,
            created_at: row.created_at,
        }
    }

    // ------------------------------------------------------------------
    // Specializations
    // ------------------------------------------------------------------

    pub async fn specializations(
        &self,
        query: &ListQuery,
    ) -> HmsResult<(Vec<Specialization>, PageMeta)> {
        let (page, per_page) = query.normalised();
        let pattern = query.like_pattern();

        let search_clause = if pattern.is_some() {
            " AND (LOWER(specialization_name) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ?)"
        } else {
            ""
        };

        let count_sql =
            format!("SELECT COUNT(*) FROM specializations WHERE is_archived = 0{search_clause}");
        let total = self.count(&count_sql, pattern.as_deref(), 2).await?;

        let rows_sql = format!(
            "SELECT id, specialization_name, description, common_conditions, is_archived, created_at
             FROM specializations
             WHERE is_archived = 0{search_clause}
             ORDER BY specialization_name ASC
             LIMIT ? OFFSET ?"
        );
        let mut rows_query = sqlx::query_as::<_, Specialization>(&rows_sql);
        if let Some(ref pattern) = pattern {
            for _ in 0..2 {
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

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn payments(&self, query: &ListQuery) -> HmsResult<(Vec<PaymentView>, PageMeta)> {
        let (page, per_page) = query.normalised();
        let pattern = query.like_pattern();

        let search_clause = if pattern.is_some() {
            " AND (LOWER(COALESCE(pt.full_name, '')) LIKE ?
               OR COALESCE(a.appointment_date, '') LIKE ?
               OR CAST(p.amount AS TEXT) LIKE ?
               OR LOWER(p.payment_status) LIKE ?)"
        } else {
            ""
        };

        let count_sql = format!(
            "SELECT COUNT(*)
             FROM payments p
             LEFT JOIN patients pt ON pt.id = p.patient_id
             LEFT JOIN appointments a ON a.id = p.appointment_id
             WHERE p.is_archived = 0{search_clause}"
        );
        let total = self.count(&count_sql, pattern.as_deref(), 4).await?;

        let rows_sql = format!(
            "SELECT p.id, p.patient_id, pt.full_name AS patient_name,
                    p.appointment_id, a.appointment_date,
                    p.amount, p.payment_method, p.payment_status,
                    p.transaction_date, p.payment_date, p.is_archived, p.created_at
             FROM payments p
             LEFT JOIN patients pt ON pt.id = p.patient_id
             LEFT JOIN appointments a ON a.id = p.appointment_id
             WHERE p.is_archived = 0{search_clause}
             ORDER BY p.transaction_date DESC, p.id DESC
             LIMIT ? OFFSET ?"
        );
        let mut rows_query = sqlx::query_as::<_, PaymentView>(&rows_sql);
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

    /// Payment detail. Archived payments are hidden here, unlike the other
    /// entities' detail lookups.
    pub async fn payment(&self, id: i64) -> HmsResult<PaymentView> {
        sqlx::query_as::<_, PaymentView>(
            "SELECT p.id, p.patient_id, pt.full_name AS patient_name,
                    p.appointment_id, a.appointment_date,
                    p.amount, p.payment_method, p.payment_status,
                    p.transaction_date, p.payment_date, p.is_archived, p.created_at
             FROM payments p
             LEFT JOIN patients pt ON pt.id = p.patient_id
             LEFT JOIN appointments a ON a.id = p.appointment_id
             WHERE p.id = ? AND p.is_archived = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::NotFound("Payment record not found or archived.".into()))
    }

    // ------------------------------------------------------------------
    // Medical records
    // ------------------------------------------------------------------

    pub async fn medical_records(
        &self,
        query: &ListQuery,
    ) -> HmsResult<(Vec<MedicalRecordView>, PageMeta)> {
        let (page, per_page) = query.normalised();
        let pattern = query.like_pattern();

        let search_clause = if pattern.is_some() {
            " AND (LOWER(COALESCE(pt.full_name, '')) LIKE ?
               OR LOWER(COALESCE(d.doctor_name, '')) LIKE ?
               OR LOWER(m.diagnosis) LIKE ?)"
        } else {
            ""
        };

        let count_sql = format!(
            "SELECT COUNT(*)
             FROM medical_records m
             LEFT JOIN patients pt ON pt.id = m.patient_id
             LEFT JOIN doctors d ON d.id = m.doctor_id
             WHERE m.is_archived = 0{search_clause}"
        );
        let total = self.count(&count_sql, pattern.as_deref(), 3).await?;

        let rows_sql = format!(
            "SELECT m.id, m.appointment_id, m.patient_id, m.doctor_id,
                    pt.full_name AS patient_name, d.doctor_name,
                    m.blood_pressure, m.heart_rate, m.temperature, m.weight,
                    m.diagnosis, m.treatment, m.is_archived, m.created_at
             FROM medical_records m
             LEFT JOIN patients pt ON pt.id = m.patient_id
             LEFT JOIN doctors d ON d.id = m.doctor_id
             WHERE m.is_archived = 0{search_clause}
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT ? OFFSET ?"
        );
        let mut rows_query = sqlx::query_as::<_, MedicalRecordView>(&rows_sql);
        if let Some(ref pattern) = pattern {
            for _ in 0..3 {
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

    pub async fn medical_record(&self, id: i64) -> HmsResult<MedicalRecordView> {
        sqlx::query_as::<_, MedicalRecordView>(
            "SELECT m.id, m.appointment_id, m.patient_id, m.doctor_id,
                    pt.full_name AS patient_name, d.doctor_name,
                    m.blood_pressure, m.heart_rate, m.temperature, m.weight,
                    m.diagnosis, m.treatment, m.is_archived, m.created_at
             FROM medical_records m
             LEFT JOIN patients pt ON pt.id = m.patient_id
             LEFT JOIN doctors d ON d.id = m.doctor_id
             WHERE m.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HmsError::not_found("Medical record"))
    }

    // ------------------------------------------------------------------

    async fn count(&self, sql: &str, pattern: Option<&str>, binds: usize) -> HmsResult<u64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        if let Some(pattern) = pattern {
            for _ in 0..binds {
                query = query.bind(pattern.to_owned());
            }
        }
        Ok(query.fetch_one(&self.pool).await? as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_IMAGE_URL;
    use crate::db::test_pool;
    use crate::store::{EntityStore, NewDoctor, NewPatient, NewSpecialization};

    fn test_cfg() -> CoreConfig {
        CoreConfig::new("sqlite::memory:".into(), "/storage".into()).unwrap()
    }

    async fn seed(store: &EntityStore) -> (i64, i64) {
        let spec = store
            .create_specialization(NewSpecialization {
                specialization_name: "Pediatrics".into(),
                description: Some("Children's medicine".into()),
                common_conditions: vec!["Asthma".into()],
            })
            .await
            .unwrap();
        let doctor = store
            .create_doctor(NewDoctor {
                doctor_name: "Dr. Navarro".into(),
                email: "navarro@clinic.test".into(),
                qualifications: "MD, DPPS".into(),
                years_of_experience: 15,
                consultation_fee: 800.0,
                specialization_id: spec.id,
                available_days: vec!["Monday".into(), "Thursday".into()],
                image: Some("doctors/navarro.png".into()),
            })
            .await
            .unwrap();
        (spec.id, doctor.id)
    }

    #[tokio::test]
    async fn doctor_listing_resolves_specialization_days_and_image() {
        let pool = test_pool().await;
        let store = EntityStore::new(pool.clone());
        let (_, doctor_id) = seed(&store).await;

        let listings = ListingService::new(pool, test_cfg());
        let (doctors, meta) = listings.doctors(&ListQuery::default()).await.unwrap();
        assert_eq!(meta.total, 1);
        let profile = &doctors[0];
        assert_eq!(profile.id, doctor_id);
        assert_eq!(profile.specialization_name.as_deref(), Some("Pediatrics"));
        assert_eq!(profile.available_days, vec!["Monday", "Thursday"]);
        assert_eq!(profile.image_url, "/storage/doctors/navarro.png");
    }

    #[tokio::test]
    async fn missing_image_gets_placeholder_url() {
        let pool = test_pool().await;
        let store = EntityStore::new(pool.clone());
        store
            .create_patient(NewPatient {
                full_name: "Mia Flores".into(),
                age: 30,
                gender: "Female".into(),
                email: "mia@example.test".into(),
                phone_number: None,
                address: None,
                image: None,
            })
            .await
            .unwrap();

        let listings = ListingService::new(pool, test_cfg());
        let (patients, _) = listings.patients(&ListQuery::default()).await.unwrap();
        assert_eq!(patients[0].image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[tokio::test]
    async fn archived_rows_are_hidden_from_lists() {
        let pool = test_pool().await;
        let store = EntityStore::new(pool.clone());
        let (_, doctor_id) = seed(&store).await;
        store.archive_doctor(doctor_id).await.unwrap();

        let listings = ListingService::new(pool, test_cfg());
        let (doctors, meta) = listings.doctors(&ListQuery::default()).await.unwrap();
        assert!(doctors.is_empty());
        assert_eq!(meta.total, 0);

        // Detail lookup still resolves the archived doctor.
        let profile = listings.doctor(doctor_id).await.unwrap();
        assert!(profile.is_archived);
    }

    #[tokio::test]
    async fn doctor_search_matches_specialization() {
        let pool = test_pool().await;
        let store = EntityStore::new(pool.clone());
        seed(&store).await;

        let listings = ListingService::new(pool, test_cfg());
        let query = ListQuery {
            search: Some("pedia".into()),
            ..ListQuery::default()
        };
        let (doctors, _) = listings.doctors(&query).await.unwrap();
        assert_eq!(doctors.len(), 1);

        let query = ListQuery {
            search: Some("oncology".into()),
            ..ListQuery::default()
        };
        let (doctors, _) = listings.doctors(&query).await.unwrap();
        assert!(doctors.is_empty());
    }

    #[tokio::test]
    async fn pagination_pages_through_patients() {
        let pool = test_pool().await;
        let store = EntityStore::new(pool.clone());
        for i in 0..7 {
            store
                .create_patient(NewPatient {
                    full_name: format!("Patient {i}"),
                    age: 20 + i,
                    gender: "Other".into(),
                    email: format!("p{i}@example.test"),
                    phone_number: None,
                    address: None,
                    image: None,
                })
                .await
                .unwrap();
        }

        let listings = ListingService::new(pool, test_cfg());
        let query = ListQuery {
            search: None,
            page: 2,
            per_page: 3,
        };
        let (patients, meta) = listings.patients(&query).await.unwrap();
        assert_eq!(patients.len(), 3);
        assert_eq!(meta.total, 7);
        assert_eq!(meta.last_page, 3);
        assert!(meta.has_more_pages);

        // A page far past the end is an empty page, not an error.
        let far = ListQuery {
            search: None,
            page: u32::MAX,
            per_page: 100,
        };
        let (rows, meta) = listings.patients(&far).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(meta.total, 7);
    }
}
