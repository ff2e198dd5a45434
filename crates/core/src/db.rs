//! SQLite pool setup and schema management.
//!
//! The schema is applied statement-by-statement at startup; every statement
//! is idempotent (`IF NOT EXISTS`) so restarts are safe. The two partial
//! unique indexes on `appointments` are the storage-level guarantee behind
//! the booking-conflict rules: a slot can only be check-then-inserted once,
//! no matter how many requests race.

use crate::HmsResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS specializations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        specialization_name TEXT NOT NULL,
        description TEXT,
        common_conditions TEXT NOT NULL DEFAULT '[]',
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS doctors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        doctor_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT,
        qualifications TEXT NOT NULL,
        years_of_experience INTEGER NOT NULL,
        consultation_fee REAL NOT NULL,
        specialization_id INTEGER NOT NULL REFERENCES specializations(id),
        image TEXT,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS doctor_available_days (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        doctor_id INTEGER NOT NULL REFERENCES doctors(id),
        day_of_week TEXT NOT NULL,
        position INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT,
        phone_number TEXT,
        address TEXT,
        image TEXT,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    // AUTOINCREMENT ids are never reused, which keeps appointment numbers
    // monotonic with id even across archived rows.
    "CREATE TABLE IF NOT EXISTS appointments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        appointment_no TEXT UNIQUE,
        patient_id INTEGER NOT NULL REFERENCES patients(id),
        doctor_id INTEGER NOT NULL REFERENCES doctors(id),
        appointment_date TEXT NOT NULL,
        appointment_time TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending',
        reason_for_visit TEXT NOT NULL,
        notes TEXT,
        is_paid INTEGER NOT NULL DEFAULT 0,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_appointments_slot
        ON appointments (doctor_id, appointment_date, appointment_time)
        WHERE is_archived = 0",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_appointments_patient_day
        ON appointments (patient_id, appointment_date)
        WHERE is_archived = 0 AND status IN ('Pending', 'Approved')",
    "CREATE INDEX IF NOT EXISTS ix_appointments_date
        ON appointments (appointment_date)",
    "CREATE TABLE IF NOT EXISTS medical_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        appointment_id INTEGER NOT NULL REFERENCES appointments(id),
        patient_id INTEGER NOT NULL REFERENCES patients(id),
        doctor_id INTEGER NOT NULL REFERENCES doctors(id),
        blood_pressure TEXT,
        heart_rate INTEGER,
        temperature REAL,
        weight REAL,
        diagnosis TEXT NOT NULL,
        treatment TEXT,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        patient_id INTEGER NOT NULL REFERENCES patients(id),
        appointment_id INTEGER REFERENCES appointments(id),
        amount REAL NOT NULL,
        payment_method TEXT NOT NULL,
        payment_status TEXT NOT NULL DEFAULT 'Pending',
        transaction_date TEXT NOT NULL,
        payment_date TEXT,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
];

/// Opens a connection pool and applies the schema.
///
/// In-memory databases are capped at a single connection: each SQLite
/// `:memory:` connection is otherwise its own private database.
pub async fn connect(database_url: &str) -> HmsResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let max_connections = if in_memory { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Applies every schema statement. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> HmsResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:")
        .await
        .expect("in-memory pool should open")
}
