use log::info;
use sqlx::SqlitePool;
use std::env;

/// Seed data for the department catalog, inserted once when the table
/// is empty. Service times are in minutes.
const DEFAULT_DEPARTMENTS: [(&str, i64, &str); 5] = [
    ("Doctor Consultation", 15, "General physician consultation"),
    ("Pharmacy / Medicine Pickup", 5, "Collect prescribed medicines"),
    ("Blood Test / Laboratory", 10, "Blood tests and lab work"),
    ("Radiology / Scanning (X-ray, MRI, CT)", 20, "Medical imaging services"),
    ("Medical Report Collection", 3, "Collect test reports and documents"),
];

pub async fn create_pool() -> SqlitePool {
    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://hospital_queue.db?mode=rwc".to_string());
    SqlitePool::connect(&database_url)
        .await
        .expect("Failed to connect to the database")
}

/// Creates both tables if absent and seeds the default departments.
/// Idempotent: a non-empty catalog is left untouched.
pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            average_service_time INTEGER NOT NULL,
            description TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            department TEXT NOT NULL,
            queue_number INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'waiting'
        )",
    )
    .execute(pool)
    .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM departments")
        .fetch_one(pool)
        .await?;

    if count == 0 {
        for (name, average_service_time, description) in DEFAULT_DEPARTMENTS {
            sqlx::query(
                "INSERT INTO departments (name, average_service_time, description) VALUES (?, ?, ?)",
            )
            .bind(name)
            .bind(average_service_time)
            .bind(description)
            .execute(pool)
            .await?;
        }
        info!("Database initialized with default departments");
    }

    Ok(())
}
