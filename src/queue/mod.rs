use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::department::Department;
use crate::models::patient::{Patient, PatientStatus};

/// Three-tier crowd classification. Purely cosmetic: each tier carries a
/// display color token used by the dashboard.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdLevel {
    Low,
    Moderate,
    High,
}

impl CrowdLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CrowdLevel::Low => "Low",
            CrowdLevel::Moderate => "Moderate",
            CrowdLevel::High => "High",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            CrowdLevel::Low => "success",
            CrowdLevel::Moderate => "warning",
            CrowdLevel::High => "danger",
        }
    }
}

/// Classify a single department's waiting count.
pub fn crowd_level(count: i64) -> CrowdLevel {
    if count <= 10 {
        CrowdLevel::Low
    } else if count <= 25 {
        CrowdLevel::Moderate
    } else {
        CrowdLevel::High
    }
}

/// Classify the hospital-wide waiting total.
pub fn hospital_crowd_level(total_count: i64) -> CrowdLevel {
    if total_count <= 40 {
        CrowdLevel::Low
    } else if total_count <= 80 {
        CrowdLevel::Moderate
    } else {
        CrowdLevel::High
    }
}

/// Coarse dashboard aggregate, distinct from the per-patient estimate:
/// average_service_time * waiting_count / 2, or 0 when the queue is empty.
pub fn average_wait_estimate(average_service_time: i64, waiting_count: i64) -> f64 {
    if waiting_count > 0 {
        average_service_time as f64 * waiting_count as f64 / 2.0
    } else {
        0.0
    }
}

/// Next queue number for a department: one past the highest number held
/// by a waiting patient, or 1 for an empty queue. Numbers of served and
/// cancelled patients are never reused because they stay in the table.
///
/// Read-then-write: callers that insert with the returned number must
/// hold the registration lock across the pair.
pub async fn next_queue_number(pool: &SqlitePool, department: &str) -> Result<i64, sqlx::Error> {
    let last: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(queue_number) FROM patients WHERE department = ? AND status = 'waiting'",
    )
    .bind(department)
    .fetch_one(pool)
    .await?;

    Ok(last.map_or(1, |n| n + 1))
}

/// Current position of a waiting patient: the count of waiting patients
/// ahead of them in the same department, plus 1. `None` when the patient
/// does not exist or is no longer waiting.
pub async fn queue_position(pool: &SqlitePool, patient_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
        .bind(patient_id)
        .fetch_optional(pool)
        .await?;

    let patient = match patient {
        Some(p) if p.status == PatientStatus::Waiting => p,
        _ => return Ok(None),
    };

    let ahead: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM patients
         WHERE department = ? AND status = 'waiting' AND queue_number < ?",
    )
    .bind(&patient.department)
    .bind(patient.queue_number)
    .fetch_one(pool)
    .await?;

    Ok(Some(ahead + 1))
}

/// Estimated wait for a given position: (position - 1) * average service
/// time. Position 1 waits 0. Unknown department yields 0.
pub async fn waiting_time(
    pool: &SqlitePool,
    department: &str,
    position: i64,
) -> Result<i64, sqlx::Error> {
    let dept = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE name = ?")
        .bind(department)
        .fetch_optional(pool)
        .await?;

    match dept {
        Some(dept) => Ok((position - 1) * dept.average_service_time),
        None => Ok(0),
    }
}

/// Count of waiting patients in one department.
pub async fn waiting_count(pool: &SqlitePool, department: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE department = ? AND status = 'waiting'")
        .bind(department)
        .fetch_one(pool)
        .await
}

/// Count of patients in a given status across the whole hospital.
pub async fn status_count(pool: &SqlitePool, status: PatientStatus) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE status = ?")
        .bind(status)
        .fetch_one(pool)
        .await
}
