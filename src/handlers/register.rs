use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use validator::Validate;

use crate::errors::AppError;
use crate::models::department::Department;
use crate::queue;
use crate::utils;

/// Held across the next-queue-number read and the insert so that two
/// concurrent registrations cannot be assigned the same number.
pub type RegistrationLock = Mutex<()>;

#[derive(Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(min = 1, max = 100))]
    department: String,
}

pub async fn list_departments(
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|err| {
            log::error!("Database error listing departments: {:?}", err);
            AppError::Database(err.to_string())
        })?;

    Ok(HttpResponse::Ok().json(departments))
}

pub async fn register(
    pool: web::Data<SqlitePool>,
    lock: web::Data<RegistrationLock>,
    form: web::Form<RegistrationForm>,
) -> Result<HttpResponse, actix_web::Error> {
    utils::validation::validate_payload(&*form)?;

    let name = form.name.trim();
    let department = form.department.trim();
    if name.is_empty() || department.is_empty() {
        return Err(AppError::Validation("Name and department are required".to_string()).into());
    }

    sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE name = ?")
        .bind(department)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|err| AppError::Database(err.to_string()))?
        .ok_or_else(|| AppError::Validation("Invalid department".to_string()))?;

    let guard = lock.lock().await;
    let queue_number = queue::next_queue_number(pool.get_ref(), department)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;

    let result = sqlx::query(
        "INSERT INTO patients (name, department, queue_number, timestamp, status)
         VALUES (?, ?, ?, ?, 'waiting')",
    )
    .bind(name)
    .bind(department)
    .bind(queue_number)
    .bind(Utc::now())
    .execute(pool.get_ref())
    .await
    .map_err(|err| {
        log::error!("Database error during registration: {:?}", err);
        AppError::Database(err.to_string())
    })?;
    let patient_id = result.last_insert_rowid();
    drop(guard);

    let position = queue::queue_position(pool.get_ref(), patient_id)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?
        .unwrap_or(1);
    let waiting_time = queue::waiting_time(pool.get_ref(), department, position)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;

    let queue_count = queue::waiting_count(pool.get_ref(), department)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;
    let crowd = queue::crowd_level(queue_count);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "patient_id": patient_id,
        "queue_number": queue_number,
        "position": position,
        "waiting_time": waiting_time,
        "crowd_level": {
            "level": crowd.label(),
            "color": crowd.color(),
        }
    })))
}
