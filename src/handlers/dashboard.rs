use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::patient::PatientStatus;
use crate::queue;

#[derive(Serialize)]
struct DepartmentStatus {
    name: String,
    queue_count: i64,
    average_service_time: i64,
    avg_waiting_time: f64,
    crowd_level: &'static str,
    crowd_color: &'static str,
}

pub async fn department_status(
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|err| {
            log::error!("Database error listing departments: {:?}", err);
            AppError::Database(err.to_string())
        })?;

    let mut dept_data = Vec::with_capacity(departments.len());
    for dept in departments {
        let queue_count = queue::waiting_count(pool.get_ref(), &dept.name)
            .await
            .map_err(|err| AppError::Database(err.to_string()))?;

        let avg_waiting_time = queue::average_wait_estimate(dept.average_service_time, queue_count);
        let crowd = queue::crowd_level(queue_count);

        dept_data.push(DepartmentStatus {
            name: dept.name,
            queue_count,
            average_service_time: dept.average_service_time,
            avg_waiting_time: (avg_waiting_time * 10.0).round() / 10.0,
            crowd_level: crowd.label(),
            crowd_color: crowd.color(),
        });
    }

    Ok(HttpResponse::Ok().json(dept_data))
}

pub async fn hospital_overview(
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let total_waiting = queue::status_count(pool.get_ref(), PatientStatus::Waiting)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;
    let total_served = queue::status_count(pool.get_ref(), PatientStatus::Served)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;

    let crowd = queue::hospital_crowd_level(total_waiting);

    Ok(HttpResponse::Ok().json(json!({
        "total_waiting": total_waiting,
        "total_served": total_served,
        "total_patients": total_waiting + total_served,
        "crowd_level": crowd.label(),
        "crowd_color": crowd.color(),
    })))
}
