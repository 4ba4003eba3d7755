use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::patient::{Patient, PatientStatus};
use crate::queue;

#[derive(Deserialize)]
pub struct PatientAction {
    patient_id: Option<i64>,
}

async fn fetch_patient(pool: &SqlitePool, patient_id: i64) -> Result<Option<Patient>, AppError> {
    sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
        .bind(patient_id)
        .fetch_optional(pool)
        .await
        .map_err(|err| {
            log::error!("Database error fetching patient {}: {:?}", patient_id, err);
            AppError::Database(err.to_string())
        })
}

/// Serves both `/status/{id}` and `/api/patient_status/{id}`. A served
/// patient reports position 0 and wait 0; a cancelled one reports a null
/// position.
pub async fn patient_status(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, actix_web::Error> {
    let patient_id = path.into_inner();
    let patient = fetch_patient(pool.get_ref(), patient_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    let (position, waiting_time): (Option<i64>, i64) = if patient.status == PatientStatus::Served {
        (Some(0), 0)
    } else {
        match queue::queue_position(pool.get_ref(), patient_id)
            .await
            .map_err(|err| AppError::Database(err.to_string()))?
        {
            Some(position) => {
                let waiting_time = queue::waiting_time(pool.get_ref(), &patient.department, position)
                    .await
                    .map_err(|err| AppError::Database(err.to_string()))?;
                (Some(position), waiting_time)
            }
            None => (None, 0),
        }
    };

    let queue_count = queue::waiting_count(pool.get_ref(), &patient.department)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;
    let crowd = queue::crowd_level(queue_count);

    Ok(HttpResponse::Ok().json(json!({
        "name": patient.name,
        "department": patient.department,
        "queue_number": patient.queue_number,
        "position": position,
        "waiting_time": waiting_time,
        "status": patient.status,
        "crowd_level": crowd.label(),
        "crowd_color": crowd.color(),
    })))
}

pub async fn leave_queue(
    pool: web::Data<SqlitePool>,
    payload: web::Json<PatientAction>,
) -> Result<HttpResponse, actix_web::Error> {
    let patient_id = payload
        .patient_id
        .ok_or_else(|| AppError::Validation("Patient ID required".to_string()))?;

    let patient = fetch_patient(pool.get_ref(), patient_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    if patient.status != PatientStatus::Waiting {
        return Err(AppError::InvalidState("Patient is not in queue".to_string()).into());
    }

    sqlx::query("UPDATE patients SET status = 'cancelled' WHERE id = ?")
        .bind(patient_id)
        .execute(pool.get_ref())
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("{} has left the queue for {}", patient.name, patient.department),
    })))
}

pub async fn mark_served(
    pool: web::Data<SqlitePool>,
    payload: web::Json<PatientAction>,
) -> Result<HttpResponse, actix_web::Error> {
    let patient_id = payload
        .patient_id
        .ok_or_else(|| AppError::Validation("Patient ID required".to_string()))?;

    let patient = fetch_patient(pool.get_ref(), patient_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    // Served and cancelled are terminal; only a waiting patient can be
    // marked served.
    if patient.status != PatientStatus::Waiting {
        return Err(AppError::InvalidState("Patient is not waiting".to_string()).into());
    }

    sqlx::query("UPDATE patients SET status = 'served' WHERE id = ?")
        .bind(patient_id)
        .execute(pool.get_ref())
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Patient {} marked as served", patient.name),
    })))
}
