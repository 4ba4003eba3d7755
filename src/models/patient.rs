use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue lifecycle. `Served` and `Cancelled` are terminal; the only
/// permitted transitions are `Waiting -> Served` and `Waiting -> Cancelled`.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Waiting,
    Served,
    Cancelled,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub queue_number: i64,
    pub timestamp: DateTime<Utc>,
    pub status: PatientStatus,
}
