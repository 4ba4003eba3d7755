use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub average_service_time: i64,
    pub description: Option<String>,
}
