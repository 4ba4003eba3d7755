pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod queue;
pub mod utils;

use actix_web::web;

/// Route table, shared between the server binary and integration tests.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/register")
            .route(web::get().to(handlers::register::list_departments))
            .route(web::post().to(handlers::register::register)),
    )
    .service(
        web::resource("/status/{id}")
            .route(web::get().to(handlers::patient::patient_status)),
    )
    .service(
        web::resource("/api/department_status")
            .route(web::get().to(handlers::dashboard::department_status)),
    )
    .service(
        web::resource("/api/hospital_overview")
            .route(web::get().to(handlers::dashboard::hospital_overview)),
    )
    .service(
        web::resource("/api/patient_status/{id}")
            .route(web::get().to(handlers::patient::patient_status)),
    )
    .service(
        web::resource("/api/leave_queue")
            .route(web::post().to(handlers::patient::leave_queue)),
    )
    .service(
        web::resource("/api/mark_served")
            .route(web::post().to(handlers::patient::mark_served)),
    );
}
