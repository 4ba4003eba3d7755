use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use hospital_queue_backend::handlers::register::RegistrationLock;
use hospital_queue_backend::{app_config, db};

async fn test_pool() -> SqlitePool {
    // One connection: every checkout of a multi-connection in-memory
    // pool would see a different empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_db(&pool).await.unwrap();
    pool
}

async fn test_app(
    pool: SqlitePool,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(RegistrationLock::new(())))
            .configure(app_config),
    )
    .await
}

async fn register(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    department: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("name", name), ("department", department)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success());
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn register_get_lists_seeded_departments() {
    let app = test_app(test_pool().await).await;

    let req = test::TestRequest::get().uri("/register").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let departments: Value = test::read_body_json(resp).await;
    let departments = departments.as_array().unwrap();
    assert_eq!(departments.len(), 5);
    assert_eq!(departments[0]["name"], "Doctor Consultation");
    assert_eq!(departments[0]["average_service_time"], 15);
}

#[actix_web::test]
async fn registration_assigns_positions_and_waits_in_order() {
    let app = test_app(test_pool().await).await;

    // Pharmacy has a 5-minute average service time.
    let alice = register(&app, "Alice", "Pharmacy / Medicine Pickup").await;
    assert_eq!(alice["success"], true);
    assert_eq!(alice["queue_number"], 1);
    assert_eq!(alice["position"], 1);
    assert_eq!(alice["waiting_time"], 0);
    assert_eq!(alice["crowd_level"]["level"], "Low");
    assert_eq!(alice["crowd_level"]["color"], "success");

    let bob = register(&app, "Bob", "Pharmacy / Medicine Pickup").await;
    assert_eq!(bob["queue_number"], 2);
    assert_eq!(bob["position"], 2);
    assert_eq!(bob["waiting_time"], 5);
}

#[actix_web::test]
async fn registration_rejects_missing_and_unknown_input() {
    let app = test_app(test_pool().await).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("name", "   "), ("department", "Doctor Consultation")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("name", "Alice"), ("department", "Dermatology")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid department");
}

#[actix_web::test]
async fn cancelling_promotes_the_next_patient_and_keeps_the_number_retired() {
    let app = test_app(test_pool().await).await;

    let alice = register(&app, "Alice", "Pharmacy / Medicine Pickup").await;
    let bob = register(&app, "Bob", "Pharmacy / Medicine Pickup").await;

    let req = test::TestRequest::post()
        .uri("/api/leave_queue")
        .set_json(json!({ "patient_id": alice["patient_id"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Alice has left the queue for Pharmacy / Medicine Pickup"
    );

    // Bob moves to the front.
    let uri = format!("/api/patient_status/{}", bob["patient_id"]);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["position"], 1);
    assert_eq!(status["waiting_time"], 0);

    // Alice is cancelled with a null position.
    let uri = format!("/api/patient_status/{}", alice["patient_id"]);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["status"], "cancelled");
    assert_eq!(status["position"], Value::Null);
    assert_eq!(status["waiting_time"], 0);

    // Alice's queue number 1 is never handed out again.
    let carol = register(&app, "Carol", "Pharmacy / Medicine Pickup").await;
    assert_eq!(carol["queue_number"], 3);
}

#[actix_web::test]
async fn served_patients_report_zero_position_and_wait() {
    let app = test_app(test_pool().await).await;

    let alice = register(&app, "Alice", "Blood Test / Laboratory").await;

    let req = test::TestRequest::post()
        .uri("/api/mark_served")
        .set_json(json!({ "patient_id": alice["patient_id"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Patient Alice marked as served");

    let uri = format!("/status/{}", alice["patient_id"]);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["status"], "served");
    assert_eq!(status["position"], 0);
    assert_eq!(status["waiting_time"], 0);
}

#[actix_web::test]
async fn terminal_states_reject_further_transitions() {
    let pool = test_pool().await;
    let app = test_app(pool.clone()).await;

    let alice = register(&app, "Alice", "Doctor Consultation").await;
    let patient_id = alice["patient_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/leave_queue")
        .set_json(json!({ "patient_id": patient_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    // Serving a cancelled patient fails and leaves the record untouched.
    let req = test::TestRequest::post()
        .uri("/api/mark_served")
        .set_json(json!({ "patient_id": patient_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let status: String = sqlx::query_scalar("SELECT status FROM patients WHERE id = ?")
        .bind(patient_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "cancelled");

    // Leaving twice fails the same way.
    let req = test::TestRequest::post()
        .uri("/api/leave_queue")
        .set_json(json!({ "patient_id": patient_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn queue_actions_validate_ids() {
    let app = test_app(test_pool().await).await;

    let req = test::TestRequest::post()
        .uri("/api/leave_queue")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Patient ID required");

    let req = test::TestRequest::post()
        .uri("/api/mark_served")
        .set_json(json!({ "patient_id": 9999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri("/api/patient_status/9999")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn department_status_reports_counts_and_estimates() {
    let app = test_app(test_pool().await).await;

    register(&app, "Alice", "Doctor Consultation").await;
    register(&app, "Bob", "Doctor Consultation").await;
    register(&app, "Carol", "Doctor Consultation").await;

    let req = test::TestRequest::get()
        .uri("/api/department_status")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let departments = body.as_array().unwrap();
    assert_eq!(departments.len(), 5);

    let doctor = departments
        .iter()
        .find(|d| d["name"] == "Doctor Consultation")
        .unwrap();
    assert_eq!(doctor["queue_count"], 3);
    assert_eq!(doctor["average_service_time"], 15);
    // 15 * 3 / 2, rounded to one decimal.
    assert_eq!(doctor["avg_waiting_time"], 22.5);
    assert_eq!(doctor["crowd_level"], "Low");
    assert_eq!(doctor["crowd_color"], "success");

    let pharmacy = departments
        .iter()
        .find(|d| d["name"] == "Pharmacy / Medicine Pickup")
        .unwrap();
    assert_eq!(pharmacy["queue_count"], 0);
    assert_eq!(pharmacy["avg_waiting_time"], 0.0);
}

#[actix_web::test]
async fn hospital_overview_excludes_cancelled_patients() {
    let app = test_app(test_pool().await).await;

    let alice = register(&app, "Alice", "Doctor Consultation").await;
    let bob = register(&app, "Bob", "Pharmacy / Medicine Pickup").await;
    register(&app, "Carol", "Blood Test / Laboratory").await;

    let req = test::TestRequest::post()
        .uri("/api/mark_served")
        .set_json(json!({ "patient_id": alice["patient_id"] }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/leave_queue")
        .set_json(json!({ "patient_id": bob["patient_id"] }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/hospital_overview")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_waiting"], 1);
    assert_eq!(body["total_served"], 1);
    assert_eq!(body["total_patients"], 2);
    assert_eq!(body["crowd_level"], "Low");
    assert_eq!(body["crowd_color"], "success");
}
