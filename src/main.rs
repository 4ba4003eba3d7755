use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::env;

use hospital_queue_backend::handlers::register::RegistrationLock;
use hospital_queue_backend::{app_config, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let pool = db::create_pool().await;
    db::init_db(&pool)
        .await
        .expect("Failed to initialize the database");

    let registration_lock = web::Data::new(RegistrationLock::new(()));
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("Starting server at {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(registration_lock.clone())
            .configure(app_config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
