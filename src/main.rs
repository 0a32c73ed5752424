use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use payroll_be::database::init_database;
use payroll_be::handlers::{billing, employees, payroll};
use payroll_be::{BillingRepository, Config, EmployeeRepository, PayrollRepository};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Payroll API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Initialize repositories
    let employee_repository = EmployeeRepository::new(pool.clone());
    let payroll_repository = PayrollRepository::new(pool.clone());
    let billing_repository = BillingRepository::new(pool.clone());

    let employee_repo_data = web::Data::new(employee_repository);
    let payroll_repo_data = web::Data::new(payroll_repository);
    let billing_repo_data = web::Data::new(billing_repository);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(employee_repo_data.clone())
            .app_data(payroll_repo_data.clone())
            .app_data(billing_repo_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/employees")
                            .route("", web::post().to(employees::create_employee))
                            .route("", web::get().to(employees::get_employees))
                            .route("/{worker_id}", web::get().to(employees::get_employee)),
                    )
                    .service(
                        web::scope("/payroll")
                            .route("", web::post().to(payroll::create_payroll))
                            .route("", web::get().to(payroll::get_payrolls))
                            .route("/batch", web::post().to(payroll::batch_create_payroll))
                            .route("/summary", web::get().to(payroll::payroll_summary))
                            .route("/{id}", web::get().to(payroll::get_payroll))
                            .route("/{id}", web::put().to(payroll::update_payroll))
                            .route("/{id}", web::delete().to(payroll::delete_payroll))
                            .route("/{id}/restore", web::post().to(payroll::restore_payroll))
                            .route("/{id}/print", web::post().to(payroll::print_payroll)),
                    )
                    .service(
                        web::scope("/billing")
                            .route("", web::post().to(billing::create_billing))
                            .route("", web::get().to(billing::get_billings))
                            .route("/batch", web::post().to(billing::batch_create_billing))
                            .route("/summary", web::get().to(billing::billing_summary))
                            .route("/bulk-delete", web::post().to(billing::bulk_delete_billing))
                            .route("/{id}", web::get().to(billing::get_billing))
                            .route("/{id}", web::put().to(billing::update_billing))
                            .route("/{id}", web::delete().to(billing::delete_billing))
                            .route("/{id}/restore", web::post().to(billing::restore_billing))
                            .route("/{id}/print", web::post().to(billing::print_billing)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
