use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::database::models::EmployeeInput;
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    pub active: Option<bool>,
}

pub async fn create_employee(
    repo: web::Data<EmployeeRepository>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    if input.worker_id.trim().is_empty() {
        return Err(AppError::validation("workerId", "must not be empty"));
    }
    if input.national_id.trim().is_empty() {
        return Err(AppError::validation("nationalId", "must not be empty"));
    }

    let employee = repo.create(input).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(employee)))
}

pub async fn get_employees(
    repo: web::Data<EmployeeRepository>,
    query: web::Query<EmployeeListQuery>,
) -> Result<HttpResponse, AppError> {
    let employees = repo.list(query.active.unwrap_or(false)).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(employees)))
}

pub async fn get_employee(
    repo: web::Data<EmployeeRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let worker_id = path.into_inner();
    let employee = repo
        .find_by_worker_id(&worker_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Worker {} not found", worker_id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(employee)))
}
