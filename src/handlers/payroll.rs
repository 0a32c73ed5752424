use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::config::Config;
use crate::database::models::{PayrollBatchRequest, PayrollFilter, PayrollInput};
use crate::database::repositories::{EmployeeRepository, PayrollRepository};
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, Paged};

pub async fn create_payroll(
    repo: web::Data<PayrollRepository>,
    employees: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    input: web::Json<PayrollInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if !employees.worker_exists(&input.worker_id).await? {
        return Err(AppError::not_found(format!(
            "Worker {} is not in the employee directory",
            input.worker_id
        )));
    }

    let record = repo.create(input, &config.derivation_rules()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(record)))
}

pub async fn get_payrolls(
    repo: web::Data<PayrollRepository>,
    query: web::Query<PayrollFilter>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner();
    let (records, total) = repo.list(&filter).await.map_err(|e| {
        log::error!("Failed to fetch payroll records: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(Paged::new(
        records,
        filter.page,
        filter.per_page,
        total,
    ))))
}

pub async fn get_payroll(
    repo: web::Data<PayrollRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let record = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Payroll record not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn update_payroll(
    repo: web::Data<PayrollRepository>,
    employees: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    input: web::Json<PayrollInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = input.into_inner();

    if !employees.worker_exists(&input.worker_id).await? {
        return Err(AppError::not_found(format!(
            "Worker {} is not in the employee directory",
            input.worker_id
        )));
    }

    let record = repo.update(id, input, &config.derivation_rules()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn delete_payroll(
    repo: web::Data<PayrollRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    repo.soft_delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Payroll record deleted",
    )))
}

pub async fn restore_payroll(
    repo: web::Data<PayrollRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let record = repo.restore(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

/// Stamp the slip with today's date and mark the record paid. The date is
/// taken here, at the composition root, and handed down as a plain value.
pub async fn print_payroll(
    repo: web::Data<PayrollRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();
    let record = repo.mark_printed(path.into_inner(), today).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn batch_create_payroll(
    repo: web::Data<PayrollRepository>,
    employees: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    input: web::Json<PayrollBatchRequest>,
) -> Result<HttpResponse, AppError> {
    let batch = input.into_inner();

    let worker_ids: Vec<String> = batch.items.iter().map(|i| i.worker_id.clone()).collect();
    let missing = employees.missing_worker_ids(&worker_ids).await?;
    if !missing.is_empty() {
        return Err(AppError::not_found(format!(
            "Unknown worker ids: {}",
            missing.join(", ")
        )));
    }

    let outcome = repo.batch_create(batch, &config.derivation_rules()).await?;
    let message = if outcome.skipped.is_empty() {
        format!("Created {} payroll records", outcome.created.len())
    } else {
        format!(
            "Created {} payroll records, skipped {} duplicates",
            outcome.created.len(),
            outcome.skipped.len()
        )
    };

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(Some(outcome), &message)))
}

pub async fn payroll_summary(
    repo: web::Data<PayrollRepository>,
    query: web::Query<PayrollFilter>,
) -> Result<HttpResponse, AppError> {
    let summary = repo.summary(&query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}
