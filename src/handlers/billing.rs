use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::config::Config;
use crate::database::models::{BillingBatchRequest, BillingFilter, BillingInput};
use crate::database::repositories::{BillingRepository, EmployeeRepository};
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, Paged};

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

pub async fn create_billing(
    repo: web::Data<BillingRepository>,
    employees: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    input: web::Json<BillingInput>,
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

pub async fn get_billings(
    repo: web::Data<BillingRepository>,
    query: web::Query<BillingFilter>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner();
    let (records, total) = repo.list(&filter).await.map_err(|e| {
        log::error!("Failed to fetch billing records: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(Paged::new(
        records,
        filter.page,
        filter.per_page,
        total,
    ))))
}

pub async fn get_billing(
    repo: web::Data<BillingRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let record = repo
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Billing record not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn update_billing(
    repo: web::Data<BillingRepository>,
    employees: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    input: web::Json<BillingInput>,
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

pub async fn delete_billing(
    repo: web::Data<BillingRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    repo.soft_delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Billing record deleted",
    )))
}

pub async fn bulk_delete_billing(
    repo: web::Data<BillingRepository>,
    input: web::Json<BulkDeleteRequest>,
) -> Result<HttpResponse, AppError> {
    let deleted = repo.bulk_delete(&input.ids).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(serde_json::json!({ "deletedCount": deleted })),
        "Billing records deleted",
    )))
}

pub async fn restore_billing(
    repo: web::Data<BillingRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let record = repo.restore(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn print_billing(
    repo: web::Data<BillingRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let today = Utc::now().date_naive();
    let record = repo.mark_printed(path.into_inner(), today).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn batch_create_billing(
    repo: web::Data<BillingRepository>,
    employees: web::Data<EmployeeRepository>,
    config: web::Data<Config>,
    input: web::Json<BillingBatchRequest>,
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
        format!("Created {} billing records", outcome.created.len())
    } else {
        format!(
            "Created {} billing records, skipped {} duplicates",
            outcome.created.len(),
            outcome.skipped.len()
        )
    };

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(Some(outcome), &message)))
}

pub async fn billing_summary(
    repo: web::Data<BillingRepository>,
    query: web::Query<BillingFilter>,
) -> Result<HttpResponse, AppError> {
    let summary = repo.summary(&query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}
