use sqlx::PgPool;

use crate::database::models::{Employee, EmployeeInput};
use crate::error::AppError;

const COLUMNS: &str = "id, worker_id, national_id, bank_account, full_name, position, email, \
     phone, address, hired_on, left_on, active, created_at, updated_at";

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: EmployeeInput) -> Result<Employee, AppError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (worker_id, national_id, bank_account, full_name, position, email, phone, address, hired_on, left_on, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.worker_id)
        .bind(input.national_id)
        .bind(input.bank_account)
        .bind(input.full_name)
        .bind(input.position)
        .bind(input.email)
        .bind(input.phone)
        .bind(input.address)
        .bind(input.hired_on)
        .bind(input.left_on)
        .bind(input.active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn find_by_worker_id(&self, worker_id: &str) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {COLUMNS} FROM employees WHERE worker_id = $1"
        ))
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Existence check used by the payroll/billing create paths: an unknown
    /// worker id must be rejected before any record is written.
    pub async fn worker_exists(&self, worker_id: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE worker_id = $1")
                .bind(worker_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Which of the given worker ids are missing from the directory. Batch
    /// ingestion uses this so a 200-item payload costs one lookup.
    pub async fn missing_worker_ids(
        &self,
        worker_ids: &[String],
    ) -> Result<Vec<String>, AppError> {
        let known: Vec<String> =
            sqlx::query_scalar("SELECT worker_id FROM employees WHERE worker_id = ANY($1)")
                .bind(worker_ids)
                .fetch_all(&self.pool)
                .await?;

        let known: std::collections::HashSet<&str> =
            known.iter().map(|s| s.as_str()).collect();
        // Each unknown id is reported once, in first-seen order, however
        // often the batch repeats it.
        let mut seen = std::collections::HashSet::new();
        let mut missing = Vec::new();
        for id in worker_ids {
            if !known.contains(id.as_str()) && seen.insert(id.as_str()) {
                missing.push(id.clone());
            }
        }
        Ok(missing)
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Employee>, AppError> {
        let employees = if active_only {
            sqlx::query_as::<_, Employee>(&format!(
                "SELECT {COLUMNS} FROM employees WHERE active ORDER BY worker_id"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Employee>(&format!(
                "SELECT {COLUMNS} FROM employees ORDER BY worker_id"
            ))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(employees)
    }
}
