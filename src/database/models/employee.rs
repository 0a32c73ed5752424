use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Position;

/// A row in the employee directory. Payroll and billing records copy the
/// fields they need from this at creation time; later edits here never touch
/// historical records.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub worker_id: String,
    pub national_id: String,
    pub bank_account: Option<String>,
    pub full_name: String,
    pub position: Position,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hired_on: Option<NaiveDate>,
    pub left_on: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub worker_id: String,
    pub national_id: String,
    pub bank_account: Option<String>,
    pub full_name: String,
    pub position: Position,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hired_on: Option<NaiveDate>,
    pub left_on: Option<NaiveDate>,
    pub active: Option<bool>,
}
