use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Position;

/// One worker's computed pay for one calendar month. The insurance totals,
/// gross pay and net pay columns are derived; they are recomputed on every
/// write and any submitted value for them is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: i64,
    pub worker_id: String,
    pub national_id: String,
    pub full_name: String,
    pub bank_account: Option<String>,
    pub position: Position,
    pub days_worked: BigDecimal,
    pub daily_rate: BigDecimal,
    pub overtime: BigDecimal,
    pub holiday_bonus: BigDecimal,
    pub health_insurance: BigDecimal,
    pub retirement_fund: BigDecimal,
    pub pension_fund: BigDecimal,
    pub total_insurance: BigDecimal,
    pub gross_pay: BigDecimal,
    pub net_pay: BigDecimal,
    pub pay_month: NaiveDate,
    pub paid: bool,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub printed_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Raw payroll inputs. Derived fields are intentionally absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    pub worker_id: String,
    pub national_id: String,
    pub full_name: String,
    pub bank_account: Option<String>,
    pub position: Position,
    pub days_worked: BigDecimal,
    pub daily_rate: BigDecimal,
    pub overtime: BigDecimal,
    pub holiday_bonus: Option<BigDecimal>,
    pub health_insurance: BigDecimal,
    pub retirement_fund: BigDecimal,
    pub pension_fund: BigDecimal,
    pub pay_month: NaiveDate,
    pub paid: Option<bool>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Per-worker entry in a batch request; the shared period fields live on the
/// enclosing [`PayrollBatchRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollBatchItem {
    pub worker_id: String,
    pub national_id: String,
    pub full_name: String,
    pub bank_account: Option<String>,
    pub position: Position,
    pub days_worked: BigDecimal,
    pub daily_rate: BigDecimal,
    pub overtime: Option<BigDecimal>,
    pub holiday_bonus: Option<BigDecimal>,
    pub health_insurance: Option<BigDecimal>,
    pub retirement_fund: Option<BigDecimal>,
    pub pension_fund: Option<BigDecimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollBatchRequest {
    pub pay_month: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub items: Vec<PayrollBatchItem>,
}

impl PayrollBatchItem {
    /// Merge the batch-level period fields in, producing a full create input.
    pub fn into_input(self, batch: &PayrollBatchRequest) -> PayrollInput {
        PayrollInput {
            worker_id: self.worker_id,
            national_id: self.national_id,
            full_name: self.full_name,
            bank_account: self.bank_account,
            position: self.position,
            days_worked: self.days_worked,
            daily_rate: self.daily_rate,
            overtime: self.overtime.unwrap_or_default(),
            holiday_bonus: self.holiday_bonus,
            health_insurance: self.health_insurance.unwrap_or_default(),
            retirement_fund: self.retirement_fund.unwrap_or_default(),
            pension_fund: self.pension_fund.unwrap_or_default(),
            pay_month: batch.pay_month,
            paid: None,
            period_start: batch.period_start,
            period_end: batch.period_end,
        }
    }
}

/// Outcome of a batch ingestion: what was written plus which items were
/// dropped because the worker already had a record in the period.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome<T> {
    pub created: Vec<T>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub worker_id: String,
    pub full_name: String,
    pub reason: String,
}
