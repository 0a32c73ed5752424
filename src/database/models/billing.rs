use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Position;

/// One client-facing charge line for one worker and billing period.
///
/// `total_billable` is the payout plus contributions, gross of the statutory
/// deduction; `worker_net` is the payout minus that deduction. The two are
/// deliberately computed on different bases (inherited billing rule, kept
/// as-is pending product confirmation).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
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
    pub workplace_accident: BigDecimal,
    pub death_benefit: BigDecimal,
    pub retirement_fund: BigDecimal,
    pub pension_fund: BigDecimal,
    pub uniform_fee: BigDecimal,
    pub management_fee: BigDecimal,
    pub total_contribution: BigDecimal,
    pub worker_payout: BigDecimal,
    pub worker_net: BigDecimal,
    pub total_billable: BigDecimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub printed_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Raw billing inputs. Every optional money field is coerced to zero during
/// derivation, so omitting a contribution behaves exactly like sending 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInput {
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
    pub workplace_accident: Option<BigDecimal>,
    pub death_benefit: Option<BigDecimal>,
    pub retirement_fund: Option<BigDecimal>,
    pub pension_fund: Option<BigDecimal>,
    pub uniform_fee: Option<BigDecimal>,
    pub management_fee: Option<BigDecimal>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingBatchItem {
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
    pub workplace_accident: Option<BigDecimal>,
    pub death_benefit: Option<BigDecimal>,
    pub retirement_fund: Option<BigDecimal>,
    pub pension_fund: Option<BigDecimal>,
    pub uniform_fee: Option<BigDecimal>,
    pub management_fee: Option<BigDecimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingBatchRequest {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub items: Vec<BillingBatchItem>,
}

impl BillingBatchItem {
    pub fn into_input(self, batch: &BillingBatchRequest) -> BillingInput {
        BillingInput {
            worker_id: self.worker_id,
            national_id: self.national_id,
            full_name: self.full_name,
            bank_account: self.bank_account,
            position: self.position,
            days_worked: self.days_worked,
            daily_rate: self.daily_rate,
            overtime: self.overtime,
            holiday_bonus: self.holiday_bonus,
            health_insurance: self.health_insurance,
            workplace_accident: self.workplace_accident,
            death_benefit: self.death_benefit,
            retirement_fund: self.retirement_fund,
            pension_fund: self.pension_fund,
            uniform_fee: self.uniform_fee,
            management_fee: self.management_fee,
            period_start: batch.period_start,
            period_end: batch.period_end,
        }
    }
}
