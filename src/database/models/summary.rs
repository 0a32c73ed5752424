use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PositionBreakdown {
    pub position: String,
    pub record_count: i64,
    pub total_net: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSummary {
    pub record_count: i64,
    pub total_gross: BigDecimal,
    pub total_insurance: BigDecimal,
    pub total_net: BigDecimal,
    pub total_holiday_bonus: BigDecimal,
    pub total_overtime: BigDecimal,
    /// Mean net pay over the filtered set, rounded half-up to the whole unit.
    pub average_net: BigDecimal,
    pub by_position: Vec<PositionBreakdown>,
    pub printed_count: i64,
    pub unprinted_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PositionCount {
    pub position: String,
    pub record_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    pub record_count: i64,
    pub total_days_worked: BigDecimal,
    pub total_worker_payout: BigDecimal,
    pub total_contribution: BigDecimal,
    pub total_billable: BigDecimal,
    pub by_position: Vec<PositionCount>,
}
