use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::config::DerivationRules;
use crate::database::models::filter::page_bounds;
use crate::database::models::{
    BatchOutcome, BillingBatchRequest, BillingFilter, BillingInput, BillingRecord, BillingSummary,
    PositionCount, SkippedItem,
};
use crate::database::repositories::{period_label, position_display};
use crate::error::AppError;
use crate::services::derivation::derive_billing;
use crate::services::validation::validate_billing_input;

const COLUMNS: &str = "id, worker_id, national_id, full_name, bank_account, position, \
     days_worked, daily_rate, overtime, holiday_bonus, health_insurance, workplace_accident, \
     death_benefit, retirement_fund, pension_fund, uniform_fee, management_fee, \
     total_contribution, worker_payout, worker_net, total_billable, period_start, period_end, \
     printed_on, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The billing period key is the calendar month of `period_start`; one
    /// live record per worker per month, same contract as payroll.
    pub async fn create(
        &self,
        input: BillingInput,
        rules: &DerivationRules,
    ) -> Result<BillingRecord, AppError> {
        validate_billing_input(&input)?;

        let mut tx = self.pool.begin().await?;
        Self::guard_period(&mut tx, &input.worker_id, input.period_start, None).await?;
        let record = Self::insert(&mut tx, &input, rules).await?;
        tx.commit().await?;

        Ok(record)
    }

    pub async fn update(
        &self,
        id: i64,
        input: BillingInput,
        rules: &DerivationRules,
    ) -> Result<BillingRecord, AppError> {
        validate_billing_input(&input)?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM billing_records WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Err(AppError::not_found("Billing record not found"));
        }

        Self::guard_period(&mut tx, &input.worker_id, input.period_start, Some(id)).await?;

        let b = derive_billing(&input, rules);
        let record = sqlx::query_as::<_, BillingRecord>(&format!(
            r#"
            UPDATE billing_records
            SET worker_id = $1, national_id = $2, full_name = $3, bank_account = $4,
                position = $5, days_worked = $6, daily_rate = $7, overtime = $8,
                holiday_bonus = $9, health_insurance = $10, workplace_accident = $11,
                death_benefit = $12, retirement_fund = $13, pension_fund = $14,
                uniform_fee = $15, management_fee = $16, total_contribution = $17,
                worker_payout = $18, worker_net = $19, total_billable = $20,
                period_start = $21, period_end = $22, updated_at = now()
            WHERE id = $23
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&input.worker_id)
        .bind(&input.national_id)
        .bind(&input.full_name)
        .bind(&input.bank_account)
        .bind(input.position)
        .bind(&input.days_worked)
        .bind(&input.daily_rate)
        .bind(&b.overtime)
        .bind(&b.holiday_bonus)
        .bind(&b.health_insurance)
        .bind(&b.workplace_accident)
        .bind(&b.death_benefit)
        .bind(&b.retirement_fund)
        .bind(&b.pension_fund)
        .bind(&b.uniform_fee)
        .bind(&b.management_fee)
        .bind(&b.total_contribution)
        .bind(&b.worker_payout)
        .bind(&b.worker_net)
        .bind(&b.total_billable)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_conflict(e, &input.worker_id, input.period_start))?;

        tx.commit().await?;
        Ok(record)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<BillingRecord>, AppError> {
        let record = sqlx::query_as::<_, BillingRecord>(&format!(
            "SELECT {COLUMNS} FROM billing_records WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list(
        &self,
        filter: &BillingFilter,
    ) -> Result<(Vec<BillingRecord>, i64), AppError> {
        let total: i64 = Self::filtered("COUNT(*)", filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = Self::filtered(COLUMNS, filter);
        qb.push(" ORDER BY period_start DESC, created_at DESC");
        let (limit, offset) = page_bounds(filter.page, filter.per_page);
        qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let records = qb
            .build_query_as::<BillingRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE billing_records SET deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Billing record not found"));
        }
        Ok(())
    }

    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE billing_records SET deleted_at = now(), updated_at = now() \
             WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn restore(&self, id: i64) -> Result<BillingRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let trashed = sqlx::query_as::<_, BillingRecord>(&format!(
            "SELECT {COLUMNS} FROM billing_records WHERE id = $1 AND deleted_at IS NOT NULL"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Deleted billing record not found"))?;

        Self::guard_period(&mut tx, &trashed.worker_id, trashed.period_start, Some(id)).await?;

        let record = sqlx::query_as::<_, BillingRecord>(&format!(
            "UPDATE billing_records SET deleted_at = NULL, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_conflict(e, &trashed.worker_id, trashed.period_start))?;

        tx.commit().await?;
        Ok(record)
    }

    pub async fn mark_printed(
        &self,
        id: i64,
        today: NaiveDate,
    ) -> Result<BillingRecord, AppError> {
        let record = sqlx::query_as::<_, BillingRecord>(&format!(
            "UPDATE billing_records SET printed_on = $2, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Billing record not found"))?;

        Ok(record)
    }

    pub async fn batch_create(
        &self,
        batch: BillingBatchRequest,
        rules: &DerivationRules,
    ) -> Result<BatchOutcome<BillingRecord>, AppError> {
        let inputs: Vec<BillingInput> = batch
            .items
            .iter()
            .cloned()
            .map(|item| item.into_input(&batch))
            .collect();
        for input in &inputs {
            validate_billing_input(input)?;
        }

        let period = period_label(batch.period_start);
        let worker_ids: Vec<String> = inputs.iter().map(|i| i.worker_id.clone()).collect();

        let mut tx = self.pool.begin().await?;

        let mut taken: HashSet<String> = sqlx::query_scalar::<_, String>(
            r#"
            SELECT worker_id FROM billing_records
            WHERE worker_id = ANY($1)
              AND date_part('year', period_start)::int = $2
              AND date_part('month', period_start)::int = $3
              AND deleted_at IS NULL
            "#,
        )
        .bind(&worker_ids)
        .bind(batch.period_start.year())
        .bind(batch.period_start.month() as i32)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let mut created = Vec::new();
        let mut skipped = Vec::new();
        for input in inputs {
            if taken.contains(&input.worker_id) {
                skipped.push(SkippedItem {
                    worker_id: input.worker_id.clone(),
                    full_name: input.full_name.clone(),
                    reason: format!("already has a billing record for {}", period),
                });
                continue;
            }
            taken.insert(input.worker_id.clone());
            created.push(Self::insert(&mut tx, &input, rules).await?);
        }

        tx.commit().await?;
        Ok(BatchOutcome { created, skipped })
    }

    pub async fn summary(&self, filter: &BillingFilter) -> Result<BillingSummary, AppError> {
        #[derive(sqlx::FromRow)]
        struct Totals {
            record_count: i64,
            total_days_worked: BigDecimal,
            total_worker_payout: BigDecimal,
            total_contribution: BigDecimal,
            total_billable: BigDecimal,
        }

        let totals = Self::filtered(
            "COUNT(*) AS record_count, \
             COALESCE(SUM(days_worked), 0) AS total_days_worked, \
             COALESCE(SUM(worker_payout), 0) AS total_worker_payout, \
             COALESCE(SUM(total_contribution), 0) AS total_contribution, \
             COALESCE(SUM(total_billable), 0) AS total_billable",
            filter,
        )
        .build_query_as::<Totals>()
        .fetch_one(&self.pool)
        .await?;

        let mut qb = Self::filtered("position, COUNT(*) AS record_count", filter);
        qb.push(" GROUP BY position ORDER BY position");
        let by_position: Vec<PositionCount> = qb
            .build_query_as::<PositionCount>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| PositionCount {
                position: position_display(&row.position),
                ..row
            })
            .collect();

        Ok(BillingSummary {
            record_count: totals.record_count,
            total_days_worked: totals.total_days_worked,
            total_worker_payout: totals.total_worker_payout,
            total_contribution: totals.total_contribution,
            total_billable: totals.total_billable,
            by_position,
        })
    }

    async fn insert(
        conn: &mut PgConnection,
        input: &BillingInput,
        rules: &DerivationRules,
    ) -> Result<BillingRecord, AppError> {
        let b = derive_billing(input, rules);

        sqlx::query_as::<_, BillingRecord>(&format!(
            r#"
            INSERT INTO billing_records
                (worker_id, national_id, full_name, bank_account, position, days_worked,
                 daily_rate, overtime, holiday_bonus, health_insurance, workplace_accident,
                 death_benefit, retirement_fund, pension_fund, uniform_fee, management_fee,
                 total_contribution, worker_payout, worker_net, total_billable,
                 period_start, period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&input.worker_id)
        .bind(&input.national_id)
        .bind(&input.full_name)
        .bind(&input.bank_account)
        .bind(input.position)
        .bind(&input.days_worked)
        .bind(&input.daily_rate)
        .bind(&b.overtime)
        .bind(&b.holiday_bonus)
        .bind(&b.health_insurance)
        .bind(&b.workplace_accident)
        .bind(&b.death_benefit)
        .bind(&b.retirement_fund)
        .bind(&b.pension_fund)
        .bind(&b.uniform_fee)
        .bind(&b.management_fee)
        .bind(&b.total_contribution)
        .bind(&b.worker_payout)
        .bind(&b.worker_net)
        .bind(&b.total_billable)
        .bind(input.period_start)
        .bind(input.period_end)
        .fetch_one(conn)
        .await
        .map_err(|e| Self::map_conflict(e, &input.worker_id, input.period_start))
    }

    async fn guard_period(
        conn: &mut PgConnection,
        worker_id: &str,
        period_start: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM billing_records
            WHERE worker_id = $1
              AND date_part('year', period_start)::int = $2
              AND date_part('month', period_start)::int = $3
              AND deleted_at IS NULL
              AND ($4::bigint IS NULL OR id <> $4)
            LIMIT 1
            "#,
        )
        .bind(worker_id)
        .bind(period_start.year())
        .bind(period_start.month() as i32)
        .bind(exclude_id)
        .fetch_optional(conn)
        .await?;

        if existing.is_some() {
            return Err(AppError::Duplicate {
                worker_id: worker_id.to_string(),
                period: period_label(period_start),
            });
        }
        Ok(())
    }

    fn map_conflict(error: sqlx::Error, worker_id: &str, period_start: NaiveDate) -> AppError {
        if AppError::is_period_conflict(&error) {
            AppError::Duplicate {
                worker_id: worker_id.to_string(),
                period: period_label(period_start),
            }
        } else {
            error.into()
        }
    }

    fn filtered(select: &str, filter: &BillingFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {select} FROM billing_records WHERE deleted_at IS NULL"
        ));
        if let Some(position) = filter.position {
            qb.push(" AND position = ").push_bind(position.to_string());
        }
        if let Some(month) = filter.month {
            qb.push(" AND date_part('month', period_start)::int = ")
                .push_bind(month as i32);
        }
        if let Some(year) = filter.year {
            qb.push(" AND date_part('year', period_start)::int = ")
                .push_bind(year);
        }
        if let Some(worker_id) = &filter.worker_id {
            qb.push(" AND worker_id = ").push_bind(worker_id.clone());
        }
        if let Some(national_id) = &filter.national_id {
            qb.push(" AND national_id = ").push_bind(national_id.clone());
        }
        if let (Some(start), Some(end)) = (filter.period_start, filter.period_end) {
            qb.push(" AND period_start >= ")
                .push_bind(start)
                .push(" AND period_end <= ")
                .push_bind(end);
        }
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Position;

    #[test]
    fn filtered_targets_period_start_for_month_and_year() {
        let filter = BillingFilter {
            month: Some(3),
            year: Some(2025),
            position: Some(Position::CleaningService),
            ..Default::default()
        };

        let qb = BillingRepository::filtered("COUNT(*)", &filter);
        let sql = qb.sql();
        assert!(sql.contains("date_part('month', period_start)"));
        assert!(sql.contains("date_part('year', period_start)"));
        assert!(sql.contains("AND position = "));
    }

    #[test]
    fn period_range_bounds_both_dates() {
        let filter = BillingFilter {
            period_start: Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            period_end: Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()),
            ..Default::default()
        };
        let qb = BillingRepository::filtered("COUNT(*)", &filter);
        let sql = qb.sql();
        assert!(sql.contains("period_start >= "));
        assert!(sql.contains("period_end <= "));
    }
}
