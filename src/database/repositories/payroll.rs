use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::config::DerivationRules;
use crate::database::models::filter::page_bounds;
use crate::database::models::{
    BatchOutcome, PayrollBatchRequest, PayrollFilter, PayrollInput, PayrollRecord, PayrollSummary,
    PositionBreakdown, SkippedItem,
};
use crate::database::repositories::{period_label, position_display};
use crate::error::AppError;
use crate::services::derivation::{self, derive_payroll};
use crate::services::validation::validate_payroll_input;

const COLUMNS: &str = "id, worker_id, national_id, full_name, bank_account, position, \
     days_worked, daily_rate, overtime, holiday_bonus, health_insurance, retirement_fund, \
     pension_fund, total_insurance, gross_pay, net_pay, pay_month, paid, period_start, \
     period_end, printed_on, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PayrollRepository {
    pool: PgPool,
}

impl PayrollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate, guard the (worker, month) period, derive and insert as one
    /// transaction. The partial unique index backstops the guard against
    /// concurrent writers.
    pub async fn create(
        &self,
        input: PayrollInput,
        rules: &DerivationRules,
    ) -> Result<PayrollRecord, AppError> {
        validate_payroll_input(&input)?;

        let mut tx = self.pool.begin().await?;
        Self::guard_period(&mut tx, &input.worker_id, input.pay_month, None).await?;
        let record = Self::insert(&mut tx, &input, rules).await?;
        tx.commit().await?;

        Ok(record)
    }

    /// Full-input update. Derived columns are recomputed from scratch; the
    /// duplicate guard re-runs with the record itself excluded so moving a
    /// record onto another worker's month is rejected.
    pub async fn update(
        &self,
        id: i64,
        input: PayrollInput,
        rules: &DerivationRules,
    ) -> Result<PayrollRecord, AppError> {
        validate_payroll_input(&input)?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM payroll_records WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Err(AppError::not_found("Payroll record not found"));
        }

        Self::guard_period(&mut tx, &input.worker_id, input.pay_month, Some(id)).await?;

        let breakdown = derive_payroll(&input, rules);
        let record = sqlx::query_as::<_, PayrollRecord>(&format!(
            r#"
            UPDATE payroll_records
            SET worker_id = $1, national_id = $2, full_name = $3, bank_account = $4,
                position = $5, days_worked = $6, daily_rate = $7, overtime = $8,
                holiday_bonus = $9, health_insurance = $10, retirement_fund = $11,
                pension_fund = $12, total_insurance = $13, gross_pay = $14, net_pay = $15,
                pay_month = $16, paid = $17, period_start = $18, period_end = $19,
                updated_at = now()
            WHERE id = $20
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
        .bind(&input.overtime)
        .bind(&breakdown.holiday_bonus)
        .bind(&breakdown.health_insurance)
        .bind(&breakdown.retirement_fund)
        .bind(&breakdown.pension_fund)
        .bind(&breakdown.total_insurance)
        .bind(&breakdown.gross_pay)
        .bind(&breakdown.net_pay)
        .bind(input.pay_month)
        .bind(input.paid.unwrap_or(false))
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_conflict(e, &input.worker_id, input.pay_month))?;

        tx.commit().await?;
        Ok(record)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<PayrollRecord>, AppError> {
        let record = sqlx::query_as::<_, PayrollRecord>(&format!(
            "SELECT {COLUMNS} FROM payroll_records WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list(
        &self,
        filter: &PayrollFilter,
    ) -> Result<(Vec<PayrollRecord>, i64), AppError> {
        let total: i64 = Self::filtered("COUNT(*)", filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = Self::filtered(COLUMNS, filter);
        qb.push(" ORDER BY pay_month DESC, created_at DESC");
        let (limit, offset) = page_bounds(filter.page, filter.per_page);
        qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

        let records = qb
            .build_query_as::<PayrollRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE payroll_records SET deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Payroll record not found"));
        }
        Ok(())
    }

    /// Bring a soft-deleted record back. The period guard re-runs first:
    /// if the month has been refilled since the delete, restore fails with
    /// the same Duplicate the original create would have produced.
    pub async fn restore(&self, id: i64) -> Result<PayrollRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let trashed = sqlx::query_as::<_, PayrollRecord>(&format!(
            "SELECT {COLUMNS} FROM payroll_records WHERE id = $1 AND deleted_at IS NOT NULL"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Deleted payroll record not found"))?;

        Self::guard_period(&mut tx, &trashed.worker_id, trashed.pay_month, Some(id)).await?;

        let record = sqlx::query_as::<_, PayrollRecord>(&format!(
            "UPDATE payroll_records SET deleted_at = NULL, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_conflict(e, &trashed.worker_id, trashed.pay_month))?;

        tx.commit().await?;
        Ok(record)
    }

    /// Stamp the pay slip: record the print date and flip the paid flag.
    /// `today` comes from the caller so the operation stays clock-free.
    pub async fn mark_printed(
        &self,
        id: i64,
        today: NaiveDate,
    ) -> Result<PayrollRecord, AppError> {
        let record = sqlx::query_as::<_, PayrollRecord>(&format!(
            "UPDATE payroll_records SET printed_on = $2, paid = TRUE, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Payroll record not found"))?;

        Ok(record)
    }

    /// Create many records for one shared pay month in a single transaction.
    /// Workers who already have a record that month are collected as skip
    /// entries (one bulk lookup, not a query per item); any other failure
    /// rolls the whole batch back.
    pub async fn batch_create(
        &self,
        batch: PayrollBatchRequest,
        rules: &DerivationRules,
    ) -> Result<BatchOutcome<PayrollRecord>, AppError> {
        let inputs: Vec<PayrollInput> = batch
            .items
            .iter()
            .cloned()
            .map(|item| item.into_input(&batch))
            .collect();
        for input in &inputs {
            validate_payroll_input(input)?;
        }

        let period = period_label(batch.pay_month);
        let worker_ids: Vec<String> = inputs.iter().map(|i| i.worker_id.clone()).collect();

        let mut tx = self.pool.begin().await?;

        let mut taken: HashSet<String> = sqlx::query_scalar::<_, String>(
            r#"
            SELECT worker_id FROM payroll_records
            WHERE worker_id = ANY($1)
              AND date_part('year', pay_month)::int = $2
              AND date_part('month', pay_month)::int = $3
              AND deleted_at IS NULL
            "#,
        )
        .bind(&worker_ids)
        .bind(batch.pay_month.year())
        .bind(batch.pay_month.month() as i32)
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
                    reason: format!("already has a payroll record for {}", period),
                });
                continue;
            }
            // Repeated worker ids inside one batch count as duplicates too.
            taken.insert(input.worker_id.clone());
            created.push(Self::insert(&mut tx, &input, rules).await?);
        }

        tx.commit().await?;
        Ok(BatchOutcome { created, skipped })
    }

    /// Aggregate totals over the same filtered set `list` would return.
    pub async fn summary(&self, filter: &PayrollFilter) -> Result<PayrollSummary, AppError> {
        #[derive(sqlx::FromRow)]
        struct Totals {
            record_count: i64,
            total_gross: BigDecimal,
            total_insurance: BigDecimal,
            total_net: BigDecimal,
            total_holiday_bonus: BigDecimal,
            total_overtime: BigDecimal,
            printed_count: i64,
            unprinted_count: i64,
        }

        let totals = Self::filtered(
            "COUNT(*) AS record_count, \
             COALESCE(SUM(gross_pay), 0) AS total_gross, \
             COALESCE(SUM(total_insurance), 0) AS total_insurance, \
             COALESCE(SUM(net_pay), 0) AS total_net, \
             COALESCE(SUM(holiday_bonus), 0) AS total_holiday_bonus, \
             COALESCE(SUM(overtime), 0) AS total_overtime, \
             COUNT(*) FILTER (WHERE printed_on IS NOT NULL) AS printed_count, \
             COUNT(*) FILTER (WHERE printed_on IS NULL) AS unprinted_count",
            filter,
        )
        .build_query_as::<Totals>()
        .fetch_one(&self.pool)
        .await?;

        let mut qb = Self::filtered(
            "position, COUNT(*) AS record_count, COALESCE(SUM(net_pay), 0) AS total_net",
            filter,
        );
        qb.push(" GROUP BY position ORDER BY position");
        let by_position: Vec<PositionBreakdown> = qb
            .build_query_as::<PositionBreakdown>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| PositionBreakdown {
                position: position_display(&row.position),
                ..row
            })
            .collect();

        let average_net = derivation::average(&totals.total_net, totals.record_count);

        Ok(PayrollSummary {
            record_count: totals.record_count,
            total_gross: totals.total_gross,
            total_insurance: totals.total_insurance,
            total_net: totals.total_net,
            total_holiday_bonus: totals.total_holiday_bonus,
            total_overtime: totals.total_overtime,
            average_net,
            by_position,
            printed_count: totals.printed_count,
            unprinted_count: totals.unprinted_count,
        })
    }

    async fn insert(
        conn: &mut PgConnection,
        input: &PayrollInput,
        rules: &DerivationRules,
    ) -> Result<PayrollRecord, AppError> {
        let breakdown = derive_payroll(input, rules);

        sqlx::query_as::<_, PayrollRecord>(&format!(
            r#"
            INSERT INTO payroll_records
                (worker_id, national_id, full_name, bank_account, position, days_worked,
                 daily_rate, overtime, holiday_bonus, health_insurance, retirement_fund,
                 pension_fund, total_insurance, gross_pay, net_pay, pay_month, paid,
                 period_start, period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
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
        .bind(&input.overtime)
        .bind(&breakdown.holiday_bonus)
        .bind(&breakdown.health_insurance)
        .bind(&breakdown.retirement_fund)
        .bind(&breakdown.pension_fund)
        .bind(&breakdown.total_insurance)
        .bind(&breakdown.gross_pay)
        .bind(&breakdown.net_pay)
        .bind(input.pay_month)
        .bind(input.paid.unwrap_or(false))
        .bind(input.period_start)
        .bind(input.period_end)
        .fetch_one(conn)
        .await
        .map_err(|e| Self::map_conflict(e, &input.worker_id, input.pay_month))
    }

    /// Application-level duplicate check: one live record per worker per
    /// calendar month of `pay_month`. Gives the caller a friendly error the
    /// unique index cannot.
    async fn guard_period(
        conn: &mut PgConnection,
        worker_id: &str,
        pay_month: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM payroll_records
            WHERE worker_id = $1
              AND date_part('year', pay_month)::int = $2
              AND date_part('month', pay_month)::int = $3
              AND deleted_at IS NULL
              AND ($4::bigint IS NULL OR id <> $4)
            LIMIT 1
            "#,
        )
        .bind(worker_id)
        .bind(pay_month.year())
        .bind(pay_month.month() as i32)
        .bind(exclude_id)
        .fetch_optional(conn)
        .await?;

        if existing.is_some() {
            return Err(AppError::Duplicate {
                worker_id: worker_id.to_string(),
                period: period_label(pay_month),
            });
        }
        Ok(())
    }

    fn map_conflict(error: sqlx::Error, worker_id: &str, pay_month: NaiveDate) -> AppError {
        if AppError::is_period_conflict(&error) {
            AppError::Duplicate {
                worker_id: worker_id.to_string(),
                period: period_label(pay_month),
            }
        } else {
            error.into()
        }
    }

    fn filtered(select: &str, filter: &PayrollFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {select} FROM payroll_records WHERE deleted_at IS NULL"
        ));
        if let Some(position) = filter.position {
            qb.push(" AND position = ").push_bind(position.to_string());
        }
        if let Some(paid) = filter.paid {
            qb.push(" AND paid = ").push_bind(paid);
        }
        if let Some(month) = filter.month {
            qb.push(" AND date_part('month', pay_month)::int = ")
                .push_bind(month as i32);
        }
        if let Some(year) = filter.year {
            qb.push(" AND date_part('year', pay_month)::int = ").push_bind(year);
        }
        if let Some(worker_id) = &filter.worker_id {
            qb.push(" AND worker_id = ").push_bind(worker_id.clone());
        }
        if let Some(national_id) = &filter.national_id {
            qb.push(" AND national_id = ").push_bind(national_id.clone());
        }
        if let (Some(start), Some(end)) = (filter.period_start, filter.period_end) {
            qb.push(" AND pay_month BETWEEN ")
                .push_bind(start)
                .push(" AND ")
                .push_bind(end);
        }
        qb
    }
}
