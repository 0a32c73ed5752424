use std::env;

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;
use std::str::FromStr;

use payroll_be::database::init_database;
use payroll_be::database::models::{
    BillingInput, EmployeeInput, PayrollInput, Position,
};
use payroll_be::{DerivationRules, EmployeeRepository};

/// Connect to the database named by TEST_DATABASE_URL and wipe the tables.
///
/// Returns None when the variable is unset so these tests are skipped on
/// machines without a Postgres instance. Combine with `#[serial]` — the
/// truncate makes concurrent tests stomp on each other.
pub async fn test_pool() -> Option<PgPool> {
    let _ = env_logger::builder().is_test(true).try_init();

    let url = env::var("TEST_DATABASE_URL").ok()?;
    let pool = init_database(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");

    sqlx::query("TRUNCATE payroll_records, billing_records, employees RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("failed to reset test tables");

    Some(pool)
}

/// Payroll and billing rows reference the employee directory, so every test
/// that writes records seeds its workers first.
pub async fn seed_workers(pool: &PgPool, worker_ids: &[&str]) {
    let repo = EmployeeRepository::new(pool.clone());
    for worker_id in worker_ids {
        repo.create(MockData::employee(worker_id))
            .await
            .expect("failed to seed worker");
    }
}

pub fn rules() -> DerivationRules {
    DerivationRules {
        min_insured_days: BigDecimal::from(7),
        statutory_deduction: BigDecimal::from(149316),
    }
}

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal literal")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// Mock data generators
pub struct MockData;

#[allow(dead_code)]
impl MockData {
    pub fn employee(worker_id: &str) -> EmployeeInput {
        EmployeeInput {
            worker_id: worker_id.to_string(),
            national_id: format!("317{}", worker_id),
            bank_account: Some(format!("00{}99", worker_id)),
            full_name: format!("Worker {}", worker_id),
            position: Position::Security,
            email: None,
            phone: None,
            address: None,
            hired_on: Some(date(2024, 1, 15)),
            left_on: None,
            active: Some(true),
        }
    }

    pub fn payroll_input(worker_id: &str, pay_month: NaiveDate) -> PayrollInput {
        PayrollInput {
            worker_id: worker_id.to_string(),
            national_id: format!("317{}", worker_id),
            full_name: format!("Worker {}", worker_id),
            bank_account: Some(format!("00{}99", worker_id)),
            position: Position::Security,
            days_worked: dec("20"),
            daily_rate: dec("100000"),
            overtime: dec("50000"),
            holiday_bonus: None,
            health_insurance: dec("30000"),
            retirement_fund: dec("20000"),
            pension_fund: dec("10000"),
            pay_month,
            paid: None,
            period_start: pay_month,
            period_end: end_of_month(pay_month),
        }
    }

    pub fn billing_input(worker_id: &str, period_start: NaiveDate) -> BillingInput {
        BillingInput {
            worker_id: worker_id.to_string(),
            national_id: format!("317{}", worker_id),
            full_name: format!("Worker {}", worker_id),
            bank_account: Some(format!("00{}99", worker_id)),
            position: Position::Security,
            days_worked: dec("20"),
            daily_rate: dec("100000"),
            overtime: Some(dec("50000")),
            holiday_bonus: None,
            health_insurance: Some(dec("30000")),
            workplace_accident: Some(dec("5000")),
            death_benefit: Some(dec("3000")),
            retirement_fund: Some(dec("20000")),
            pension_fund: Some(dec("10000")),
            uniform_fee: Some(dec("25000")),
            management_fee: Some(dec("100000")),
            period_start,
            period_end: end_of_month(period_start),
        }
    }
}

pub fn end_of_month(start: NaiveDate) -> NaiveDate {
    let next = if start.month() == 12 {
        date(start.year() + 1, 1, 1)
    } else {
        date(start.year(), start.month() + 1, 1)
    };
    next.pred_opt().expect("previous day exists")
}
