use pretty_assertions::assert_eq;
use serial_test::serial;

use payroll_be::database::models::{BillingBatchItem, BillingBatchRequest, BillingFilter, Position};
use payroll_be::database::repositories::BillingRepository;
use payroll_be::error::AppError;

mod common;

use common::{date, dec, MockData};

#[tokio::test]
#[serial]
async fn create_computes_the_charge_breakdown() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001"]).await;
    let repo = BillingRepository::new(pool);

    let record = repo
        .create(
            MockData::billing_input("E001", date(2025, 3, 1)),
            &common::rules(),
        )
        .await
        .unwrap();

    // payout = 20 * 100000 + 50000; contributions sum to 193000
    assert_eq!(record.worker_payout, dec("2050000.00"));
    assert_eq!(record.total_contribution, dec("193000.00"));
    assert_eq!(record.worker_net, dec("1900684.00"));
    // The client total is payout plus contributions, gross of the deduction.
    assert_eq!(record.total_billable, dec("2243000.00"));
}

#[tokio::test]
#[serial]
async fn omitted_contributions_behave_like_zero() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001"]).await;
    let repo = BillingRepository::new(pool);

    let mut input = MockData::billing_input("E001", date(2025, 3, 1));
    input.overtime = None;
    input.health_insurance = None;
    input.workplace_accident = None;
    input.death_benefit = None;
    input.retirement_fund = None;
    input.pension_fund = None;
    input.uniform_fee = None;
    input.management_fee = None;

    let record = repo.create(input, &common::rules()).await.unwrap();

    assert_eq!(record.overtime, dec("0.00"));
    assert_eq!(record.total_contribution, dec("0.00"));
    assert_eq!(record.worker_payout, dec("2000000.00"));
    assert_eq!(record.worker_net, dec("1850684.00"));
    assert_eq!(record.total_billable, dec("2000000.00"));
}

#[tokio::test]
#[serial]
async fn one_record_per_worker_per_period_month() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001"]).await;
    let repo = BillingRepository::new(pool);
    let rules = common::rules();

    repo.create(MockData::billing_input("E001", date(2025, 3, 1)), &rules)
        .await
        .unwrap();

    let err = repo
        .create(MockData::billing_input("E001", date(2025, 3, 20)), &rules)
        .await
        .unwrap_err();
    match err {
        AppError::Duplicate { worker_id, period } => {
            assert_eq!(worker_id, "E001");
            assert_eq!(period, "March 2025");
        }
        other => panic!("expected Duplicate, got {:?}", other),
    }

    repo.create(MockData::billing_input("E001", date(2025, 4, 1)), &rules)
        .await
        .unwrap();
}

#[tokio::test]
#[serial]
async fn update_moves_are_guarded_and_recomputed() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001", "E002"]).await;
    let repo = BillingRepository::new(pool);
    let rules = common::rules();

    let record = repo
        .create(MockData::billing_input("E001", date(2025, 3, 1)), &rules)
        .await
        .unwrap();

    let mut input = MockData::billing_input("E001", date(2025, 3, 1));
    input.days_worked = dec("25");
    let updated = repo.update(record.id, input, &rules).await.unwrap();
    assert_eq!(updated.worker_payout, dec("2550000.00"));
    assert_eq!(updated.worker_net, dec("2400684.00"));

    repo.create(MockData::billing_input("E002", date(2025, 3, 1)), &rules)
        .await
        .unwrap();
    let err = repo
        .update(
            record.id,
            MockData::billing_input("E002", date(2025, 3, 1)),
            &rules,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate { .. }));
}

#[tokio::test]
#[serial]
async fn bulk_delete_reports_how_many_went() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001", "E002"]).await;
    let repo = BillingRepository::new(pool);
    let rules = common::rules();

    let a = repo
        .create(MockData::billing_input("E001", date(2025, 3, 1)), &rules)
        .await
        .unwrap();
    let b = repo
        .create(MockData::billing_input("E002", date(2025, 3, 1)), &rules)
        .await
        .unwrap();

    // One real id, one repeat after delete, one that never existed.
    let deleted = repo.bulk_delete(&[a.id, b.id, 9999]).await.unwrap();
    assert_eq!(deleted, 2);

    let deleted_again = repo.bulk_delete(&[a.id]).await.unwrap();
    assert_eq!(deleted_again, 0);

    let (rows, total) = repo.list(&BillingFilter::default()).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
#[serial]
async fn restore_rechecks_the_period() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001"]).await;
    let repo = BillingRepository::new(pool);
    let rules = common::rules();

    let record = repo
        .create(MockData::billing_input("E001", date(2025, 3, 1)), &rules)
        .await
        .unwrap();
    repo.soft_delete(record.id).await.unwrap();

    repo.create(MockData::billing_input("E001", date(2025, 3, 2)), &rules)
        .await
        .unwrap();

    let err = repo.restore(record.id).await.unwrap_err();
    assert!(matches!(err, AppError::Duplicate { .. }));
}

#[tokio::test]
#[serial]
async fn mark_printed_stamps_the_date_only() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001"]).await;
    let repo = BillingRepository::new(pool);

    let record = repo
        .create(
            MockData::billing_input("E001", date(2025, 3, 1)),
            &common::rules(),
        )
        .await
        .unwrap();

    let today = date(2025, 4, 5);
    let printed = repo.mark_printed(record.id, today).await.unwrap();
    assert_eq!(printed.printed_on, Some(today));
}

#[tokio::test]
#[serial]
async fn batch_creates_new_and_skips_taken_workers() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001", "E002", "E003"]).await;
    let repo = BillingRepository::new(pool);
    let rules = common::rules();

    repo.create(MockData::billing_input("E002", date(2025, 3, 3)), &rules)
        .await
        .unwrap();

    let item = |worker_id: &str| BillingBatchItem {
        worker_id: worker_id.to_string(),
        national_id: format!("317{}", worker_id),
        full_name: format!("Worker {}", worker_id),
        bank_account: None,
        position: Position::Operator,
        days_worked: dec("21"),
        daily_rate: dec("95000"),
        overtime: None,
        holiday_bonus: None,
        health_insurance: Some(dec("30000")),
        workplace_accident: None,
        death_benefit: None,
        retirement_fund: Some(dec("20000")),
        pension_fund: None,
        uniform_fee: None,
        management_fee: Some(dec("100000")),
    };

    let batch = BillingBatchRequest {
        period_start: date(2025, 3, 1),
        period_end: date(2025, 3, 31),
        items: vec![item("E001"), item("E002"), item("E003")],
    };

    let outcome = repo.batch_create(batch, &rules).await.unwrap();
    assert_eq!(outcome.created.len(), 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].worker_id, "E002");
    assert!(outcome.skipped[0].reason.contains("March 2025"));

    let (_, total) = repo.list(&BillingFilter::default()).await.unwrap();
    assert_eq!(total, 3);
}

#[tokio::test]
#[serial]
async fn summary_totals_match_the_rows() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    common::seed_workers(&pool, &["E001", "E002"]).await;
    let repo = BillingRepository::new(pool);
    let rules = common::rules();

    repo.create(MockData::billing_input("E001", date(2025, 3, 1)), &rules)
        .await
        .unwrap();
    repo.create(MockData::billing_input("E002", date(2025, 3, 1)), &rules)
        .await
        .unwrap();
    repo.create(MockData::billing_input("E001", date(2025, 4, 1)), &rules)
        .await
        .unwrap();

    let summary = repo
        .summary(&BillingFilter {
            month: Some(3),
            year: Some(2025),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(summary.record_count, 2);
    assert_eq!(summary.total_days_worked, dec("40.00"));
    assert_eq!(summary.total_worker_payout, dec("4100000.00"));
    assert_eq!(summary.total_contribution, dec("386000.00"));
    assert_eq!(summary.total_billable, dec("4486000.00"));
    assert_eq!(summary.by_position.len(), 1);
    assert_eq!(summary.by_position[0].position, "Security");
    assert_eq!(summary.by_position[0].record_count, 2);
}

#[tokio::test]
#[serial]
async fn validation_collects_field_errors() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = BillingRepository::new(pool);

    let mut input = MockData::billing_input("E001", date(2025, 3, 1));
    input.days_worked = dec("-1");
    input.management_fee = Some(dec("-5"));

    let err = repo.create(input, &common::rules()).await.unwrap_err();
    match err {
        AppError::Validation { errors } => {
            assert!(errors.contains_key("daysWorked"));
            assert!(errors.contains_key("managementFee"));
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}
