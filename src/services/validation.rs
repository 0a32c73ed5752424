//! Input validation for the write paths. Runs before derivation; derivation
//! itself assumes already-validated numeric fields and never fails.

use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;

use crate::database::models::{BillingInput, PayrollInput};
use crate::error::AppError;

#[derive(Default)]
struct FieldErrors {
    errors: HashMap<String, Vec<String>>,
}

impl FieldErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn require_non_negative(&mut self, field: &str, value: &BigDecimal) {
        if value < &BigDecimal::zero() {
            self.push(field, "must not be negative");
        }
    }

    fn require_non_negative_opt(&mut self, field: &str, value: &Option<BigDecimal>) {
        if let Some(value) = value {
            self.require_non_negative(field, value);
        }
    }

    fn require_non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    fn require_ordered_period(&mut self, start: NaiveDate, end: NaiveDate) {
        if end < start {
            self.push("periodEnd", "must not be before periodStart");
        }
    }

    fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                errors: self.errors,
            })
        }
    }
}

pub fn validate_payroll_input(input: &PayrollInput) -> Result<(), AppError> {
    let mut errors = FieldErrors::default();

    errors.require_non_empty("workerId", &input.worker_id);
    errors.require_non_empty("nationalId", &input.national_id);
    errors.require_non_empty("fullName", &input.full_name);
    errors.require_non_negative("daysWorked", &input.days_worked);
    errors.require_non_negative("dailyRate", &input.daily_rate);
    errors.require_non_negative("overtime", &input.overtime);
    errors.require_non_negative_opt("holidayBonus", &input.holiday_bonus);
    errors.require_non_negative("healthInsurance", &input.health_insurance);
    errors.require_non_negative("retirementFund", &input.retirement_fund);
    errors.require_non_negative("pensionFund", &input.pension_fund);
    errors.require_ordered_period(input.period_start, input.period_end);

    errors.finish()
}

pub fn validate_billing_input(input: &BillingInput) -> Result<(), AppError> {
    let mut errors = FieldErrors::default();

    errors.require_non_empty("workerId", &input.worker_id);
    errors.require_non_empty("nationalId", &input.national_id);
    errors.require_non_empty("fullName", &input.full_name);
    errors.require_non_negative("daysWorked", &input.days_worked);
    errors.require_non_negative("dailyRate", &input.daily_rate);
    errors.require_non_negative_opt("overtime", &input.overtime);
    errors.require_non_negative_opt("holidayBonus", &input.holiday_bonus);
    errors.require_non_negative_opt("healthInsurance", &input.health_insurance);
    errors.require_non_negative_opt("workplaceAccident", &input.workplace_accident);
    errors.require_non_negative_opt("deathBenefit", &input.death_benefit);
    errors.require_non_negative_opt("retirementFund", &input.retirement_fund);
    errors.require_non_negative_opt("pensionFund", &input.pension_fund);
    errors.require_non_negative_opt("uniformFee", &input.uniform_fee);
    errors.require_non_negative_opt("managementFee", &input.management_fee);
    errors.require_ordered_period(input.period_start, input.period_end);

    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Position;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_payroll() -> PayrollInput {
        PayrollInput {
            worker_id: "E001".to_string(),
            national_id: "3201010101010001".to_string(),
            full_name: "Asep Sunandar".to_string(),
            bank_account: None,
            position: Position::Operator,
            days_worked: dec("20"),
            daily_rate: dec("100000"),
            overtime: dec("0"),
            holiday_bonus: None,
            health_insurance: dec("50000"),
            retirement_fund: dec("20000"),
            pension_fund: dec("10000"),
            pay_month: date(2025, 3, 1),
            paid: None,
            period_start: date(2025, 2, 26),
            period_end: date(2025, 3, 25),
        }
    }

    #[test]
    fn accepts_valid_payroll_input() {
        assert!(validate_payroll_input(&valid_payroll()).is_ok());
    }

    #[test]
    fn rejects_negative_amounts_with_field_detail() {
        let mut input = valid_payroll();
        input.daily_rate = dec("-1");
        input.health_insurance = dec("-50000");

        let err = validate_payroll_input(&input).unwrap_err();
        match err {
            AppError::Validation { errors } => {
                assert!(errors.contains_key("dailyRate"));
                assert!(errors.contains_key("healthInsurance"));
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_inverted_period() {
        let mut input = valid_payroll();
        input.period_start = date(2025, 3, 25);
        input.period_end = date(2025, 3, 1);

        let err = validate_payroll_input(&input).unwrap_err();
        match err {
            AppError::Validation { errors } => assert!(errors.contains_key("periodEnd")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_blank_worker_id() {
        let mut input = valid_payroll();
        input.worker_id = "  ".to_string();

        assert!(validate_payroll_input(&input).is_err());
    }

    #[test]
    fn billing_absent_optionals_are_fine_but_negatives_are_not() {
        let mut input = BillingInput {
            worker_id: "E002".to_string(),
            national_id: "3201010101010002".to_string(),
            full_name: "Budi Santoso".to_string(),
            bank_account: None,
            position: Position::Driver,
            days_worked: dec("22"),
            daily_rate: dec("100000"),
            overtime: None,
            holiday_bonus: None,
            health_insurance: None,
            workplace_accident: None,
            death_benefit: None,
            retirement_fund: None,
            pension_fund: None,
            uniform_fee: None,
            management_fee: None,
            period_start: date(2025, 3, 1),
            period_end: date(2025, 3, 31),
        };
        assert!(validate_billing_input(&input).is_ok());

        input.management_fee = Some(dec("-1"));
        let err = validate_billing_input(&input).unwrap_err();
        match err {
            AppError::Validation { errors } => assert!(errors.contains_key("managementFee")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
