//! Pure derivation of the aggregate payroll/billing columns.
//!
//! These functions are the only place the wage arithmetic lives. The write
//! path calls them explicitly right before persisting, so a record can never
//! reach storage with stale or caller-supplied derived fields. No I/O, no
//! clock, no config lookup: everything comes in through the arguments.

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use crate::config::DerivationRules;
use crate::database::models::{BillingInput, PayrollInput};

const MONEY_SCALE: i64 = 2;

/// Derived payroll columns, plus the normalized inputs the override may have
/// rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollBreakdown {
    pub health_insurance: BigDecimal,
    pub retirement_fund: BigDecimal,
    pub pension_fund: BigDecimal,
    pub total_insurance: BigDecimal,
    pub holiday_bonus: BigDecimal,
    pub gross_pay: BigDecimal,
    pub net_pay: BigDecimal,
}

/// Compute the payroll breakdown for one worker-month.
///
/// Workers below the minimum insured tenure get all three insurance
/// components forced to zero, whatever was submitted; the totals then follow
/// from the overridden values.
pub fn derive_payroll(input: &PayrollInput, rules: &DerivationRules) -> PayrollBreakdown {
    let insured = input.days_worked >= rules.min_insured_days;

    let (health_insurance, retirement_fund, pension_fund) = if insured {
        (
            money(&input.health_insurance),
            money(&input.retirement_fund),
            money(&input.pension_fund),
        )
    } else {
        (zero_money(), zero_money(), zero_money())
    };

    let total_insurance = &health_insurance + &retirement_fund + &pension_fund;
    let holiday_bonus = money(&input.holiday_bonus.clone().unwrap_or_default());
    let gross_pay = money(&(&input.daily_rate * &input.days_worked))
        + money(&input.overtime)
        + &holiday_bonus;
    let net_pay = &gross_pay - &total_insurance;

    PayrollBreakdown {
        health_insurance,
        retirement_fund,
        pension_fund,
        total_insurance,
        holiday_bonus,
        gross_pay,
        net_pay,
    }
}

/// Derived billing columns with every optional input coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingBreakdown {
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
}

/// Compute the billing breakdown for one worker-period.
///
/// `total_billable` stays gross of the statutory deduction; only
/// `worker_net` subtracts it. Inherited billing rule, kept intentionally.
pub fn derive_billing(input: &BillingInput, rules: &DerivationRules) -> BillingBreakdown {
    let overtime = opt_money(&input.overtime);
    let holiday_bonus = opt_money(&input.holiday_bonus);
    let health_insurance = opt_money(&input.health_insurance);
    let workplace_accident = opt_money(&input.workplace_accident);
    let death_benefit = opt_money(&input.death_benefit);
    let retirement_fund = opt_money(&input.retirement_fund);
    let pension_fund = opt_money(&input.pension_fund);
    let uniform_fee = opt_money(&input.uniform_fee);
    let management_fee = opt_money(&input.management_fee);

    let total_contribution = &health_insurance
        + &workplace_accident
        + &death_benefit
        + &retirement_fund
        + &pension_fund
        + &uniform_fee
        + &management_fee;

    let worker_payout =
        money(&(&input.daily_rate * &input.days_worked)) + &overtime + &holiday_bonus;
    let worker_net = &worker_payout - &rules.statutory_deduction;
    let total_billable = &worker_payout + &total_contribution;

    BillingBreakdown {
        overtime,
        holiday_bonus,
        health_insurance,
        workplace_accident,
        death_benefit,
        retirement_fund,
        pension_fund,
        uniform_fee,
        management_fee,
        total_contribution,
        worker_payout,
        worker_net,
        total_billable,
    }
}

/// Mean of a summed total over a count, rounded half-up to the whole unit.
/// Zero counts average to zero rather than dividing.
pub fn average(total: &BigDecimal, count: i64) -> BigDecimal {
    if count <= 0 {
        return BigDecimal::zero();
    }
    (total / BigDecimal::from(count)).with_scale_round(0, RoundingMode::HalfUp)
}

fn money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

fn opt_money(value: &Option<BigDecimal>) -> BigDecimal {
    money(&value.clone().unwrap_or_default())
}

fn zero_money() -> BigDecimal {
    BigDecimal::zero().with_scale(MONEY_SCALE)
}
