use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_days, days_between_inclusive, next_day_of_month};
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::InstallmentStatus;

/// one installment of a multi-EMI schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiInstallment {
    /// 1-based position in the schedule
    pub instalment_no: u32,
    pub due_date: NaiveDate,
    pub outstanding_principal_before: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    /// post-service fee + GST share for this installment
    pub fee_component: Money,
    /// sum of the three components, each rounded independently
    pub instalment_amount: Money,
    pub status: InstallmentStatus,
}

/// monthly due dates anchored to a day of month
///
/// the first date is taken as given; each subsequent date is the next
/// occurrence of `anchor_day` after the previous one, so a day-31 anchor
/// clamps through short months and recovers 31 when the month allows it.
pub fn monthly_due_dates(first_due: NaiveDate, anchor_day: u32, count: u32) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count as usize);
    let mut current = first_due;
    for i in 0..count {
        if i > 0 {
            current = next_day_of_month(current, anchor_day, 0);
        }
        dates.push(current);
    }
    dates
}

/// monthly due dates keeping the first date's own day as the anchor
pub fn fixed_interval_due_dates(first_due: NaiveDate, count: u32) -> Vec<NaiveDate> {
    monthly_due_dates(first_due, first_due.day(), count)
}

/// build a reducing-balance EMI schedule
///
/// principal splits as floor-at-paise per installment with the remainder
/// absorbed by the last one, so the components always sum back to the
/// principal exactly. interest per installment is charged on the balance
/// still outstanding, over the inclusive span from the day after the
/// previous due date (the day after `accrual_anchor` for the first) to
/// its own due date.
pub fn build_schedule(
    principal: Money,
    rate_per_day: Rate,
    accrual_anchor: NaiveDate,
    due_dates: &[NaiveDate],
    per_installment_fee: Money,
) -> Result<Vec<EmiInstallment>> {
    if !principal.is_positive() {
        return Err(EngineError::InvalidPrincipal { amount: principal });
    }
    if due_dates.is_empty() {
        return Err(EngineError::InvalidPlan {
            message: "schedule requires at least one due date".to_string(),
        });
    }

    let count = due_dates.len() as u32;
    let principal_per_emi = (principal / Decimal::from(count)).floor2();

    let mut installments = Vec::with_capacity(due_dates.len());
    let mut outstanding = principal;
    let mut period_start = add_days(accrual_anchor, 1);

    for (idx, due_date) in due_dates.iter().enumerate() {
        let is_last = idx == due_dates.len() - 1;
        let principal_component = if is_last {
            // remainder lands here so the components sum exactly
            principal - principal_per_emi * Decimal::from(count - 1)
        } else {
            principal_per_emi
        };

        let days = days_between_inclusive(period_start, *due_date);
        let interest_component = outstanding.interest_for_days(rate_per_day, days);

        installments.push(EmiInstallment {
            instalment_no: idx as u32 + 1,
            due_date: *due_date,
            outstanding_principal_before: outstanding,
            principal_component,
            interest_component,
            fee_component: per_installment_fee,
            instalment_amount: principal_component + interest_component + per_installment_fee,
            status: InstallmentStatus::Pending,
        });

        outstanding -= principal_component;
        period_start = add_days(*due_date, 1);
    }

    Ok(installments)
}

/// recompute remaining installments against shifted due dates
///
/// principal and fee components carry over untouched; interest restarts
/// from the day after `accrual_anchor` (the approval date) for the first
/// remaining installment and runs reducing-balance to each new due date.
pub fn reschedule(
    remaining: &[EmiInstallment],
    new_due_dates: &[NaiveDate],
    rate_per_day: Rate,
    accrual_anchor: NaiveDate,
) -> Result<Vec<EmiInstallment>> {
    if remaining.len() != new_due_dates.len() {
        return Err(EngineError::InvalidPlan {
            message: format!(
                "{} remaining installments but {} new due dates",
                remaining.len(),
                new_due_dates.len()
            ),
        });
    }

    let mut rescheduled = Vec::with_capacity(remaining.len());
    let mut outstanding = remaining
        .first()
        .map(|i| i.outstanding_principal_before)
        .unwrap_or(Money::ZERO);
    let mut period_start = add_days(accrual_anchor, 1);

    for (installment, due_date) in remaining.iter().zip(new_due_dates) {
        let days = days_between_inclusive(period_start, *due_date);
        let interest_component = outstanding.interest_for_days(rate_per_day, days);

        rescheduled.push(EmiInstallment {
            instalment_no: installment.instalment_no,
            due_date: *due_date,
            outstanding_principal_before: outstanding,
            principal_component: installment.principal_component,
            interest_component,
            fee_component: installment.fee_component,
            instalment_amount: installment.principal_component
                + interest_component
                + installment.fee_component,
            status: InstallmentStatus::Pending,
        });

        outstanding -= installment.principal_component;
        period_start = add_days(*due_date, 1);
    }

    Ok(rescheduled)
}

/// sum of interest components
pub fn total_interest(installments: &[EmiInstallment]) -> Money {
    installments
        .iter()
        .map(|i| i.interest_component)
        .fold(Money::ZERO, |acc, x| acc + x)
}

/// sum of principal components
pub fn total_principal(installments: &[EmiInstallment]) -> Money {
    installments
        .iter()
        .map(|i| i.principal_component)
        .fold(Money::ZERO, |acc, x| acc + x)
}

/// sum of installment amounts
pub fn total_payable(installments: &[EmiInstallment]) -> Money {
    installments
        .iter()
        .map(|i| i.instalment_amount)
        .fold(Money::ZERO, |acc, x| acc + x)
}
