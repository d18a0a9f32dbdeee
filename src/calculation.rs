use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_days, days_between_inclusive, next_day_of_month};
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::fees::{self, FeeBreakdown};
use crate::plan::{BorrowerProfile, LoanPlan};
use crate::schedule::{self, EmiInstallment};
use crate::types::DaysSource;

/// result of the loan calculation core
///
/// the single entry point reused by application, disbursal and
/// recalculation flows. deterministic: identical inputs, including the
/// as-of date, always produce identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCalculation {
    pub principal: Money,
    /// resolved interest day count
    pub days: i64,
    pub days_source: DaysSource,
    pub interest: Money,
    pub fees: FeeBreakdown,
    pub disbursal_amount: Money,
    pub total_repayable: Money,
    /// single due date, or every installment date for multi-EMI plans
    pub due_dates: Vec<NaiveDate>,
    /// populated for multi-EMI plans only
    pub emi_schedule: Vec<EmiInstallment>,
}

impl LoanCalculation {
    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.due_dates.first().copied()
    }
}

/// resolved duration: day count plus the due date it implies
struct ResolvedDays {
    days: i64,
    source: DaysSource,
    first_due: NaiveDate,
    anchor_day: Option<u32>,
}

/// compute disbursal amount, interest and total repayable for a loan
pub fn calculate(
    principal: Money,
    plan: &LoanPlan,
    borrower: &BorrowerProfile,
    as_of: NaiveDate,
    custom_days: Option<i64>,
    config: &EngineConfig,
) -> Result<LoanCalculation> {
    plan.validate()?;

    if !principal.is_positive() {
        return Err(EngineError::InvalidPrincipal { amount: principal });
    }

    let resolved = resolve_days(plan, borrower, as_of, custom_days)?;

    let breakdown = fees::decompose(
        principal,
        &plan.fees,
        plan.emi_count,
        plan.is_multi_emi(),
        config.gst_rate,
    );

    let (due_dates, emi_schedule, interest) = if plan.is_multi_emi() {
        let due_dates = match resolved.anchor_day {
            Some(day) => schedule::monthly_due_dates(resolved.first_due, day, plan.emi_count),
            None => schedule::fixed_interval_due_dates(resolved.first_due, plan.emi_count),
        };
        let installments = schedule::build_schedule(
            principal,
            plan.interest_rate_per_day,
            as_of,
            &due_dates,
            breakdown.per_installment_addition(plan.emi_count),
        )?;
        // reported interest is the schedule's own total, so the single-shot
        // and per-installment views reconcile until an extension intervenes
        let interest = schedule::total_interest(&installments);
        (due_dates, installments, interest)
    } else {
        let interest = principal.interest_for_days(plan.interest_rate_per_day, resolved.days);
        (vec![resolved.first_due], Vec::new(), interest)
    };

    let disbursal_amount = principal - breakdown.total_disbursal_deduction();
    let total_repayable = principal + interest + breakdown.total_repayable_addition();

    Ok(LoanCalculation {
        principal,
        days: resolved.days,
        days_source: resolved.source,
        interest,
        fees: breakdown,
        disbursal_amount,
        total_repayable,
        due_dates,
        emi_schedule,
    })
}

fn resolve_days(
    plan: &LoanPlan,
    borrower: &BorrowerProfile,
    as_of: NaiveDate,
    custom_days: Option<i64>,
) -> Result<ResolvedDays> {
    if let Some(days) = custom_days {
        if days < 0 {
            return Err(EngineError::InvalidDuration { days });
        }
        return Ok(ResolvedDays {
            days,
            source: DaysSource::Custom,
            first_due: add_days(as_of, days),
            anchor_day: None,
        });
    }

    if plan.calculate_by_salary_date {
        if let Some(salary_day) = borrower.anchoring_day() {
            let first_due = next_qualifying_salary_date(as_of, salary_day, plan.repayment_days);
            return Ok(ResolvedDays {
                days: days_between_inclusive(as_of, first_due),
                source: DaysSource::SalaryDate,
                first_due,
                anchor_day: Some(salary_day),
            });
        }
    }

    let days = plan.repayment_days as i64;
    Ok(ResolvedDays {
        days,
        source: DaysSource::Fixed,
        first_due: add_days(as_of, days),
        anchor_day: None,
    })
}

/// next salary date whose inclusive gap from `as_of` meets the plan minimum
///
/// starts at the first salary date strictly after `as_of` and rolls
/// forward month by month while the gap stays short.
fn next_qualifying_salary_date(as_of: NaiveDate, salary_day: u32, minimum_days: u32) -> NaiveDate {
    let mut candidate = next_day_of_month(as_of, salary_day, 0);
    while days_between_inclusive(as_of, candidate) < minimum_days as i64 {
        candidate = next_day_of_month(candidate, salary_day, 0);
    }
    candidate
}
